mod terminal;

use std::{backtrace::Backtrace, panic, path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use flexi_logger::{
    Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecBuilder, LogSpecification, Logger,
    LoggerHandle, Naming,
};
use log::{debug, error, info};
use masterror::{AppError, AppResult};
use timebox_core::{
    clock::{ClockOptions, ClockWidget},
    config::get_config,
    document::Document,
};
use timebox_proto::ports::time::SystemClock;
use tokio::{runtime::Handle, signal};

use crate::terminal::TerminalElement;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    config_path: Option<PathBuf>,

    /// Identifier the terminal line is registered under; defaults to the
    /// configured clock target.
    #[arg(short, long)]
    element_id: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logger = match start_logger() {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("timebox: {err}");
            return ExitCode::FAILURE;
        }
    };
    debug!("args: {args:?}");

    panic::set_hook(Box::new(|info| {
        let b = Backtrace::capture();
        error!("Panic: {info} \n {b}");
    }));

    match run(args, &logger).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logger() -> AppResult<LoggerHandle> {
    Logger::with(
        LogSpecBuilder::new()
            .default(log::LevelFilter::Info)
            .build(),
    )
    .log_to_file(FileSpec::default().directory("/tmp/timebox"))
    .duplicate_to_stderr(Duplicate::Warn)
    .rotate(
        Criterion::Age(Age::Day),
        Naming::Timestamps,
        Cleanup::KeepLogFiles(7),
    )
    .start()
    .map_err(|err| AppError::internal(format!("Failed to start logger: {err}")))
}

fn log_spec(log_level: &str) -> AppResult<LogSpecification> {
    LogSpecification::env_or_parse(log_level)
        .map_err(|err| AppError::validation(format!("Failed to parse log level: {err}")))
}

async fn run(args: Args, logger: &LoggerHandle) -> AppResult<()> {
    let (config, config_path) = get_config(args.config_path)?;
    debug!("Using config {config_path:?}");

    logger.set_new_spec(log_spec(&config.log_level)?);

    let options = ClockOptions::from_config(&config.clock)?;
    let element_id = args
        .element_id
        .unwrap_or_else(|| options.target_id().to_owned());

    let terminal = Arc::new(TerminalElement::stdout());
    let document = Document::new().with_element(element_id, terminal.clone());

    let Some(mut handle) =
        ClockWidget::mount(&document, &options, Arc::new(SystemClock), &Handle::current())
    else {
        info!("Clock target '{}' not found, nothing to display", options.target_id());
        return Ok(());
    };

    signal::ctrl_c()
        .await
        .map_err(|err| AppError::internal(format!("Failed to listen for Ctrl-C: {err}")))?;

    handle.stop();
    terminal
        .finish()
        .map_err(|err| AppError::internal(format!("Failed to finish clock line: {err}")))?;

    info!("Clock stopped after {} renders", handle.render_count());
    Ok(())
}
