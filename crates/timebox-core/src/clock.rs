mod format;

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use log::{error, info};
use masterror::AppError;
use thiserror::Error;
use timebox_proto::{
    config::{ClockModuleConfig, DEFAULT_REFRESH_INTERVAL_MS, DEFAULT_TARGET_ID},
    ports::{
        display::{DisplayError, DisplayHost, DisplayTarget},
        time::TimeSource,
    },
};
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

pub use format::{ClockFormat, ClockFormatError};

/// Rejected [`ClockOptions`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockOptionsError {
    /// A zero refresh interval would never let the timer fire.
    #[error("clock refresh interval must be greater than zero")]
    ZeroInterval,
    /// The display pattern is malformed.
    #[error(transparent)]
    Format(#[from] ClockFormatError),
}

impl From<ClockOptionsError> for AppError {
    fn from(err: ClockOptionsError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Mount parameters for a [`ClockWidget`].
///
/// The refresh interval is always non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOptions {
    target_id: String,
    refresh_interval: Duration,
    format: ClockFormat,
}

impl Default for ClockOptions {
    fn default() -> Self {
        Self {
            target_id: DEFAULT_TARGET_ID.to_owned(),
            refresh_interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            format: ClockFormat::us_english(),
        }
    }
}

impl ClockOptions {
    /// Build options from the `[clock]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`ClockOptionsError`] if the interval is zero or the configured
    /// pattern is malformed.
    pub fn from_config(config: &ClockModuleConfig) -> Result<Self, ClockOptionsError> {
        Self::default()
            .with_target_id(config.target_id.clone())
            .with_format(ClockFormat::parse(config.format.clone())?)
            .with_refresh_interval(config.refresh_interval())
    }

    pub fn with_target_id(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = target_id.into();
        self
    }

    /// # Errors
    ///
    /// Returns [`ClockOptionsError::ZeroInterval`] for [`Duration::ZERO`].
    pub fn with_refresh_interval(
        mut self,
        refresh_interval: Duration,
    ) -> Result<Self, ClockOptionsError> {
        if refresh_interval.is_zero() {
            return Err(ClockOptionsError::ZeroInterval);
        }

        self.refresh_interval = refresh_interval;
        Ok(self)
    }

    pub fn with_format(mut self, format: ClockFormat) -> Self {
        self.format = format;
        self
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn format(&self) -> &ClockFormat {
        &self.format
    }
}

/// Writes the formatted current time into a single display target.
#[derive(Debug, Clone)]
pub struct ClockWidget {
    target: Arc<dyn DisplayTarget>,
    format: ClockFormat,
    time_source: Arc<dyn TimeSource>,
    renders: Arc<AtomicU64>,
}

impl ClockWidget {
    pub fn new(
        target: Arc<dyn DisplayTarget>,
        format: ClockFormat,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            target,
            format,
            time_source,
            renders: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Locate the display target in `host`, render once and start the timer.
    ///
    /// Returns `None` without side effects when the host has no element under
    /// `options.target_id()`. Otherwise the target already shows the time when
    /// this returns, and the next render happens one refresh interval later on
    /// `runtime`.
    pub fn mount<H>(
        host: &H,
        options: &ClockOptions,
        time_source: Arc<dyn TimeSource>,
        runtime: &Handle,
    ) -> Option<ClockHandle>
    where
        H: DisplayHost + ?Sized,
    {
        let target = host.get_element_by_id(&options.target_id)?;
        let widget = Self::new(target, options.format.clone(), time_source);

        let failing = match widget.render() {
            Ok(_) => false,
            Err(DisplayError::Detached) => return None,
            Err(err) => {
                error!("Failed to render clock: {err}");
                true
            }
        };

        let period = options.refresh_interval;
        let start = Instant::now() + period;
        let task = runtime.spawn(run_ticker(widget.clone(), start, period, failing));

        Some(ClockHandle {
            widget,
            task: Some(task),
        })
    }

    /// Format the current moment and write it to the target.
    ///
    /// Returns the text that was written.
    pub fn render(&self) -> Result<String, DisplayError> {
        let text = self.format.format(&self.time_source.now());
        self.target.set_text(&text)?;
        self.renders.fetch_add(1, Ordering::Relaxed);

        Ok(text)
    }

    /// Number of writes that reached the target.
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}

/// Only the first failure of a run of failed writes is logged.
async fn run_ticker(widget: ClockWidget, start: Instant, period: Duration, mut failing: bool) {
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match widget.render() {
            Ok(_) if failing => {
                info!("Clock target accepts writes again");
                failing = false;
            }
            Ok(_) => {}
            Err(DisplayError::Detached) => {
                info!("Clock target detached, stopping timer");
                break;
            }
            Err(err) if !failing => {
                error!("Failed to render clock: {err}");
                failing = true;
            }
            Err(_) => {}
        }
    }
}

/// Owns the repeating timer of a mounted clock.
///
/// Dropping the handle cancels the timer.
#[derive(Debug)]
pub struct ClockHandle {
    widget: ClockWidget,
    task: Option<JoinHandle<()>>,
}

impl ClockHandle {
    pub fn widget(&self) -> &ClockWidget {
        &self.widget
    }

    pub fn render_count(&self) -> u64 {
        self.widget.render_count()
    }

    /// Whether the timer task is still alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the timer. No render starts after this returns.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
