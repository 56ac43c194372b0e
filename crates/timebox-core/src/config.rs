use std::{
    env::VarError,
    fs, io,
    path::{Path, PathBuf},
};

pub use timebox_proto::config::*;

use log::{info, warn};
use masterror::AppError;
use shellexpand::{LookupError, full};
use thiserror::Error;

/// Errors raised while locating, reading or validating the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to expand config path: {0}")]
    Expand(#[from] LookupError<VarError>),
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigValidationError),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { .. } => AppError::not_found(err.to_string()),
            ConfigError::Parse(_) | ConfigError::Invalid(_) => AppError::validation(err.to_string()),
            ConfigError::Expand(_) | ConfigError::Read { .. } => AppError::internal(err.to_string()),
        }
    }
}

/// Load the configuration and return it with the resolved path.
///
/// An explicit `path` must exist. Without one, the default location is used
/// and a missing file falls back to [`Config::default`].
pub fn get_config(path: Option<PathBuf>) -> Result<(Config, PathBuf), ConfigError> {
    let (config, path) = match path {
        Some(path) => {
            info!("Config path provided {path:?}");
            let expanded = expand_path(&path)?;

            if !expanded.exists() {
                return Err(ConfigError::NotFound {
                    path: expanded,
                });
            }

            (read_config(&expanded)?, expanded)
        }
        None => {
            let expanded = expand_path(Path::new(DEFAULT_CONFIG_FILE_PATH))?;

            if expanded.exists() {
                (read_config(&expanded)?, expanded)
            } else {
                info!("No config file at {expanded:?}, using defaults");
                (Config::default(), expanded)
            }
        }
    };

    config.validate()?;

    Ok((config, path))
}

fn expand_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let str_path = path.to_string_lossy();
    let expanded = full(&str_path)?;

    Ok(PathBuf::from(expanded.as_ref()))
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| {
        warn!("Failed to read config file: {source}");
        ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!("Decoding config file {path:?}");

    let config = toml::from_str(&content).inspect_err(|e| {
        warn!("Failed to parse config file: {e}");
    })?;

    info!("Config file loaded successfully");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn reads_explicit_config_file() {
        let file = config_file(
            r#"
            log_level = "info"

            [clock]
            target_id = "clock"
            refresh_interval_ms = 500
            "#,
        );

        let (config, path) = get_config(Some(file.path().to_path_buf())).expect("config loads");

        assert_eq!(path, file.path());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.clock.target_id, "clock");
        assert_eq!(config.clock.refresh_interval_ms, 500);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");

        let err = get_config(Some(missing.clone())).expect_err("missing file rejected");
        assert!(matches!(err, ConfigError::NotFound { ref path } if *path == missing));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let file = config_file("[clock\ntarget_id = ");

        let err = get_config(Some(file.path().to_path_buf())).expect_err("parse failure");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let file = config_file("[clock]\nrefresh_interval_ms = 0\n");

        let err = get_config(Some(file.path().to_path_buf())).expect_err("validation failure");
        assert!(matches!(
            err,
            ConfigError::Invalid(ConfigValidationError::ZeroInterval)
        ));
    }
}
