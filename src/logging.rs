//! Tracing setup. Logs go to a file only; writing to the terminal would tear
//! the TUI.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Env var that overrides `logging.filter`.
pub const LOG_ENV: &str = "ALLEGRO_LOG";

fn filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns whether logging is on.
pub fn init(settings: &LoggingSettings) -> std::io::Result<bool> {
    let Some(path) = settings.file.as_deref() else {
        return Ok(false);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(settings))
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .is_ok();
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_means_logging_off() {
        let settings = LoggingSettings::default();
        assert!(!init(&settings).unwrap());
    }

    #[test]
    fn creates_log_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("allegro.log");
        let settings = LoggingSettings {
            file: Some(path.clone()),
            filter: "debug".to_string(),
        };
        init(&settings).unwrap();
        assert!(path.is_file());
    }
}
