use crate::settings::LoggingSettings;
use anyhow::Result;
use std::sync::OnceLock;
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

static INIT_GUARD: OnceLock<()> = OnceLock::new();

fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(settings.level.to_tracing_level_filter().into())
        .from_env_lossy()
}

/// Install a subscriber for the bridge's diagnostics.
///
/// Does nothing when logging is disabled in `settings` or a previous call
/// already ran. A subscriber installed by the host wins; ours is dropped.
pub fn initialize_logging(settings: &LoggingSettings) -> Result<()> {
    if !settings.enabled {
        return Ok(());
    }
    if INIT_GUARD.set(()).is_err() {
        return Ok(());
    }

    // Forward `log` records from host crates; ignore 'already set'
    let _ = tracing_log::LogTracer::init();

    let maybe_log_file = settings.file.as_ref().map(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
    });

    match maybe_log_file {
        Some(Ok(log_file)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::sync::Mutex::new(log_file))
                .with_target(true)
                .with_ansi(false)
                .with_filter(env_filter(settings));
            let _ = tracing_subscriber::registry().with(file_layer).try_init();
        }
        other => {
            // Unwritable or unset file: stderr only
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_env_filter(env_filter(settings))
                .try_init();
            if let Some(Err(e)) = other {
                warn!("Cannot open log file, logging to stderr: {}", e);
            }
        }
    }

    info!("jitetw logging at level {}", settings.level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::LogLevel;

    // Only test in this binary that installs a global subscriber
    #[test]
    fn test_file_logging_reports_effective_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jitetw.log");
        let settings = LoggingSettings {
            enabled: true,
            level: LogLevel::Info,
            file: Some(path.clone()),
        };

        initialize_logging(&settings).unwrap();
        // Second call is a no-op
        initialize_logging(&settings).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("jitetw logging at level info").count(), 1);
    }
}
