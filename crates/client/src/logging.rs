use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "stagehand.log";

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// JSON records to a daily file under `log_dir`, readable lines on stderr.
///
/// Stdout is left to the command output. `RUST_LOG` wins over `default_directive`.
pub fn init_logging(log_dir: &str, default_directive: &str) {
    let file_appender = rolling::daily(log_dir, LOG_FILE_NAME);
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_applies_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(
            env_filter("warn").max_level_hint(),
            Some(tracing_subscriber::filter::LevelFilter::WARN)
        );
    }
}
