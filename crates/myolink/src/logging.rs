use clap::ValueEnum;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Env var holding full filter directives; overrides `--log-level`.
pub const LOG_FILTER_ENV: &str = "MYOLINK_LOG";

/// Crates whose diagnostics `--log-level` controls. Everything else stays at `warn`.
const PROTOCOL_TARGETS: [&str; 6] = [
    "myolink",
    "myolink_transport",
    "myolink_frame",
    "myolink_advert",
    "myolink_stream",
    "myolink_peer",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Filter directives for `level` applied to the protocol crates only.
///
/// Dependencies are capped at `warn`, or lower when `level` is stricter.
pub fn protocol_directives(level: LogLevel) -> String {
    let level = level.as_filter();
    let others = level.min(LevelFilter::WARN);
    let mut directives = vec![others.to_string().to_lowercase()];
    directives.extend(
        PROTOCOL_TARGETS
            .iter()
            .map(|target| format!("{target}={}", level.to_string().to_lowercase())),
    );
    directives.join(",")
}

fn build_filter(level: LogLevel) -> EnvFilter {
    match std::env::var(LOG_FILTER_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .unwrap_or_else(|_| EnvFilter::new(protocol_directives(level))),
        _ => EnvFilter::new(protocol_directives(level)),
    }
}

/// Install the stderr subscriber. Decoder diagnostics (malformed input,
/// truncated association lists, stride mismatches) surface here.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(build_filter(level))
        .with_ansi(false)
        .with_target(matches!(level, LogLevel::Debug | LogLevel::Trace));

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_applies_to_protocol_crates_only() {
        let directives = protocol_directives(LogLevel::Debug);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("myolink_stream=debug"));
        assert!(directives.contains("myolink_peer=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn stricter_levels_also_quiet_dependencies() {
        let directives = protocol_directives(LogLevel::Error);
        assert!(directives.starts_with("error,"));
        assert!(directives.contains("myolink_advert=error"));
    }
}
