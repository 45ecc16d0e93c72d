use repeater_storage::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;

pub fn init(config: &LoggingConfig, cli_level_override: Option<&str>) -> Result<(), String> {
    let level = resolve_log_level(config, cli_level_override)?;

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(true)
            .pretty()
            .try_init(),
    }
    .map_err(|err| format!("initialize logging subscriber: {err}"))
}

fn resolve_log_level(
    config: &LoggingConfig,
    cli_level_override: Option<&str>,
) -> Result<LevelFilter, String> {
    let raw_level = cli_level_override.unwrap_or(config.level.as_str());
    raw_level.trim().to_ascii_lowercase().parse::<LevelFilter>().map_err(|_| {
        format!("invalid log level `{raw_level}`; expected one of trace, debug, info, warn, error, off")
    })
}

#[cfg(test)]
mod tests {
    use super::resolve_log_level;
    use repeater_storage::LoggingConfig;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(
            resolve_log_level(&LoggingConfig::default(), None).unwrap(),
            LevelFilter::INFO
        );
    }

    #[test]
    fn log_level_prefers_cli_override() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(resolve_log_level(&config, Some("DEBUG")).unwrap(), LevelFilter::DEBUG);
        assert_eq!(resolve_log_level(&config, None).unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let err = resolve_log_level(&LoggingConfig::default(), Some("verbose")).unwrap_err();
        assert!(err.contains("invalid log level"), "unexpected error: {err}");
    }
}
