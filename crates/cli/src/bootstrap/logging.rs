use tracing_subscriber::EnvFilter;
use zonequery_domain::config::LoggingConfig;

/// Filter directive from `-v` count, falling back to the config file level.
pub fn log_directive(config: &LoggingConfig, verbosity: u8) -> String {
    match verbosity {
        0 => config.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Logs go to stderr; stdout carries only the rendered result. `RUST_LOG`
/// wins over everything else.
pub fn init_logging(config: &LoggingConfig, verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(config, verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .init();
}
