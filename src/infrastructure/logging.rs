//! Tracing subscriber initialisation

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a full filter directive, e.g. `voice_sync=trace`
pub const LOG_ENV: &str = "VOICE_SYNC_LOG";

/// Build the filter: `VOICE_SYNC_LOG` wins, otherwise `voice_sync=<level>`,
/// or `debug` when verbose.
pub fn build_filter(level: &str, verbose: bool) -> Result<EnvFilter, String> {
    let level = if verbose { "debug" } else { level };

    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(format!("voice_sync={}", level)))
        .map_err(|e| format!("Invalid log level \"{}\": {}", level, e))
}

/// Install the global subscriber writing compact lines to stderr.
///
/// Stdout stays reserved for command output.
pub fn init_logging(level: &str, verbose: bool) -> Result<(), String> {
    let filter = build_filter(level, verbose)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| format!("Failed to initialise logging: {}", e))
}
