use std::io::IsTerminal;

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Pick the log filter: `-q`/`-v` win over the config level, which wins
/// over the `warn` default. `RUST_LOG` overrides all of them.
pub fn log_level(verbose: u8, quiet: u8, configured: Option<&str>) -> String {
    let level = if quiet >= 2 {
        "off"
    } else if quiet == 1 {
        "error"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        return configured.unwrap_or("warn").to_string();
    };
    level.to_string()
}

/// Install the stderr tracing subscriber
pub fn init_tracing(level: &str) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| format!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}
