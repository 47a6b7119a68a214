//! Logging setup.
//!
//! `JSON2MODEL_LOG` takes an `EnvFilter` directive (e.g.
//! `json2model::naming=debug`); without it the level follows `-v`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "JSON2MODEL_LOG";

/// Level used when `JSON2MODEL_LOG` is unset: warn, then info, debug, trace per `-v`.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a compact stderr subscriber. Stdout stays free for `inspect` output.
///
/// # Errors
///
/// Returns an error if the filter cannot be parsed or a subscriber is already set.
pub fn init(verbosity: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;
    Ok(())
}
