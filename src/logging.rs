//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so stdout carries nothing but line protocol.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info";

/// Resolve the filter: an explicit level wins over `RUST_LOG`.
pub fn filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log level {:?}", level))
        }
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global subscriber.
pub fn init(level: Option<&str>, json: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(level)?)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_is_used() {
        let rendered = filter(Some("debug,printwatch_adapters=trace"))
            .unwrap()
            .to_string();
        assert!(rendered.contains("printwatch_adapters=trace"));
    }

    #[test]
    fn invalid_level_is_rejected() {
        assert!(filter(Some("printwatch=notalevel")).is_err());
    }
}
