//! Structured logging setup

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Crates that log at WARN regardless of the configured level
const QUIET_TARGETS: [&str; 3] = ["hyper_util", "reqwest", "tower_http"];

/// Build the filter for a configured level name.
///
/// Unknown level names fall back to INFO. HTTP plumbing crates are capped at
/// WARN unless the level is DEBUG or TRACE.
pub fn build_filter(level: &str) -> EnvFilter {
    let level = match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::new(level.to_string());
    if level < Level::DEBUG {
        for target in QUIET_TARGETS {
            match format!("{}=warn", target).parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => tracing::warn!("Failed to set {} log filter: {}", target, e),
            }
        }
    }
    filter
}

/// Install the global subscriber, JSON-formatted when `json` is set
pub fn init_logging(
    level: &str,
    json: bool,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = build_filter(level);
    if json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_configured_level() {
        let debug = build_filter("debug").to_string().to_lowercase();
        assert!(debug.contains("debug"));
        assert!(!debug.contains("reqwest"));

        let warn = build_filter("WARN").to_string().to_lowercase();
        for target in QUIET_TARGETS {
            assert!(warn.contains(&format!("{}=warn", target)));
        }
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let rendered = build_filter("chatty").to_string().to_lowercase();
        assert!(rendered.contains("info"));
        assert!(rendered.contains("reqwest=warn"));
    }
}
