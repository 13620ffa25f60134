//! Subscriber setup for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. `RUST_LOG` takes precedence over the configured filter.

use tracing_subscriber::EnvFilter;

/// Filter used when `verbose` is requested.
pub const VERBOSE_FILTER: &str = "montepi=debug";

/// Build the filter: `RUST_LOG` if set, else `verbose`, else `configured`.
#[must_use]
pub fn build_filter(configured: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = if verbose { VERBOSE_FILTER } else { configured };
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install a stderr fmt subscriber. Returns false if one was already set.
pub fn init(configured: &str, verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(configured, verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directive_falls_back() {
        // Must not panic on garbage input.
        let _ = build_filter("[[[not a filter", false);
    }

    #[test]
    fn test_second_init_reports_false() {
        let _ = init("warn", false);
        assert!(!init("warn", false));
    }
}
