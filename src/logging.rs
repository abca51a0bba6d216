use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "MACHETE_LOG";

/// Default filter directive for a given `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the stderr subscriber. `MACHETE_LOG` wins over `-v` when set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    // A second init (tests driving `run` twice) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::default_directive;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "info");
        assert_eq!(default_directive(2), "debug");
        assert_eq!(default_directive(7), "debug");
    }
}
