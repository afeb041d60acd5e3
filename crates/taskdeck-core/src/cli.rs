use std::io::IsTerminal;

use anyhow::anyhow;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// `KEY=VALUE` pair given through a repeated `--rc` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

impl From<KeyVal> for (String, String) {
    fn from(kv: KeyVal) -> Self {
        (kv.key, kv.value)
    }
}

pub fn default_level(verbose: u8, quiet: u8) -> &'static str {
    if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over the flag-derived
/// level; a subscriber installed earlier (tests) is left in place.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_pairs() {
        let kv: KeyVal = "server.bind = 0.0.0.0:9000".parse().expect("valid pair");
        assert_eq!(kv.key, "server.bind");
        assert_eq!(kv.value, "0.0.0.0:9000");
        assert!("no-separator".parse::<KeyVal>().is_err());
    }

    #[test]
    fn quiet_beats_verbose() {
        assert_eq!(default_level(3, 1), "warn");
        assert_eq!(default_level(0, 0), "warn");
        assert_eq!(default_level(2, 0), "debug");
        assert_eq!(default_level(0, 2), "error");
    }
}
