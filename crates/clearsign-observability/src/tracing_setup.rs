//! Subscriber setup for the `clearsign` binary and tests.
//!
//! Filter precedence: `RUST_LOG` if set, then [`LogConfig::directives`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// A global level plus per-crate overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level for everything not listed in `components`
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// One JSON object per event instead of text lines
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// `--verbose` raises the clearsign crates to debug; everything else stays at the default.
    pub fn for_cli(verbose: bool, json: bool) -> Self {
        let mut config = Self {
            json,
            ..Self::default()
        };
        let level = if verbose { "debug" } else { "info" };
        for component in [
            "clearsign",
            "clearsign-core",
            "clearsign-transform",
            "clearsign-explorer",
            "clearsign-verify",
        ] {
            config.components.insert(component.into(), level.into());
        }
        config
    }

    /// Filter directives, e.g. `warn,clearsign_verify=debug`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Initialise tracing with the given log config. `RUST_LOG`, when set, wins.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.directives()))
        .unwrap_or_else(|_| EnvFilter::new(default_level()));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_use_crate_names() {
        let mut config = LogConfig::default();
        config.components.insert("clearsign-explorer".into(), "trace".into());
        assert_eq!(config.directives(), "warn,clearsign_explorer=trace");
    }

    #[test]
    fn verbose_cli_config() {
        let config = LogConfig::for_cli(true, false);
        assert!(config.directives().contains("clearsign_verify=debug"));
        assert!(!LogConfig::for_cli(false, true).directives().contains("debug"));
    }

    #[test]
    fn yaml_defaults() {
        let config: LogConfig = serde_yaml::from_str("json: true").unwrap();
        assert_eq!(config.level, "warn");
        assert!(config.json);
    }

    #[test]
    fn second_init_is_refused() {
        let config = LogConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
