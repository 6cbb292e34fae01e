//! Configuration for the harness, loaded from `apiprobe.toml`.
//!
//! Loading order:
//!
//! 1. If `APIPROBE_CONFIG` is set, load from that path (a missing file is
//!    an error, since the caller asked for it explicitly).
//! 2. Otherwise load `apiprobe.toml` from the current directory; a missing
//!    file falls back to defaults, a malformed one is an error.
//!
//! Individual values can then be overridden from the environment:
//! `APIPROBE_BASE_URL`, `APIPROBE_HEALTH_PATH`, `APIPROBE_TIMEOUT_MS`,
//! `APIPROBE_RESPONSE_TIME_CEILING_MS`. A `.env` file is honored via
//! `dotenv`.
//!
//! ```toml
//! base_url = "http://localhost:3000"
//! timeout = "10s"
//! response_time_ceiling = "2s"
//! health_path = "/health"
//! ```

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{io::Read, path::Path, time::Duration};
use tracing::*;

use crate::{Error, Result};

/// Environment variable name for specifying the config file path.
const APIPROBE_CONFIG_ENV: &str = "APIPROBE_CONFIG";

static CONFIG: Lazy<Config> = Lazy::new(|| {
    let _ = dotenv::dotenv();
    Config::load().unwrap_or_default()
});

/// Get the cached harness configuration.
pub fn get_config() -> &'static Config {
    &CONFIG
}

/// apiprobe's configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the API under test.
    pub base_url: String,
    /// Per-request timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Ceiling used by response-time assertions.
    #[serde(with = "humantime_serde")]
    pub response_time_ceiling: Duration,
    /// Path probed by `Client::health_check`.
    pub health_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(10),
            response_time_ceiling: Duration::from_secs(2),
            health_path: "/health".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a specific path. A file that cannot be
    /// opened yields the defaults with env overrides applied; a file that
    /// cannot be parsed is an error.
    fn load_from(path: &Path) -> Result<Config> {
        let Ok(mut file) = std::fs::File::open(path) else {
            // no file is fine; env overrides still apply on top of the defaults
            let mut cfg = Config::default();
            cfg.load_env();
            return Ok(cfg);
        };

        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .map_err(|e| Error::Config(e.to_string()))?;

        let mut cfg: Config = toml::from_str(&buf).map_err(|e| {
            Error::Config(format!(
                "failed to deserialize apiprobe.toml into apiprobe_core::Config: {e}"
            ))
        })?;

        debug!("apiprobe.toml was successfully loaded: {cfg:#?}");

        cfg.load_env();

        Ok(cfg)
    }

    fn load() -> Result<Config> {
        match std::env::var(APIPROBE_CONFIG_ENV) {
            Ok(path) => {
                let path = Path::new(&path);
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file specified by {APIPROBE_CONFIG_ENV} not found: {path:?}"
                    )));
                }
                debug!("loading config from {APIPROBE_CONFIG_ENV}={path:?}");
                Config::load_from(path)
            }
            Err(_) => Config::load_from(Path::new("apiprobe.toml")),
        }
    }

    /// Apply `APIPROBE_*` environment overrides on top of the file values.
    /// Unparseable duration overrides are logged and ignored.
    fn load_env(&mut self) {
        if let Ok(base_url) = std::env::var("APIPROBE_BASE_URL") {
            self.base_url = base_url;
        }
        if let Ok(health_path) = std::env::var("APIPROBE_HEALTH_PATH") {
            self.health_path = health_path;
        }
        if let Ok(timeout) = std::env::var("APIPROBE_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => self.timeout = Duration::from_millis(ms),
                Err(e) => error!("APIPROBE_TIMEOUT_MS must be an integer number of milliseconds, got {timeout:?}: {e}"),
            }
        }
        if let Ok(ceiling) = std::env::var("APIPROBE_RESPONSE_TIME_CEILING_MS") {
            match ceiling.parse::<u64>() {
                Ok(ms) => self.response_time_ceiling = Duration::from_millis(ms),
                Err(e) => error!("APIPROBE_RESPONSE_TIME_CEILING_MS must be an integer number of milliseconds, got {ceiling:?}: {e}"),
            }
        }

        debug!("apiprobe configuration after env overrides: {self:#?}");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, "http://localhost:3000");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.response_time_ceiling, Duration::from_secs(2));
        assert_eq!(cfg.health_path, "/health");
    }

    #[test]
    fn parse_full_file() {
        let cfg: Config = toml::from_str(
            r#"
            base_url = "http://localhost:8080"
            timeout = "30s"
            response_time_ceiling = "500ms"
            health_path = "/healthz"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.response_time_ceiling, Duration::from_millis(500));
        assert_eq!(cfg.health_path, "/healthz");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let cfg: Config = toml::from_str(r#"base_url = "http://localhost:8080""#).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8080");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from(Path::new("/nonexistent/apiprobe.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    #[serial]
    fn env_overrides_apply_without_a_config_file() {
        std::env::set_var("APIPROBE_BASE_URL", "http://localhost:1234");
        let cfg = Config::load_from(Path::new("/nonexistent/apiprobe.toml")).unwrap();
        std::env::remove_var("APIPROBE_BASE_URL");

        assert_eq!(cfg.base_url, "http://localhost:1234");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join("apiprobe-malformed.toml");
        std::fs::write(&path, "timeout = {{{{").unwrap();
        let result = Config::load_from(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn env_overrides_apply() {
        std::env::set_var("APIPROBE_BASE_URL", "http://localhost:9999");
        std::env::set_var("APIPROBE_TIMEOUT_MS", "1500");
        let mut cfg = Config::default();
        cfg.load_env();
        std::env::remove_var("APIPROBE_BASE_URL");
        std::env::remove_var("APIPROBE_TIMEOUT_MS");

        assert_eq!(cfg.base_url, "http://localhost:9999");
        assert_eq!(cfg.timeout, Duration::from_millis(1500));
    }

    #[test]
    #[serial]
    fn unparseable_duration_override_is_ignored() {
        std::env::set_var("APIPROBE_TIMEOUT_MS", "fast");
        let mut cfg = Config::default();
        cfg.load_env();
        std::env::remove_var("APIPROBE_TIMEOUT_MS");

        assert_eq!(cfg.timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn error_when_explicit_config_path_not_found() {
        std::env::set_var(APIPROBE_CONFIG_ENV, "/nonexistent/path/apiprobe.toml");
        let result = Config::load();
        std::env::remove_var(APIPROBE_CONFIG_ENV);

        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"), "unexpected error: {err}");
    }
}
