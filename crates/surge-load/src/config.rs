use std::{str::FromStr, time::Duration};

use thiserror::Error;

use surge_auth::AuthConfig;
use surge_core::PollConfig;
use surge_model::Principal;
use surge_observe::{LoggerConfig, LoggerFormat};
use surge_transport::TransportConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the driver needs for one batch.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub transport: TransportConfig,
    pub auth: AuthConfig,
    pub poll: PollConfig,
    pub logger: LoggerConfig,
    /// Number of concurrent executions.
    pub fanout: usize,
    pub principal: Principal,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            auth: AuthConfig::default(),
            poll: PollConfig::default(),
            logger: LoggerConfig::default(),
            fanout: 100,
            principal: Principal::new("test", "test"),
        }
    }
}

impl LoadConfig {
    /// Defaults overridden by `SURGE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_overrides(&lookup)?;
        Ok(cfg)
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        // Transport
        if let Some(url) = lookup("SURGE_BASE_URL") {
            self.transport.base_url = url;
        }
        if let Some(ms) = parsed::<u64>(lookup, "SURGE_REQUEST_TIMEOUT_MS")? {
            self.transport.timeout_ms = positive("SURGE_REQUEST_TIMEOUT_MS", ms)?;
        }

        // Batch
        if let Some(n) = parsed::<usize>(lookup, "SURGE_FANOUT")? {
            self.fanout = positive("SURGE_FANOUT", n as u64)? as usize;
        }
        let identity = lookup("SURGE_IDENTITY");
        let secret = lookup("SURGE_SECRET");
        if identity.is_some() || secret.is_some() {
            self.principal = Principal::new(
                identity.unwrap_or_else(|| self.principal.identity().to_string()),
                secret.unwrap_or_else(|| self.principal.secret().to_string()),
            );
        }

        // Auth
        if let Some(n) = parsed::<u32>(lookup, "SURGE_AUTH_MAX_RETRIES")? {
            self.auth.max_retries = positive("SURGE_AUTH_MAX_RETRIES", u64::from(n))? as u32;
        }
        if let Some(secs) = parsed::<u64>(lookup, "SURGE_AUTH_DEFAULT_RETRY_AFTER_SECS")? {
            self.auth.default_retry_after = Duration::from_secs(secs);
        }

        // Polling
        if let Some(ms) = parsed::<u64>(lookup, "SURGE_POLL_INITIAL_DELAY_MS")? {
            self.poll.initial_delay = Duration::from_millis(positive("SURGE_POLL_INITIAL_DELAY_MS", ms)?);
        }
        if let Some(ms) = parsed::<u64>(lookup, "SURGE_POLL_MAX_DELAY_MS")? {
            self.poll.max_delay = Duration::from_millis(positive("SURGE_POLL_MAX_DELAY_MS", ms)?);
        }
        if let Some(factor) = parsed::<f64>(lookup, "SURGE_POLL_BACKOFF_FACTOR")? {
            if !factor.is_finite() || factor < 1.0 {
                return Err(invalid("SURGE_POLL_BACKOFF_FACTOR", factor.to_string()));
            }
            self.poll.backoff_factor = factor;
        }
        if let Some(ms) = parsed::<u64>(lookup, "SURGE_POLL_DEADLINE_MS")? {
            self.poll.deadline = Duration::from_millis(positive("SURGE_POLL_DEADLINE_MS", ms)?);
        }
        if self.poll.initial_delay > self.poll.max_delay {
            return Err(invalid(
                "SURGE_POLL_INITIAL_DELAY_MS",
                self.poll.initial_delay.as_millis().to_string(),
            ));
        }

        // Logging
        if let Some(level) = lookup("SURGE_LOG_LEVEL") {
            self.logger.filter = level;
        }
        if let Some(format) = lookup("SURGE_LOG_FORMAT") {
            self.logger.format =
                LoggerFormat::from_str(&format).map_err(|_| invalid("SURGE_LOG_FORMAT", format))?;
        }

        Ok(())
    }
}

fn invalid(key: &'static str, value: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.into(),
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| invalid(key, raw)),
    }
}

fn positive(key: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(invalid(key, "0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<LoadConfig, ConfigError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LoadConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_overrides() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.transport.base_url, "http://localhost:8000");
        assert_eq!(cfg.transport.timeout_ms, 30_000);
        assert_eq!(cfg.fanout, 100);
        assert_eq!(cfg.principal.identity(), "test");
        assert_eq!(cfg.auth.max_retries, 2);
        assert_eq!(cfg.auth.default_retry_after, Duration::from_secs(60));
        assert_eq!(cfg.poll.initial_delay, Duration::from_secs(25));
        assert_eq!(cfg.poll.max_delay, Duration::from_secs(60));
        assert_eq!(cfg.poll.backoff_factor, 1.5);
        assert_eq!(cfg.poll.deadline, Duration::from_secs(190));
        assert_eq!(cfg.logger.filter, "info");
        assert_eq!(cfg.logger.format, LoggerFormat::Text);
    }

    #[test]
    fn environment_overrides_apply() {
        let cfg = load(&[
            ("SURGE_BASE_URL", "https://api.example.test"),
            ("SURGE_FANOUT", "10"),
            ("SURGE_IDENTITY", "loadbot"),
            ("SURGE_AUTH_MAX_RETRIES", "4"),
            ("SURGE_POLL_INITIAL_DELAY_MS", "500"),
            ("SURGE_POLL_BACKOFF_FACTOR", "2"),
            ("SURGE_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(cfg.transport.base_url, "https://api.example.test");
        assert_eq!(cfg.fanout, 10);
        assert_eq!(cfg.principal.identity(), "loadbot");
        assert_eq!(cfg.principal.secret(), "test");
        assert_eq!(cfg.auth.max_retries, 4);
        assert_eq!(cfg.poll.initial_delay, Duration::from_millis(500));
        assert_eq!(cfg.poll.backoff_factor, 2.0);
        assert_eq!(cfg.logger.format, LoggerFormat::Json);
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = load(&[("SURGE_FANOUT", "lots")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "SURGE_FANOUT",
                value: "lots".to_string()
            }
        );
    }

    #[test]
    fn zero_fanout_is_rejected() {
        assert!(load(&[("SURGE_FANOUT", "0")]).is_err());
    }

    #[test]
    fn zero_initial_delay_is_rejected() {
        let err = load(&[("SURGE_POLL_INITIAL_DELAY_MS", "0")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "SURGE_POLL_INITIAL_DELAY_MS",
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn initial_delay_must_not_exceed_cap() {
        let err = load(&[
            ("SURGE_POLL_INITIAL_DELAY_MS", "5000"),
            ("SURGE_POLL_MAX_DELAY_MS", "1000"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "SURGE_POLL_INITIAL_DELAY_MS",
                value: "5000".to_string()
            }
        );

        // Lowering the cap below the default first sleep needs a matching override.
        assert!(load(&[("SURGE_POLL_MAX_DELAY_MS", "10000")]).is_err());
        assert!(load(&[
            ("SURGE_POLL_INITIAL_DELAY_MS", "1000"),
            ("SURGE_POLL_MAX_DELAY_MS", "1000"),
        ])
        .is_ok());
    }

    #[test]
    fn shrinking_backoff_is_rejected() {
        let err = load(&[("SURGE_POLL_BACKOFF_FACTOR", "0.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SURGE_POLL_BACKOFF_FACTOR", .. }));
        assert!(load(&[("SURGE_POLL_BACKOFF_FACTOR", "NaN")]).is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = load(&[("SURGE_LOG_FORMAT", "journald")]).unwrap_err();
        assert_eq!(err.to_string(), r#"invalid value "journald" for SURGE_LOG_FORMAT"#);
    }
}
