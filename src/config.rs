use crate::db::config::SessionConfig;
use crate::db::models::LogColumns;
use crate::error::AppError;
use axum_extra::extract::cookie::Key;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "VSEARCH_";

/// Cookie signing plus encryption keys are taken from this much key material.
const MIN_COOKIE_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub database: SessionConfig,
    pub request_log: RequestLogConfig,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Master secret for the private login cookie. Random per process when unset.
    pub cookie_secret: Option<String>,
    /// When set, `/login` requires `?key=<login_key>`.
    pub login_key: Option<String>,
    pub insecure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            cookie_secret: None,
            login_key: None,
            insecure_cookie: false,
        }
    }
}

impl fmt::Debug for BasicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("BasicConfig")
            .field("listen_addr", &self.listen_addr)
            .field("loglevel", &self.loglevel)
            .field("cookie_secret", &redact(&self.cookie_secret))
            .field("login_key", &redact(&self.login_key))
            .field("insecure_cookie", &self.insecure_cookie)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestLogConfig {
    pub columns: LogColumns,
    /// Artificial delay before each log write; 0 disables it.
    pub simulated_latency_ms: u64,
}

impl RequestLogConfig {
    pub fn simulated_latency(&self) -> Option<Duration> {
        (self.simulated_latency_ms > 0).then(|| Duration::from_millis(self.simulated_latency_ms))
    }
}

impl Config {
    /// Defaults, then the TOML file (if present), then `VSEARCH_*` env vars
    /// with `__` separating nested keys (`VSEARCH_DATABASE__PASSWORD`).
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load from `$VSEARCH_CONFIG_FILE` or `config.toml`.
    pub fn load() -> Result<Self, AppError> {
        let path = std::env::var("VSEARCH_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let cfg: Config = Self::figment(path).extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.listen_addr()?;
        if let Some(secret) = &self.basic.cookie_secret
            && secret.len() < MIN_COOKIE_SECRET_LEN
        {
            return Err(AppError::InvalidConfig(format!(
                "basic.cookie_secret must be at least {MIN_COOKIE_SECRET_LEN} bytes"
            )));
        }
        if self.database.database.is_empty() {
            return Err(AppError::InvalidConfig(
                "database.database must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.basic.listen_addr.parse()?)
    }

    /// Key for the private login cookie; random (per process) when no secret is set.
    pub fn cookie_key(&self) -> Result<Key, AppError> {
        match &self.basic.cookie_secret {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|e| AppError::InvalidConfig(format!("basic.cookie_secret: {e}"))),
            None => Ok(Key::generate()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::config::Engine;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let cfg: Config = Config::figment("missing.toml").extract()?;
            assert_eq!(cfg.basic.listen_addr, "0.0.0.0:8000");
            assert_eq!(cfg.database.engine, Engine::Mysql);
            assert_eq!(cfg.database.host, "127.0.0.1");
            assert_eq!(cfg.request_log.columns, LogColumns::WithClientAddr);
            assert!(cfg.request_log.simulated_latency().is_none());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [database]
                host = "db.local"
                user = "u"
                password = "from-file"
                database = "d"
                port = 3307

                [request_log]
                columns = "without_client_addr"
                simulated_latency_ms = 250
                "#,
            )?;
            jail.set_env("VSEARCH_DATABASE__PASSWORD", "from-env");

            let cfg: Config = Config::figment("config.toml").extract()?;
            assert_eq!(cfg.database.host, "db.local");
            assert_eq!(cfg.database.port, Some(3307));
            assert_eq!(cfg.database.password, "from-env");
            assert_eq!(cfg.request_log.columns, LogColumns::WithoutClientAddr);
            assert_eq!(
                cfg.request_log.simulated_latency(),
                Some(Duration::from_millis(250))
            );
            Ok(())
        });
    }

    #[test]
    fn short_cookie_secret_is_rejected() {
        let mut cfg = Config::default();
        cfg.basic.cookie_secret = Some("short".to_string());
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));

        cfg.basic.cookie_secret = Some("x".repeat(MIN_COOKIE_SECRET_LEN));
        assert!(cfg.validate().is_ok());
        assert!(cfg.cookie_key().is_ok());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let mut cfg = Config::default();
        cfg.basic.login_key = Some("let-me-in".to_string());
        cfg.database.password = "quakA!".to_string();
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("let-me-in"));
        assert!(!printed.contains("quakA!"));
    }
}
