use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Which database engine a [`SessionConfig`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Mysql,
    /// `database` is a file path; host and credentials are ignored.
    Sqlite,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Mysql => f.write_str("mysql"),
            Engine::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Connection parameters for one session. Immutable once built.
///
/// `Debug` redacts the password; nothing in this crate logs it.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub engine: Engine,
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: Option<u16>,
    /// Milliseconds allowed for establishing the connection.
    pub connect_timeout_ms: Option<u64>,
}

impl SessionConfig {
    pub fn mysql(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            engine: Engine::Mysql,
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port: None,
            connect_timeout_ms: None,
        }
    }

    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            engine: Engine::Sqlite,
            host: String::new(),
            user: String::new(),
            password: String::new(),
            database: path.into(),
            port: None,
            connect_timeout_ms: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.connect_timeout_ms = Some(millis);
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::mysql("127.0.0.1", "vsearch", "", "vsearchlogDB")
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let cfg = SessionConfig::mysql("db.local", "u", "s3cret!", "d");
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("s3cret!"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("db.local"));
    }

    #[test]
    fn sub_second_connect_timeout_keeps_its_precision() {
        let cfg =
            SessionConfig::sqlite("x.sqlite").with_connect_timeout(Duration::from_millis(500));
        assert_eq!(cfg.connect_timeout(), Some(Duration::from_millis(500)));

        let cfg = cfg.with_connect_timeout(Duration::from_millis(1500));
        assert_eq!(cfg.connect_timeout_ms, Some(1500));
        assert_eq!(cfg.connect_timeout(), Some(Duration::from_millis(1500)));

        assert_eq!(SessionConfig::default().connect_timeout(), None);
    }
}
