use serde::Deserialize;
use std::fmt;

/// One completed search, as persisted in the `log` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub phrase: String,
    pub letters: String,
    pub client_addr: Option<String>,
    pub user_agent: String,
    pub results: String,
}

impl LogRecord {
    pub fn new(
        phrase: impl Into<String>,
        letters: impl Into<String>,
        client_addr: Option<String>,
        user_agent: impl Into<String>,
        results: impl Into<String>,
    ) -> Self {
        Self {
            phrase: phrase.into(),
            letters: letters.into(),
            client_addr,
            user_agent: user_agent.into(),
            results: results.into(),
        }
    }
}

/// Column layout of the `log` table as deployed.
///
/// `WithClientAddr` writes and reads the `ip` column; `WithoutClientAddr`
/// leaves it out of both statements, and records read back carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogColumns {
    #[default]
    WithClientAddr,
    WithoutClientAddr,
}

impl LogColumns {
    pub fn includes_client_addr(self) -> bool {
        matches!(self, LogColumns::WithClientAddr)
    }

    pub fn column_count(self) -> usize {
        if self.includes_client_addr() { 5 } else { 4 }
    }

    /// Human-readable headings, in select-list order.
    pub fn titles(self) -> &'static [&'static str] {
        match self {
            LogColumns::WithClientAddr => {
                &["Phrase", "Letters", "Remote_addr", "User_agent", "Results"]
            }
            LogColumns::WithoutClientAddr => &["Phrase", "Letters", "User_agent", "Results"],
        }
    }
}

impl fmt::Display for LogColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogColumns::WithClientAddr => f.write_str("with_client_addr"),
            LogColumns::WithoutClientAddr => f.write_str("without_client_addr"),
        }
    }
}
