//! SQL DDL for the request log table.
//!
//! `ip` is nullable so that both column layouts write to the same table.

use crate::db::config::Engine;

pub const MYSQL_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS log (
    id INT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    ts TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    phrase VARCHAR(128) NOT NULL,
    letters VARCHAR(32) NOT NULL,
    ip VARCHAR(45) NULL,
    browser_string VARCHAR(256) NOT NULL,
    results VARCHAR(64) NOT NULL
);
"#;

pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    phrase TEXT NOT NULL,
    letters TEXT NOT NULL,
    ip TEXT NULL,
    browser_string TEXT NOT NULL,
    results TEXT NOT NULL
);
"#;

pub fn init_sql(engine: Engine) -> &'static str {
    match engine {
        Engine::Mysql => MYSQL_INIT,
        Engine::Sqlite => SQLITE_INIT,
    }
}
