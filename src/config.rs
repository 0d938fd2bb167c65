//! Service settings.
//!
//! Values come from `KEYJOURNAL_*` environment variables layered over the
//! defaults below. The token variables are read separately by
//! [`crate::auth::tokens::TokenStore::load`] and are not part of [`Config`].

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::JournalError;

pub const ENV_PREFIX: &str = "KEYJOURNAL_";
pub const TOKENS_FILE_ENV: &str = "KEYJOURNAL_TOKENS_FILE";
pub const TOKENS_ENV: &str = "KEYJOURNAL_TOKENS";

const DATABASE_FILE: &str = "app.db";
const AUDIT_LOG_FILE: &str = "app.log";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory holding the SQLite database file.
    pub data_dir: PathBuf,
    /// Directory holding the audit log.
    pub log_dir: PathBuf,
    /// Directory holding `index.html`.
    pub static_dir: PathBuf,
    pub listen_addr: String,
    pub loglevel: String,
    /// Mark the login cookie `Secure`; set when TLS terminates in front of us.
    pub secure_cookie: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_dir: PathBuf::from("./logs"),
            static_dir: PathBuf::from("./static"),
            listen_addr: "0.0.0.0:8907".to_string(),
            loglevel: "info".to_string(),
            secure_cookie: false,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["tokens", "tokens_file"]))
    }

    pub fn from_env() -> Result<Self, JournalError> {
        Ok(Self::figment().extract()?)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.log_dir.join(AUDIT_LOG_FILE)
    }

    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}
