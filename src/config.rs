//! Resolved runtime configuration.
//!
//! `main.rs` owns the clap definitions; this module turns the parsed flags
//! into a validated `Config` and knows where logs go by default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::api::HttpTodoApi;

/// Everything the program needs after argument parsing.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// Overall request timeout. `None` means wait for the server indefinitely.
    pub timeout: Option<Duration>,
    pub log_dir: PathBuf,
    /// Initial user-ID text for the form.
    pub user_id: String,
}

impl Config {
    pub fn new(
        api_url: String,
        timeout_secs: Option<u64>,
        log_dir: Option<PathBuf>,
        user_id: String,
    ) -> Result<Self> {
        let timeout = match timeout_secs {
            Some(0) => bail!("--timeout-secs must be greater than zero"),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };
        Ok(Self {
            api_url,
            timeout,
            // A function name is itself a closure: `default_log_dir` only
            // runs when no directory was given.
            log_dir: log_dir.unwrap_or_else(default_log_dir),
            user_id,
        })
    }

    /// Build the HTTP client for `api_url`.
    pub fn api(&self) -> Result<HttpTodoApi> {
        HttpTodoApi::new(&self.api_url, self.timeout)
            .with_context(|| format!("cannot use API URL {:?}", self.api_url))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }
}

pub const LOG_FILE_NAME: &str = "todo-create.log";

/// `<data dir>/todo-create/logs`, or `./todo-create-logs` on platforms
/// without a data directory.
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("todo-create").join("logs"))
        .unwrap_or_else(|| PathBuf::from("todo-create-logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_BASE_URL;

    #[test]
    fn defaults() {
        let config = Config::new(DEFAULT_BASE_URL.into(), None, None, "1".into()).unwrap();
        assert!(config.timeout.is_none());
        assert_eq!(config.log_dir, default_log_dir());
        assert!(config.log_file().ends_with(LOG_FILE_NAME));
        assert_eq!(config.api().unwrap().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Config::new(DEFAULT_BASE_URL.into(), Some(0), None, "1".into()).is_err());
    }

    #[test]
    fn explicit_log_dir_wins() {
        let config = Config::new(
            DEFAULT_BASE_URL.into(),
            Some(5),
            Some(PathBuf::from("/tmp/logs")),
            "1".into(),
        )
        .unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.log_file(), PathBuf::from("/tmp/logs/todo-create.log"));
    }

    #[test]
    fn bad_api_url_fails_when_building_client() {
        let config = Config::new("ftp://example.com".into(), None, None, "1".into()).unwrap();
        assert!(config.api().is_err());
    }
}
