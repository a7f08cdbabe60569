use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::site::DEFAULT_SITE_URL;

/// Settings read from the environment (and `.env` files loaded by the
/// binary). Command line flags take precedence over these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub site_url: String,
    pub cache_dir: PathBuf,
    pub conf_path: PathBuf,
    pub out_path: PathBuf,
    pub session_cookie: Option<String>,
    pub http_timeout: Duration,
}

impl RunConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());
        let http_timeout = non_empty("OOM_HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(30)
            .clamp(5, 120);

        Self {
            site_url: non_empty("OOM_SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            cache_dir: non_empty("OOM_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            conf_path: non_empty("OOM_CONF")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("oom.conf")),
            out_path: non_empty("OOM_OUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("out.csv")),
            session_cookie: non_empty("OOM_SESSION_COOKIE"),
            http_timeout: Duration::from_secs(http_timeout),
        }
    }
}
