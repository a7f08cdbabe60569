use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{COOKIE, USER_AGENT};
use tracing::debug;

use crate::error::{OomError, Result};

const AGENT: &str = "Mozilla/5.0 (oom_season)";

/// Source of raw page bytes. Injected into the pipeline so tests and
/// alternative session handling can stand in for the live site.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Live fetcher backed by a blocking reqwest client built once up front.
pub struct HttpFetcher {
    client: Client,
    session_cookie: Option<String>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, session_cookie: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| OomError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            session_cookie,
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "fetching page");
        let mut req = self.client.get(url).header(USER_AGENT, AGENT);
        if let Some(cookie) = self.session_cookie.as_deref() {
            req = req.header(COOKIE, cookie);
        }

        let fetch_err = |reason: String| OomError::Fetch {
            url: url.to_string(),
            reason,
        };
        let resp = req.send().map_err(|err| fetch_err(err.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(fetch_err(format!("server returned {status}")));
        }
        let body = resp
            .bytes()
            .map_err(|err| fetch_err(format!("failed reading body: {err}")))?;
        Ok(body.to_vec())
    }
}
