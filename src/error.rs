//! Error taxonomy for the competition pipeline.
//!
//! Every variant is fatal to a run: nothing here is recovered locally, the
//! caller decides how to surface it.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OomError {
    /// Configuration or cache file is unreadable or malformed.
    #[error("config error: {0}")]
    Config(String),

    /// Network request failed or returned a non-success status.
    #[error("fetch {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// Page layout did not match either known format at an expected anchor.
    #[error("parse error: {0}")]
    Parse(String),

    /// Requested competition id is absent from the live listing.
    #[error("competition id {0} not found on web site list of comps")]
    Resolution(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OomError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OomError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OomError>;
