pub mod comp_cache;
pub mod competition;
pub mod error;
pub mod html_token;
pub mod http_client;
pub mod loader;
pub mod page_parse;
pub mod report;
pub mod resolver;
pub mod run_config;
pub mod scoring;
pub mod site;
pub mod standings;

pub use error::{OomError, Result};
