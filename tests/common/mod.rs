#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use oom_season::http_client::Fetch;
use oom_season::{OomError, Result};

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// Serves canned pages by url and records what was asked for.
#[derive(Default)]
pub struct FakeFetcher {
    pages: Mutex<HashMap<String, Vec<u8>>>,
    fallback: Option<Vec<u8>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every url not explicitly registered gets this page.
    pub fn with_fallback(page: &str) -> Self {
        Self {
            fallback: Some(page.as_bytes().to_vec()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn serve(&self, url: &str, page: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), page.as_bytes().to_vec());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Fetch for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        let page = self
            .pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .or_else(|| self.fallback.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        page.ok_or_else(|| OomError::Fetch {
            url: url.to_string(),
            reason: "server returned 404 Not Found".to_string(),
        })
    }
}
