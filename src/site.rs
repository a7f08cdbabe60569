/// Club site the season is scraped from.
pub const DEFAULT_SITE_URL: &str = "http://www.colchestergolfclub.com";

/// Appended to listing-derived competition URLs; selects net ranking.
pub const RANKING_SUFFIX: &str = "&sort=1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    base: String,
}

impl Site {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn listing_url(&self, year: i32) -> String {
        format!(
            "{}/competition.php?showall=1&time=&show=&year={year}",
            self.base
        )
    }

    pub fn competition_url(&self, id: &str) -> String {
        format!("{}/competition.php?compid={id}", self.base)
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL)
    }
}
