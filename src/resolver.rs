//! Reconciles the competitions asked for in the configuration file with the
//! season listing published on the site.
//!
//! The listing is read cache-first. A requested id missing from a cached
//! listing only means the cache may predate that competition, so the listing
//! is fetched live once more before the id is declared unknown.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::comp_cache::CacheStore;
use crate::competition::{CompetitionDescriptor, CompetitionListing};
use crate::error::{OomError, Result};
use crate::http_client::Fetch;
use crate::page_parse::{parse_config, parse_listing};
use crate::site::{RANKING_SUFFIX, Site};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Initial,
    Reconciled,
    Failed,
}

pub struct DescriptorResolver<'a> {
    fetcher: &'a dyn Fetch,
    store: &'a CacheStore,
    site: &'a Site,
    year: i32,
    state: ResolveState,
    forced_refetches: usize,
}

impl<'a> DescriptorResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetch, store: &'a CacheStore, site: &'a Site, year: i32) -> Self {
        Self {
            fetcher,
            store,
            site,
            year,
            state: ResolveState::Initial,
            forced_refetches: 0,
        }
    }

    pub fn state(&self) -> ResolveState {
        self.state
    }

    /// Number of times a cached listing was bypassed for a live one.
    pub fn forced_refetches(&self) -> usize {
        self.forced_refetches
    }

    /// Listing page bytes and whether they came from the cache. Live pages
    /// are written back to the year's cache file.
    pub fn fetch_listing(&self, use_cache: bool) -> Result<(Vec<u8>, bool)> {
        if use_cache {
            if let Some(page) = self.store.read_listing(self.year)? {
                info!(year = self.year, "using cached competition listing");
                return Ok((page, true));
            }
        }
        let url = self.site.listing_url(self.year);
        info!(year = self.year, %url, "fetching competition listing");
        let page = self.fetcher.fetch(&url)?;
        self.store.write_listing(self.year, &page)?;
        Ok((page, false))
    }

    /// Fills in name, date and (unless given) URL for every requested
    /// competition. Fails with [`OomError::Resolution`] when an id is not on
    /// the live listing.
    pub fn resolve(
        &mut self,
        requested: Vec<CompetitionDescriptor>,
    ) -> Result<Vec<CompetitionDescriptor>> {
        let outcome = self.reconcile(requested);
        self.state = match outcome {
            Ok(_) => ResolveState::Reconciled,
            Err(_) => ResolveState::Failed,
        };
        outcome
    }

    /// Every competition on the season listing, ordered by id.
    pub fn resolve_all(&mut self) -> Result<Vec<CompetitionDescriptor>> {
        let outcome = self.fetch_listing(true).map(|(page, _)| {
            let mut all: Vec<CompetitionDescriptor> =
                self.parse(&page).into_values().collect();
            all.sort_by_key(|desc| id_sort_key(&desc.id));
            all
        });
        self.state = match outcome {
            Ok(_) => ResolveState::Reconciled,
            Err(_) => ResolveState::Failed,
        };
        outcome
    }

    fn reconcile(
        &mut self,
        mut requested: Vec<CompetitionDescriptor>,
    ) -> Result<Vec<CompetitionDescriptor>> {
        let (page, from_cache) = self.fetch_listing(true)?;
        let mut listing = self.parse(&page);

        if let Some(missing) = first_missing(&requested, &listing) {
            if from_cache {
                warn!(id = missing, "competition missing from cached listing, refetching");
                self.forced_refetches += 1;
                let (page, _) = self.fetch_listing(false)?;
                listing = self.parse(&page);
            }
            if let Some(missing) = first_missing(&requested, &listing) {
                return Err(OomError::Resolution(missing.to_string()));
            }
        }

        for desc in &mut requested {
            let Some(listed) = listing.get(&desc.id) else {
                continue;
            };
            desc.name = listed.name.clone();
            desc.date = listed.date.clone();
            if desc.source_url.is_empty() {
                desc.source_url = format!("{}{RANKING_SUFFIX}", listed.source_url);
            }
        }
        Ok(requested)
    }

    fn parse(&self, page: &[u8]) -> CompetitionListing {
        parse_listing(&String::from_utf8_lossy(page), self.site)
    }
}

/// Reads the competition list file.
pub fn read_config_file(path: &Path) -> Result<Vec<CompetitionDescriptor>> {
    let text = fs::read_to_string(path)
        .map_err(|err| OomError::Config(format!("cannot read {}: {err}", path.display())))?;
    let requested = parse_config(&text)?;
    if requested.is_empty() {
        return Err(OomError::Config(format!(
            "{} lists no competitions",
            path.display()
        )));
    }
    Ok(requested)
}

fn first_missing<'r>(
    requested: &'r [CompetitionDescriptor],
    listing: &CompetitionListing,
) -> Option<&'r str> {
    requested
        .iter()
        .find(|desc| !listing.contains_key(&desc.id))
        .map(|desc| desc.id.as_str())
}

fn id_sort_key(id: &str) -> (usize, String) {
    (id.len(), id.to_string())
}
