use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::comp_cache::CacheStore;
use crate::competition::Competition;
use crate::error::{OomError, Result};
use crate::http_client::Fetch;
use crate::page_parse::parse_results_page;
use crate::scoring::score_results;

/// Upper bound on competitions being loaded at the same time.
pub const MAX_IN_FLIGHT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub from_cache: usize,
    pub fetched: usize,
}

/// Fills one competition from its cache record, or from the live page when
/// nothing is cached yet. Live results are written back to the cache.
pub fn load_competition(
    fetcher: &dyn Fetch,
    store: &CacheStore,
    comp: &mut Competition,
) -> Result<LoadSource> {
    if comp.id().is_empty() {
        return Err(OomError::Config(
            "competition with empty key cannot be loaded".to_string(),
        ));
    }

    if let Some(cached) = store.read_competition(comp.id())? {
        debug!(id = comp.id(), players = cached.player_count, "competition from cache");
        *comp = cached;
        return Ok(LoadSource::Cache);
    }

    if comp.descriptor.source_url.is_empty() {
        return Err(OomError::Config(format!(
            "competition {} is not cached and has no url",
            comp.id()
        )));
    }
    let page = fetcher.fetch(&comp.descriptor.source_url)?;
    populate_from_page(comp, &String::from_utf8_lossy(&page))?;
    store.write_competition(comp)?;
    debug!(id = comp.id(), players = comp.player_count, "competition fetched");
    Ok(LoadSource::Network)
}

/// Parses and scores a results page into `comp`, replacing earlier results.
pub fn populate_from_page(comp: &mut Competition, page: &str) -> Result<()> {
    let scored = score_results(parse_results_page(page)?);
    comp.player_count = scored.len();
    comp.results.clear();
    for row in scored {
        if comp.results.contains_key(&row.player_name) {
            return Err(OomError::Parse(format!(
                "player {:?} appears twice in competition {}",
                row.player_name,
                comp.id()
            )));
        }
        comp.results.insert(row.player_name.clone(), row);
    }
    Ok(())
}

/// Loads every competition on a fixed-size pool and returns once all have
/// finished. The first failure fails the whole run.
pub fn load_all(
    fetcher: &dyn Fetch,
    store: &CacheStore,
    comps: &mut [Competition],
) -> Result<LoadSummary> {
    let total = comps.len();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(MAX_IN_FLIGHT)
        .thread_name(|idx| format!("oom-load-{idx}"))
        .build()
        .map_err(|err| OomError::Config(format!("failed to build load pool: {err}")))?;
    let completed = AtomicUsize::new(0);

    let sources: Vec<LoadSource> = pool.install(|| {
        comps
            .par_iter_mut()
            .map(|comp| {
                let source = load_competition(fetcher, store, comp)?;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                info!(id = comp.id(), ?source, "loaded {done}/{total}");
                Ok(source)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut summary = LoadSummary::default();
    for source in sources {
        match source {
            LoadSource::Cache => summary.from_cache += 1,
            LoadSource::Network => summary.fetched += 1,
        }
    }
    Ok(summary)
}
