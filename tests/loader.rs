mod common;

use std::fs;
use std::time::Duration;

use oom_season::OomError;
use oom_season::comp_cache::CacheStore;
use oom_season::competition::{Competition, CompetitionDescriptor};
use oom_season::loader::{LoadSource, MAX_IN_FLIGHT, load_all, load_competition};

use common::{FakeFetcher, read_fixture};

fn descriptor(id: &str) -> CompetitionDescriptor {
    CompetitionDescriptor {
        id: id.to_string(),
        name: format!("Comp {id}"),
        date: "01/05/2016".to_string(),
        source_url: format!("http://club.example/competition.php?compid={id}&sort=1"),
    }
}

#[test]
fn live_page_is_cached_then_reused() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let fetcher = FakeFetcher::new();
    let desc = descriptor("100");
    fetcher.serve(&desc.source_url, &read_fixture("standard_results.html"));

    let mut comp = Competition::new(desc.clone());
    let source = load_competition(&fetcher, &store, &mut comp).unwrap();
    assert_eq!(source, LoadSource::Network);
    assert_eq!(comp.player_count, 3);
    assert!(store.competition_path("100").exists());

    let mut again = Competition::new(desc);
    let source = load_competition(&fetcher, &store, &mut again).unwrap();
    assert_eq!(source, LoadSource::Cache);
    assert_eq!(fetcher.call_count(), 1);
    assert_eq!(again, comp);
}

#[test]
fn hand_edited_cache_overrides_site() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    fs::write(
        store.competition_path("100"),
        "# match play final decided the placings\r\n\
         key, 100\r\n\
         name, Knockout\r\n\
         date, 01/09/2016\r\n\
         url, http://club.example/competition.php?compid=100\r\n\
         number of players, 2\r\n\
         oom_points, rank_in_comp, result, name\r\n\
         2, 1, won, Bob Green\r\n\
         1, 2, lost, Alice Brown\r\n",
    )
    .unwrap();

    let fetcher = FakeFetcher::new();
    let mut comp = Competition::new(descriptor("100"));
    let source = load_competition(&fetcher, &store, &mut comp).unwrap();

    assert_eq!(source, LoadSource::Cache);
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(comp.descriptor.name, "Knockout");
    assert_eq!(comp.results["Bob Green"].points, 2);
    assert_eq!(comp.results["Alice Brown"].raw_result, "lost");
}

#[test]
fn gate_bounds_concurrent_fetches() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let fetcher = FakeFetcher::with_fallback(&read_fixture("standard_results.html"))
        .with_delay(Duration::from_millis(20));

    let mut comps: Vec<Competition> = (0..50)
        .map(|i| Competition::new(descriptor(&format!("{}", 1000 + i))))
        .collect();
    let summary = load_all(&fetcher, &store, &mut comps).unwrap();

    assert_eq!(summary.fetched, 50);
    assert_eq!(summary.from_cache, 0);
    assert_eq!(fetcher.call_count(), 50);
    assert!(fetcher.max_in_flight() <= MAX_IN_FLIGHT);
    assert!(fetcher.max_in_flight() >= 1);
    assert!(comps.iter().all(|c| c.player_count == 3));
    assert!(comps.iter().all(|c| store.competition_path(c.id()).exists()));
}

#[test]
fn second_run_is_offline() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let fetcher = FakeFetcher::with_fallback(&read_fixture("championship_results.html"));

    let mut first: Vec<Competition> = ["1", "2", "3"]
        .iter()
        .map(|id| Competition::new(descriptor(id)))
        .collect();
    load_all(&fetcher, &store, &mut first).unwrap();
    assert_eq!(fetcher.call_count(), 3);

    let mut second: Vec<Competition> = ["1", "2", "3"]
        .iter()
        .map(|id| Competition::new(descriptor(id)))
        .collect();
    let summary = load_all(&fetcher, &store, &mut second).unwrap();
    assert_eq!(summary.from_cache, 3);
    assert_eq!(fetcher.call_count(), 3);
    assert_eq!(first, second);
}

#[test]
fn one_failed_fetch_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let fetcher = FakeFetcher::new();
    let ok = descriptor("1");
    fetcher.serve(&ok.source_url, &read_fixture("standard_results.html"));

    let mut comps = vec![Competition::new(ok), Competition::new(descriptor("2"))];
    let err = load_all(&fetcher, &store, &mut comps).unwrap_err();
    assert!(matches!(err, OomError::Fetch { .. }));
    assert!(!store.competition_path("2").exists());
}

#[test]
fn uncached_competition_without_url_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let fetcher = FakeFetcher::new();

    let mut comp = Competition::new(CompetitionDescriptor::new("42"));
    let err = load_competition(&fetcher, &store, &mut comp).unwrap_err();
    assert!(matches!(err, OomError::Config(_)));

    let mut blank = Competition::new(CompetitionDescriptor::default());
    assert!(matches!(
        load_competition(&fetcher, &store, &mut blank),
        Err(OomError::Config(_))
    ));
    assert_eq!(fetcher.call_count(), 0);
}

#[test]
fn login_page_is_not_cached_as_an_empty_field() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let fetcher = FakeFetcher::with_fallback(
        "<html><head><title>Login Required</title></head><body>Members only</body></html>",
    );

    let mut comp = Competition::new(descriptor("77"));
    let err = load_competition(&fetcher, &store, &mut comp).unwrap_err();
    assert!(matches!(err, OomError::Parse(_)));
    assert!(!store.competition_path("77").exists());
}

#[test]
fn wrapped_names_load_from_cache_on_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let fetcher = FakeFetcher::new();
    let mut desc = descriptor("310");
    desc.name = "Spring Stableford".to_string();
    fetcher.serve(
        &desc.source_url,
        "<table>\
         <tr><td><a href=\"p.php?playerid=1\">Mary\r\n      Ann Lee</a></td>\
         <td><a href=\"viewround.php?roundid=1\">40</a></td></tr>\
         <tr><td><a href=\"p.php?playerid=2\">  Tom   Hart </a></td>\
         <td><a href=\"viewround.php?roundid=2\"> 3\n6 </a></td></tr>\
         </table>",
    );

    let mut first = Competition::new(desc.clone());
    assert_eq!(
        load_competition(&fetcher, &store, &mut first).unwrap(),
        LoadSource::Network
    );
    assert!(first.results.contains_key("Mary Ann Lee"));
    assert_eq!(first.results["Tom Hart"].raw_result, "3 6");

    let mut second = Competition::new(desc);
    assert_eq!(
        load_competition(&fetcher, &store, &mut second).unwrap(),
        LoadSource::Cache
    );
    assert_eq!(second, first);
}
