use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use tracing::info;

use oom_season::comp_cache::CacheStore;
use oom_season::competition::Competition;
use oom_season::http_client::HttpFetcher;
use oom_season::loader::load_all;
use oom_season::report::{build_rows, write_csv, write_xlsx};
use oom_season::resolver::{DescriptorResolver, read_config_file};
use oom_season::run_config::RunConfig;
use oom_season::site::Site;
use oom_season::standings::Standings;

/// Builds the season Order of Merit from club competition results.
#[derive(Debug, Parser)]
#[command(name = "oom", version)]
struct Cli {
    /// Season year; defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
    /// Use every competition of the year instead of the configuration list.
    #[arg(long)]
    all: bool,
    /// Show rank and result alongside points in each cell.
    #[arg(long)]
    detail: bool,
    /// Competition list file [env: OOM_CONF]
    #[arg(long)]
    conf: Option<PathBuf>,
    /// CSV report path [env: OOM_OUT]
    #[arg(long)]
    out: Option<PathBuf>,
    /// Directory holding the result caches [env: OOM_CACHE_DIR]
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Also write the table as an Excel workbook.
    #[arg(long)]
    xlsx: Option<PathBuf>,
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg = RunConfig::from_env();
    let year = cli.year.unwrap_or_else(|| chrono::Local::now().year());
    let cache_dir = cli.cache_dir.unwrap_or(cfg.cache_dir);
    let conf_path = cli.conf.unwrap_or(cfg.conf_path);
    let out_path = cli.out.unwrap_or(cfg.out_path);

    let fetcher = HttpFetcher::new(cfg.http_timeout, cfg.session_cookie)?;
    let store = CacheStore::new(cache_dir);
    let site = Site::new(cfg.site_url);
    info!(year, cache = %store.dir().display(), "building order of merit");

    let mut resolver = DescriptorResolver::new(&fetcher, &store, &site, year);
    let descriptors = if cli.all {
        resolver.resolve_all()?
    } else {
        let requested = read_config_file(&conf_path)?;
        resolver.resolve(requested)?
    };

    let mut competitions: Vec<Competition> =
        descriptors.into_iter().map(Competition::new).collect();
    let summary = load_all(&fetcher, &store, &mut competitions)
        .context("failed loading competition results")?;
    info!(
        cached = summary.from_cache,
        fetched = summary.fetched,
        "competitions loaded"
    );

    let standings = Standings::from_competitions(&competitions);
    let rows = build_rows(year, &competitions, &standings, cli.detail);
    write_csv(&out_path, &rows)?;
    info!(path = %out_path.display(), players = standings.players.len(), "report written");

    if let Some(xlsx_path) = cli.xlsx {
        write_xlsx(&xlsx_path, &rows)?;
        info!(path = %xlsx_path.display(), "workbook written");
    }
    Ok(())
}
