//! On-disk caches that let a season be recomputed offline.
//!
//! - `<id>.txt`: one competition in a human-editable text form. Results can
//!   be corrected by hand (e.g. match play finals overriding stroke play
//!   placings) and will be picked up on the next run.
//! - `all_comps_<year>.dat`: raw bytes of the season listing page.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::competition::{Competition, CompetitionDescriptor, PlayerResult};
use crate::error::{OomError, Result};

const EOL: &str = "\r\n";
const RESULTS_HEADER: &str = "oom_points, rank_in_comp, result, name";

const KEY_LABEL: &str = "key";
const NAME_LABEL: &str = "name";
const DATE_LABEL: &str = "date";
const URL_LABEL: &str = "url";
const PLAYERS_LABEL: &str = "number of players";

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn competition_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.txt"))
    }

    pub fn listing_path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("all_comps_{year}.dat"))
    }

    /// Cached competition for `id`, or `None` when it has never been fetched.
    pub fn read_competition(&self, id: &str) -> Result<Option<Competition>> {
        let path = self.competition_path(id);
        let Some(raw) = read_optional(&path)? else {
            return Ok(None);
        };
        let text = String::from_utf8(raw).map_err(|_| {
            OomError::Config(format!("{} is not valid UTF-8", path.display()))
        })?;
        let comp = parse_competition(&text)
            .map_err(|err| OomError::Config(format!("{}: {err}", path.display())))?;
        if comp.id() != id {
            return Err(OomError::Config(format!(
                "{} holds competition {} not {id}",
                path.display(),
                comp.id()
            )));
        }
        Ok(Some(comp))
    }

    /// Overwrites any previous record for this competition. Values the text
    /// form could not read back unchanged are refused before touching disk.
    pub fn write_competition(&self, comp: &Competition) -> Result<()> {
        check_storable(comp)?;
        let path = self.competition_path(comp.id());
        write_atomic(&path, render_competition(comp).as_bytes())
    }

    pub fn read_listing(&self, year: i32) -> Result<Option<Vec<u8>>> {
        read_optional(&self.listing_path(year))
    }

    pub fn write_listing(&self, year: i32, page: &[u8]) -> Result<()> {
        write_atomic(&self.listing_path(year), page)
    }
}

/// Text form of a competition, rows in finishing order.
pub fn render_competition(comp: &Competition) -> String {
    let d = &comp.descriptor;
    let mut out = String::new();
    for (label, value) in [
        (KEY_LABEL, d.id.as_str()),
        (NAME_LABEL, d.name.as_str()),
        (DATE_LABEL, d.date.as_str()),
        (URL_LABEL, d.source_url.as_str()),
    ] {
        out.push_str(&format!("{label}, {value}{EOL}"));
    }
    out.push_str(&format!("{PLAYERS_LABEL}, {}{EOL}", comp.player_count));
    out.push_str(RESULTS_HEADER);
    out.push_str(EOL);
    for p in comp.ranked_results() {
        out.push_str(&format!(
            "{:>10}, {:>12}, {:>8}, {}{EOL}",
            p.points, p.rank, p.raw_result, p.player_name
        ));
    }
    out
}

/// Every field must survive [`parse_competition`]: single line, no
/// surrounding whitespace, and no comma in the result column.
pub fn check_storable(comp: &Competition) -> Result<()> {
    let d = &comp.descriptor;
    for (label, value) in [
        (KEY_LABEL, d.id.as_str()),
        (NAME_LABEL, d.name.as_str()),
        (DATE_LABEL, d.date.as_str()),
        (URL_LABEL, d.source_url.as_str()),
    ] {
        check_cell(comp.id(), label, value)?;
    }
    for p in comp.results.values() {
        check_cell(comp.id(), "player name", &p.player_name)?;
        check_cell(comp.id(), "result", &p.raw_result)?;
        if p.raw_result.contains(',') {
            return Err(OomError::Parse(format!(
                "competition {}: result {:?} for {} contains a comma",
                comp.id(),
                p.raw_result,
                p.player_name
            )));
        }
    }
    Ok(())
}

fn check_cell(id: &str, label: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n']) || value.trim() != value {
        return Err(OomError::Parse(format!(
            "competition {id}: {label} {value:?} cannot be stored on one line"
        )));
    }
    Ok(())
}

/// Inverse of [`render_competition`]. Tolerates `#` comment lines ahead of
/// the key and blank lines among the rows.
pub fn parse_competition(text: &str) -> std::result::Result<Competition, String> {
    let mut lines = text
        .lines()
        .skip_while(|line| line.trim().is_empty() || line.starts_with('#'));

    let mut field = |label: &str| -> std::result::Result<String, String> {
        let line = lines
            .next()
            .ok_or_else(|| format!("missing '{label}' line"))?;
        let (found, value) = line
            .split_once(',')
            .ok_or_else(|| format!("expected '{label}, <value>' got {line:?}"))?;
        if !found.trim().eq_ignore_ascii_case(label) {
            return Err(format!("expected '{label}' got {:?}", found.trim()));
        }
        Ok(value.trim().to_string())
    };

    let descriptor = CompetitionDescriptor {
        id: field(KEY_LABEL)?,
        name: field(NAME_LABEL)?,
        date: field(DATE_LABEL)?,
        source_url: field(URL_LABEL)?,
    };
    let player_count = field(PLAYERS_LABEL)?;
    let player_count = player_count
        .parse::<usize>()
        .map_err(|_| format!("bad player count {player_count:?}"))?;
    if descriptor.id.is_empty() {
        return Err("empty competition key".to_string());
    }

    // results header
    let _ = lines.next();

    let mut results = HashMap::new();
    for line in lines.filter(|line| !line.trim().is_empty()) {
        let row = parse_result_row(line)?;
        if results.contains_key(&row.player_name) {
            return Err(format!("player {:?} listed twice", row.player_name));
        }
        results.insert(row.player_name.clone(), row);
    }

    Ok(Competition {
        descriptor,
        player_count,
        results,
    })
}

fn parse_result_row(line: &str) -> std::result::Result<PlayerResult, String> {
    let cols: Vec<&str> = line.splitn(4, ',').map(str::trim).collect();
    let [points, rank, raw_result, player_name] = cols.as_slice() else {
        return Err(format!("expected 4 columns in {line:?}"));
    };
    if player_name.is_empty() {
        return Err(format!("missing player name in {line:?}"));
    }
    Ok(PlayerResult {
        player_name: player_name.to_string(),
        points: points
            .parse()
            .map_err(|_| format!("bad points {points:?} for {player_name}"))?,
        rank: rank
            .parse()
            .map_err(|_| format!("bad rank {rank:?} for {player_name}"))?,
        raw_result: raw_result.to_string(),
    })
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(OomError::io(path, err)),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|err| OomError::io(dir, err))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(|err| OomError::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| OomError::io(path, err))?;
    Ok(())
}
