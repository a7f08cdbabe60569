//! Splits raw result pages into per-player fragments and reads the
//! season listing and competition configuration files.

use std::collections::HashSet;
use std::iter::FusedIterator;

use reqwest::Url;

use crate::competition::{CompetitionDescriptor, CompetitionListing};
use crate::error::{OomError, Result};
use crate::html_token::{Layout, collapse_whitespace, extract_player};
use crate::site::Site;

const COMP_ID_MARKER: &str = "?compid=";

/// Pages carrying player links use the standard layout; the club
/// championship pages do not.
pub fn detect_layout(page: &str) -> Layout {
    if page.contains(Layout::Standard.row_marker()) {
        Layout::Standard
    } else {
        Layout::Championship
    }
}

/// Lazily yields one fragment per player row, in page order.
///
/// Each fragment starts at the layout's row marker and runs up to the next
/// marker (or the end of the page). Page furniture ahead of the first marker
/// is never yielded.
#[derive(Debug, Clone)]
pub struct PlayerFragments<'a> {
    rest: &'a str,
    marker: &'static str,
}

pub fn split_fragments(page: &str, layout: Layout) -> PlayerFragments<'_> {
    let marker = layout.row_marker();
    let rest = match page.find(marker) {
        Some(start) => &page[start..],
        None => "",
    };
    PlayerFragments { rest, marker }
}

impl<'a> Iterator for PlayerFragments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let skip = self.marker.len().min(self.rest.len());
        let fragment = match self.rest[skip..].find(self.marker) {
            Some(next) => {
                let (head, tail) = self.rest.split_at(skip + next);
                self.rest = tail;
                head
            }
            None => std::mem::take(&mut self.rest),
        };
        Some(fragment)
    }
}

impl FusedIterator for PlayerFragments<'_> {}

/// `(player_name, raw_result)` for every row of a results page, best first.
///
/// A page carrying neither layout's row marker (a login prompt, a
/// redesigned site) is a parse error, not an empty field.
pub fn parse_results_page(page: &str) -> Result<Vec<(String, String)>> {
    let layout = detect_layout(page);
    if !page.contains(layout.row_marker()) {
        let title = page
            .split_once("<title>")
            .and_then(|(_, rest)| rest.split_once("</title>"))
            .map(|(title, _)| collapse_whitespace(title))
            .unwrap_or_default();
        return Err(OomError::Parse(format!(
            "page matches neither results layout (title {title:?})"
        )));
    }
    split_fragments(page, layout)
        .map(|fragment| extract_player(fragment, layout))
        .collect()
}

/// Reads `<a href="...?compid=ID">NAME</a> ... <td>DATE</td>` triples out of
/// the season listing page. An incomplete trailing entry ends the list.
pub fn parse_listing(page: &str, site: &Site) -> CompetitionListing {
    let mut listing = CompetitionListing::new();
    let mut rest = page;

    while let Some((id, after)) = next_comp_key(rest) {
        let Some((name, after)) = between(after, "\">", "</a>") else {
            break;
        };
        let Some((date, after)) = between(after, "<td>", "</td>") else {
            break;
        };
        rest = after;
        if id.is_empty() {
            continue;
        }
        listing.insert(
            id.to_string(),
            CompetitionDescriptor {
                id: id.to_string(),
                name: collapse_whitespace(name),
                date: collapse_whitespace(date),
                source_url: site.competition_url(id),
            },
        );
    }

    listing
}

/// First `?compid=` in `s`, returning the digit run after it and the
/// remaining text.
pub fn next_comp_key(s: &str) -> Option<(&str, &str)> {
    let start = s.find(COMP_ID_MARKER)? + COMP_ID_MARKER.len();
    let after = &s[start..];
    let digits = after.bytes().take_while(u8::is_ascii_digit).count();
    Some(after.split_at(digits))
}

fn between<'a>(s: &'a str, open: &str, close: &str) -> Option<(&'a str, &'a str)> {
    let start = s.find(open)? + open.len();
    let end = s[start..].find(close)? + start;
    Some((&s[start..end], &s[end + close.len()..]))
}

/// Parses the competition list file: one competition per line, identified
/// by an embedded `?compid=<digits>`, optionally followed by a comma and the
/// full page URL to use instead of the listing one.
pub fn parse_config(text: &str) -> Result<Vec<CompetitionDescriptor>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for line in text.lines() {
        let Some((id, _)) = next_comp_key(line) else {
            continue;
        };
        if id.is_empty() {
            continue;
        }
        if !seen.insert(id.to_string()) {
            return Err(OomError::Config(format!(
                "competition id {id} listed more than once"
            )));
        }
        let url = line
            .split_once(',')
            .map(|(_, tail)| tail.trim())
            .filter(|candidate| is_page_url(candidate))
            .unwrap_or_default();
        out.push(CompetitionDescriptor::with_url(id, url));
    }

    Ok(out)
}

fn is_page_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
