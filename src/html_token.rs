//! Pulls one player's name and displayed result out of a single result row.
//!
//! The club site renders results in one of two fixed layouts; anything that
//! does not line up with the expected anchors is reported as a parse error
//! rather than guessed at.

use crate::error::{OomError, Result};

const STANDARD_TERMINATOR: &str = "</a></td>";
const CHAMPIONSHIP_TERMINATOR: &str = "</td></tr>";
const SPAN_CLOSE: &str = "</span>";
const NBSP: &str = "&nbsp;";

/// Status recorded when the championship layout shows an empty score cell.
pub const NO_SCORE: &str = "NS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Ordinary competitions: rows start at a `?playerid=` link.
    Standard,
    /// Multi-round club championships: rows start at a `namecol` cell.
    Championship,
}

impl Layout {
    /// Marker that opens each player's row in this layout.
    pub fn row_marker(self) -> &'static str {
        match self {
            Layout::Standard => "?playerid=",
            Layout::Championship => "class=\"namecol\">",
        }
    }
}

/// Returns `(player_name, raw_result)` for one row fragment.
pub fn extract_player(fragment: &str, layout: Layout) -> Result<(String, String)> {
    match layout {
        Layout::Standard => extract_standard(fragment),
        Layout::Championship => extract_championship(fragment),
    }
}

// ?playerid=76041">Jo Mager</a>(16)</td>
// <td><a href="viewround.php?roundid=16413" title="...">24</a></td>
fn extract_standard(fragment: &str) -> Result<(String, String)> {
    let open = fragment
        .find('>')
        .ok_or_else(|| malformed("standard row has no opening tag", fragment))?;
    let name_end = fragment[open..]
        .find("</a>")
        .map(|idx| open + idx)
        .ok_or_else(|| malformed("standard row has no name link close", fragment))?;
    let name = fragment[open + 1..name_end].trim();

    let rest = &fragment[name_end + "</a>".len()..];
    let term = rest
        .find(STANDARD_TERMINATOR)
        .ok_or_else(|| malformed("standard row has no result terminator", fragment))?;
    let cell = &rest[..term];
    let result = match cell.rfind('>') {
        Some(idx) => &cell[idx + 1..],
        None => cell,
    };

    finish(name, result.trim(), fragment)
}

// class="namecol">Jo Mager (16)</td><td>80</td><td><span>78</span></td></tr>
fn extract_championship(fragment: &str) -> Result<(String, String)> {
    let open = fragment
        .find('>')
        .ok_or_else(|| malformed("championship row has no opening tag", fragment))?;
    let after = &fragment[open + 1..];
    let mut name_end = after
        .find('<')
        .ok_or_else(|| malformed("championship row has no name cell close", fragment))?;
    // Handicap annotations in parentheses are not part of the name.
    if let Some(paren) = after.find('(') {
        name_end = name_end.min(paren);
    }
    let name = after[..name_end].trim();

    let rest = &after[name_end..];
    let term = rest
        .find(CHAMPIONSHIP_TERMINATOR)
        .ok_or_else(|| malformed("championship row has no row terminator", fragment))?;
    let mut cell = &rest[..term];
    if let Some(stripped) = cell.strip_suffix(SPAN_CLOSE) {
        cell = stripped;
    }
    let mut result = match cell.rfind('>') {
        Some(idx) => &cell[idx + 1..],
        None => cell,
    }
    .trim();
    if result == NBSP {
        result = NO_SCORE;
    }

    finish(name, result, fragment)
}

fn finish(name: &str, result: &str, fragment: &str) -> Result<(String, String)> {
    let name = collapse_whitespace(name);
    if name.is_empty() {
        return Err(malformed("empty player name", fragment));
    }
    Ok((name, collapse_whitespace(result)))
}

/// Trims and folds every whitespace run (including line breaks inside
/// wrapped anchor text) to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn malformed(what: &str, fragment: &str) -> OomError {
    let snippet: String = fragment.chars().take(80).collect();
    OomError::Parse(format!("{what} near {snippet:?}"))
}
