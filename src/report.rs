use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::competition::{Competition, PlayerResult};
use crate::standings::Standings;

const SHEET_NAME: &str = "OrderOfMerit";
const LEAD_COLUMNS: usize = 4;

/// Season table as rows of cells: year banner, competition ids, dates and
/// names as column headers, then one row per ranked player.
pub fn build_rows(
    year: i32,
    competitions: &[Competition],
    standings: &Standings,
    detail: bool,
) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec![format!("Year {year}")],
        header_row(competitions, |c| c.descriptor.id.clone()),
        header_row(competitions, |c| c.descriptor.date.clone()),
    ];

    let mut names = vec![
        "rank".to_string(),
        "name".to_string(),
        "oomPts".to_string(),
        "#Comp".to_string(),
    ];
    names.extend(competitions.iter().map(|c| c.descriptor.name.clone()));
    rows.push(names);

    for player in &standings.players {
        let mut row = vec![
            player.rank.to_string(),
            player.name.clone(),
            player.total_points.to_string(),
            player.competitions_played.to_string(),
        ];
        row.extend(competitions.iter().map(|comp| {
            player
                .by_competition
                .get(comp.id())
                .map(|result| format_cell(result, detail))
                .unwrap_or_default()
        }));
        rows.push(row);
    }

    rows
}

fn header_row(competitions: &[Competition], cell: impl Fn(&Competition) -> String) -> Vec<String> {
    let mut row = vec![String::new(); LEAD_COLUMNS];
    row.extend(competitions.iter().map(cell));
    row
}

/// `12` or, in detail mode, `12 (3rd 38)`.
pub fn format_cell(result: &PlayerResult, detail: bool) -> String {
    if !detail {
        return result.points.to_string();
    }
    format!(
        "{} ({}{} {})",
        result.points,
        result.rank,
        ordinal_suffix(result.rank),
        result.raw_result
    )
}

pub fn ordinal_suffix(n: usize) -> &'static str {
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

pub fn render_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| escape_csv(cell)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    fs::write(path, render_csv(rows))
        .with_context(|| format!("failed writing report to {}", path.display()))
}

pub fn write_xlsx(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        write_rows(sheet, rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let row_num = u32::try_from(row_idx)
                .with_context(|| format!("row {row_idx} is beyond the sheet"))?;
            let col_num = u16::try_from(col_idx)
                .with_context(|| format!("column {col_idx} is beyond the sheet"))?;
            let written = match value.parse::<f64>() {
                Ok(num) if num.is_finite() => worksheet.write_number(row_num, col_num, num),
                _ => worksheet.write_string(row_num, col_num, value),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        let got: Vec<&str> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 111, 101]
            .iter()
            .map(|n| ordinal_suffix(*n))
            .collect();
        assert_eq!(
            got,
            vec!["st", "nd", "rd", "th", "th", "th", "th", "st", "nd", "rd", "th", "st"]
        );
    }

    #[test]
    fn out_of_range_column_is_an_error_not_a_wrap() {
        let mut row = vec![String::new(); usize::from(u16::MAX) + 1];
        row.push("7".to_string());
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        assert!(write_rows(sheet, &[row]).is_err());
    }

    #[test]
    fn csv_quotes_commas() {
        let rows = vec![vec!["a".to_string(), "Smith, J".to_string()]];
        assert_eq!(render_csv(&rows), "a,\"Smith, J\"\n");
    }
}
