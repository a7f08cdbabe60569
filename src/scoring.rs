use crate::competition::PlayerResult;

/// Stamps Order of Merit points onto results listed in finishing order.
///
/// The winner of an `n` player field gets `n` points, the last finisher 1.
/// Results that are not plain integers (DQ, NR, NS, ...) score nothing,
/// whatever their position. Rank is purely positional; equal scores are not
/// merged.
pub fn score_results<I>(ordered: I) -> Vec<PlayerResult>
where
    I: IntoIterator<Item = (String, String)>,
{
    let rows: Vec<(String, String)> = ordered.into_iter().collect();
    let field = rows.len();

    rows.into_iter()
        .enumerate()
        .map(|(idx, (player_name, raw_result))| PlayerResult {
            points: points_for(field, idx, &raw_result),
            rank: idx + 1,
            player_name,
            raw_result,
        })
        .collect()
}

fn points_for(field: usize, idx: usize, raw_result: &str) -> i64 {
    if raw_result.trim().parse::<i64>().is_err() {
        return 0;
    }
    (field - idx) as i64
}
