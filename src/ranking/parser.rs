//! Head-to-head cell parsing and win-rate seeding

use crate::types::{Cell, HeadToHead, ParsedMatrix};

/// Token separating wins from losses inside a cell (`"3 -- 2"`)
pub const CELL_SEPARATOR: &str = "--";

/// Parse `"<wins> -- <losses>"` into a record.
///
/// Returns `None` unless the text splits into exactly two parts that are both
/// non-negative integers after trimming.
pub fn parse_record(text: &str) -> Option<HeadToHead> {
    let mut parts = text.trim().split(CELL_SEPARATOR);
    let wins = parts.next()?.trim().parse::<u32>().ok()?;
    let losses = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(HeadToHead::new(wins, losses))
}

/// Parse a single cell. Malformed or non-text cells count as "no match played".
pub fn parse_cell(cell: &Cell) -> HeadToHead {
    cell.as_text().and_then(parse_record).unwrap_or_default()
}

/// Parse every cell of the matrix, keeping its shape
pub fn parse_matrix(matrix: &[Vec<Cell>]) -> ParsedMatrix {
    matrix
        .iter()
        .map(|row| row.iter().map(parse_cell).collect())
        .collect()
}

/// Unweighted win rate per competitor, ignoring the diagonal.
///
/// Competitors without any recorded match get 0.0.
pub fn initial_win_rates(parsed: &ParsedMatrix) -> Vec<f64> {
    parsed
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (wins, losses) = row
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .fold((0u64, 0u64), |(w, l), (_, record)| {
                    (w + u64::from(record.wins), l + u64::from(record.losses))
                });
            let total = wins + losses;
            if total > 0 {
                wins as f64 / total as f64
            } else {
                0.0
            }
        })
        .collect()
}
