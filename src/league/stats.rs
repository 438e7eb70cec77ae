//! Per-competitor match statistics for exported tables

use crate::ranking::CELL_SEPARATOR;
use crate::types::Cell;
use serde::{Deserialize, Serialize};

/// Win/draw/loss summary of one competitor
///
/// Each off-diagonal cell counts as one encounter: the competitor won it when
/// its side of the score is higher, lost it when lower, drew otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches_played: u32,
    pub win_rate: f64,
}

/// Parse a score cell leniently (decimal scores allowed)
fn parse_score(cell: &Cell) -> Option<(f64, f64)> {
    let text = cell.as_text()?;
    let mut parts = text.split(CELL_SEPARATOR).map(str::trim);
    let own = parts.next()?.parse::<f64>().ok()?;
    let other = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((own, other))
}

/// Statistics for competitor `index` from its row of the table
pub fn competitor_stats(row: &[Cell], index: usize) -> CompetitorStats {
    let mut stats = CompetitorStats::default();

    for (j, cell) in row.iter().enumerate() {
        if j == index {
            continue;
        }
        let Some((own, other)) = parse_score(cell) else {
            continue;
        };

        if own > other {
            stats.wins += 1;
        } else if own < other {
            stats.losses += 1;
        } else {
            stats.draws += 1;
        }
    }

    stats.matches_played = stats.wins + stats.losses + stats.draws;
    if stats.matches_played > 0 {
        stats.win_rate =
            (f64::from(stats.wins) + 0.5 * f64::from(stats.draws)) / f64::from(stats.matches_played);
    }

    stats
}
