//! CSV export of a computed ranking
//!
//! Joins the engine's score vector with competitor names and match
//! statistics, sorts by score (highest first) and assigns 1-based ranks.

use crate::error::RankingError;
use crate::league::stats::competitor_stats;
use crate::types::Cell;
use serde::{Deserialize, Serialize};

/// File name offered to clients downloading the export
pub const EXPORT_FILENAME: &str = "league_ranking_data.csv";

const CSV_HEADER: [&str; 5] = ["Rank", "Name", "Score", "WinRate", "MatchesPlayed"];

/// One line of the exported ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub rank: usize,
    pub name: String,
    pub score: f64,
    pub win_rate: f64,
    pub matches_played: u32,
}

/// Build the ranked rows. Ties keep their input order.
pub fn ranked_rows(
    table: &[Vec<Cell>],
    scores: &[f64],
    names: &[String],
) -> crate::error::Result<Vec<ExportRow>> {
    if names.is_empty() {
        return Err(RankingError::ExportMismatch {
            reason: "no competitors to export".to_string(),
        }
        .into());
    }
    if scores.len() != names.len() || table.len() != names.len() {
        return Err(RankingError::ExportMismatch {
            reason: format!(
                "{} names, {} scores and {} table rows",
                names.len(),
                scores.len(),
                table.len()
            ),
        }
        .into());
    }
    if let Some(row) = table.iter().position(|row| row.len() != names.len()) {
        return Err(RankingError::ExportMismatch {
            reason: format!(
                "table row {} has {} cells, expected {}",
                row,
                table[row].len(),
                names.len()
            ),
        }
        .into());
    }

    let mut rows: Vec<ExportRow> = names
        .iter()
        .zip(scores)
        .zip(table)
        .enumerate()
        .map(|(i, ((name, &score), row))| {
            let stats = competitor_stats(row, i);
            ExportRow {
                rank: 0,
                name: name.clone(),
                score,
                win_rate: stats.win_rate,
                matches_played: stats.matches_played,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = position + 1;
    }

    Ok(rows)
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the ranking as CSV (CRLF line endings, header first)
pub fn export_csv(
    table: &[Vec<Cell>],
    scores: &[f64],
    names: &[String],
) -> crate::error::Result<String> {
    let rows = ranked_rows(table, scores, names)?;

    let mut csv = CSV_HEADER.join(",");
    csv.push_str("\r\n");
    for row in rows {
        csv.push_str(&format!(
            "{},{},{:.3},{:.3},{}\r\n",
            row.rank,
            csv_field(&row.name),
            row.score,
            row.win_rate,
            row.matches_played
        ));
    }

    Ok(csv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<Vec<Cell>> {
        [
            ["0 -- 0", "2 -- 1", "3 -- 0"],
            ["1 -- 2", "0 -- 0", "1 -- 1"],
            ["0 -- 3", "1 -- 1", "0 -- 0"],
        ]
        .iter()
        .map(|row| row.iter().map(|cell| Cell::from(*cell)).collect())
        .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_rows_sorted_by_score() {
        let rows = ranked_rows(&table(), &[0.2, 1.0, 0.0], &names(&["A", "B", "C"])).unwrap();

        assert_eq!(rows[0].name, "B");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].name, "A");
        assert_eq!(rows[2].name, "C");
        assert_eq!(rows[2].rank, 3);

        // A: beat B, beat C
        assert_eq!(rows[1].matches_played, 2);
        assert_eq!(rows[1].win_rate, 1.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = ranked_rows(&table(), &[0.5, 0.5, 0.5], &names(&["A", "B", "C"])).unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_csv_output() {
        let csv = export_csv(&table(), &[1.0, 0.25, 0.0], &names(&["A", "B, Jr.", "C"])).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[0], "Rank,Name,Score,WinRate,MatchesPlayed");
        assert_eq!(lines[1], "1,A,1.000,1.000,2");
        assert_eq!(lines[2], "2,\"B, Jr.\",0.250,0.250,2");
        assert_eq!(lines[3], "3,C,0.000,0.250,2");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_mismatched_inputs() {
        let err = export_csv(&table(), &[1.0, 0.5], &names(&["A", "B", "C"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RankingError>(),
            Some(RankingError::ExportMismatch { .. })
        ));

        assert!(export_csv(&[], &[], &[]).is_err());
    }
}
