//! Structural and reciprocal-symmetry validation of head-to-head tables
//!
//! Runs before a table reaches the ranking engine. Every problem found is
//! reported as a human-readable message; an empty list means the table is
//! well formed.

use crate::ranking::CELL_SEPARATOR;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// One row of a submitted table: competitor name plus its cells
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl LeagueRow {
    pub fn new(name: &str, data: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            data: Value::Array(data.iter().map(|cell| Value::from(*cell)).collect()),
        }
    }
}

/// Render a cell the way it was submitted
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Split `"X -- Y"` into its two trimmed integer parts
fn score_parts(value: &Value) -> Result<(String, String), &'static str> {
    let text = cell_text(value);
    let parts: Vec<&str> = text.split(CELL_SEPARATOR).map(str::trim).collect();
    if parts.len() != 2 {
        return Err("not of the form 'X -- Y'");
    }
    if parts.iter().any(|part| part.parse::<i64>().is_err()) {
        return Err("non-numeric score");
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// A self-play cell may be non-numeric ('X', '-', "0 -- 0"), but if it is a number it must be 0
fn self_play_is_valid(value: &Value) -> bool {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.map_or(true, |n| n == 0.0)
}

/// Validate a head-to-head table. Messages are deduplicated, first occurrence wins.
pub fn validate_head_to_head(headers: &[String], rows: &[LeagueRow]) -> Vec<String> {
    if headers.len() < 2 {
        return vec![
            "At least two competitors are required, but the header row has fewer.".to_string(),
        ];
    }
    if rows.is_empty() {
        return vec!["The table has no data rows.".to_string()];
    }

    let mut errors = Vec::new();

    let names: Vec<Option<&str>> = rows.iter().map(|row| row.name.as_deref()).collect();
    let unique: HashSet<&Option<&str>> = names.iter().collect();
    if unique.len() != names.len() {
        errors.push("Competitor names in the first column must be unique.".to_string());
    }

    for header in headers {
        if !names.contains(&Some(header.as_str())) {
            errors.push(format!(
                "Header '{}' has no matching competitor row.",
                header
            ));
        }
    }

    for (i, row) in rows.iter().enumerate() {
        let name = match row.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                errors.push(format!("Row {} has no competitor name.", i + 1));
                continue;
            }
        };

        let Some(cells) = row.data.as_array() else {
            errors.push(format!("Row for '{}' has no data list.", name));
            continue;
        };

        if cells.len() != headers.len() {
            errors.push(format!(
                "Row for '{}' has {} cells, expected {}.",
                name,
                cells.len(),
                headers.len()
            ));
            continue;
        }

        for (j, cell) in cells.iter().enumerate() {
            let opponent = headers[j].as_str();

            if name == opponent {
                if !self_play_is_valid(cell) {
                    errors.push(format!(
                        "Cell ({} vs {}): self-play cell must be 0 or a marker such as 'X' or '-', found '{}'.",
                        name,
                        opponent,
                        cell_text(cell)
                    ));
                }
                continue;
            }

            let Some(opponent_row) = rows.iter().find(|r| r.name.as_deref() == Some(opponent))
            else {
                errors.push(format!(
                    "Cell ({} vs {}): no row found for opponent '{}'.",
                    name, opponent, opponent
                ));
                continue;
            };

            let Some(column) = headers.iter().position(|h| h == name) else {
                errors.push(format!(
                    "Cell ({} vs {}): '{}' has no column in the header row.",
                    name, opponent, name
                ));
                continue;
            };

            let Some(reciprocal) = opponent_row
                .data
                .as_array()
                .and_then(|data| data.get(column))
            else {
                errors.push(format!(
                    "Cell ({} vs {}): reciprocal cell is missing from '{}'s row.",
                    name, opponent, opponent
                ));
                continue;
            };

            match (score_parts(cell), score_parts(reciprocal)) {
                (Ok((own, other)), Ok((reciprocal_own, reciprocal_other))) => {
                    if own != reciprocal_other || other != reciprocal_own {
                        errors.push(format!(
                            "Cell ({} vs {}): reciprocal score mismatch, expected '{} -- {}' but found '{}'.",
                            name,
                            opponent,
                            other,
                            own,
                            cell_text(reciprocal)
                        ));
                    }
                }
                (Err(reason), _) | (_, Err(reason)) => {
                    errors.push(format!(
                        "Cell ({} vs {}): invalid score '{}', expected 'X -- Y' with integer X and Y ({}).",
                        name,
                        opponent,
                        cell_text(cell),
                        reason
                    ));
                }
            }
        }
    }

    let mut seen = HashSet::new();
    errors.retain(|error| seen.insert(error.clone()));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn valid_rows() -> Vec<LeagueRow> {
        vec![
            LeagueRow::new("A", &["X", "2 -- 1", "3 -- 0"]),
            LeagueRow::new("B", &["1 -- 2", "-", "1 -- 1"]),
            LeagueRow::new("C", &["0 -- 3", "1 -- 1", "0"]),
        ]
    }

    #[test]
    fn test_valid_table() {
        let errors = validate_head_to_head(&headers(&["A", "B", "C"]), &valid_rows());
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_too_few_headers() {
        let errors = validate_head_to_head(&headers(&["A"]), &valid_rows());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_no_rows() {
        let errors = validate_head_to_head(&headers(&["A", "B"]), &[]);
        assert_eq!(errors, vec!["The table has no data rows.".to_string()]);
    }

    #[test]
    fn test_reciprocal_mismatch() {
        let mut rows = valid_rows();
        rows[1] = LeagueRow::new("B", &["2 -- 2", "-", "1 -- 1"]);
        let errors = validate_head_to_head(&headers(&["A", "B", "C"]), &rows);

        // Reported from both sides of the pair
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.contains("reciprocal score mismatch")));
    }

    #[test]
    fn test_invalid_format() {
        let mut rows = valid_rows();
        rows[0] = LeagueRow::new("A", &["X", "two -- 1", "3 -- 0"]);
        let errors = validate_head_to_head(&headers(&["A", "B", "C"]), &rows);
        assert!(errors.iter().any(|e| e.contains("invalid score 'two -- 1'")));
    }

    #[test]
    fn test_self_play_must_be_zero() {
        let mut rows = valid_rows();
        rows[2] = LeagueRow::new("C", &["0 -- 3", "1 -- 1", "4"]);
        let errors = validate_head_to_head(&headers(&["A", "B", "C"]), &rows);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("self-play"));
    }

    #[test]
    fn test_structural_errors() {
        let rows = vec![
            LeagueRow::new("A", &["X", "1 -- 0"]),
            LeagueRow::new("A", &["0 -- 1"]),
            LeagueRow {
                name: None,
                data: Value::Null,
            },
        ];
        let errors = validate_head_to_head(&headers(&["A", "B"]), &rows);

        assert!(errors.iter().any(|e| e.contains("must be unique")));
        assert!(errors.iter().any(|e| e.contains("Header 'B'")));
        assert!(errors.iter().any(|e| e.contains("has 1 cells, expected 2")));
        assert!(errors.iter().any(|e| e.contains("Row 3 has no competitor name")));
    }

    #[test]
    fn test_missing_data_list() {
        let rows = vec![
            LeagueRow::new("A", &["X", "1 -- 0"]),
            LeagueRow {
                name: Some("B".to_string()),
                data: Value::from("1 -- 0"),
            },
        ];
        let errors = validate_head_to_head(&headers(&["A", "B"]), &rows);
        assert!(errors.iter().any(|e| e == "Row for 'B' has no data list."));
    }

    #[test]
    fn test_errors_are_deduplicated() {
        let rows = vec![
            LeagueRow::new("A", &["X", "1 -- 0"]),
            LeagueRow::new("A", &["X", "1 -- 0"]),
            LeagueRow::new("A", &["X", "1 -- 0"]),
        ];
        let errors = validate_head_to_head(&headers(&["A", "B"]), &rows);
        let unique: HashSet<&String> = errors.iter().collect();
        assert_eq!(unique.len(), errors.len());
    }
}
