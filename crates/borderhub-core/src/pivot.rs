//! Pivoting long tables into heatmap matrices.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};
use crate::models::Table;

/// How duplicate (row, column) values collapse into one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Mean,
    Count,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Count => "count",
        })
    }
}

impl FromStr for Aggregation {
    type Err = HubError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "mean" => Ok(Aggregation::Mean),
            "count" => Ok(Aggregation::Count),
            _ => Err(HubError::UnknownAggregation(s.to_string())),
        }
    }
}

/// A 2D matrix keyed by row and column labels.
///
/// Combinations with no input rows are `None`, which renders as a blank
/// cell rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotMatrix {
    pub aggregation: Aggregation,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        self.cells[r][c]
    }

    /// Filled cells as (row, column, value) triples, row-major.
    pub fn to_long(&self) -> Vec<(String, String, f64)> {
        let mut out = vec![];
        for (r, row) in self.rows.iter().enumerate() {
            for (c, col) in self.columns.iter().enumerate() {
                if let Some(v) = self.cells[r][c] {
                    out.push((row.clone(), col.clone(), v));
                }
            }
        }
        out
    }
}

#[derive(Default, Clone, Copy)]
struct Acc {
    sum: f64,
    count: usize,
}

/// Build a matrix from (row, column, value) triples.
///
/// Blank keys and missing values are skipped, so a label only appears when
/// it has at least one value.
pub fn pivot<I, R, C>(entries: I, aggregation: Aggregation) -> PivotMatrix
where
    I: IntoIterator<Item = (R, C, Option<f64>)>,
    R: Into<String>,
    C: Into<String>,
{
    let mut acc: HashMap<(String, String), Acc> = HashMap::new();
    let mut row_set = HashSet::new();
    let mut col_set = HashSet::new();

    for (row, col, value) in entries {
        let (row, col): (String, String) = (row.into(), col.into());
        let Some(value) = value else { continue };
        if row.is_empty() || col.is_empty() {
            continue;
        }
        row_set.insert(row.clone());
        col_set.insert(col.clone());
        let cell = acc.entry((row, col)).or_default();
        cell.sum += value;
        cell.count += 1;
    }

    let rows = sorted_labels(row_set);
    let columns = sorted_labels(col_set);
    let cells = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| {
                    acc.get(&(r.clone(), c.clone())).map(|a| match aggregation {
                        Aggregation::Sum => a.sum,
                        Aggregation::Mean => a.sum / a.count as f64,
                        Aggregation::Count => a.count as f64,
                    })
                })
                .collect()
        })
        .collect();

    PivotMatrix {
        aggregation,
        rows,
        columns,
        cells,
    }
}

/// Pivot a raw table by column names.
pub fn pivot_table(
    table: &Table,
    file: &str,
    row_key: &str,
    col_key: &str,
    value_key: &str,
    aggregation: Aggregation,
) -> Result<PivotMatrix> {
    let r = table.require_column(file, row_key)?;
    let c = table.require_column(file, col_key)?;
    let v = table.require_column(file, value_key)?;

    let mut entries = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let raw = row[v].trim();
        let value = if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            None
        } else {
            Some(raw.parse::<f64>().map_err(|_| HubError::InvalidValue {
                file: file.to_string(),
                line: i + 2,
                column: value_key.to_string(),
                value: raw.to_string(),
            })?)
        };
        entries.push((normalize_key(&row[r]), normalize_key(&row[c]), value));
    }
    Ok(pivot(entries, aggregation))
}

// "2020.0" and "2020" are the same year.
fn normalize_key(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n.abs() < 1e15 && raw.contains('.') => {
            format!("{}", n as i64)
        }
        _ => raw.to_string(),
    }
}

/// Numeric order when every label is a number, lexicographic otherwise.
fn sorted_labels(set: HashSet<String>) -> Vec<String> {
    let mut labels: Vec<String> = set.into_iter().collect();
    let numeric: Option<Vec<f64>> = labels.iter().map(|l| l.parse::<f64>().ok()).collect();
    if numeric.is_some() {
        labels.sort_by(|a, b| {
            let (x, y) = (a.parse::<f64>().unwrap_or(0.0), b.parse::<f64>().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        });
    } else {
        labels.sort();
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci_table(rows: &[(&str, &str, &str)]) -> Table {
        Table::new(
            vec!["Border_Name".into(), "year".into(), "CI".into()],
            rows.iter()
                .map(|(b, y, v)| vec![b.to_string(), y.to_string(), v.to_string()])
                .collect(),
        )
    }

    #[test]
    fn duplicates_are_summed() {
        let t = ci_table(&[("Busia", "2020", "5"), ("Busia", "2020", "3")]);
        let m = pivot_table(&t, "ci_results.csv", "Border_Name", "year", "CI", Aggregation::Sum)
            .unwrap();
        assert_eq!(m.get("Busia", "2020"), Some(8.0));
    }

    #[test]
    fn missing_combination_is_blank_not_zero() {
        let t = ci_table(&[("Busia", "2020", "5"), ("Malaba", "2021", "0")]);
        let m = pivot_table(&t, "ci", "Border_Name", "year", "CI", Aggregation::Sum).unwrap();
        assert_eq!(m.get("Busia", "2021"), None);
        assert_eq!(m.get("Malaba", "2021"), Some(0.0));
        assert_eq!(m.get("Malaba", "2020"), None);
    }

    #[test]
    fn reaggregating_long_form_is_idempotent() {
        let t = ci_table(&[
            ("Busia", "2020", "5"),
            ("Busia", "2020", "3"),
            ("Malaba", "2019", "1.25"),
            ("Malaba", "2021", "2"),
        ]);
        let once = pivot_table(&t, "ci", "Border_Name", "year", "CI", Aggregation::Sum).unwrap();
        let entries = once
            .to_long()
            .into_iter()
            .map(|(r, c, v)| (r, c, Some(v)));
        let twice = pivot(entries, Aggregation::Sum);
        assert_eq!(once, twice);
    }

    #[test]
    fn years_sort_numerically_and_merge_float_format() {
        let t = ci_table(&[
            ("Busia", "2021", "1"),
            ("Busia", "999", "1"),
            ("Busia", "2021.0", "2"),
        ]);
        let m = pivot_table(&t, "ci", "Border_Name", "year", "CI", Aggregation::Sum).unwrap();
        assert_eq!(m.columns, vec!["999", "2021"]);
        assert_eq!(m.get("Busia", "2021"), Some(3.0));
    }

    #[test]
    fn mean_and_count() {
        let t = ci_table(&[("Busia", "2020", "5"), ("Busia", "2020", "3"), ("Busia", "2020", "")]);
        let mean = pivot_table(&t, "ci", "Border_Name", "year", "CI", Aggregation::Mean).unwrap();
        assert_eq!(mean.get("Busia", "2020"), Some(4.0));
        let count = pivot_table(&t, "ci", "Border_Name", "year", "CI", Aggregation::Count).unwrap();
        assert_eq!(count.get("Busia", "2020"), Some(2.0));
    }

    #[test]
    fn missing_key_column_is_reported() {
        let t = ci_table(&[("Busia", "2020", "5")]);
        let err = pivot_table(&t, "ci_results.csv", "Border_Name", "month", "CI", Aggregation::Sum)
            .unwrap_err();
        assert!(matches!(err, HubError::MissingColumn { .. }));
    }
}
