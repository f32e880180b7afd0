//! Data models for borderhub.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HubError;

// ─── Column contract ─────────────────────────────────────────────────────────

pub const BORDER_COLUMN: &str = "Border_Name";
pub const YEAR_COLUMN: &str = "year";
pub const CI_COLUMN: &str = "CI";
pub const SUMMARY_NAME_COLUMN: &str = "name";
/// Prefix of the per-decay MPI columns (`Norm_MPI_0.02`, ...).
pub const MPI_COLUMN_PREFIX: &str = "Norm_MPI_";

// ─── Decay parameter ─────────────────────────────────────────────────────────

/// One of the three distance-decay settings the MPI was computed for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Decay {
    #[default]
    D002,
    D003,
    D005,
}

impl Decay {
    pub const ALL: [Decay; 3] = [Decay::D002, Decay::D003, Decay::D005];

    pub fn value(self) -> f64 {
        match self {
            Decay::D002 => 0.02,
            Decay::D003 => 0.03,
            Decay::D005 => 0.05,
        }
    }

    /// The label shown to users: the bare numeric value.
    pub fn label(self) -> &'static str {
        match self {
            Decay::D002 => "0.02",
            Decay::D003 => "0.03",
            Decay::D005 => "0.05",
        }
    }

    /// Name of the MPI column holding values for this decay.
    pub fn column(self) -> String {
        format!("{MPI_COLUMN_PREFIX}{}", self.label())
    }

    /// Recover the decay from an MPI column name.
    pub fn from_column(column: &str) -> Option<Decay> {
        column.strip_prefix(MPI_COLUMN_PREFIX)?.parse().ok()
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Decay::D002 => 0,
            Decay::D003 => 1,
            Decay::D005 => 2,
        }
    }
}

impl fmt::Display for Decay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Decay {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: f64 = s
            .trim()
            .parse()
            .map_err(|_| HubError::UnknownDecay(s.to_string()))?;
        Decay::ALL
            .into_iter()
            .find(|d| (d.value() - parsed).abs() < 1e-9)
            .ok_or_else(|| HubError::UnknownDecay(s.to_string()))
    }
}

impl TryFrom<String> for Decay {
    type Error = HubError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Decay> for String {
    fn from(d: Decay) -> Self {
        d.label().to_string()
    }
}

// ─── Typed records ───────────────────────────────────────────────────────────

/// Anything that belongs to a border post and can be filtered by it.
pub trait BorderKeyed {
    fn border(&self) -> &str;
}

/// One row of `mpi_border_results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderPost {
    pub name: String,
    /// Indexed by decay, in `Decay::ALL` order. Blank cells are `None`.
    pub mpi: [Option<f64>; 3],
}

impl BorderPost {
    pub fn mpi(&self, decay: Decay) -> Option<f64> {
        self.mpi[decay.index()]
    }
}

impl BorderKeyed for BorderPost {
    fn border(&self) -> &str {
        &self.name
    }
}

/// One row of `ci_results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictRecord {
    pub border: String,
    pub year: i32,
    pub ci: Option<f64>,
}

impl BorderKeyed for ConflictRecord {
    fn border(&self) -> &str {
        &self.border
    }
}

/// A long-form row for grouped bar charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDatum {
    pub border: String,
    pub decay: String,
    pub value: Option<f64>,
}

/// CI values for one border across years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub border: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub ci: f64,
}

/// CI of one border in a single year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearValue {
    pub border: String,
    pub ci: f64,
}

// ─── Raw tables ──────────────────────────────────────────────────────────────

/// A CSV file held verbatim: header plus raw string cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, file: &str, name: &str) -> crate::error::Result<usize> {
        self.column_index(name).ok_or_else(|| HubError::MissingColumn {
            file: file.to_string(),
            column: name.to_string(),
        })
    }

    /// Unique non-blank values of a column in first-seen order.
    pub fn unique_values(&self, column: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|v| !v.is_empty())
            .filter(|v| seen.insert(v.as_str()))
            .cloned()
            .collect()
    }

    /// Rows whose `column` cell is in the selection, keeping order and header.
    pub fn filter_rows(&self, column: usize, selection: &BorderSelection) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.get(column).is_some_and(|v| selection.contains(v)))
                .cloned()
                .collect(),
        }
    }
}

// ─── User selection ──────────────────────────────────────────────────────────

/// Which border posts a view should include.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BorderSelection {
    /// No explicit choice: every border is shown.
    #[default]
    All,
    Only(HashSet<String>),
}

impl BorderSelection {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BorderSelection::Only(names.into_iter().map(Into::into).collect())
    }

    /// Parse a comma-separated query value. `None` selects all borders,
    /// an empty string selects none.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            None => BorderSelection::All,
            Some(s) => BorderSelection::Only(
                s.split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect(),
            ),
        }
    }

    pub fn contains(&self, border: &str) -> bool {
        match self {
            BorderSelection::All => true,
            BorderSelection::Only(set) => set.contains(border),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BorderSelection::Only(set) if set.is_empty())
    }
}

/// Everything a single render pass is parameterised by.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub borders: BorderSelection,
    pub decay: Decay,
    pub year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_parses_only_known_values() {
        assert_eq!("0.03".parse::<Decay>().unwrap(), Decay::D003);
        assert_eq!(" 0.050 ".parse::<Decay>().unwrap(), Decay::D005);
        assert!(matches!("0.04".parse::<Decay>(), Err(HubError::UnknownDecay(_))));
        assert!("abc".parse::<Decay>().is_err());
    }

    #[test]
    fn decay_column_round_trips() {
        for d in Decay::ALL {
            assert_eq!(Decay::from_column(&d.column()), Some(d));
        }
        assert_eq!(Decay::D002.column(), "Norm_MPI_0.02");
        assert_eq!(Decay::from_column("CI"), None);
    }

    #[test]
    fn default_decay_is_smallest() {
        assert_eq!(Decay::default(), Decay::D002);
        assert_eq!(FilterSelection::default().decay.label(), "0.02");
    }

    #[test]
    fn decay_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Decay::D003).unwrap(), "\"0.03\"");
        let d: Decay = serde_json::from_str("\"0.05\"").unwrap();
        assert_eq!(d, Decay::D005);
    }

    #[test]
    fn selection_from_query() {
        assert_eq!(BorderSelection::from_query(None), BorderSelection::All);
        assert!(BorderSelection::from_query(Some("")).is_empty());
        let sel = BorderSelection::from_query(Some("Busia, Malaba,"));
        assert!(sel.contains("Busia"));
        assert!(sel.contains("Malaba"));
        assert!(!sel.contains("Lwakhakha"));
    }

    #[test]
    fn unique_values_skip_blanks() {
        let t = Table::new(
            vec!["Border_Name".into()],
            vec![vec!["B".into()], vec!["".into()], vec!["A".into()], vec!["B".into()]],
        );
        assert_eq!(t.unique_values(0), vec!["B", "A"]);
    }
}
