//! Loading the result files of a data directory, once per process.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{HubError, Result};
use crate::models::{
    BorderPost, ConflictRecord, Decay, Table, BORDER_COLUMN, CI_COLUMN, SUMMARY_NAME_COLUMN,
    YEAR_COLUMN,
};
use crate::storage;

/// The files a data directory may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    MpiBorder,
    Ci,
    MpiSummary,
    MarketMetrics,
    BorderMetrics,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::MpiBorder,
        DatasetKind::Ci,
        DatasetKind::MpiSummary,
        DatasetKind::MarketMetrics,
        DatasetKind::BorderMetrics,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            DatasetKind::MpiBorder => "mpi_border_results.csv",
            DatasetKind::Ci => "ci_results.csv",
            DatasetKind::MpiSummary => "mpi_summary.csv",
            DatasetKind::MarketMetrics => "aggregated_market_metrics.csv",
            DatasetKind::BorderMetrics => "aggregated_border_metrics.csv",
        }
    }

    /// Short name used in URLs and on the command line.
    pub fn slug(self) -> &'static str {
        self.file_name().trim_end_matches(".csv")
    }

    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::MpiBorder => "MPI by Border",
            DatasetKind::Ci => "CI Results",
            DatasetKind::MpiSummary => "MPI Summary",
            DatasetKind::MarketMetrics => "Aggregated Market Metrics",
            DatasetKind::BorderMetrics => "Aggregated Border Metrics",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, DatasetKind::MpiBorder | DatasetKind::Ci)
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DatasetKind {
    type Err = HubError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        DatasetKind::ALL
            .into_iter()
            .find(|k| k.slug() == s || k.file_name() == s)
            .ok_or_else(|| HubError::UnknownDataset(s.to_string()))
    }
}

/// Everything loaded from one data directory.
#[derive(Debug)]
pub struct Datasets {
    pub dir: PathBuf,
    pub loaded_at: DateTime<Utc>,
    pub borders: Vec<BorderPost>,
    pub conflicts: Vec<ConflictRecord>,
    tables: HashMap<DatasetKind, Table>,
}

impl Datasets {
    /// Read the two mandatory tables and whichever optional ones exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let mpi_table = storage::read_table(&dir.join(DatasetKind::MpiBorder.file_name()))?;
        let ci_table = storage::read_table(&dir.join(DatasetKind::Ci.file_name()))?;

        let borders = parse_borders(&mpi_table)?;
        let conflicts = parse_conflicts(&ci_table)?;

        let mut tables = HashMap::new();
        tables.insert(DatasetKind::MpiBorder, mpi_table);
        tables.insert(DatasetKind::Ci, ci_table);

        for kind in DatasetKind::ALL.into_iter().filter(|k| !k.is_required()) {
            match storage::read_optional_table(&dir.join(kind.file_name()))? {
                Some(table) => {
                    tables.insert(kind, table);
                }
                None => debug!("{}", HubError::OptionalDataMissing(kind.file_name().into())),
            }
        }

        info!(
            dir = %dir.display(),
            borders = borders.len(),
            conflict_rows = conflicts.len(),
            tables = tables.len(),
            "datasets loaded"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            loaded_at: Utc::now(),
            borders,
            conflicts,
            tables,
        })
    }

    /// The raw table of a dataset. Optional datasets that were not present
    /// yield `OptionalDataMissing`.
    pub fn table(&self, kind: DatasetKind) -> Result<&Table> {
        self.tables
            .get(&kind)
            .ok_or_else(|| HubError::OptionalDataMissing(kind.file_name().to_string()))
    }

    pub fn has(&self, kind: DatasetKind) -> bool {
        self.tables.contains_key(&kind)
    }

    /// Datasets that were found, in canonical order.
    pub fn available(&self) -> Vec<DatasetKind> {
        DatasetKind::ALL.into_iter().filter(|k| self.has(*k)).collect()
    }

    pub fn summary(&self) -> Option<&Table> {
        self.tables.get(&DatasetKind::MpiSummary)
    }
}

fn parse_number(file: &str, line: usize, column: &str, raw: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| HubError::InvalidValue {
        file: file.to_string(),
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

fn parse_borders(table: &Table) -> Result<Vec<BorderPost>> {
    let file = DatasetKind::MpiBorder.file_name();
    let name_idx = table.require_column(file, BORDER_COLUMN)?;
    let mut decay_idx = [0usize; 3];
    for decay in Decay::ALL {
        decay_idx[decay.index()] = table.require_column(file, &decay.column())?;
    }

    let mut out = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        // header is line 1
        let line = i + 2;
        let mut mpi = [None; 3];
        for decay in Decay::ALL {
            let idx = decay_idx[decay.index()];
            mpi[decay.index()] = parse_number(file, line, &decay.column(), &row[idx])?;
        }
        out.push(BorderPost {
            name: row[name_idx].clone(),
            mpi,
        });
    }
    Ok(out)
}

fn parse_conflicts(table: &Table) -> Result<Vec<ConflictRecord>> {
    let file = DatasetKind::Ci.file_name();
    let border_idx = table.require_column(file, BORDER_COLUMN)?;
    let year_idx = table.require_column(file, YEAR_COLUMN)?;
    let ci_idx = table.require_column(file, CI_COLUMN)?;

    let mut out = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let line = i + 2;
        // Years exported from a float column come through as "2020.0".
        let year = match parse_number(file, line, YEAR_COLUMN, &row[year_idx])? {
            Some(y) if y.fract() == 0.0 => y as i32,
            Some(_) => {
                return Err(HubError::InvalidValue {
                    file: file.to_string(),
                    line,
                    column: YEAR_COLUMN.to_string(),
                    value: row[year_idx].clone(),
                })
            }
            None => {
                debug!(line, "ci row without a year skipped");
                continue;
            }
        };
        out.push(ConflictRecord {
            border: row[border_idx].clone(),
            year,
            ci: parse_number(file, line, CI_COLUMN, &row[ci_idx])?,
        });
    }
    Ok(out)
}

/// Ethnic group names from `mpi_summary.csv`; empty when the file or
/// its `name` column is absent.
pub fn ethnic_groups(data: &Datasets) -> Vec<String> {
    data.summary()
        .and_then(|t| t.column_index(SUMMARY_NAME_COLUMN).map(|idx| t.unique_values(idx)))
        .unwrap_or_default()
}

/// Process-lifetime cache of the parsed datasets.
///
/// The first successful load is kept forever. Failed loads are not cached,
/// so supplying a missing file makes the next call succeed.
#[derive(Debug)]
pub struct DatasetCache {
    dir: PathBuf,
    loaded: RwLock<Option<Arc<Datasets>>>,
}

impl DatasetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loaded: RwLock::new(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self) -> Result<Arc<Datasets>> {
        if let Some(data) = self
            .loaded
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            return Ok(Arc::clone(data));
        }

        let mut slot = self.loaded.write().unwrap_or_else(|e| e.into_inner());
        if let Some(data) = slot.as_ref() {
            return Ok(Arc::clone(data));
        }
        let data = Arc::new(Datasets::load(&self.dir)?);
        *slot = Some(Arc::clone(&data));
        Ok(data)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_kind_parses_slug_and_file_name() {
        assert_eq!("ci_results".parse::<DatasetKind>().unwrap(), DatasetKind::Ci);
        assert_eq!(
            "aggregated_market_metrics.csv".parse::<DatasetKind>().unwrap(),
            DatasetKind::MarketMetrics
        );
        assert!(matches!(
            "secrets".parse::<DatasetKind>(),
            Err(HubError::UnknownDataset(_))
        ));
    }

    #[test]
    fn year_may_be_float_formatted() {
        let table = Table::new(
            vec!["Border_Name".into(), "year".into(), "CI".into()],
            vec![
                vec!["Busia".into(), "2020.0".into(), "1.5".into()],
                vec!["Busia".into(), "".into(), "2".into()],
            ],
        );
        let records = parse_conflicts(&table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2020);
    }

    #[test]
    fn bad_number_reports_line_and_column() {
        let table = Table::new(
            vec!["Border_Name".into(), "year".into(), "CI".into()],
            vec![vec!["Busia".into(), "2020".into(), "high".into()]],
        );
        let err = parse_conflicts(&table).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains("'CI'"), "{msg}");
    }
}
