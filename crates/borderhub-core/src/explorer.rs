//! Result explorer: binds the loaded tables to parameterised views.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::dataset::{ethnic_groups, DatasetKind, Datasets};
use crate::error::{HubError, Result};
use crate::figures::{self, Figure};
use crate::models::{
    BarDatum, BorderKeyed, BorderPost, BorderSelection, ConflictRecord, Decay, FilterSelection,
    TrendPoint, TrendSeries, YearValue, BORDER_COLUMN, CI_COLUMN, YEAR_COLUMN,
};
use crate::pivot::{self, Aggregation, PivotMatrix};
use crate::storage;

pub const NO_MPI_DATA: &str = "No data for selected borders.";
pub const NO_CI_DATA: &str = "No CI data for selected borders.";

/// What a view renders: content, an explicit empty state, or a message
/// explaining why the data cannot be shown.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum View<T> {
    Ready { data: T },
    Empty { message: String },
    Unavailable { message: String },
}

impl<T> View<T> {
    pub fn empty(message: impl Into<String>) -> Self {
        View::Empty {
            message: message.into(),
        }
    }

    pub fn unavailable(err: &HubError) -> Self {
        View::Unavailable {
            message: err.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, View::Ready { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            View::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> View<U> {
        match self {
            View::Ready { data } => View::Ready { data: f(data) },
            View::Empty { message } => View::Empty { message },
            View::Unavailable { message } => View::Unavailable { message },
        }
    }
}

/// Values for the dashboard's selection controls.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerOptions {
    pub borders: Vec<String>,
    pub decays: Vec<Decay>,
    pub years: Vec<i32>,
    pub ethnic_groups: Vec<String>,
    pub downloads: Vec<DownloadInfo>,
}

/// Every tab of the exploration page for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerPage {
    pub decay: Decay,
    pub mpi_bars: View<Figure>,
    pub mpi_heatmap: View<Figure>,
    pub ci_trends: View<Figure>,
    pub ci_heatmap: View<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<View<Vec<YearValue>>>,
    pub downloads: Vec<DownloadInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadInfo {
    pub name: &'static str,
    pub file_name: &'static str,
    pub label: String,
    pub rows: usize,
}

// ─── Pure operations ─────────────────────────────────────────────────────────

/// Rows whose border is selected, in their original order.
pub fn filter_by_border<T: BorderKeyed + Clone>(rows: &[T], selection: &BorderSelection) -> Vec<T> {
    rows.iter()
        .filter(|r| selection.contains(r.border()))
        .cloned()
        .collect()
}

/// Wide → long: one (border, decay label, value) triple per row and decay,
/// border-major.
pub fn reshape_for_grouped_bars(rows: &[BorderPost], decays: &[Decay]) -> Vec<BarDatum> {
    let mut out = Vec::with_capacity(rows.len() * decays.len());
    for row in rows {
        for decay in decays {
            out.push(BarDatum {
                border: row.name.clone(),
                decay: decay.label().to_string(),
                value: row.mpi(*decay),
            });
        }
    }
    out
}

/// CI per border across years, summed per year and ordered by year.
/// Borders keep their first-seen order.
pub fn trend_series<T>(rows: &[T]) -> Vec<TrendSeries>
where
    T: Borrow<ConflictRecord>,
{
    let mut order: Vec<String> = vec![];
    let mut by_border: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    for rec in rows {
        let rec: &ConflictRecord = rec.borrow();
        let Some(ci) = rec.ci else { continue };
        if rec.border.is_empty() {
            continue;
        }
        if !by_border.contains_key(&rec.border) {
            order.push(rec.border.clone());
        }
        *by_border
            .entry(rec.border.clone())
            .or_default()
            .entry(rec.year)
            .or_insert(0.0) += ci;
    }
    order
        .into_iter()
        .map(|border| {
            let points = by_border
                .remove(&border)
                .unwrap_or_default()
                .into_iter()
                .map(|(year, ci)| TrendPoint { year, ci })
                .collect();
            TrendSeries { border, points }
        })
        .collect()
}

// ─── Explorer over a loaded directory ────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResultExplorer {
    data: Arc<Datasets>,
}

impl ResultExplorer {
    pub fn new(data: Arc<Datasets>) -> Self {
        Self { data }
    }

    pub fn datasets(&self) -> &Datasets {
        &self.data
    }

    /// Unique non-blank border names in file order.
    pub fn border_options(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.data
            .borders
            .iter()
            .filter(|b| !b.name.is_empty() && seen.insert(b.name.as_str()))
            .map(|b| b.name.clone())
            .collect()
    }

    pub fn year_options(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.data.conflicts.iter().map(|c| c.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn options(&self) -> ExplorerOptions {
        ExplorerOptions {
            borders: self.border_options(),
            decays: Decay::ALL.to_vec(),
            years: self.year_options(),
            ethnic_groups: ethnic_groups(&self.data),
            downloads: self.downloads(),
        }
    }

    /// Downloads the directory offers; optional files appear only if present.
    pub fn downloads(&self) -> Vec<DownloadInfo> {
        self.data
            .available()
            .into_iter()
            .filter_map(|k| {
                let rows = self.data.table(k).ok()?.len();
                Some(DownloadInfo {
                    name: k.slug(),
                    file_name: k.file_name(),
                    label: format!("Download {}", k.label()),
                    rows,
                })
            })
            .collect()
    }

    pub fn mpi_long(&self, selection: &BorderSelection) -> View<Vec<BarDatum>> {
        let rows = filter_by_border(&self.data.borders, selection);
        if rows.is_empty() {
            return View::empty(NO_MPI_DATA);
        }
        View::Ready {
            data: reshape_for_grouped_bars(&rows, &Decay::ALL),
        }
    }

    pub fn mpi_bars(&self, selection: &BorderSelection) -> View<Figure> {
        self.mpi_long(selection)
            .map(|long| figures::mpi_bar_chart(&long))
    }

    pub fn mpi_heatmap(&self, decay: Decay) -> View<Figure> {
        if self.data.borders.is_empty() {
            return View::empty(NO_MPI_DATA);
        }
        View::Ready {
            data: figures::mpi_heatmap(&self.data.borders, decay),
        }
    }

    pub fn ci_series(&self, selection: &BorderSelection) -> View<Vec<TrendSeries>> {
        let rows = filter_by_border(&self.data.conflicts, selection);
        let series = trend_series(&rows);
        if series.is_empty() {
            return View::empty(NO_CI_DATA);
        }
        View::Ready { data: series }
    }

    pub fn ci_trends(&self, selection: &BorderSelection) -> View<Figure> {
        self.ci_series(selection)
            .map(|series| figures::ci_trend_chart(&series))
    }

    pub fn ci_matrix(&self, aggregation: Aggregation) -> Result<PivotMatrix> {
        pivot::pivot_table(
            self.data.table(DatasetKind::Ci)?,
            DatasetKind::Ci.file_name(),
            BORDER_COLUMN,
            YEAR_COLUMN,
            CI_COLUMN,
            aggregation,
        )
    }

    pub fn ci_heatmap(&self, aggregation: Aggregation) -> Result<View<Figure>> {
        let matrix = self.ci_matrix(aggregation)?;
        if matrix.is_empty() {
            return Ok(View::empty(NO_CI_DATA));
        }
        Ok(View::Ready {
            data: figures::ci_heatmap(&matrix),
        })
    }

    /// CI of every border in one year, summed over duplicate rows.
    pub fn year_snapshot(&self, year: i32) -> View<Vec<YearValue>> {
        let rows: Vec<_> = self
            .data
            .conflicts
            .iter()
            .filter(|c| c.year == year)
            .collect();
        let values: Vec<YearValue> = trend_series(&rows)
            .into_iter()
            .map(|s| YearValue {
                border: s.border,
                ci: s.points.iter().map(|p| p.ci).sum(),
            })
            .collect();
        if values.is_empty() {
            return View::empty(format!("No CI data for {year}."));
        }
        View::Ready { data: values }
    }

    /// Render the whole page in one pass.
    pub fn render(&self, selection: &FilterSelection) -> ExplorerPage {
        ExplorerPage {
            decay: selection.decay,
            mpi_bars: self.mpi_bars(&selection.borders),
            mpi_heatmap: self.mpi_heatmap(selection.decay),
            ci_trends: self.ci_trends(&selection.borders),
            ci_heatmap: self
                .ci_heatmap(Aggregation::Sum)
                .unwrap_or_else(|e| View::unavailable(&e)),
            year: selection.year.map(|y| self.year_snapshot(y)),
            downloads: self.downloads(),
        }
    }

    /// CSV bytes of a loaded table, optionally restricted to some borders.
    /// Tables without a border column are always exported whole.
    pub fn export(&self, kind: DatasetKind, selection: &BorderSelection) -> Result<Vec<u8>> {
        let table = self.data.table(kind)?;
        match (selection, table.column_index(BORDER_COLUMN)) {
            (BorderSelection::Only(_), Some(idx)) => {
                storage::table_to_csv(&table.filter_rows(idx, selection))
            }
            (BorderSelection::Only(_), None) => {
                debug!(dataset = %kind, "no border column, exporting whole table");
                storage::table_to_csv(table)
            }
            (BorderSelection::All, _) => storage::table_to_csv(table),
        }
    }

    /// Like `export`, but an empty selection is an error rather than a
    /// header-only file.
    pub fn export_selection(
        &self,
        kind: DatasetKind,
        selection: &BorderSelection,
    ) -> Result<Vec<u8>> {
        if selection.is_empty() {
            return Err(HubError::EmptySelection);
        }
        self.export(kind, selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(name: &str, a: f64, b: f64, c: f64) -> BorderPost {
        BorderPost {
            name: name.into(),
            mpi: [Some(a), Some(b), Some(c)],
        }
    }

    fn rec(border: &str, year: i32, ci: f64) -> ConflictRecord {
        ConflictRecord {
            border: border.into(),
            year,
            ci: Some(ci),
        }
    }

    #[test]
    fn filter_preserves_order() {
        let rows = vec![
            post("Busia", 0.9, 0.8, 0.7),
            post("Malaba", 0.5, 0.4, 0.3),
            post("Lwakhakha", 0.2, 0.1, 0.0),
        ];
        let sel = BorderSelection::only(["Lwakhakha", "Busia"]);
        let names: Vec<_> = filter_by_border(&rows, &sel)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Busia", "Lwakhakha"]);
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let rows = vec![post("Busia", 0.9, 0.8, 0.7)];
        let sel = BorderSelection::only(Vec::<String>::new());
        assert!(filter_by_border(&rows, &sel).is_empty());
    }

    #[test]
    fn reshape_counts_and_labels() {
        let rows = vec![post("Busia", 0.9, 0.8, 0.7), post("Malaba", 0.5, 0.4, 0.3)];
        let long = reshape_for_grouped_bars(&rows, &Decay::ALL);
        assert_eq!(long.len(), rows.len() * Decay::ALL.len());
        for datum in &long {
            let (int, frac) = datum.decay.split_once('.').unwrap();
            assert!(!int.is_empty() && int.chars().all(|c| c.is_ascii_digit()));
            assert!(!frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(long[1].border, "Busia");
        assert_eq!(long[1].decay, "0.03");
        assert_eq!(long[1].value, Some(0.8));
    }

    #[test]
    fn trends_sum_duplicate_years_and_sort() {
        let rows = vec![
            rec("Busia", 2021, 1.0),
            rec("Malaba", 2020, 2.0),
            rec("Busia", 2020, 5.0),
            rec("Busia", 2020, 3.0),
        ];
        let series = trend_series(&rows);
        assert_eq!(series[0].border, "Busia");
        assert_eq!(
            series[0].points,
            vec![TrendPoint { year: 2020, ci: 8.0 }, TrendPoint { year: 2021, ci: 1.0 }]
        );
        assert_eq!(series[1].border, "Malaba");
    }
}
