//! Storage layer: CSV result tables, YAML config, data directory layout.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{HubError, Result};
use crate::models::Table;

// ─── CSV table I/O ───────────────────────────────────────────────────────────

/// Read a mandatory CSV file. A missing file is `DataUnavailable`.
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(HubError::DataUnavailable {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = vec![];
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table::new(headers, rows))
}

/// Read an optional CSV file. Absence is `Ok(None)`, not an error.
pub fn read_optional_table(path: &Path) -> Result<Option<Table>> {
    if !path.is_file() {
        debug!(path = %path.display(), "optional table not present");
        return Ok(None);
    }
    read_table(path).map(Some)
}

/// Serialise a table as UTF-8, comma-separated, `\n`-terminated CSV with
/// a header row. Fields are quoted only where the format requires it.
pub fn write_table<W: Write>(out: W, table: &Table) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    if !table.headers.is_empty() {
        writer.write_record(&table.headers)?;
    }
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn table_to_csv(table: &Table) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_table(&mut buf, table)?;
    Ok(buf)
}

/// Parse CSV bytes back into a table.
pub fn table_from_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = vec![];
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(Table::new(headers, rows))
}

// ─── YAML config I/O ─────────────────────────────────────────────────────────

pub fn save_yaml<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = serde_yaml::to_string(data)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T>
where
    T: Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let content = fs::read_to_string(path)?;
    let val = serde_yaml::from_str(&content)?;
    Ok(val)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["Border_Name".into(), "note".into()],
            vec![
                vec!["Busia".into(), "plain".into()],
                vec!["Malaba".into(), "has, comma".into()],
                vec!["Lwakhakha".into(), "has \"quotes\"".into()],
                vec!["Suam".into(), "".into()],
            ],
        )
    }

    #[test]
    fn csv_round_trip_preserves_cells() {
        let table = sample();
        let bytes = table_to_csv(&table).unwrap();
        assert_eq!(table_from_csv(&bytes).unwrap(), table);
    }

    #[test]
    fn csv_output_is_plain_where_possible() {
        let bytes = table_to_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Border_Name,note"));
        assert_eq!(lines.next(), Some("Busia,plain"));
        assert_eq!(lines.next(), Some("Malaba,\"has, comma\""));
        assert!(text.ends_with('\n'));
        assert!(!text.contains('\r'));
    }

    #[test]
    fn header_only_table_exports_header() {
        let table = Table::new(vec!["a".into(), "b".into()], vec![]);
        assert_eq!(table_to_csv(&table).unwrap(), b"a,b\n");
    }

    #[test]
    fn missing_mandatory_file_names_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ci_results.csv");
        let err = read_table(&path).unwrap_err();
        assert!(err.to_string().contains("ci_results.csv"));
        assert!(matches!(err, HubError::DataUnavailable { .. }));
    }

    #[test]
    fn missing_optional_file_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(read_optional_table(&tmp.path().join("mpi_summary.csv")).unwrap().is_none());
    }
}
