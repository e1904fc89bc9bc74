//! Query results and CSV export

use crate::error::Result;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/// Column of a result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column label as returned by the warehouse
    pub name: String,
    /// Warehouse type name, e.g. `fixed` or `text`
    pub data_type: String,
}

/// Rows returned by one statement
///
/// Values arrive as text; SQL `NULL` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// Columns, in select order
    pub columns: Vec<Column>,
    /// Fetched rows
    pub rows: Vec<Vec<Option<String>>>,
    /// Row count reported by the warehouse; may exceed `rows.len()`
    pub total_rows: u64,
    /// Handle the warehouse assigned to the statement
    pub statement_handle: Option<String>,
}

impl ResultSet {
    /// Whether the statement returned no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether only the first partition of a larger result was fetched
    pub fn is_truncated(&self) -> bool {
        (self.rows.len() as u64) < self.total_rows
    }
}

/// Write `results` as CSV with a header row; `NULL` becomes an empty field
pub fn write_csv<W: Write>(results: &ResultSet, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if !results.columns.is_empty() {
        csv.write_record(results.columns.iter().map(|c| c.name.as_str()))
            .context("Failed to write CSV header")?;
    }
    for row in &results.rows {
        csv.write_record(row.iter().map(|value| value.as_deref().unwrap_or("")))
            .context("Failed to write CSV row")?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Export `results` to the file at `path`, returning the number of rows written
pub fn export_csv(results: &ResultSet, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(results, file)?;
    tracing::info!("Exported {} row(s) to {}", results.rows.len(), path.display());
    Ok(results.rows.len())
}
