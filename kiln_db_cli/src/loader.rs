use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;

use kiln_db_core::storage::Schema;

/// Reads a headered CSV into field mappings keyed by column name.
///
/// The header must name exactly the table's columns; otherwise nothing is
/// returned and the load is aborted.
pub fn read_csv_rows(path: &Path, schema: &Schema) -> Result<Vec<HashMap<String, String>>> {
    let file = std::fs::File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    read_rows(file, schema)
}

pub fn read_rows(input: impl Read, schema: &Schema) -> Result<Vec<HashMap<String, String>>> {
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("CSV file has no header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        bail!("CSV file seems to be empty or without headers");
    }

    let found: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    let expected: BTreeSet<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    if found != expected {
        bail!(
            "CSV columns do not match table columns: expected {:?}, found {:?}",
            expected,
            found
        );
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed CSV record")?;
        // Short records leave fields out; the engine reports them per row.
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
