//! CSV input and output for annotation tables.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use tracing::debug;

/// Number of rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Read a CSV file with a single header row into a DataFrame.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("create csv reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("read csv: {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );
    Ok(df)
}

/// Read a CSV table and check that the text column exists.
pub fn read_annotation_input(path: &Path, text_column: &str) -> Result<DataFrame> {
    let df = read_csv_table(path)?;
    if df.column(text_column).is_err() {
        let available: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        bail!(
            "{}: text column '{text_column}' not found (columns: {})",
            path.display(),
            available.join(", ")
        );
    }
    Ok(df)
}

/// Write a DataFrame to CSV with a header row, creating parent directories.
pub fn write_csv_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory: {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("create output: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write csv: {}", path.display()))?;
    debug!(path = %path.display(), rows = df.height(), "wrote table");
    Ok(())
}
