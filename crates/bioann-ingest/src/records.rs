//! DataFrame construction from string records.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

/// Build a string DataFrame from record maps.
///
/// Columns follow `columns` order; a record without a value for a column
/// yields a null cell. Used for SPARQL result sets.
pub fn records_to_frame(
    columns: &[String],
    records: &[BTreeMap<String, String>],
) -> Result<DataFrame> {
    let mut frame_columns: Vec<Column> = Vec::with_capacity(columns.len());
    for name in columns {
        let values: Vec<Option<String>> = records
            .iter()
            .map(|record| record.get(name).cloned())
            .collect();
        frame_columns.push(Series::new(name.as_str().into(), values).into());
    }
    DataFrame::new(frame_columns).context("build dataframe from records")
}
