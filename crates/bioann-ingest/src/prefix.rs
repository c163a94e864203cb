//! OBO PURL prefixing for ontology identifier columns.

use anyhow::{Context, Result};
use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::polars_utils::column_strings;

/// Base of OBO Foundry persistent URLs.
pub const OBO_PURL_BASE: &str = "http://purl.obolibrary.org/obo/";

/// Expand a short identifier (`CHEBI_17234`) to its OBO PURL.
///
/// Values that already look like absolute URLs are returned unchanged.
pub fn obo_purl(identifier: &str) -> String {
    let trimmed = identifier.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("{OBO_PURL_BASE}{trimmed}")
    }
}

/// Replace `column` with its OBO PURL expansion; null cells stay null.
pub fn add_obo_prefix(df: &mut DataFrame, column: &str) -> Result<()> {
    let values = column_strings(df, column)
        .with_context(|| format!("column '{column}' not found"))?;
    let prefixed: Vec<Option<String>> = values
        .into_iter()
        .map(|value| value.map(|id| obo_purl(&id)))
        .collect();
    df.with_column(Series::new(column.into(), prefixed))
        .with_context(|| format!("replace column '{column}'"))?;
    Ok(())
}
