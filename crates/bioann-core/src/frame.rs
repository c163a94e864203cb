//! Flat annotation table and the merge back onto the input table.
//!
//! Nested lists are spread into indexed columns (`annotations.0.from`,
//! `ancestry.1.prefLabel`, ...). Column width is the largest list seen in the
//! batch, so identical inputs always yield identical columns. The frame
//! carries two helper columns, [`ROW_INDEX`] and [`LINE_INDEX`], which key the
//! merge and are dropped from the merged output.

use polars::prelude::*;

use bioann_model::{ClassDetail, FlatAnnotationRow, HierarchyEntry, ResolvedAncestor, SpanMatch};

/// Synthetic input row position used as the join key.
pub const ROW_INDEX: &str = "__bioann_row";
/// Position of the line within its row's response.
pub const LINE_INDEX: &str = "__bioann_line";

pub const CLASS_REF_ID: &str = "annotatedClass.@id";
pub const CLASS_REF_SELF: &str = "annotatedClass.links.self";
pub const CLASS_ID: &str = "class.@id";
pub const CLASS_PREF_LABEL: &str = "class.prefLabel";
pub const CLASS_ONTOLOGY: &str = "class.ontology";
pub const STATUS: &str = "annotation.status";

/// Generated columns present whatever the batch holds.
pub const FIXED_COLUMNS: [&str; 8] = [
    ROW_INDEX,
    LINE_INDEX,
    CLASS_REF_ID,
    CLASS_REF_SELF,
    CLASS_ID,
    CLASS_PREF_LABEL,
    CLASS_ONTOLOGY,
    STATUS,
];

/// Column name for field `field` of the `index`-th matched span.
pub fn span_column(index: usize, field: &str) -> String {
    format!("annotations.{index}.{field}")
}

/// Column name for field `field` of the `index`-th raw hierarchy entry.
pub fn hierarchy_column(index: usize, field: &str) -> String {
    format!("hierarchy.{index}.{field}")
}

/// Column name for field `field` of the `index`-th resolved ancestor.
pub fn ancestry_column(index: usize, field: &str) -> String {
    format!("ancestry.{index}.{field}")
}

/// Widths of the indexed column groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Widths {
    spans: usize,
    hierarchy: usize,
    ancestry: usize,
}

impl Widths {
    fn of(rows: &[FlatAnnotationRow]) -> Self {
        let mut widths = Self::default();
        for row in rows {
            if let Some(annotation) = row.annotation() {
                widths.spans = widths.spans.max(annotation.annotations.len());
                widths.hierarchy = widths.hierarchy.max(annotation.hierarchy.len());
            }
            if let Some(resolution) = &row.resolution {
                widths.ancestry = widths.ancestry.max(resolution.ancestry.len());
            }
        }
        widths
    }
}

fn text_column<F>(name: impl Into<PlSmallStr>, rows: &[FlatAnnotationRow], value: F) -> Column
where
    F: Fn(&FlatAnnotationRow) -> Option<String>,
{
    let values: Vec<Option<String>> = rows.iter().map(value).collect();
    Column::new(name.into(), values)
}

fn int_column<F>(name: impl Into<PlSmallStr>, rows: &[FlatAnnotationRow], value: F) -> Column
where
    F: Fn(&FlatAnnotationRow) -> Option<i64>,
{
    let values: Vec<Option<i64>> = rows.iter().map(value).collect();
    Column::new(name.into(), values)
}

fn span(row: &FlatAnnotationRow, index: usize) -> Option<&SpanMatch> {
    row.annotation()?.annotations.get(index)
}

fn hierarchy(row: &FlatAnnotationRow, index: usize) -> Option<&HierarchyEntry> {
    row.annotation()?.hierarchy.get(index)
}

fn primary(row: &FlatAnnotationRow) -> Option<&ClassDetail> {
    row.resolution.as_ref()?.primary.detail()
}

fn ancestor(row: &FlatAnnotationRow, index: usize) -> Option<&ResolvedAncestor> {
    row.resolution.as_ref()?.ancestry.get(index)
}

fn ancestor_detail(row: &FlatAnnotationRow, index: usize) -> Option<&ClassDetail> {
    ancestor(row, index)?.detail.detail()
}

/// Build the flat annotation table, one row per line, in line order.
pub fn annotation_frame(rows: &[FlatAnnotationRow]) -> PolarsResult<DataFrame> {
    let widths = Widths::of(rows);
    let mut columns: Vec<Column> = Vec::new();

    let row_index: Vec<u64> = rows.iter().map(|row| row.row_index as u64).collect();
    let line_index: Vec<u64> = rows.iter().map(|row| row.line_index as u64).collect();
    columns.push(Column::new(ROW_INDEX.into(), row_index));
    columns.push(Column::new(LINE_INDEX.into(), line_index));

    columns.push(text_column(CLASS_REF_ID, rows, |row| {
        row.annotation().map(|a| a.class_id().to_string())
    }));
    columns.push(text_column(CLASS_REF_SELF, rows, |row| {
        row.annotation()
            .and_then(|a| a.annotated_class.self_url())
            .map(str::to_string)
    }));

    for i in 0..widths.spans {
        columns.push(int_column(span_column(i, "from"), rows, |row| {
            span(row, i).map(|s| s.from)
        }));
        columns.push(int_column(span_column(i, "to"), rows, |row| {
            span(row, i).map(|s| s.to)
        }));
        columns.push(text_column(span_column(i, "matchType"), rows, |row| {
            span(row, i).map(|s| s.match_type.clone())
        }));
        columns.push(text_column(span_column(i, "text"), rows, |row| {
            span(row, i).and_then(|s| s.text.clone())
        }));
    }

    for i in 0..widths.hierarchy {
        columns.push(text_column(hierarchy_column(i, "annotatedClass.@id"), rows, |row| {
            hierarchy(row, i).map(|h| h.annotated_class.id.clone())
        }));
        columns.push(int_column(hierarchy_column(i, "distance"), rows, |row| {
            hierarchy(row, i).map(|h| h.distance)
        }));
    }

    columns.push(text_column(CLASS_ID, rows, |row| {
        primary(row).map(|d| d.id.clone())
    }));
    columns.push(text_column(CLASS_PREF_LABEL, rows, |row| {
        primary(row).and_then(|d| d.pref_label.clone())
    }));
    columns.push(text_column(CLASS_ONTOLOGY, rows, |row| {
        primary(row).and_then(ClassDetail::ontology).map(str::to_string)
    }));

    for i in 0..widths.ancestry {
        columns.push(text_column(ancestry_column(i, "@id"), rows, |row| {
            ancestor_detail(row, i).map(|d| d.id.clone())
        }));
        columns.push(text_column(ancestry_column(i, "prefLabel"), rows, |row| {
            ancestor_detail(row, i).and_then(|d| d.pref_label.clone())
        }));
        columns.push(text_column(ancestry_column(i, "ontology"), rows, |row| {
            ancestor_detail(row, i)
                .and_then(ClassDetail::ontology)
                .map(str::to_string)
        }));
        columns.push(int_column(ancestry_column(i, "distance"), rows, |row| {
            ancestor(row, i).map(|a| a.distance)
        }));
    }

    columns.push(text_column(STATUS, rows, |row| {
        Some(row.status().as_str().to_string())
    }));

    DataFrame::new(columns)
}

/// Fail when `input` already has a column named like one of `generated`.
pub fn ensure_no_clash<'a>(
    input: &DataFrame,
    generated: impl IntoIterator<Item = &'a str>,
) -> PolarsResult<()> {
    let clashes: Vec<&str> = generated
        .into_iter()
        .filter(|name| input.column(name).is_ok())
        .collect();
    if clashes.is_empty() {
        return Ok(());
    }
    Err(PolarsError::Duplicate(
        format!("input already has annotation columns: {}", clashes.join(", ")).into(),
    ))
}

/// Left-join the flat annotation table onto `input` by row position.
///
/// Every input row appears at least once; a row with `k` lines appears `k`
/// times, in line order. Helper columns are removed from the result. Input
/// columns sharing a name with an annotation column are an error.
pub fn merge_onto(input: &DataFrame, annotations: &DataFrame) -> PolarsResult<DataFrame> {
    let generated = annotations.get_column_names();
    ensure_no_clash(input, generated.iter().map(|name| name.as_str()))?;

    let height = input.height();
    let positions: Vec<u64> = (0..height as u64).collect();

    let mut keyed = input.clone();
    keyed.with_column(Column::new(ROW_INDEX.into(), positions))?;

    let merged = keyed
        .lazy()
        .join(
            annotations.clone().lazy(),
            [col(ROW_INDEX)],
            [col(ROW_INDEX)],
            JoinArgs::new(JoinType::Left),
        )
        .sort_by_exprs(
            [col(ROW_INDEX), col(LINE_INDEX)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    merged.drop(ROW_INDEX)?.drop(LINE_INDEX)
}
