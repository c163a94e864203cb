//! Human-readable report for a single annotated text.

use std::fmt::Write;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};

use bioann_model::{ClassLookup, FlatAnnotationRow, LineMatch};

const MISSING: &str = "-";

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn lookup_cells(lookup: &ClassLookup) -> [String; 3] {
    match lookup {
        ClassLookup::Resolved(detail) => [
            detail.id.clone(),
            detail.pref_label.clone().unwrap_or_else(|| MISSING.to_string()),
            detail.ontology().unwrap_or(MISSING).to_string(),
        ],
        ClassLookup::Unresolved { reason, .. } => [
            MISSING.to_string(),
            format!("unresolved: {reason}"),
            MISSING.to_string(),
        ],
    }
}

/// Render the lines of one text as a sequence of tables.
///
/// Lines without a resolution (class lookups skipped) show the class
/// reference only.
pub fn lookup_report(text: &str, rows: &[FlatAnnotationRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Text: {text}");

    for (n, row) in rows.iter().enumerate() {
        let annotation = match &row.content {
            LineMatch::NoMatches => {
                let _ = writeln!(out, "No matches.");
                continue;
            }
            LineMatch::Malformed { reason } => {
                let _ = writeln!(out, "\nMatch {}: malformed ({reason})", n + 1);
                continue;
            }
            LineMatch::Match(annotation) => annotation,
        };
        let _ = writeln!(out, "\nMatch {}: {}", n + 1, annotation.class_id());

        let mut class_table = new_table(vec!["Class", "Preferred label", "Ontology"]);
        match &row.resolution {
            Some(resolution) => {
                class_table.add_row(lookup_cells(&resolution.primary).to_vec());
            }
            None => {
                class_table.add_row(vec![annotation.class_id(), MISSING, MISSING]);
            }
        }
        let _ = writeln!(out, "{class_table}");

        if !annotation.annotations.is_empty() {
            let mut spans = new_table(vec!["From", "To", "Match type", "Text"]);
            for span in &annotation.annotations {
                spans.add_row(vec![
                    span.from.to_string(),
                    span.to.to_string(),
                    span.match_type.clone(),
                    span.text.clone().unwrap_or_else(|| MISSING.to_string()),
                ]);
            }
            let _ = writeln!(out, "{spans}");
        }

        if !annotation.hierarchy.is_empty() {
            let mut ancestry = new_table(vec!["Distance", "Class", "Preferred label", "Ontology"]);
            match &row.resolution {
                Some(resolution) => {
                    for ancestor in &resolution.ancestry {
                        let [id, label, ontology] = lookup_cells(&ancestor.detail);
                        let id = if ancestor.detail.is_resolved() {
                            id
                        } else {
                            ancestor.class_id.clone()
                        };
                        ancestry.add_row(vec![ancestor.distance.to_string(), id, label, ontology]);
                    }
                }
                None => {
                    for entry in &annotation.hierarchy {
                        ancestry.add_row(vec![
                            entry.distance.to_string(),
                            entry.annotated_class.id.clone(),
                            MISSING.to_string(),
                            MISSING.to_string(),
                        ]);
                    }
                }
            }
            let _ = writeln!(out, "Hierarchy\n{ancestry}");
        }
    }
    out
}
