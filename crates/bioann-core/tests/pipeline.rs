//! End-to-end runs of the annotation pipeline against recorded payloads.

use bioann_client::{RecordedService, ServiceCall};
use bioann_core::{
    AnnotationPipeline, BatchError, BatchPolicy, PipelineError, PipelineOptions, STATUS,
    ancestry_column, span_column,
};
use bioann_ingest::column_strings;
use bioann_model::ClassDetail;
use polars::prelude::*;
use serde_json::{Value, json};

fn detail(id: &str, label: &str) -> ClassDetail {
    serde_json::from_value(json!({"@id": id, "prefLabel": label, "links": {"ontology": "CHEBI"}}))
        .expect("class detail")
}

fn glucose_element() -> Value {
    json!({
        "annotatedClass": {"@id": "C1", "links": {"self": "u1"}},
        "annotations": [{"from": 1, "to": 7, "matchType": "PREF"}],
        "hierarchy": [{"annotatedClass": {"@id": "C2", "links": {"self": "u2"}}, "distance": 1}]
    })
}

fn element(class: &str, from: i64, to: i64) -> Value {
    json!({
        "annotatedClass": {"@id": class, "links": {"self": format!("u-{class}")}},
        "annotations": [{"from": from, "to": to, "matchType": "SYN"}]
    })
}

fn input(ids: &[i64], texts: &[Option<&str>]) -> DataFrame {
    DataFrame::new(vec![
        Column::new("id".into(), ids.to_vec()),
        Column::new("text".into(), texts.to_vec()),
    ])
    .expect("input frame")
}

fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    column_strings(df, name).unwrap_or_else(|| panic!("column {name} missing"))
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some((*v).to_string())).collect()
}

#[test]
fn glucose_example_flattens_to_one_row() {
    let service = RecordedService::default()
        .with_annotations("glucose", vec![glucose_element()])
        .with_class("u1", detail("C1", "Glucose"));
    let pipeline = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"));

    let output = pipeline.run(&input(&[1], &[Some("glucose")])).expect("run");
    let frame = &output.frame;

    assert_eq!(frame.height(), 1);
    assert_eq!(strings(frame, "id"), some(&["1"]));
    assert_eq!(strings(frame, "text"), some(&["glucose"]));
    assert_eq!(strings(frame, &span_column(0, "from")), some(&["1"]));
    assert_eq!(strings(frame, &span_column(0, "to")), some(&["7"]));
    assert_eq!(strings(frame, &span_column(0, "matchType")), some(&["PREF"]));
    assert_eq!(strings(frame, "class.@id"), some(&["C1"]));
    assert_eq!(strings(frame, "class.prefLabel"), some(&["Glucose"]));
    assert_eq!(strings(frame, &ancestry_column(0, "distance")), some(&["1"]));
    assert_eq!(strings(frame, &ancestry_column(0, "@id")), vec![None]);
    assert_eq!(strings(frame, &ancestry_column(0, "prefLabel")), vec![None]);

    assert_eq!(output.stats.matched_lines, 1);
    assert_eq!(output.stats.unresolved_lookups, 1);
}

#[test]
fn glucose_example_column_layout() {
    let service = RecordedService::default()
        .with_annotations("glucose", vec![glucose_element()])
        .with_class("u1", detail("C1", "Glucose"));
    let output = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&input(&[1], &[Some("glucose")]))
        .expect("run");

    let names: Vec<String> = output
        .frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    insta::assert_snapshot!(names.join("\n"), @r"
    id
    text
    annotatedClass.@id
    annotatedClass.links.self
    annotations.0.from
    annotations.0.to
    annotations.0.matchType
    annotations.0.text
    hierarchy.0.annotatedClass.@id
    hierarchy.0.distance
    class.@id
    class.prefLabel
    class.ontology
    ancestry.0.@id
    ancestry.0.prefLabel
    ancestry.0.ontology
    ancestry.0.distance
    annotation.status
    ");
}

#[test]
fn rows_expand_by_match_count_and_keep_zero_match_rows() {
    let service = RecordedService::default()
        .with_annotations("two", vec![element("A", 1, 3), element("B", 5, 9)])
        .with_annotations("one", vec![element("C", 2, 4)]);
    let output = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&input(&[1, 2, 3, 4], &[Some("two"), Some("none"), None, Some("one")]))
        .expect("run");

    let frame = &output.frame;
    assert_eq!(frame.height(), 5);
    assert_eq!(strings(frame, "id"), some(&["1", "1", "2", "3", "4"]));
    assert_eq!(
        strings(frame, STATUS),
        some(&["matched", "matched", "no_matches", "no_matches", "matched"])
    );
    assert_eq!(
        strings(frame, "annotatedClass.@id"),
        vec![Some("A".into()), Some("B".into()), None, None, Some("C".into())]
    );
    assert_eq!(
        strings(frame, &span_column(0, "from")),
        vec![Some("1".into()), Some("5".into()), None, None, Some("2".into())]
    );
    assert_eq!(
        strings(frame, &span_column(0, "to")),
        vec![Some("3".into()), Some("9".into()), None, None, Some("4".into())]
    );
    assert_eq!(strings(frame, "class.@id")[2], None);
    assert_eq!(output.stats.input_rows, 4);
    assert_eq!(output.stats.output_rows, 5);
    assert_eq!(output.stats.zero_match_rows, 2);
}

#[test]
fn duplicate_texts_are_annotated_per_row() {
    let service = RecordedService::default().with_annotations("glucose", vec![glucose_element()]);
    let output = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&input(&[1, 2], &[Some("glucose"), Some("glucose")]))
        .expect("run");

    assert_eq!(output.frame.height(), 2);
    assert_eq!(strings(&output.frame, "id"), some(&["1", "2"]));
}

#[test]
fn malformed_element_keeps_row_with_null_columns() {
    let service = RecordedService::default().with_annotations(
        "mixed",
        vec![json!({"annotations": []}), glucose_element()],
    );
    let output = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&input(&[1], &[Some("mixed")]))
        .expect("run");

    assert_eq!(strings(&output.frame, STATUS), some(&["malformed", "matched"]));
    assert_eq!(
        strings(&output.frame, "annotatedClass.@id"),
        vec![None, Some("C1".to_string())]
    );
    assert_eq!(output.stats.malformed_lines, 1);
}

#[test]
fn identical_responses_give_identical_frames() {
    let service = RecordedService::default()
        .with_annotations("glucose", vec![glucose_element(), glucose_element()])
        .with_class("u1", detail("C1", "Glucose"))
        .with_class("u2", detail("C2", "Hexose"));
    let table = input(&[1, 2, 3], &[Some("glucose"), None, Some("glucose")]);
    let pipeline = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"));

    let first = pipeline.run(&table).expect("first run");
    let second = pipeline.run(&table).expect("second run");
    assert!(first.frame.equals_missing(&second.frame));
    assert_eq!(first.rows, second.rows);
}

#[test]
fn custom_text_column_is_used() {
    let service = RecordedService::default().with_annotations("glucose", vec![glucose_element()]);
    let table = DataFrame::new(vec![Column::new("label".into(), vec!["glucose"])])
        .expect("input frame");
    let output = AnnotationPipeline::new(
        &service,
        PipelineOptions::new("CHEBI").with_text_column("label"),
    )
    .run(&table)
    .expect("run");
    assert_eq!(output.stats.matched_lines, 1);
}

#[test]
fn missing_text_column_is_an_error() {
    let service = RecordedService::default();
    let table = DataFrame::new(vec![Column::new("label".into(), vec!["glucose"])])
        .expect("input frame");
    let err = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&table)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Batch(BatchError::MissingTextColumn(ref name)) if name == "text"
    ));
    assert!(service.calls().is_empty());
}

#[test]
fn fail_fast_aborts_with_partial_results() {
    let service = RecordedService::default()
        .with_annotations("glucose", vec![glucose_element()])
        .with_failing_text("insulin");
    let err = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&input(&[1, 2, 3], &[Some("glucose"), Some("insulin"), Some("glucose")]))
        .unwrap_err();

    let PipelineError::Batch(batch) = err else {
        panic!("expected batch error");
    };
    assert_eq!(batch.completed().len(), 1);
    assert_eq!(batch.completed()[0].row_index, 0);
    let annotate_calls = service
        .calls()
        .into_iter()
        .filter(|call| matches!(call, ServiceCall::Annotate { .. }))
        .count();
    assert_eq!(annotate_calls, 2);
}

#[test]
fn skip_row_keeps_failed_row_with_null_columns() {
    let service = RecordedService::default()
        .with_annotations("glucose", vec![glucose_element()])
        .with_failing_text("insulin");
    let output = AnnotationPipeline::new(
        &service,
        PipelineOptions::new("CHEBI").with_policy(BatchPolicy::SkipRow),
    )
    .run(&input(&[1, 2, 3], &[Some("glucose"), Some("insulin"), Some("glucose")]))
    .expect("run");

    assert_eq!(output.frame.height(), 3);
    assert_eq!(strings(&output.frame, STATUS), some(&["matched", "no_matches", "matched"]));
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].row_index, 1);
    assert_eq!(output.stats.skipped_rows, 1);
    assert_eq!(output.stats.zero_match_rows, 0);
    assert_eq!(output.stats.matched_lines, 2);
}

#[test]
fn progress_is_reported_for_every_row() {
    use std::cell::Cell;
    use std::rc::Rc;

    let service = RecordedService::default();
    let seen = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&seen);
    let pipeline = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .with_progress(move |p| counter.set(p.completed));

    pipeline
        .run(&input(&[1, 2, 3], &[Some("a"), Some("b"), Some("c")]))
        .expect("run");
    assert_eq!(seen.get(), 3);
}

#[test]
fn padded_cell_is_sent_and_kept_verbatim() {
    let service = RecordedService::default();
    let output = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&input(&[1], &[Some("  glucose level ")]))
        .expect("run");

    assert_eq!(
        service.calls(),
        vec![ServiceCall::Annotate {
            text: "  glucose level ".to_string(),
            ontology: "CHEBI".to_string(),
        }]
    );
    assert_eq!(output.rows[0].text, "  glucose level ");
    assert_eq!(strings(&output.frame, "text"), some(&["  glucose level "]));
}

#[test]
fn input_column_named_like_annotation_column_is_rejected() {
    let service = RecordedService::default().with_annotations("glucose", vec![glucose_element()]);
    let table = DataFrame::new(vec![
        Column::new("text".into(), vec!["glucose"]),
        Column::new(STATUS.into(), vec!["reviewed"]),
    ])
    .expect("input frame");

    let err = AnnotationPipeline::new(&service, PipelineOptions::new("CHEBI"))
        .run(&table)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Frame(PolarsError::Duplicate(_))), "{err}");
    assert!(err.to_string().contains(STATUS), "{err}");
    assert!(service.calls().is_empty());
}
