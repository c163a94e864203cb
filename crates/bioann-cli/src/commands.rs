use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use bioann_cli::logging::redact_value;
use bioann_cli::report::lookup_report;
use bioann_cli::workflow::{
    AnnotateRequest, ServiceSettings, annotate_csv, build_service, default_output_path,
    lookup_text, sparql_frame,
};
use bioann_core::{BatchProgress, PipelineOptions, PipelineOutput};
use bioann_ingest::{any_to_string, write_csv_table};

use crate::cli::{AnnotateArgs, LookupArgs, ServiceArgs, SparqlArgs};
use crate::summary::{apply_table_style, print_summary};

fn service_settings(args: &ServiceArgs) -> ServiceSettings {
    ServiceSettings {
        endpoint: args.endpoint.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        replay: args.replay.clone(),
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows",
    )
    .context("progress bar template")?;
    bar.set_style(style.progress_chars("#>-"));
    Ok(bar)
}

pub fn run_annotate(args: &AnnotateArgs) -> Result<()> {
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    let span = info_span!("annotate_file", input = %args.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let service = build_service(&service_settings(&args.service))?;
    let request = AnnotateRequest {
        input: args.input.clone(),
        output: output_path.clone(),
        options: PipelineOptions::new(args.ontology.clone())
            .with_text_column(args.text_column.clone())
            .with_policy(args.policy.into()),
        obo_prefix: args.obo_prefix.clone(),
    };

    let bar = if args.no_progress || !io::stderr().is_terminal() {
        None
    } else {
        Some(progress_bar()?)
    };
    let progress = bar.clone().map(|bar| {
        Box::new(move |p: BatchProgress| {
            bar.set_length(p.total as u64);
            bar.set_position(p.completed as u64);
        }) as Box<dyn Fn(BatchProgress)>
    });

    let result = annotate_csv(&request, service.as_ref(), progress);
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let PipelineOutput {
        stats, failures, ..
    } = result?;

    info!(
        output = %output_path.display(),
        duration_ms = start.elapsed().as_millis(),
        "wrote annotated table"
    );
    print_summary(&output_path, &stats, &failures);
    Ok(())
}

pub fn run_lookup(args: &LookupArgs) -> Result<()> {
    let service = build_service(&service_settings(&args.service))?;
    debug!(text = redact_value(&args.text), ontology = %args.ontology, "lookup");
    let rows = lookup_text(service.as_ref(), &args.text, &args.ontology, !args.no_classes)?;
    print!("{}", lookup_report(&args.text, &rows));
    Ok(())
}

pub fn run_sparql(args: &SparqlArgs) -> Result<()> {
    let mut frame = sparql_frame(
        &args.endpoint,
        &args.query_file,
        Duration::from_secs(args.timeout_secs),
        &args.obo_prefix,
    )?;
    info!(rows = frame.height(), columns = frame.width(), "query complete");

    match &args.output {
        Some(path) => {
            write_csv_table(&mut frame, path)?;
            println!("Wrote {} rows to {}", frame.height(), path.display());
        }
        None => println!("{}", frame_table(&frame)),
    }
    Ok(())
}

fn frame_table(frame: &DataFrame) -> Table {
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    let columns = frame.get_columns();
    for idx in 0..frame.height() {
        let row: Vec<String> = columns
            .iter()
            .map(|column| column.get(idx).map(any_to_string).unwrap_or_default())
            .collect();
        table.add_row(row);
    }
    table
}
