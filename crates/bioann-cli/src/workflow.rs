//! Service construction and the file-level annotate and SPARQL workflows.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::info;

use bioann_client::{
    AnnotationService, BioPortalClient, ClientConfig, RecordedService, SparqlClient, open_query,
};
use bioann_core::{
    AnnotationPipeline, BatchProgress, PipelineOptions, PipelineOutput, augment, explode,
    normalize,
};
use bioann_ingest::{add_obo_prefix, read_annotation_input, records_to_frame, write_csv_table};
use bioann_model::{AnnotatedText, FlatAnnotationRow};

/// How to reach the annotation service.
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    /// Overrides `BIOPORTAL_URL`.
    pub endpoint: Option<String>,
    pub timeout: Duration,
    /// Replay recorded payloads instead of calling the network.
    pub replay: Option<PathBuf>,
}

/// Build the annotation service for a run.
///
/// A replay file takes precedence; otherwise the HTTP client is configured
/// from the environment, which must provide the API key.
pub fn build_service(settings: &ServiceSettings) -> Result<Box<dyn AnnotationService>> {
    if let Some(path) = &settings.replay {
        let service = RecordedService::from_file(path)
            .with_context(|| format!("load recording {}", path.display()))?;
        info!(path = %path.display(), "replaying recorded annotations");
        return Ok(Box::new(service));
    }

    let mut config = ClientConfig::from_env().context("configure annotator client")?;
    if let Some(endpoint) = &settings.endpoint {
        config = ClientConfig::new(endpoint.clone(), config.api_key().to_string())
            .context("configure annotator endpoint")?;
    }
    let client = BioPortalClient::new(config.with_timeout(settings.timeout))
        .context("build annotator client")?;
    Ok(Box::new(client))
}

/// Inputs of [`annotate_csv`].
#[derive(Debug, Clone)]
pub struct AnnotateRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: PipelineOptions,
    /// Output columns rewritten to OBO PURLs before writing.
    pub obo_prefix: Vec<String>,
}

/// Default output path: `<stem>.annotated.csv` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}.annotated.csv"))
}

/// Read the input CSV, run the pipeline and write the flattened table.
pub fn annotate_csv(
    request: &AnnotateRequest,
    service: &dyn AnnotationService,
    progress: Option<Box<dyn Fn(BatchProgress)>>,
) -> Result<PipelineOutput> {
    let input = read_annotation_input(&request.input, &request.options.text_column)?;

    let mut pipeline = AnnotationPipeline::new(service, request.options.clone());
    if let Some(progress) = progress {
        pipeline = pipeline.with_progress(progress);
    }
    let mut output = pipeline
        .run(&input)
        .with_context(|| format!("annotate {}", request.input.display()))?;

    apply_obo_prefix(&mut output.frame, &request.obo_prefix)?;
    write_csv_table(&mut output.frame, &request.output)?;
    Ok(output)
}

/// Annotate one text and flatten its matches.
///
/// With `resolve_classes` unset no class-detail requests are made.
pub fn lookup_text(
    service: &dyn AnnotationService,
    text: &str,
    ontology: &str,
    resolve_classes: bool,
) -> Result<Vec<FlatAnnotationRow>> {
    let matches = service
        .annotate(text, ontology)
        .context("annotation request failed")?;
    let annotated = [AnnotatedText {
        row_index: 0,
        text: text.to_string(),
        matches,
    }];
    let lines = normalize(&explode(&annotated));
    if resolve_classes {
        return Ok(augment(lines, service));
    }
    Ok(lines
        .into_iter()
        .map(|line| FlatAnnotationRow {
            row_index: line.row_index,
            line_index: line.line_index,
            text: line.text,
            content: line.content,
            resolution: None,
        })
        .collect())
}

/// Run a SPARQL query file and return the bindings as a table.
pub fn sparql_frame(
    endpoint: &str,
    query_file: &Path,
    timeout: Duration,
    obo_prefix: &[String],
) -> Result<DataFrame> {
    let query =
        open_query(query_file).with_context(|| format!("read query {}", query_file.display()))?;
    let client = SparqlClient::new(endpoint, timeout).context("build SPARQL client")?;
    let results = client
        .query(&query)
        .with_context(|| format!("query {endpoint}"))?;
    let mut frame = records_to_frame(&results.vars, &results.rows)?;
    apply_obo_prefix(&mut frame, obo_prefix)?;
    Ok(frame)
}

fn apply_obo_prefix(frame: &mut DataFrame, columns: &[String]) -> Result<()> {
    for column in columns {
        add_obo_prefix(frame, column)?;
    }
    Ok(())
}
