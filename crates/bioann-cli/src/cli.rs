//! CLI argument definitions for the ontology annotator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use bioann_client::{DEFAULT_SPARQL_ENDPOINT, ENDPOINT_ENV};
use bioann_core::{BatchPolicy, DEFAULT_TEXT_COLUMN};

#[derive(Parser)]
#[command(
    name = "bioann",
    version,
    about = "Annotate free-text table columns with biomedical ontology classes",
    long_about = "Annotate free-text table columns with biomedical ontology classes.\n\n\
                  Each text cell is sent to a BioPortal-style annotator; matched classes\n\
                  and their ancestry are resolved and flattened back onto the input rows.\n\
                  The API key is read from BIO_KEY (a .env file is honoured)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell text to appear in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Prefix pretty and compact log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Annotate a text column of a CSV file and write the flattened table.
    Annotate(AnnotateArgs),

    /// Annotate a single text and print a readable report.
    Lookup(LookupArgs),

    /// Run a SPARQL SELECT query and write the bindings as CSV.
    Sparql(SparqlArgs),
}

/// Where annotation requests are answered.
#[derive(Args)]
pub struct ServiceArgs {
    /// Annotator base URL.
    #[arg(long = "endpoint", env = ENDPOINT_ENV, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECONDS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Answer requests from a recorded JSON payload file instead of the network.
    #[arg(long = "replay", value_name = "FILE")]
    pub replay: Option<PathBuf>,
}

#[derive(Parser)]
pub struct AnnotateArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV file (default: <INPUT>.annotated.csv).
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Column holding the text to annotate.
    #[arg(long = "text-column", default_value = DEFAULT_TEXT_COLUMN)]
    pub text_column: String,

    /// Ontology code to annotate against.
    #[arg(long = "ontology", value_name = "CODE")]
    pub ontology: String,

    /// What to do when an annotation request fails.
    #[arg(long = "on-error", value_enum, default_value = "fail-fast")]
    pub policy: PolicyArg,

    /// Expand short identifiers in these output columns to OBO PURLs.
    #[arg(long = "obo-prefix", value_name = "COLUMN")]
    pub obo_prefix: Vec<String>,

    /// Do not show the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Text to annotate.
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Ontology code to annotate against.
    #[arg(long = "ontology", value_name = "CODE")]
    pub ontology: String,

    /// Skip class-detail and ancestry lookups.
    #[arg(long = "no-classes")]
    pub no_classes: bool,

    #[command(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser)]
pub struct SparqlArgs {
    /// File holding the SPARQL query.
    #[arg(long = "query-file", value_name = "FILE")]
    pub query_file: PathBuf,

    /// SPARQL endpoint URL.
    #[arg(long = "endpoint", default_value = DEFAULT_SPARQL_ENDPOINT, value_name = "URL")]
    pub endpoint: String,

    /// Output CSV file (prints a table when omitted).
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Expand short identifiers in these columns to OBO PURLs.
    #[arg(long = "obo-prefix", value_name = "COLUMN")]
    pub obo_prefix: Vec<String>,

    /// Request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECONDS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    FailFast,
    SkipRow,
}

impl From<PolicyArg> for BatchPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::FailFast => BatchPolicy::FailFast,
            PolicyArg::SkipRow => BatchPolicy::SkipRow,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
