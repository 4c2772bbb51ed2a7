use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "APScore CLI - Predicts the antimicrobial potential of compounds against a panel of human gut bacterial strains.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every compound of an input table and write the result table.
    Predict(PredictArgs),
    /// List the strain panel together with the resolved Gram stain of every strain.
    Panel(PanelArgs),
}

/// Locations of the reference artifacts, shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct ArtifactArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the reference artifacts under their default file names.
    #[arg(long, value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Override the embedding model directory (must contain representation.tsv).
    #[arg(long, value_name = "DIR")]
    pub embedding_model: Option<PathBuf>,

    /// Override the tree ensemble classifier (JSON).
    #[arg(long, value_name = "PATH")]
    pub classifier: Option<PathBuf>,

    /// Override the strain screening table whose header defines the strain panel.
    #[arg(long, value_name = "PATH")]
    pub strain_table: Option<PathBuf>,

    /// Override the strain information table holding the Gram stain labels.
    #[arg(long, value_name = "PATH")]
    pub gram_table: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S scoring.min-nkill=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `predict` subcommand.
#[derive(Args, Debug)]
pub struct PredictArgs {
    // --- Core Arguments ---
    /// Input table: CSV/TSV with a SMILES column, or a TSV of precomputed embeddings.
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Path for the output CSV result table.
    #[arg(required = true, value_name = "OUTPUT")]
    pub output: PathBuf,

    // --- Input Overrides ---
    /// Treat the input as precomputed embeddings keyed by compound id.
    #[arg(long)]
    pub embedded_input: bool,

    /// Name of the column holding SMILES strings.
    #[arg(long, value_name = "NAME")]
    pub smiles_column: Option<String>,

    /// Name of the column holding chemical ids.
    #[arg(long, value_name = "NAME")]
    pub id_column: Option<String>,

    // --- Runtime and Scoring Overrides ---
    /// Device preference for the embedding model: auto, cpu, cuda or cuda:N.
    #[arg(long, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Add growth-inhibition counts and the broad-spectrum flag to the output.
    #[arg(long)]
    pub aggregate_scores: bool,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}

/// Arguments for the `panel` subcommand.
#[derive(Args, Debug)]
pub struct PanelArgs {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,
}
