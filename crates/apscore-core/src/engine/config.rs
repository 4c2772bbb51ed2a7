use crate::core::io::strain_info::{DEFAULT_GRAM_COLUMN, DEFAULT_INDEX_COLUMN, DEFAULT_SKIP_ROWS};
use crate::core::representation::Device;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SMILES_COLUMN: &str = "input";
pub const DEFAULT_ID_COLUMN: &str = "chem_id";
/// Probability at or above which a (compound, strain) pair counts as growth inhibition.
pub const DEFAULT_APP_THRESHOLD: f64 = 0.04374140128493309;
/// Minimum number of inhibited strains for a compound to be called broad spectrum.
pub const DEFAULT_MIN_NKILL: usize = 10;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// A table of SMILES strings, embedded by the representation model.
    #[default]
    Smiles,
    /// A tab-separated table of precomputed embeddings keyed by compound id.
    Embedded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputConfig {
    pub mode: InputMode,
    pub smiles_column: String,
    pub id_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactConfig {
    /// Directory of the embedding model. Required in SMILES mode only.
    pub embedding_model_path: Option<PathBuf>,
    pub classifier_path: PathBuf,
    pub strain_table_path: PathBuf,
    pub gram_table_path: PathBuf,
    pub gram_table_skip_rows: Vec<usize>,
    pub gram_index_column: String,
    pub gram_label_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Adds growth-inhibition counts and the broad-spectrum flag to the output.
    pub aggregate_scores: bool,
    pub app_threshold: f64,
    pub min_nkill: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            aggregate_scores: false,
            app_threshold: DEFAULT_APP_THRESHOLD,
            min_nkill: DEFAULT_MIN_NKILL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub input: InputConfig,
    pub artifacts: ArtifactConfig,
    pub scoring: ScoringConfig,
    pub device: Device,
}

#[derive(Default)]
pub struct PredictorConfigBuilder {
    input_mode: Option<InputMode>,
    smiles_column: Option<String>,
    id_column: Option<String>,
    embedding_model_path: Option<PathBuf>,
    classifier_path: Option<PathBuf>,
    strain_table_path: Option<PathBuf>,
    gram_table_path: Option<PathBuf>,
    gram_table_skip_rows: Option<Vec<usize>>,
    gram_index_column: Option<String>,
    gram_label_column: Option<String>,
    aggregate_scores: Option<bool>,
    app_threshold: Option<f64>,
    min_nkill: Option<usize>,
    device: Option<Device>,
}

impl PredictorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_mode(mut self, mode: InputMode) -> Self {
        self.input_mode = Some(mode);
        self
    }
    pub fn smiles_column(mut self, name: impl Into<String>) -> Self {
        self.smiles_column = Some(name.into());
        self
    }
    pub fn id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column = Some(name.into());
        self
    }
    pub fn embedding_model_path(mut self, path: PathBuf) -> Self {
        self.embedding_model_path = Some(path);
        self
    }
    pub fn classifier_path(mut self, path: PathBuf) -> Self {
        self.classifier_path = Some(path);
        self
    }
    pub fn strain_table_path(mut self, path: PathBuf) -> Self {
        self.strain_table_path = Some(path);
        self
    }
    pub fn gram_table_path(mut self, path: PathBuf) -> Self {
        self.gram_table_path = Some(path);
        self
    }
    pub fn gram_table_skip_rows(mut self, rows: Vec<usize>) -> Self {
        self.gram_table_skip_rows = Some(rows);
        self
    }
    pub fn gram_index_column(mut self, name: impl Into<String>) -> Self {
        self.gram_index_column = Some(name.into());
        self
    }
    pub fn gram_label_column(mut self, name: impl Into<String>) -> Self {
        self.gram_label_column = Some(name.into());
        self
    }
    pub fn aggregate_scores(mut self, enabled: bool) -> Self {
        self.aggregate_scores = Some(enabled);
        self
    }
    pub fn app_threshold(mut self, threshold: f64) -> Self {
        self.app_threshold = Some(threshold);
        self
    }
    pub fn min_nkill(mut self, n: usize) -> Self {
        self.min_nkill = Some(n);
        self
    }
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    pub fn build(self) -> Result<PredictorConfig, ConfigError> {
        let mode = self.input_mode.unwrap_or_default();
        if mode == InputMode::Smiles && self.embedding_model_path.is_none() {
            return Err(ConfigError::MissingParameter("embedding_model_path"));
        }

        let input = InputConfig {
            mode,
            smiles_column: non_empty(
                "smiles_column",
                self.smiles_column
                    .unwrap_or_else(|| DEFAULT_SMILES_COLUMN.to_string()),
            )?,
            id_column: non_empty(
                "id_column",
                self.id_column.unwrap_or_else(|| DEFAULT_ID_COLUMN.to_string()),
            )?,
        };

        let artifacts = ArtifactConfig {
            embedding_model_path: self.embedding_model_path,
            classifier_path: self
                .classifier_path
                .ok_or(ConfigError::MissingParameter("classifier_path"))?,
            strain_table_path: self
                .strain_table_path
                .ok_or(ConfigError::MissingParameter("strain_table_path"))?,
            gram_table_path: self
                .gram_table_path
                .ok_or(ConfigError::MissingParameter("gram_table_path"))?,
            gram_table_skip_rows: self
                .gram_table_skip_rows
                .unwrap_or_else(|| DEFAULT_SKIP_ROWS.to_vec()),
            gram_index_column: self
                .gram_index_column
                .unwrap_or_else(|| DEFAULT_INDEX_COLUMN.to_string()),
            gram_label_column: self
                .gram_label_column
                .unwrap_or_else(|| DEFAULT_GRAM_COLUMN.to_string()),
        };

        let defaults = ScoringConfig::default();
        let app_threshold = self.app_threshold.unwrap_or(defaults.app_threshold);
        if !(0.0..=1.0).contains(&app_threshold) {
            return Err(ConfigError::InvalidValue {
                name: "app_threshold",
                reason: format!("{} is not a probability", app_threshold),
            });
        }
        let scoring = ScoringConfig {
            aggregate_scores: self.aggregate_scores.unwrap_or(defaults.aggregate_scores),
            app_threshold,
            min_nkill: self.min_nkill.unwrap_or(defaults.min_nkill),
        };

        Ok(PredictorConfig {
            input,
            artifacts,
            scoring,
            device: self.device.unwrap_or_default(),
        })
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            name,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(value)
}
