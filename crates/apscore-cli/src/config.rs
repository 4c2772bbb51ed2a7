mod defaults;

use crate::cli::{ArtifactArgs, PredictArgs};
use crate::error::{CliError, Result};
use crate::utils::parser;
use apscore::core::representation::Device;
use apscore::engine::config as core_config;
use defaults::DefaultsConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialInputConfig {
    embedded: Option<bool>,
    smiles_column: Option<String>,
    id_column: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialArtifactConfig {
    root: Option<PathBuf>,
    embedding_model: Option<PathBuf>,
    classifier: Option<PathBuf>,
    strain_table: Option<PathBuf>,
    gram_table: Option<PathBuf>,
    gram_table_skip_rows: Option<Vec<usize>>,
    gram_index_column: Option<String>,
    gram_label_column: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialScoringConfig {
    aggregate_scores: Option<bool>,
    app_threshold: Option<f64>,
    min_nkill: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialRuntimeConfig {
    device: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialPredictConfig {
    input: Option<PartialInputConfig>,
    artifacts: Option<PartialArtifactConfig>,
    scoring: Option<PartialScoringConfig>,
    runtime: Option<PartialRuntimeConfig>,
}

impl PartialPredictConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named by `--config`, or starts from an empty configuration.
    pub fn load(args: &ArtifactArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, args: &PredictArgs) -> Result<core_config::PredictorConfig> {
        self.apply_set_values(&args.artifacts.set_values)?;

        let input = self.input.take().unwrap_or_default();
        let scoring = self.scoring.take().unwrap_or_default();
        let runtime = self.runtime.take().unwrap_or_default();

        let mode = if args.embedded_input || input.embedded.unwrap_or(false) {
            core_config::InputMode::Embedded
        } else {
            core_config::InputMode::Smiles
        };

        let mut builder = self
            .merge_artifacts(&args.artifacts)
            .input_mode(mode)
            .aggregate_scores(args.aggregate_scores || scoring.aggregate_scores.unwrap_or(false));

        if let Some(name) = args.smiles_column.clone().or(input.smiles_column) {
            builder = builder.smiles_column(name);
        }
        if let Some(name) = args.id_column.clone().or(input.id_column) {
            builder = builder.id_column(name);
        }
        if let Some(threshold) = scoring.app_threshold {
            builder = builder.app_threshold(threshold);
        }
        if let Some(n) = scoring.min_nkill {
            builder = builder.min_nkill(n);
        }
        if let Some(device) = args.device.as_ref().or(runtime.device.as_ref()) {
            let device = Device::from_str(device).map_err(|e| CliError::Argument(e.to_string()))?;
            builder = builder.device(device);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    /// Resolves only what listing the strain panel needs: no embedding model is loaded.
    pub fn merge_for_panel(mut self, args: &ArtifactArgs) -> Result<core_config::PredictorConfig> {
        self.apply_set_values(&args.set_values)?;
        self.merge_artifacts(args)
            .input_mode(core_config::InputMode::Embedded)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_artifacts(&mut self, args: &ArtifactArgs) -> core_config::PredictorConfigBuilder {
        let defaults = DefaultsConfig::default();
        let file = self.artifacts.take().unwrap_or_default();
        let root = args
            .artifacts_dir
            .clone()
            .or(file.root)
            .unwrap_or_else(|| defaults.artifacts_dir.clone());
        debug!("Resolving reference artifacts relative to {:?}", &root);

        let pick = |cli: &Option<PathBuf>, file: Option<PathBuf>, default: PathBuf| {
            cli.clone().or(file).unwrap_or(default)
        };

        let mut builder = core_config::PredictorConfigBuilder::new()
            .embedding_model_path(pick(
                &args.embedding_model,
                file.embedding_model,
                defaults.embedding_model(&root),
            ))
            .classifier_path(pick(
                &args.classifier,
                file.classifier,
                defaults.classifier(&root),
            ))
            .strain_table_path(pick(
                &args.strain_table,
                file.strain_table,
                defaults.strain_table(&root),
            ))
            .gram_table_path(pick(
                &args.gram_table,
                file.gram_table,
                defaults.gram_table(&root),
            ));

        if let Some(rows) = file.gram_table_skip_rows {
            builder = builder.gram_table_skip_rows(rows);
        }
        if let Some(name) = file.gram_index_column {
            builder = builder.gram_index_column(name);
        }
        if let Some(name) = file.gram_label_column {
            builder = builder.gram_label_column(name);
        }
        builder
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) =
                parser::parse_set_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

            match key {
                "input.embedded" => {
                    self.input.get_or_insert_with(Default::default).embedded =
                        Some(parse_value(key, value_str)?);
                }
                "input.smiles-column" => {
                    self.input.get_or_insert_with(Default::default).smiles_column =
                        Some(value_str.to_string());
                }
                "input.id-column" => {
                    self.input.get_or_insert_with(Default::default).id_column =
                        Some(value_str.to_string());
                }
                "artifacts.root" => {
                    self.artifacts.get_or_insert_with(Default::default).root =
                        Some(PathBuf::from(value_str));
                }
                "artifacts.embedding-model" => {
                    self.artifacts
                        .get_or_insert_with(Default::default)
                        .embedding_model = Some(PathBuf::from(value_str));
                }
                "artifacts.classifier" => {
                    self.artifacts.get_or_insert_with(Default::default).classifier =
                        Some(PathBuf::from(value_str));
                }
                "artifacts.strain-table" => {
                    self.artifacts.get_or_insert_with(Default::default).strain_table =
                        Some(PathBuf::from(value_str));
                }
                "artifacts.gram-table" => {
                    self.artifacts.get_or_insert_with(Default::default).gram_table =
                        Some(PathBuf::from(value_str));
                }
                "artifacts.gram-table-skip-rows" => {
                    let rows = parser::parse_row_list(value_str)
                        .map_err(|e| CliError::Config(e.to_string()))?;
                    self.artifacts
                        .get_or_insert_with(Default::default)
                        .gram_table_skip_rows = Some(rows);
                }
                "artifacts.gram-index-column" => {
                    self.artifacts
                        .get_or_insert_with(Default::default)
                        .gram_index_column = Some(value_str.to_string());
                }
                "artifacts.gram-label-column" => {
                    self.artifacts
                        .get_or_insert_with(Default::default)
                        .gram_label_column = Some(value_str.to_string());
                }
                "scoring.aggregate-scores" => {
                    self.scoring
                        .get_or_insert_with(Default::default)
                        .aggregate_scores = Some(parse_value(key, value_str)?);
                }
                "scoring.app-threshold" => {
                    self.scoring.get_or_insert_with(Default::default).app_threshold =
                        Some(parse_value(key, value_str)?);
                }
                "scoring.min-nkill" => {
                    self.scoring.get_or_insert_with(Default::default).min_nkill =
                        Some(parse_value(key, value_str)?);
                }
                "runtime.device" => {
                    self.runtime.get_or_insert_with(Default::default).device =
                        Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn predict_args(extra: &[&str]) -> PredictArgs {
        let mut args = vec!["apscore", "predict", "in.csv", "out.csv"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Predict(args) => args,
            _ => panic!("Expected 'predict' subcommand"),
        }
    }

    #[test]
    fn defaults_resolve_artifacts_under_default_root() {
        let config = PartialPredictConfig::default()
            .merge_with_cli(&predict_args(&[]))
            .unwrap();

        assert_eq!(config.input.mode, core_config::InputMode::Smiles);
        assert_eq!(config.input.smiles_column, "input");
        assert_eq!(
            config.artifacts.embedding_model_path,
            Some(PathBuf::from("checkpoints"))
        );
        assert_eq!(
            config.artifacts.classifier_path,
            PathBuf::from("checkpoints/MolE-XGBoost.json")
        );
        assert_eq!(
            config.artifacts.strain_table_path,
            PathBuf::from("checkpoints/maier_screening_results.tsv.gz")
        );
        assert!(!config.scoring.aggregate_scores);
        assert_eq!(config.device, Device::Auto);
    }

    #[test]
    fn file_values_are_merged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("apscore.toml");
        fs::write(
            &path,
            r#"
        [input]
        smiles-column = "smiles"

        [artifacts]
        root = "/data/apscore"
        gram-table = "/elsewhere/strains.tsv"
        gram-table-skip-rows = [0, 1]

        [scoring]
        aggregate-scores = true
        min-nkill = 4

        [runtime]
        device = "cpu"
        "#,
        )
        .unwrap();

        let config = PartialPredictConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&predict_args(&[]))
            .unwrap();

        assert_eq!(config.input.smiles_column, "smiles");
        assert_eq!(
            config.artifacts.classifier_path,
            PathBuf::from("/data/apscore/MolE-XGBoost.json")
        );
        assert_eq!(
            config.artifacts.gram_table_path,
            PathBuf::from("/elsewhere/strains.tsv")
        );
        assert_eq!(config.artifacts.gram_table_skip_rows, vec![0, 1]);
        assert!(config.scoring.aggregate_scores);
        assert_eq!(config.scoring.min_nkill, 4);
        assert_eq!(config.device, Device::Cpu);
    }

    #[test]
    fn cli_flags_override_set_values_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("apscore.toml");
        fs::write(
            &path,
            r#"
        [input]
        id-column = "file_id"

        [runtime]
        device = "cpu"
        "#,
        )
        .unwrap();

        let args = predict_args(&[
            "--config",
            path.to_str().unwrap(),
            "--id-column",
            "cli_id",
            "--device",
            "cuda:1",
            "-S",
            "input.id-column=set_id",
            "-S",
            "scoring.app-threshold=0.2",
        ]);
        let config = PartialPredictConfig::load(&args.artifacts)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(config.input.id_column, "cli_id");
        assert_eq!(config.device, Device::Cuda(1));
        assert_eq!(config.scoring.app_threshold, 0.2);
    }

    #[test]
    fn set_values_override_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("apscore.toml");
        fs::write(&path, "[scoring]\nmin-nkill = 4\n").unwrap();

        let args = predict_args(&[
            "-S",
            "scoring.min-nkill=7",
            "-S",
            "artifacts.gram-table-skip-rows=0,2-4",
        ]);
        let config = PartialPredictConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(config.scoring.min_nkill, 7);
        assert_eq!(config.artifacts.gram_table_skip_rows, vec![0, 2, 3, 4]);
    }

    #[test]
    fn embedded_flag_switches_input_mode() {
        let config = PartialPredictConfig::default()
            .merge_with_cli(&predict_args(&["--embedded-input"]))
            .unwrap();
        assert_eq!(config.input.mode, core_config::InputMode::Embedded);
    }

    #[test]
    fn unknown_set_key_is_rejected() {
        let result = PartialPredictConfig::default()
            .merge_with_cli(&predict_args(&["-S", "scoring.speed=fast"]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("scoring.speed")));
    }

    #[test]
    fn invalid_set_value_is_rejected() {
        let result = PartialPredictConfig::default()
            .merge_with_cli(&predict_args(&["-S", "scoring.min-nkill=many"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_device_is_an_argument_error() {
        let result = PartialPredictConfig::default()
            .merge_with_cli(&predict_args(&["--device", "tpu"]));
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn out_of_range_threshold_is_a_config_error() {
        let result = PartialPredictConfig::default()
            .merge_with_cli(&predict_args(&["-S", "scoring.app-threshold=2.0"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_file_section_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("apscore.toml");
        fs::write(&path, "[optimization]\nnum-solutions = 3\n").unwrap();
        let result = PartialPredictConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
