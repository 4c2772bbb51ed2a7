use crate::core::classifier::Classifier;
use crate::core::classifier::tree_ensemble::TreeEnsembleClassifier;
use crate::core::io::compounds::CompoundTable;
use crate::core::io::embeddings::EmbeddingFile;
use crate::core::io::error::TableLoadError;
use crate::core::io::results;
use crate::core::io::screening::ScreeningTable;
use crate::core::io::strain_info::{GramTable, StrainInfoTable};
use crate::core::io::traits::TableFile;
use crate::core::models::compound::Compound;
use crate::core::models::ids::CompoundId;
use crate::core::models::table::ResultTable;
use crate::core::representation::{Embedder, LookupEmbedder, PrecomputedEmbeddings};
use crate::engine::config::{ConfigError, InputMode, PredictorConfig};
use crate::engine::encoder::StrainPanel;
use crate::engine::error::EngineError;
use crate::engine::gram::{self, GramLabels};
use crate::engine::progress::{Progress, ProgressReporter, Stage};
use crate::engine::shaper::FeatureColumns;
use crate::engine::{aggregate, assembler, inference, shaper};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use tracing::{debug, info, instrument};

const INPUT_ORIGIN: &str = "input compounds";

/// The reference artifacts of a run, loaded once and held immutably.
///
/// A `Predictor` can score any number of batches; loading is the expensive part.
pub struct Predictor {
    config: PredictorConfig,
    panel: StrainPanel,
    features: FeatureColumns,
    gram_labels: GramLabels,
    classifier: Box<dyn Classifier>,
    embedder: Option<Box<dyn Embedder>>,
}

impl Predictor {
    /// Loads the strain panel, the Gram stain table, the classifier and (in SMILES mode)
    /// the embedding model named by `config`.
    pub fn load(config: PredictorConfig) -> Result<Self, EngineError> {
        let artifacts = &config.artifacts;

        let strain_names = ScreeningTable
            .read_from_path(&artifacts.strain_table_path)
            .map_err(|e| EngineError::model_load("strain screening table", e))?;
        let gram_table = StrainInfoTable {
            skip_rows: artifacts.gram_table_skip_rows.clone(),
            index_column: artifacts.gram_index_column.clone(),
            gram_column: artifacts.gram_label_column.clone(),
        }
        .read_from_path(&artifacts.gram_table_path)
        .map_err(|e| EngineError::model_load("strain information table", e))?;
        let classifier = TreeEnsembleClassifier::load(&artifacts.classifier_path)?;

        let embedder: Option<Box<dyn Embedder>> = match config.input.mode {
            InputMode::Smiles => {
                let model_dir = artifacts
                    .embedding_model_path
                    .as_deref()
                    .ok_or(ConfigError::MissingParameter("embedding_model_path"))?;
                let embedder = LookupEmbedder::load(model_dir, config.device)
                    .map_err(|e| EngineError::model_load("embedding model", e))?;
                Some(Box::new(embedder))
            }
            InputMode::Embedded => None,
        };

        info!(
            "Loaded {} strains, {} Gram stain entries and a {}-tree classifier.",
            strain_names.len(),
            gram_table.len(),
            classifier.num_trees()
        );
        Self::from_parts(config, strain_names, &gram_table, Box::new(classifier), embedder)
    }

    /// Builds a predictor from already loaded parts.
    ///
    /// Fails with `StrainParse` if a strain name carries no `(NT<digits>)` token.
    pub fn from_parts(
        config: PredictorConfig,
        strain_names: Vec<String>,
        gram_table: &GramTable,
        classifier: Box<dyn Classifier>,
        embedder: Option<Box<dyn Embedder>>,
    ) -> Result<Self, EngineError> {
        let panel = StrainPanel::fit(strain_names)?;
        let gram_labels = gram::resolve(&panel, gram_table)?;
        let features = FeatureColumns::for_panel(&panel)?;
        Ok(Self {
            config,
            panel,
            features,
            gram_labels,
            classifier,
            embedder,
        })
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn panel(&self) -> &StrainPanel {
        &self.panel
    }

    pub fn gram_labels(&self) -> &GramLabels {
        &self.gram_labels
    }

    /// Scores `compounds`, embedding them with `embedder`.
    ///
    /// The result has one row per entry of `compounds`, in the same order. Repeated ids
    /// are scored once and must all carry the same SMILES string.
    pub fn predict(
        &self,
        compounds: &[Compound],
        embedder: &dyn Embedder,
        reporter: &ProgressReporter,
    ) -> Result<ResultTable, EngineError> {
        check_consistent_ids(compounds)?;
        let embeddings = reporter.stage(Stage::Representation, || embedder.embed(compounds))?;
        info!(
            "Embedded {} distinct compound(s) into {} dimensions.",
            embeddings.len(),
            embeddings.dims()
        );

        let features = reporter.stage(Stage::Assembly, || {
            assembler::assemble(&embeddings, &self.panel)
        })?;

        let predictions = reporter.stage(Stage::Inference, || {
            inference::score(self.classifier.as_ref(), &features)
        })?;
        info!("Scored {} compound-strain pairs.", predictions.len());

        let annotated = reporter.stage(Stage::Annotation, || {
            gram::annotate(&predictions, &self.gram_labels)
        })?;

        let scoring = &self.config.scoring;
        let summaries = reporter.stage(Stage::Aggregation, || {
            aggregate::summarize(&annotated, self.panel.len(), scoring)
        })?;

        let table = reporter.stage(Stage::Shaping, || {
            shaper::shape(
                compounds,
                embeddings.ids(),
                &summaries,
                &self.features,
                scoring.aggregate_scores,
            )
        })?;
        debug!(
            "Result table has {} rows and {} columns.",
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }

    /// Reads the input file in the configured mode and scores it.
    pub fn predict_file(
        &self,
        input: &Path,
        reporter: &ProgressReporter,
    ) -> Result<ResultTable, EngineError> {
        match self.config.input.mode {
            InputMode::Smiles => {
                let compounds = CompoundTable::new(
                    self.config.input.smiles_column.as_str(),
                    self.config.input.id_column.as_str(),
                )
                .read_from_path(input)
                .map_err(EngineError::InputFormat)?;
                info!("Read {} compound(s) from {}.", compounds.len(), input.display());
                let embedder = self
                    .embedder
                    .as_deref()
                    .ok_or(ConfigError::MissingParameter("embedding_model_path"))?;
                self.predict(&compounds, embedder, reporter)
            }
            InputMode::Embedded => {
                let table = EmbeddingFile
                    .read_from_path(input)
                    .map_err(EngineError::InputFormat)?;
                info!(
                    "Read {} precomputed embedding(s) from {}.",
                    table.len(),
                    input.display()
                );
                let precomputed = PrecomputedEmbeddings::new(table);
                let compounds = precomputed.compounds();
                self.predict(&compounds, &precomputed, reporter)
            }
        }
    }

    /// Scores `input` and writes the result table to `output`.
    ///
    /// Nothing is written unless every stage succeeds.
    pub fn run(
        &self,
        input: &Path,
        output: &Path,
        reporter: &ProgressReporter,
    ) -> Result<ResultTable, EngineError> {
        let table = self.predict_file(input, reporter)?;
        results::write_to_path(&table, output)?;
        info!("Wrote {} row(s) to {}.", table.len(), output.display());
        Ok(table)
    }
}

/// Fails if one compound id is given with two different SMILES strings.
fn check_consistent_ids(compounds: &[Compound]) -> Result<(), EngineError> {
    let mut smiles_by_id: HashMap<&CompoundId, Option<&str>> =
        HashMap::with_capacity(compounds.len());
    for compound in compounds {
        let smiles = compound.smiles.as_deref();
        match smiles_by_id.entry(&compound.id) {
            Entry::Vacant(slot) => {
                slot.insert(smiles);
            }
            Entry::Occupied(slot) if *slot.get() != smiles => {
                return Err(EngineError::InputFormat(TableLoadError::ConflictingEntry {
                    path: INPUT_ORIGIN.to_string(),
                    entry: compound.id.to_string(),
                    first: slot.get().unwrap_or("<none>").to_string(),
                    second: smiles.unwrap_or("<none>").to_string(),
                }));
            }
            Entry::Occupied(_) => {}
        }
    }
    Ok(())
}

/// Loads the reference artifacts and runs one batch from `input` to `output`.
#[instrument(skip_all, name = "predict_workflow")]
pub fn run(
    config: PredictorConfig,
    input: &Path,
    output: &Path,
    reporter: &ProgressReporter,
) -> Result<ResultTable, EngineError> {
    info!("Starting prediction workflow for {}.", input.display());
    let predictor = reporter.stage(Stage::Loading, || Predictor::load(config))?;
    reporter.report(Progress::Message(format!(
        "{} strains in panel",
        predictor.panel().len()
    )));
    let table = predictor.run(input, output, reporter)?;
    info!("Prediction workflow complete.");
    Ok(table)
}
