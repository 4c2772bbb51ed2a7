//! Molecular representations behind the [`Embedder`] capability.
//!
//! The embedding model itself is opaque to the pipeline. Two table-backed implementations
//! are provided: [`LookupEmbedder`], which serves vectors precomputed by the embedding
//! model and keyed by SMILES, and [`PrecomputedEmbeddings`], which wraps an embedding
//! table supplied as the run input.

use crate::core::io::embeddings::EmbeddingFile;
use crate::core::io::error::TableLoadError;
use crate::core::io::traits::TableFile;
use crate::core::models::compound::Compound;
use crate::core::models::ids::CompoundId;
use crate::core::models::matrix::{EmbeddingTable, MatrixError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// File holding the precomputed representations inside the embedding model directory.
pub const REPRESENTATION_FILE: &str = "representation.tsv";

const MAX_REPORTED_MISSING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Auto => f.write_str("auto"),
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid device '{0}'. Expected 'auto', 'cpu', 'cuda' or 'cuda:<N>'.")]
pub struct ParseDeviceError(pub String);

impl FromStr for Device {
    type Err = ParseDeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Device::Auto),
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|n| n.parse().ok())
                .map(Device::Cuda)
                .ok_or_else(|| ParseDeviceError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepresentationError {
    #[error("No representation available for {count} compound(s), e.g. {examples:?}")]
    Missing { count: usize, examples: Vec<String> },
    #[error("Compound '{0}' has no SMILES string to embed")]
    NoSmiles(CompoundId),
    #[error("Compound '{id}' is given as both '{first}' and '{second}'")]
    ConflictingSmiles {
        id: CompoundId,
        first: String,
        second: String,
    },
    #[error("Failed to load representations: {0}")]
    Load(#[from] TableLoadError),
    #[error("Malformed embedding output: {0}")]
    Shape(#[from] MatrixError),
}

/// Maps compounds to fixed-width embedding vectors.
pub trait Embedder {
    /// Returns one row per distinct compound id, in first-appearance order. A repeated
    /// id must describe the same compound each time.
    ///
    /// # Errors
    ///
    /// Fails as a whole if any compound cannot be embedded; partial tables are never
    /// returned.
    fn embed(&self, compounds: &[Compound]) -> Result<EmbeddingTable, RepresentationError>;
}

/// Serves representations precomputed by the embedding model, keyed by SMILES.
#[derive(Debug, Clone)]
pub struct LookupEmbedder {
    table: EmbeddingTable,
    index: HashMap<String, usize>,
    device: Device,
}

impl LookupEmbedder {
    pub fn new(table: EmbeddingTable, device: Device) -> Self {
        let index = table
            .ids()
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str().to_string(), i))
            .collect();
        Self {
            table,
            index,
            device,
        }
    }

    /// Loads `representation.tsv` from the embedding model directory.
    pub fn load(model_dir: &Path, device: Device) -> Result<Self, RepresentationError> {
        let path: PathBuf = model_dir.join(REPRESENTATION_FILE);
        let table = EmbeddingFile.read_from_path(&path)?;
        debug!(
            "Loaded {} precomputed representations of width {} (device: {}).",
            table.len(),
            table.dims(),
            device
        );
        Ok(Self::new(table, device))
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn dims(&self) -> usize {
        self.table.dims()
    }
}

impl Embedder for LookupEmbedder {
    fn embed(&self, compounds: &[Compound]) -> Result<EmbeddingTable, RepresentationError> {
        let mut seen: HashMap<&CompoundId, &str> = HashMap::new();
        let mut ids = Vec::new();
        let mut rows = Vec::new();
        let mut missing = Vec::new();
        for compound in compounds {
            let smiles = compound
                .smiles
                .as_deref()
                .ok_or_else(|| RepresentationError::NoSmiles(compound.id.clone()))?;
            if let Some(&first) = seen.get(&compound.id) {
                if first != smiles {
                    return Err(RepresentationError::ConflictingSmiles {
                        id: compound.id.clone(),
                        first: first.to_string(),
                        second: smiles.to_string(),
                    });
                }
                continue;
            }
            seen.insert(&compound.id, smiles);
            match self.index.get(smiles) {
                Some(&row) => {
                    ids.push(compound.id.clone());
                    rows.push(row);
                }
                None => missing.push(smiles.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(missing_error(missing));
        }
        Ok(self.table.select(&rows)?.relabel(ids)?)
    }
}

/// An embedding table supplied directly as run input, keyed by compound id.
#[derive(Debug, Clone)]
pub struct PrecomputedEmbeddings {
    table: EmbeddingTable,
    index: HashMap<CompoundId, usize>,
}

impl PrecomputedEmbeddings {
    pub fn new(table: EmbeddingTable) -> Self {
        let index = table
            .ids()
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self { table, index }
    }

    /// The compounds of the table, in row order.
    pub fn compounds(&self) -> Vec<Compound> {
        self.table
            .ids()
            .iter()
            .map(|id| Compound::embedded(id.as_str()))
            .collect()
    }
}

impl Embedder for PrecomputedEmbeddings {
    fn embed(&self, compounds: &[Compound]) -> Result<EmbeddingTable, RepresentationError> {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        let mut missing = Vec::new();
        for compound in compounds {
            if !seen.insert(&compound.id) {
                continue;
            }
            match self.index.get(&compound.id) {
                Some(&row) => rows.push(row),
                None => missing.push(compound.id.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(missing_error(missing));
        }
        Ok(self.table.select(&rows)?)
    }
}

fn missing_error(missing: Vec<String>) -> RepresentationError {
    RepresentationError::Missing {
        count: missing.len(),
        examples: missing.into_iter().take(MAX_REPORTED_MISSING).collect(),
    }
}
