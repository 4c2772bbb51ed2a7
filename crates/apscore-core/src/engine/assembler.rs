use super::encoder::StrainPanel;
use super::error::EngineError;
use crate::core::models::ids::PairKey;
use crate::core::models::matrix::{EmbeddingTable, FeatureMatrix};
use nalgebra::DMatrix;
use tracing::debug;

/// Cross-joins every compound embedding with every strain one-hot vector.
///
/// Rows are compound-major: the pair (compound `i`, strain `j`) lands on row
/// `i * panel.len() + j`. Columns are the embedding dimensions followed by the one-hot
/// block.
pub fn assemble(embeddings: &EmbeddingTable, panel: &StrainPanel) -> Result<FeatureMatrix, EngineError> {
    let n_compounds = embeddings.len();
    let n_strains = panel.len();
    let dims = embeddings.dims();
    let one_hot = panel.one_hot();

    let rows = n_compounds * n_strains;
    let cols = dims + one_hot.ncols();
    let source = embeddings.values();
    let values = DMatrix::from_fn(rows, cols, |r, c| {
        let (compound, strain) = (r / n_strains, r % n_strains);
        if c < dims {
            source[(compound, c)]
        } else {
            one_hot[(strain, c - dims)]
        }
    });
    let keys = (0..n_compounds)
        .flat_map(|compound| (0..n_strains).map(move |strain| PairKey::new(compound, strain)))
        .collect();

    let features = FeatureMatrix::new(keys, values, dims)
        .map_err(|e| EngineError::Internal(format!("cross join produced a malformed matrix: {}", e)))?;

    if features.nrows() != embeddings.len() * panel.len() {
        return Err(EngineError::Internal(format!(
            "cross join has {} rows, expected {} compounds x {} strains",
            features.nrows(),
            embeddings.len(),
            panel.len()
        )));
    }
    if features.ncols() != embeddings.dims() + one_hot.ncols() {
        return Err(EngineError::Internal(format!(
            "cross join has {} columns, expected {} embedding + {} one-hot",
            features.ncols(),
            embeddings.dims(),
            one_hot.ncols()
        )));
    }

    debug!(
        "Assembled feature matrix: {} rows x {} columns.",
        features.nrows(),
        features.ncols()
    );
    Ok(features)
}
