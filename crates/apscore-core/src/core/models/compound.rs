use super::ids::CompoundId;

/// A compound as read from the input table.
///
/// In SMILES mode `smiles` is always set and `id` is either the explicit chemical id or
/// the SMILES string itself. Compounds read from a precomputed embedding table carry no
/// SMILES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub id: CompoundId,
    pub smiles: Option<String>,
}

impl Compound {
    pub fn from_smiles(smiles: impl Into<String>) -> Self {
        let smiles = smiles.into();
        Self {
            id: CompoundId::new(smiles.clone()),
            smiles: Some(smiles),
        }
    }

    pub fn with_id(id: impl Into<String>, smiles: impl Into<String>) -> Self {
        Self {
            id: CompoundId::new(id),
            smiles: Some(smiles.into()),
        }
    }

    pub fn embedded(id: impl Into<String>) -> Self {
        Self {
            id: CompoundId::new(id),
            smiles: None,
        }
    }
}
