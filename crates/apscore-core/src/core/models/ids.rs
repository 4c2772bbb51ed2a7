use std::fmt;

/// Separator used by the textual `"<compound> --- <strain>"` row labels.
///
/// Only used to render labels for humans; rows are keyed by [`PairKey`].
pub const LEGACY_PAIR_SEPARATOR: &str = " --- ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompoundId(String);

impl CompoundId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CompoundId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifies one row of the feature matrix: a compound paired with a strain.
///
/// `compound` indexes the rows of the embedding table the matrix was assembled from and
/// `strain` indexes the strain panel, so neither side ever has to be split back out of a
/// concatenated string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub compound: usize,
    pub strain: usize,
}

impl PairKey {
    pub fn new(compound: usize, strain: usize) -> Self {
        Self { compound, strain }
    }

    pub fn legacy_label(compound_id: &CompoundId, strain_name: &str) -> String {
        format!("{}{}{}", compound_id, LEGACY_PAIR_SEPARATOR, strain_name)
    }
}
