use super::ids::PairKey;
use super::strain::GramStain;

/// Name of the positive-class probability produced for every (compound, strain) pair.
pub const PROBABILITY_COLUMN: &str = "antimicrobial_predictive_probability";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairPrediction {
    pub key: PairKey,
    pub probability: f64,
}

/// A pair prediction tagged with the Gram stain of its strain.
///
/// `gram_stain` is `None` when the strain's token has no entry in the strain
/// information table. Such rows still count toward `apscore_total`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedPrediction {
    pub key: PairKey,
    pub probability: f64,
    pub gram_stain: Option<GramStain>,
}

/// Log2 geometric-mean scores for one compound. Undefined scores are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateScores {
    pub total: f64,
    pub gram_positive: f64,
    pub gram_negative: f64,
}

impl AggregateScores {
    pub const COLUMNS: [&'static str; 3] =
        ["apscore_total", "apscore_gpositive", "apscore_gnegative"];

    pub fn to_array(self) -> [f64; 3] {
        [self.total, self.gram_positive, self.gram_negative]
    }
}

/// Number of strains whose probability reaches the growth-inhibition threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InhibitionCounts {
    pub total: usize,
    pub gram_positive: usize,
    pub gram_negative: usize,
    pub broad_spectrum: bool,
}

impl InhibitionCounts {
    pub const COLUMNS: [&'static str; 4] = [
        "ginhib_total",
        "ginhib_gpositive",
        "ginhib_gnegative",
        "broad_spectrum",
    ];

    pub fn to_array(self) -> [f64; 4] {
        [
            self.total as f64,
            self.gram_positive as f64,
            self.gram_negative as f64,
            if self.broad_spectrum { 1.0 } else { 0.0 },
        ]
    }
}
