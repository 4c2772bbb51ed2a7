//! # APScore Core Library
//!
//! Predicts the antimicrobial potential of chemical compounds. Every compound is turned
//! into a learned embedding, cross-joined against a fixed panel of bacterial strains,
//! scored per (compound, strain) pair by a pretrained classifier, and summarized into
//! log2 geometric-mean potency scores split by Gram stain.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`CompoundId`, `PairKey`,
//!   `FeatureMatrix`, `ResultTable`), readers and writers for the reference artifacts, and
//!   the capability traits behind which the embedding generator and the classifier live.
//!
//! - **[`engine`]: The Pipeline Stages.** Strain panel encoding, cross-join feature
//!   assembly, classifier inference, Gram-stain annotation, aggregation and result shaping,
//!   together with configuration, errors and progress reporting.
//!
//! - **[`workflows`]: The Public API.** The `predict` workflow loads the reference
//!   artifacts once into a [`workflows::predict::Predictor`] and runs the full pipeline
//!   from an input file to a written result table.

pub mod core;
pub mod engine;
pub mod workflows;
