//! # Core Models Module
//!
//! Data structures shared by every stage of the pipeline.
//!
//! - [`ids`] - Compound identifiers and the structured (compound, strain) pair key
//! - [`compound`] - Input compounds in their original order
//! - [`strain`] - Gram stain categories, the `NT` token grammar and feature-name normalization
//! - [`matrix`] - Embedding tables and the assembled feature matrix
//! - [`prediction`] - Per-pair probabilities and per-compound aggregate scores
//! - [`table`] - The wide result table written at the end of a run

pub mod compound;
pub mod ids;
pub mod matrix;
pub mod prediction;
pub mod strain;
pub mod table;
