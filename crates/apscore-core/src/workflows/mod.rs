//! # Workflows Module
//!
//! High-level entry points that run the complete scoring pipeline.
//!
//! ## Overview
//!
//! A workflow owns resource loading, stage ordering, progress reporting and output
//! writing, so callers only deal with a [`crate::engine::config::PredictorConfig`] and
//! file paths.
//!
//! - **Prediction Workflow** ([`predict`]) - reads an input table of SMILES strings or
//!   precomputed embeddings, scores every compound against the strain panel and writes
//!   the wide result table.

pub mod predict;
