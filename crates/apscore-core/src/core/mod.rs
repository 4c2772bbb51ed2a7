//! # Core Module
//!
//! Fundamental building blocks of the antimicrobial potential pipeline.
//!
//! - **Data Models** ([`models`]) - Compounds, strains, Gram stains, pair keys, feature
//!   matrices, per-pair predictions and the final result table
//! - **File I/O** ([`io`]) - Readers for the input compound table, precomputed embeddings,
//!   the strain screening table and the strain information table, plus the result writer
//! - **Representation** ([`representation`]) - The `Embedder` capability and its
//!   table-backed implementations
//! - **Classification** ([`classifier`]) - The `Classifier` capability and the gradient
//!   boosted tree ensemble that serves as the default pretrained model

pub mod classifier;
pub mod io;
pub mod models;
pub mod representation;
