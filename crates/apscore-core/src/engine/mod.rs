//! # Engine Module
//!
//! The pipeline stages that turn compound embeddings into antimicrobial potential
//! scores, together with the configuration, error and progress types they share.
//!
//! ## Overview
//!
//! Every stage is a plain function over owned or borrowed tables. Stages run once per
//! batch, synchronously and in a fixed order:
//!
//! 1. **Encoding** ([`encoder`]) - closes the strain panel and fits its one-hot vocabulary
//! 2. **Assembly** ([`assembler`]) - cross-joins embeddings with strain vectors
//! 3. **Inference** ([`inference`]) - keeps the positive-class probability of every pair
//! 4. **Annotation** ([`gram`]) - tags pairs with the Gram stain of their strain
//! 5. **Aggregation** ([`aggregate`]) - log2 geometric-mean scores and inhibition counts
//! 6. **Shaping** ([`shaper`]) - the wide result table in input order
//!
//! Any failure aborts the batch; there is no partial success.

pub mod aggregate;
pub mod assembler;
pub mod config;
pub mod encoder;
pub mod error;
pub mod gram;
pub mod inference;
pub mod progress;
pub mod shaper;
