//! Readers and writers for the tables a prediction run consumes and produces.
//!
//! All inputs are delimited text, optionally gzip-compressed. Each table kind implements
//! [`traits::TableFile`], which takes care of opening the file, detecting compression and
//! picking the delimiter, so the individual readers only deal with their own layout.

pub mod compounds;
pub mod embeddings;
pub mod error;
pub mod results;
pub mod screening;
pub mod strain_info;
pub mod traits;
