//! Data types shared across the pipeline.

pub mod analysis;
pub mod config;
pub mod source;
