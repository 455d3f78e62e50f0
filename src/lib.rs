//! nextpoint: next-timepoint connectivity prediction
//!
//! Predicts a subject's brain-connectivity features at the next timepoint
//! from the current ones. Training data goes through correlation-based
//! feature reduction, per-feature significance elimination and
//! leave-one-out outlier rejection before a pluggable multi-output
//! regressor is fitted; k-fold cross-validation reruns the same pipeline
//! inside every fold.

pub mod cli;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod utils;
