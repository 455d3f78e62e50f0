//! Report module - metrics, terminal summaries and JSON export

pub mod export;
pub mod metrics;
pub mod summary;

pub use export::*;
pub use metrics::*;
pub use summary::*;
