//! Pipeline module - loading, preprocessing, evaluation and output

pub mod correlation;
pub mod cross_validation;
pub mod elimination;
pub mod error;
pub mod frame;
pub mod loader;
pub mod outliers;
pub mod preprocess;
pub mod random;
pub mod writer;

pub use correlation::*;
pub use cross_validation::*;
pub use elimination::*;
pub use error::{PipelineError, Result};
pub use frame::{ColumnMask, Table, TableView};
pub use loader::*;
pub use outliers::*;
pub use preprocess::*;
pub use random::RandomSource;
pub use writer::*;
