//! Business logic services.

pub mod analysis;

pub use analysis::{AnalysisService, AnalysisSettings, Directories};
