//! Request handlers.

pub mod analysis;
pub mod health;
pub mod page;
pub mod report;

pub use analysis::*;
pub use health::*;
pub use page::*;
pub use report::*;
