pub mod analysis;
pub mod dataset;

pub use analysis::*;
pub use dataset::*;
