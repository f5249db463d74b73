//! Region balancing and stratified train/val/test splitting for tabular
//! datasets labeled with country codes.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;

pub use error::{PipelineError, Result};
