mod app_config;
mod region_map;

pub use app_config::{PipelineConfig, SplitConfig, UnmappedPolicy};
pub use region_map::RegionMap;
