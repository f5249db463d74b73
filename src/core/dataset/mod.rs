mod distribution;
mod split;
mod table;
mod tsv;

pub use distribution::RegionDistribution;
pub use split::DatasetSplit;
pub use table::{Record, Table, CONDITION_COLUMN, REGION_COLUMN};
pub use tsv::{read_tsv, stage_tsv, write_tsv, StagedTsv};
