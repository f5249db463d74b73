mod region_balancer;
mod stratified_splitter;

pub use region_balancer::{
    balance_by_region, label_and_balance, label_regions, BalanceOutcome, BalanceSummary,
    LabeledTable,
};
pub use stratified_splitter::{
    allocate_proportionally, shuffle_rows, split_dataset, stratified_split, SplitOutcome,
};
