mod budget_query;
pub use budget_query::*;
mod commands;
pub use commands::*;
mod cost_tree;
pub use cost_tree::*;
mod reward_multiset;
pub use reward_multiset::*;
mod workload;
pub use workload::*;

/// Key of the tree: the effort needed to collect a reward.
pub type Cost = i64;
/// Gold stored under a cost.
pub type Reward = i64;
