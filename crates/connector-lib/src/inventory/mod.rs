//! Resource correlation and aggregation
//!
//! This module reduces the node inventory into a cluster summary, resolves
//! which nodes back each workload and classifies each workload's redundancy.

mod nodes;
mod placement;
mod redundancy;


pub use nodes::{
    aggregate_cpu_capacity, aggregate_memory_capacity, aggregate_nodes, label_sets,
    ClusterSummary,
};
pub use placement::{Placement, PlacementResolver};
pub use redundancy::{classify, Redundancy};
