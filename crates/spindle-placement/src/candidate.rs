//! Placement candidates produced by the selector.

use serde::{Deserialize, Serialize};
use spindle_core::{NodeName, StorPoolName};

/// A concrete deployment option: one storage pool and the nodes to place on.
///
/// All nodes of a candidate share the same storage pool; mixed-pool
/// placements are never produced. The node order is the order the
/// selection strategy ranked them in, so `nodes[0]` is the strategy's
/// preferred node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Storage pool every node deploys on.
    pub storage_pool: StorPoolName,

    /// Chosen nodes, exactly `place_count` of them, in strategy order.
    pub nodes: Vec<NodeName>,

    /// Worst-case free space across the chosen nodes' pool instances,
    /// with unknown free space counted as zero.
    pub capacity_after_deployment: u64,
}
