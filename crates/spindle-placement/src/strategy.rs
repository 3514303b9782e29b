//! Pluggable orderings for nodes within a bucket and for ranked candidates.

use std::cmp::Ordering;

use spindle_core::StorPoolName;
use spindle_topology::{ClusterView, Node};

use crate::candidate::Candidate;

/// Ordering applied to the nodes of a bucket before replicas are picked.
///
/// `Ordering::Less` sorts first, and the selector takes nodes from the
/// front, so "less" means "preferred".
pub trait NodeSelectionStrategy: Send + Sync {
    /// Compare two nodes competing for a replica on `pool`.
    fn compare_nodes(
        &self,
        view: &ClusterView,
        pool: &StorPoolName,
        a: &Node,
        b: &Node,
    ) -> Ordering;
}

/// Ordering applied to complete candidates; the first candidate after
/// sorting is the selection result.
pub trait CandidateSelectionStrategy: Send + Sync {
    /// Compare two candidates. `Ordering::Less` ranks `a` ahead of `b`.
    fn compare_candidates(&self, view: &ClusterView, a: &Candidate, b: &Candidate) -> Ordering;
}

/// Prefer whatever has the most free space left.
///
/// Nodes are ordered by free space on the bucket's pool, descending, with
/// node name breaking ties. Candidates are ordered by the free space of
/// their first node, descending, with the first node's name and then the
/// pool name breaking ties so equal clusters rank deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostRemainingSpace;

impl NodeSelectionStrategy for MostRemainingSpace {
    fn compare_nodes(
        &self,
        view: &ClusterView,
        pool: &StorPoolName,
        a: &Node,
        b: &Node,
    ) -> Ordering {
        let free_a = view.free_space(pool, a.name()).unwrap_or(0);
        let free_b = view.free_space(pool, b.name()).unwrap_or(0);
        free_b.cmp(&free_a).then_with(|| a.name().cmp(b.name()))
    }
}

impl CandidateSelectionStrategy for MostRemainingSpace {
    fn compare_candidates(&self, view: &ClusterView, a: &Candidate, b: &Candidate) -> Ordering {
        let free_a = head_free_space(view, a);
        let free_b = head_free_space(view, b);
        free_b
            .cmp(&free_a)
            .then_with(|| a.nodes.first().cmp(&b.nodes.first()))
            .then_with(|| a.storage_pool.cmp(&b.storage_pool))
    }
}

fn head_free_space(view: &ClusterView, candidate: &Candidate) -> u64 {
    candidate
        .nodes
        .first()
        .and_then(|node| view.free_space(&candidate.storage_pool, node))
        .unwrap_or(0)
}
