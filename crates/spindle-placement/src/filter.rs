//! Placement constraints for one selection run.

use serde::{Deserialize, Serialize};
use spindle_core::{ResourceName, StorPoolName};
use spindle_topology::ClusterView;

/// Constraints for one placement selection run.
///
/// Plain data, immutable once handed to the selector. Nothing is validated
/// at construction time: property keys are checked where they are first
/// used, the anti-affinity regex where it is compiled, and a pinned pool
/// name that matches nothing simply produces an empty candidate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementFilter {
    /// Number of replicas to place.
    pub place_count: usize,

    /// Exact display name of the storage pool to place on, if pinned.
    pub storage_pool: Option<String>,

    /// Resources whose nodes must be avoided. Names match case-insensitively.
    pub do_not_place_with: Vec<String>,

    /// Regular expression extending [`do_not_place_with`](Self::do_not_place_with):
    /// every known resource definition whose name contains a match is
    /// avoided as well. Compiled case-insensitive with `.` matching newlines.
    pub do_not_place_with_regex: Option<String>,

    /// Property keys whose values must match across all chosen nodes,
    /// applied in order.
    pub replicas_on_same: Vec<String>,

    /// Property keys whose values must differ across all chosen nodes,
    /// applied in order.
    pub replicas_on_different: Vec<String>,
}

impl Default for PlacementFilter {
    fn default() -> Self {
        Self {
            place_count: 2,
            storage_pool: None,
            do_not_place_with: Vec::new(),
            do_not_place_with_regex: None,
            replicas_on_same: Vec::new(),
            replicas_on_different: Vec::new(),
        }
    }
}

impl PlacementFilter {
    /// Create a filter with the default replica count and no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the number of replicas to place.
    #[must_use]
    pub fn with_place_count(mut self, count: usize) -> Self {
        self.place_count = count;
        self
    }

    /// Builder: pin the selection to the pool with this display name.
    #[must_use]
    pub fn with_storage_pool(mut self, pool: impl Into<String>) -> Self {
        self.storage_pool = Some(pool.into());
        self
    }

    /// Builder: avoid every node hosting `resource`.
    #[must_use]
    pub fn avoiding(mut self, resource: impl Into<String>) -> Self {
        self.do_not_place_with.push(resource.into());
        self
    }

    /// Builder: avoid every resource whose name contains a match of `regex`.
    #[must_use]
    pub fn avoiding_pattern(mut self, regex: impl Into<String>) -> Self {
        self.do_not_place_with_regex = Some(regex.into());
        self
    }

    /// Builder: require equal values of `key` across the chosen nodes.
    #[must_use]
    pub fn with_replicas_on_same(mut self, key: impl Into<String>) -> Self {
        self.replicas_on_same.push(key.into());
        self
    }

    /// Builder: require distinct values of `key` across the chosen nodes.
    #[must_use]
    pub fn with_replicas_on_different(mut self, key: impl Into<String>) -> Self {
        self.replicas_on_different.push(key.into());
        self
    }

    /// Derive the filter for extending an already-deployed resource.
    ///
    /// Replicas the resource already holds count against
    /// [`place_count`](Self::place_count); the pool chosen by the first
    /// deployment stays pinned unless the filter pins one itself; and the
    /// resource's own name joins the anti-affinity list so the remaining
    /// replicas land on fresh nodes. Returns `None` when enough replicas
    /// are already placed.
    #[must_use]
    pub fn adjusted_for_deployed(
        &self,
        view: &ClusterView,
        resource: &ResourceName,
        deployed_pool: Option<&StorPoolName>,
    ) -> Option<PlacementFilter> {
        let already_placed = view.nodes_hosting(resource).len();
        if already_placed >= self.place_count {
            return None;
        }
        let mut adjusted = self.clone().avoiding(resource.as_str());
        adjusted.place_count = self.place_count - already_placed;
        if adjusted.storage_pool.is_none() {
            adjusted.storage_pool = deployed_pool.map(|pool| pool.as_str().to_owned());
        }
        Some(adjusted)
    }
}
