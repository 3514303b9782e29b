//! The automatic placement selector.
//!
//! One selection run walks a fixed pipeline: scan the snapshot for
//! eligible pool instances, narrow to the pinned pool if the filter names
//! one, clear anti-affinity, bucket each pool group by the property
//! constraints and rank the surviving candidates. Every stage only
//! narrows; nothing re-admits an instance a previous stage dropped.

use std::collections::{BTreeMap, BTreeSet};

use spindle_core::{AccessContext, AccessType, StorPoolName};
use spindle_topology::{ClusterView, Node, StorPoolInstance};
use tracing::{debug, info, warn};

use crate::affinity;
use crate::bucket;
use crate::candidate::Candidate;
use crate::error::PlacementError;
use crate::filter::PlacementFilter;
use crate::strategy::{CandidateSelectionStrategy, NodeSelectionStrategy};

/// Eligible pool instances, grouped by pool name.
pub(crate) type InstanceGroups<'v> = BTreeMap<&'v StorPoolName, Vec<&'v StorPoolInstance>>;

/// Nodes still in the running, grouped by pool name.
pub(crate) type NodeGroups<'v> = BTreeMap<&'v StorPoolName, Vec<&'v Node>>;

/// Automatic placement selection over one cluster snapshot.
///
/// The selector borrows the snapshot and the caller's access context for
/// the duration of a run and never mutates either, so concurrent runs can
/// share one view. Objects the caller may not see are silently skipped
/// during the scan; a denial on an object the scan already admitted is
/// reported as [`PlacementError::Consistency`].
#[derive(Debug, Clone, Copy)]
pub struct Selector<'v> {
    view: &'v ClusterView,
    ctx: &'v AccessContext,
}

impl<'v> Selector<'v> {
    /// Create a selector over `view` acting as `ctx`.
    #[must_use]
    pub fn new(view: &'v ClusterView, ctx: &'v AccessContext) -> Self {
        Self { view, ctx }
    }

    /// Scan the snapshot for pool instances a replica of `size` bytes
    /// could deploy on.
    ///
    /// Keeps instances that back their storage (not diskless), whose pool
    /// the caller may view, whose node the caller may use, and that report
    /// at least `size` bytes free. Unknown free space counts as zero, so
    /// unreachable nodes only pass for zero-sized requests.
    fn eligible_instances(&self, size: u64) -> Result<InstanceGroups<'v>, PlacementError> {
        let mut groups = InstanceGroups::new();
        for def in self.view.pool_definitions() {
            if !def.protection().allows(self.ctx, AccessType::View) {
                continue;
            }
            let instances = def
                .instances(self.ctx)
                .map_err(|err| PlacementError::denied(def.name(), &err))?;
            for instance in instances {
                if instance.is_diskless() {
                    continue;
                }
                let node = self.view.node(instance.node()).ok_or_else(|| {
                    PlacementError::consistency(format!(
                        "node `{}` missing from the view",
                        instance.node()
                    ))
                })?;
                if !node.protection().allows(self.ctx, AccessType::Use) {
                    continue;
                }
                if instance.free_space().unwrap_or(0) < size {
                    continue;
                }
                groups.entry(def.name()).or_default().push(instance);
            }
        }
        Ok(groups)
    }

    /// Narrow the groups to the pinned pool, if the filter names one.
    ///
    /// The name must match the pool's display name exactly; a name that
    /// matches nothing empties the run rather than failing it, so the
    /// caller sees the same "not enough nodes" outcome as for a known
    /// pool that is simply full.
    fn filter_forced_pool(groups: InstanceGroups<'v>, forced: Option<&str>) -> InstanceGroups<'v> {
        match forced {
            Some(name) => groups
                .into_iter()
                .filter(|(pool, _)| pool.as_str() == name)
                .collect(),
            None => groups,
        }
    }

    /// Clear anti-affinity, falling back to instance granularity when the
    /// node-level pass leaves nothing.
    fn apply_anti_affinity(
        &self,
        groups: &InstanceGroups<'v>,
        excluded: &BTreeSet<String>,
    ) -> Result<NodeGroups<'v>, PlacementError> {
        let node_groups = affinity::node_level_pass(self.view, self.ctx, groups, excluded)?;
        if node_groups.is_empty() && !excluded.is_empty() {
            warn!(
                excluded = excluded.len(),
                "no node clears anti-affinity, retrying against individual pool instances"
            );
            let thinned = affinity::drop_hosting_instances(groups, excluded);
            return affinity::node_level_pass(self.view, self.ctx, &thinned, &BTreeSet::new());
        }
        Ok(node_groups)
    }

    /// Compute every placement candidate for a replica set of `size` bytes
    /// under `filter`.
    ///
    /// The list is unranked; an empty list is an ordinary outcome, not an
    /// error.
    pub fn candidate_list(
        &self,
        size: u64,
        filter: &PlacementFilter,
        node_strategy: &dyn NodeSelectionStrategy,
    ) -> Result<Vec<Candidate>, PlacementError> {
        let groups = self.eligible_instances(size)?;
        debug!(
            pools = groups.len(),
            size, "storage pools pass the eligibility scan"
        );
        let groups = Self::filter_forced_pool(groups, filter.storage_pool.as_deref());
        let excluded = affinity::expand_exclusions(self.view, filter)?;
        let node_groups = self.apply_anti_affinity(&groups, &excluded)?;
        debug!(pools = node_groups.len(), "pool groups remain after anti-affinity");

        let mut candidates = Vec::new();
        for (pool, nodes) in node_groups {
            candidates.extend(bucket::bucket_candidates(
                self.view,
                self.ctx,
                pool,
                nodes,
                filter,
                node_strategy,
            )?);
        }
        Ok(candidates)
    }

    /// Compute the candidates and pick the best one.
    ///
    /// Fails with [`PlacementError::NotEnoughFreeNodes`] when no candidate
    /// satisfies all constraints.
    pub fn best_candidate(
        &self,
        size: u64,
        filter: &PlacementFilter,
        node_strategy: &dyn NodeSelectionStrategy,
        candidate_strategy: &dyn CandidateSelectionStrategy,
    ) -> Result<Candidate, PlacementError> {
        let mut candidates = self.candidate_list(size, filter, node_strategy)?;
        if candidates.is_empty() {
            return Err(PlacementError::NotEnoughFreeNodes {
                place_count: filter.place_count,
                size,
                storage_pool: filter.storage_pool.clone(),
            });
        }
        candidates.sort_by(|a, b| candidate_strategy.compare_candidates(self.view, a, b));
        let best = candidates.swap_remove(0);
        info!(
            pool = %best.storage_pool,
            nodes = ?best.nodes,
            capacity = best.capacity_after_deployment,
            "selected placement candidate"
        );
        Ok(best)
    }
}
