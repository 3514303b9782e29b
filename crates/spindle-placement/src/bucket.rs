//! Replica-placement bucketing over node properties.
//!
//! One pool group at a time, the selector splits nodes into buckets so
//! that every bucket satisfies the equal-value constraints, thins each
//! bucket down to one node per distinct value of the distinct-value
//! constraints, and turns every bucket still large enough into a
//! [`Candidate`].

use std::collections::{BTreeMap, HashSet};

use spindle_core::{AccessContext, StorPoolName};
use spindle_topology::{ClusterView, Node};

use crate::candidate::Candidate;
use crate::error::PlacementError;
use crate::filter::PlacementFilter;
use crate::strategy::NodeSelectionStrategy;

/// Composite bucket identity: one segment per equal-value constraint
/// applied so far, in constraint order.
///
/// A segment is `None` for nodes missing the property, so nodes without
/// a value share one bucket per parent but never mix with nodes holding
/// a real value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    values: Vec<Option<String>>,
}

impl BucketKey {
    /// The root key, before any constraint has been applied.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A child key with `value` recorded for the next constraint.
    #[must_use]
    pub fn extend(&self, value: Option<&str>) -> Self {
        let mut values = self.values.clone();
        values.push(value.map(str::to_owned));
        Self { values }
    }

    /// Number of constraint segments recorded so far.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.values.len()
    }
}

fn node_property<'v>(
    node: &'v Node,
    ctx: &AccessContext,
    key: &str,
) -> Result<Option<&'v str>, PlacementError> {
    let props = node
        .properties(ctx)
        .map_err(|err| PlacementError::denied(node.name(), &err))?;
    Ok(props.get(key)?)
}

/// Bucket the nodes of one pool group and build the group's candidates.
pub(crate) fn bucket_candidates<'v>(
    view: &'v ClusterView,
    ctx: &AccessContext,
    pool: &StorPoolName,
    nodes: Vec<&'v Node>,
    filter: &PlacementFilter,
    node_strategy: &dyn NodeSelectionStrategy,
) -> Result<Vec<Candidate>, PlacementError> {
    let mut buckets: BTreeMap<BucketKey, Vec<&Node>> = BTreeMap::new();
    buckets.insert(BucketKey::root(), nodes);

    for key in &filter.replicas_on_same {
        let mut split: BTreeMap<BucketKey, Vec<&Node>> = BTreeMap::new();
        for (parent, members) in buckets {
            for node in members {
                let value = node_property(node, ctx, key)?;
                split.entry(parent.extend(value)).or_default().push(node);
            }
        }
        buckets = split;
    }

    let mut candidates = Vec::new();
    for mut members in buckets.into_values() {
        members.sort_by(|a, b| node_strategy.compare_nodes(view, pool, a, b));

        for key in &filter.replicas_on_different {
            let mut seen: HashSet<Option<String>> = HashSet::new();
            let mut kept = Vec::with_capacity(members.len());
            for node in members {
                let value = node_property(node, ctx, key)?.map(str::to_owned);
                if seen.insert(value) {
                    kept.push(node);
                }
            }
            members = kept;
        }

        if members.len() < filter.place_count {
            continue;
        }
        members.truncate(filter.place_count);
        let capacity = members
            .iter()
            .map(|node| view.free_space(pool, node.name()).unwrap_or(0))
            .min()
            .unwrap_or(0);
        candidates.push(Candidate {
            storage_pool: pool.clone(),
            nodes: members
                .into_iter()
                .map(|node| node.name().clone())
                .collect(),
            capacity_after_deployment: capacity,
        });
    }
    Ok(candidates)
}
