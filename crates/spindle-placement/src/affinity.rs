//! Anti-affinity: keeping new replicas off nodes that carry named resources.

use std::collections::BTreeSet;

use regex::RegexBuilder;
use spindle_core::AccessContext;
use spindle_topology::ClusterView;

use crate::error::PlacementError;
use crate::filter::PlacementFilter;
use crate::selector::{InstanceGroups, NodeGroups};

/// Expand the filter's anti-affinity constraints into the uppercase names
/// of every resource to keep away from.
///
/// The explicit list is taken as-is; the pattern is compiled
/// case-insensitive with `.` matching newlines and matched unanchored
/// against every known resource definition name, so `avoid` excludes
/// `avoidme` as well.
pub(crate) fn expand_exclusions(
    view: &ClusterView,
    filter: &PlacementFilter,
) -> Result<BTreeSet<String>, PlacementError> {
    let mut excluded: BTreeSet<String> = filter
        .do_not_place_with
        .iter()
        .map(|name| name.to_uppercase())
        .collect();
    if let Some(pattern) = &filter.do_not_place_with_regex {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|source| PlacementError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        for def in view.resource_definitions() {
            if regex.is_match(def.name().as_str()) {
                excluded.insert(def.name().as_upper().to_owned());
            }
        }
    }
    Ok(excluded)
}

/// Resolve each instance group to its nodes, dropping nodes that host an
/// excluded resource and groups that end up empty.
///
/// Instances are walked in ascending free-space order so that groups keep
/// a deterministic shape independent of map iteration details; the final
/// per-bucket order is the node strategy's business, not ours.
pub(crate) fn node_level_pass<'v>(
    view: &'v ClusterView,
    ctx: &AccessContext,
    groups: &InstanceGroups<'v>,
    excluded: &BTreeSet<String>,
) -> Result<NodeGroups<'v>, PlacementError> {
    let mut node_groups = NodeGroups::new();
    for (pool, instances) in groups {
        let mut instances = instances.clone();
        instances.sort_by_key(|instance| instance.free_space().unwrap_or(0));
        let mut nodes = Vec::with_capacity(instances.len());
        for instance in instances {
            let node = view.node(instance.node()).ok_or_else(|| {
                PlacementError::consistency(format!(
                    "node `{}` missing from the view",
                    instance.node()
                ))
            })?;
            let hosted = node
                .resources(ctx)
                .map_err(|err| PlacementError::denied(node.name(), &err))?;
            if hosted.iter().any(|name| excluded.contains(name.as_upper())) {
                continue;
            }
            nodes.push(node);
        }
        if !nodes.is_empty() {
            node_groups.insert(*pool, nodes);
        }
    }
    Ok(node_groups)
}

/// Drop the individual pool instances that hold a volume of an excluded
/// resource, keeping the rest of each group.
///
/// This is the fallback granularity: a node disqualified at node level
/// because one of its pools carries an excluded volume stays available
/// through its other pools.
pub(crate) fn drop_hosting_instances<'v>(
    groups: &InstanceGroups<'v>,
    excluded: &BTreeSet<String>,
) -> InstanceGroups<'v> {
    let mut kept = InstanceGroups::new();
    for (pool, instances) in groups {
        let remaining: Vec<_> = instances
            .iter()
            .copied()
            .filter(|instance| {
                instance
                    .volumes()
                    .iter()
                    .all(|vref| !excluded.contains(vref.resource.as_upper()))
            })
            .collect();
        if !remaining.is_empty() {
            kept.insert(*pool, remaining);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use spindle_core::{NodeName, ResourceName, StorPoolName};
    use spindle_topology::{Node, ResourceDefinition, StorPoolDefinition, StorPoolInstance};

    use super::*;

    fn exclusion_view(resources: &[&str]) -> ClusterView {
        let mut view = ClusterView::new();
        for name in resources {
            view.add_resource_definition(
                ResourceDefinition::new(ResourceName::new(*name).unwrap()).with_volume(1),
            )
            .unwrap();
        }
        view
    }

    #[test]
    fn test_explicit_names_are_uppercased() {
        let view = exclusion_view(&[]);
        let filter = PlacementFilter::new().avoiding("Shared0");
        let excluded = expand_exclusions(&view, &filter).unwrap();
        assert!(excluded.contains("SHARED0"));
    }

    #[test]
    fn test_pattern_matches_substrings_case_insensitively() {
        let view = exclusion_view(&["avoidme", "AvoidMeToo", "keeper"]);
        let filter = PlacementFilter::new().avoiding_pattern("avoid");
        let excluded = expand_exclusions(&view, &filter).unwrap();
        assert!(excluded.contains("AVOIDME"));
        assert!(excluded.contains("AVOIDMETOO"));
        assert!(!excluded.contains("KEEPER"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let view = exclusion_view(&[]);
        let filter = PlacementFilter::new().avoiding_pattern("avoid[");
        let err = expand_exclusions(&view, &filter).unwrap_err();
        assert!(matches!(err, PlacementError::InvalidPattern { .. }));
        assert!(err.to_string().contains("avoid["));
    }

    fn deployed_view() -> (ClusterView, StorPoolName) {
        let mut view = ClusterView::new();
        let pool = StorPoolName::new("ssd").unwrap();
        view.add_pool_definition(StorPoolDefinition::new(pool.clone()))
            .unwrap();
        for name in ["n1", "n2", "n3"] {
            let node = NodeName::new(name).unwrap();
            view.add_node(Node::new(node.clone())).unwrap();
            view.add_instance(StorPoolInstance::new(pool.clone(), node).with_free_space(100))
                .unwrap();
        }
        let shared = ResourceName::new("shared0").unwrap();
        view.add_resource_definition(ResourceDefinition::new(shared.clone()).with_volume(10))
            .unwrap();
        view.deploy_resource(&shared, &pool, &[NodeName::new("n2").unwrap()])
            .unwrap();
        (view, pool)
    }

    fn groups_of<'v>(view: &'v ClusterView, pool: &StorPoolName) -> InstanceGroups<'v> {
        let def = view.pool_definition(pool).unwrap();
        let mut groups = InstanceGroups::new();
        groups.insert(
            def.name(),
            def.instances(&AccessContext::system()).unwrap().collect(),
        );
        groups
    }

    #[test]
    fn test_node_level_pass_drops_hosting_nodes() {
        let (view, pool) = deployed_view();
        let groups = groups_of(&view, &pool);
        let excluded: BTreeSet<String> = ["SHARED0".to_string()].into_iter().collect();
        let node_groups =
            node_level_pass(&view, &AccessContext::system(), &groups, &excluded).unwrap();
        let nodes: Vec<&str> = node_groups[&pool].iter().map(|n| n.name().as_str()).collect();
        assert_eq!(nodes, vec!["n1", "n3"]);
    }

    #[test]
    fn test_node_level_pass_drops_empty_groups() {
        let (mut view, pool) = deployed_view();
        let shared = ResourceName::new("shared0").unwrap();
        view.deploy_resource(
            &shared,
            &pool,
            &[NodeName::new("n1").unwrap(), NodeName::new("n3").unwrap()],
        )
        .unwrap();
        let excluded: BTreeSet<String> = ["SHARED0".to_string()].into_iter().collect();
        let groups = groups_of(&view, &pool);
        let node_groups =
            node_level_pass(&view, &AccessContext::system(), &groups, &excluded).unwrap();
        assert!(node_groups.is_empty());
    }

    #[test]
    fn test_drop_hosting_instances_works_per_instance() {
        let (view, pool) = deployed_view();
        let groups = groups_of(&view, &pool);
        let excluded: BTreeSet<String> = ["SHARED0".to_string()].into_iter().collect();
        let thinned = drop_hosting_instances(&groups, &excluded);
        let nodes: Vec<&str> = thinned[&pool]
            .iter()
            .map(|instance| instance.node().as_str())
            .collect();
        assert_eq!(nodes, vec!["n1", "n3"]);
    }
}
