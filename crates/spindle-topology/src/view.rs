// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! The cluster topology registry.

use std::collections::BTreeMap;

use spindle_core::{NodeName, ResourceName, StorPoolName};

use crate::error::TopologyError;
use crate::node::Node;
use crate::pool::{StorPoolDefinition, StorPoolInstance, VolumeRef};
use crate::resource::ResourceDefinition;

/// A materialized, self-consistent view of the cluster.
///
/// The mutation API checks referential integrity: instances can only be
/// added for registered pools and nodes, deployments only for registered
/// resources. All maps iterate in name order, so any computation over an
/// unchanged view is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ClusterView {
    nodes: BTreeMap<NodeName, Node>,
    pools: BTreeMap<StorPoolName, StorPoolDefinition>,
    resources: BTreeMap<ResourceName, ResourceDefinition>,
}

impl ClusterView {
    /// Create an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node.
    pub fn add_node(&mut self, node: Node) -> Result<(), TopologyError> {
        if self.nodes.contains_key(node.name()) {
            return Err(TopologyError::DuplicateNode(node.name().clone()));
        }
        self.nodes.insert(node.name().clone(), node);
        Ok(())
    }

    /// Register a storage pool definition.
    pub fn add_pool_definition(&mut self, def: StorPoolDefinition) -> Result<(), TopologyError> {
        if self.pools.contains_key(def.name()) {
            return Err(TopologyError::DuplicatePool(def.name().clone()));
        }
        self.pools.insert(def.name().clone(), def);
        Ok(())
    }

    /// Register a resource definition.
    pub fn add_resource_definition(
        &mut self,
        def: ResourceDefinition,
    ) -> Result<(), TopologyError> {
        if self.resources.contains_key(def.name()) {
            return Err(TopologyError::DuplicateResource(def.name().clone()));
        }
        self.resources.insert(def.name().clone(), def);
        Ok(())
    }

    /// Register a storage-pool instance under its pool definition.
    ///
    /// The instance's pool and node must both be registered already.
    pub fn add_instance(&mut self, instance: StorPoolInstance) -> Result<(), TopologyError> {
        if !self.nodes.contains_key(instance.node()) {
            return Err(TopologyError::UnknownNode(instance.node().clone()));
        }
        let def = self
            .pools
            .get_mut(instance.pool())
            .ok_or_else(|| TopologyError::UnknownPool(instance.pool().clone()))?;
        if def.instance_map().contains_key(instance.node()) {
            return Err(TopologyError::DuplicateInstance {
                pool: instance.pool().clone(),
                node: instance.node().clone(),
            });
        }
        def.instance_map_mut()
            .insert(instance.node().clone(), instance);
        Ok(())
    }

    /// Record `resource` as deployed on each of `nodes`, backed by `pool`.
    ///
    /// Registers the resource name on every node and appends one volume
    /// reference per volume definition to the node's instance of `pool`,
    /// keeping the node-level and instance-level views consistent. All
    /// references are validated before anything is written.
    pub fn deploy_resource(
        &mut self,
        resource: &ResourceName,
        pool: &StorPoolName,
        nodes: &[NodeName],
    ) -> Result<(), TopologyError> {
        let def = self
            .resources
            .get(resource)
            .ok_or_else(|| TopologyError::UnknownResource(resource.clone()))?;
        let volume_numbers: Vec<_> = def.volumes().iter().map(|vlm| vlm.number).collect();

        let pool_def = self
            .pools
            .get(pool)
            .ok_or_else(|| TopologyError::UnknownPool(pool.clone()))?;
        let mut seen = std::collections::BTreeSet::new();
        for node_name in nodes {
            let node = self
                .nodes
                .get(node_name)
                .ok_or_else(|| TopologyError::UnknownNode(node_name.clone()))?;
            if node.hosts(resource) || !seen.insert(node_name) {
                return Err(TopologyError::AlreadyDeployed {
                    resource: resource.clone(),
                    node: node_name.clone(),
                });
            }
            if !pool_def.instance_map().contains_key(node_name) {
                return Err(TopologyError::UnknownInstance {
                    pool: pool.clone(),
                    node: node_name.clone(),
                });
            }
        }

        for node_name in nodes {
            if let Some(node) = self.nodes.get_mut(node_name) {
                node.register_resource(resource.clone());
            }
            if let Some(instance) = self
                .pools
                .get_mut(pool)
                .and_then(|def| def.instance_map_mut().get_mut(node_name))
            {
                for number in &volume_numbers {
                    instance.add_volume(VolumeRef {
                        resource: resource.clone(),
                        volume: *number,
                    });
                }
            }
        }
        Ok(())
    }

    /// Update the reported free space of `pool`'s instance on `node`.
    pub fn update_free_space(
        &mut self,
        pool: &StorPoolName,
        node: &NodeName,
        bytes: Option<u64>,
    ) -> Result<(), TopologyError> {
        let def = self
            .pools
            .get_mut(pool)
            .ok_or_else(|| TopologyError::UnknownPool(pool.clone()))?;
        let instance = def
            .instance_map_mut()
            .get_mut(node)
            .ok_or_else(|| TopologyError::UnknownInstance {
                pool: pool.clone(),
                node: node.clone(),
            })?;
        instance.set_free_space(bytes);
        Ok(())
    }

    /// The node registered under `name`, if any.
    #[must_use]
    pub fn node(&self, name: &NodeName) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Mutable access to a registered node, for the owning components.
    pub fn node_mut(&mut self, name: &NodeName) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    /// Iterate nodes in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// The pool definition registered under `name`, if any.
    #[must_use]
    pub fn pool_definition(&self, name: &StorPoolName) -> Option<&StorPoolDefinition> {
        self.pools.get(name)
    }

    /// Iterate pool definitions in name order.
    pub fn pool_definitions(&self) -> impl Iterator<Item = &StorPoolDefinition> {
        self.pools.values()
    }

    /// The resource definition registered under `name`, if any.
    #[must_use]
    pub fn resource_definition(&self, name: &ResourceName) -> Option<&ResourceDefinition> {
        self.resources.get(name)
    }

    /// Iterate resource definitions in name order.
    pub fn resource_definitions(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.values()
    }

    /// The instance of `pool` on `node`, bypassing the definition's ACL.
    ///
    /// Authorization is enforced where pools are admitted into a
    /// computation ([`StorPoolDefinition::instances`]); this is the
    /// registry-level lookup for objects already in scope.
    #[must_use]
    pub fn instance(&self, pool: &StorPoolName, node: &NodeName) -> Option<&StorPoolInstance> {
        self.pools
            .get(pool)
            .and_then(|def| def.instance_map().get(node))
    }

    /// Free space of `pool`'s instance on `node`; `None` when the instance
    /// is absent or its capacity is unknown.
    #[must_use]
    pub fn free_space(&self, pool: &StorPoolName, node: &NodeName) -> Option<u64> {
        self.instance(pool, node).and_then(StorPoolInstance::free_space)
    }

    /// Nodes hosting `resource`, in name order.
    #[must_use]
    pub fn nodes_hosting(&self, resource: &ResourceName) -> Vec<&NodeName> {
        self.nodes
            .values()
            .filter(|node| node.hosts(resource))
            .map(Node::name)
            .collect()
    }
}
