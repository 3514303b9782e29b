// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! Cluster member nodes.

use std::collections::BTreeSet;

use spindle_core::{
    AccessContext, AccessError, AccessType, NodeName, ObjectProtection, PropertyError, PropertyMap,
    ResourceName,
};

/// A cluster member.
///
/// Property and resource reads take the caller's [`AccessContext`] and
/// require [`AccessType::View`] on the node, mirroring the live registries
/// this snapshot is built from. Code that has already admitted a node to a
/// selection run must treat a denial on these reads as state divergence,
/// not as a normal filter outcome.
#[derive(Debug, Clone)]
pub struct Node {
    name: NodeName,
    props: PropertyMap,
    resources: BTreeSet<ResourceName>,
    protection: ObjectProtection,
}

impl Node {
    /// Create a node with no properties, no resources and an empty ACL.
    #[must_use]
    pub fn new(name: NodeName) -> Self {
        Self {
            name,
            props: PropertyMap::new(),
            resources: BTreeSet::new(),
            protection: ObjectProtection::new(),
        }
    }

    /// Builder: set a property.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PropertyError> {
        self.props.set(key, value)?;
        Ok(self)
    }

    /// Builder: replace the node's protection.
    #[must_use]
    pub fn with_protection(mut self, protection: ObjectProtection) -> Self {
        self.protection = protection;
        self
    }

    /// The node's name.
    #[must_use]
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// The node's access-control list.
    #[must_use]
    pub fn protection(&self) -> &ObjectProtection {
        &self.protection
    }

    /// Mutable access to the node's ACL, for the owning registry.
    pub fn protection_mut(&mut self) -> &mut ObjectProtection {
        &mut self.protection
    }

    /// The node's property bag. Requires View.
    pub fn properties(&self, ctx: &AccessContext) -> Result<&PropertyMap, AccessError> {
        self.protection.require_access(ctx, AccessType::View)?;
        Ok(&self.props)
    }

    /// Mutable access to the property bag, for the owning registry.
    pub fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.props
    }

    /// Names of the resources deployed on this node. Requires View.
    pub fn resources(&self, ctx: &AccessContext) -> Result<&BTreeSet<ResourceName>, AccessError> {
        self.protection.require_access(ctx, AccessType::View)?;
        Ok(&self.resources)
    }

    pub(crate) fn register_resource(&mut self, resource: ResourceName) -> bool {
        self.resources.insert(resource)
    }

    pub(crate) fn hosts(&self, resource: &ResourceName) -> bool {
        self.resources.contains(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> Node {
        Node::new(NodeName::new(name).unwrap())
    }

    #[test]
    fn test_builder_sets_properties() {
        let node = node("n1").with_property("site", "eu").unwrap();
        let ctx = AccessContext::system();
        assert_eq!(node.properties(&ctx).unwrap().get("site").unwrap(), Some("eu"));
    }

    #[test]
    fn test_reads_require_view() {
        let node = node("n1").with_protection(
            ObjectProtection::new().with_grant("bob", AccessType::View),
        );
        let bob = AccessContext::user("bob");
        let eve = AccessContext::user("eve");

        assert!(node.properties(&bob).is_ok());
        assert!(node.resources(&bob).is_ok());
        assert!(node.properties(&eve).is_err());
        assert!(node.resources(&eve).is_err());
    }

    #[test]
    fn test_register_resource() {
        let mut node = node("n1");
        let rsc = ResourceName::new("data").unwrap();
        assert!(node.register_resource(rsc.clone()));
        assert!(!node.register_resource(rsc.clone()));
        assert!(node.hosts(&rsc));
    }
}
