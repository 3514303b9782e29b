// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! Storage pool definitions and their per-node instances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spindle_core::{
    AccessContext, AccessError, AccessType, NodeName, ObjectProtection, ResourceName, StorPoolName,
    VolumeNumber,
};

/// Reference to a volume placed in a storage-pool instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRef {
    /// The resource the volume belongs to.
    pub resource: ResourceName,
    /// The volume's slot within that resource.
    pub volume: VolumeNumber,
}

/// One storage pool on one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorPoolInstance {
    pool: StorPoolName,
    node: NodeName,
    free_space: Option<u64>,
    diskless: bool,
    volumes: Vec<VolumeRef>,
}

impl StorPoolInstance {
    /// Create an instance with unknown free space and backing storage.
    #[must_use]
    pub fn new(pool: StorPoolName, node: NodeName) -> Self {
        Self {
            pool,
            node,
            free_space: None,
            diskless: false,
            volumes: Vec::new(),
        }
    }

    /// Builder: set the reported free capacity in bytes.
    #[must_use]
    pub fn with_free_space(mut self, bytes: u64) -> Self {
        self.free_space = Some(bytes);
        self
    }

    /// Builder: mark the instance as diskless (no backing storage; protocol
    /// endpoint only).
    #[must_use]
    pub fn diskless(mut self) -> Self {
        self.diskless = true;
        self
    }

    /// The pool this instance belongs to.
    #[must_use]
    pub fn pool(&self) -> &StorPoolName {
        &self.pool
    }

    /// The node carrying this instance.
    #[must_use]
    pub fn node(&self) -> &NodeName {
        &self.node
    }

    /// Reported free capacity; `None` while the node is unreachable.
    #[must_use]
    pub fn free_space(&self) -> Option<u64> {
        self.free_space
    }

    /// Whether the instance has no backing storage.
    #[must_use]
    pub fn is_diskless(&self) -> bool {
        self.diskless
    }

    /// Volumes currently placed in this instance.
    #[must_use]
    pub fn volumes(&self) -> &[VolumeRef] {
        &self.volumes
    }

    /// Whether any volume of `resource` is placed in this instance.
    #[must_use]
    pub fn hosts_volume_of(&self, resource: &ResourceName) -> bool {
        self.volumes.iter().any(|vref| &vref.resource == resource)
    }

    pub(crate) fn set_free_space(&mut self, bytes: Option<u64>) {
        self.free_space = bytes;
    }

    pub(crate) fn add_volume(&mut self, vref: VolumeRef) {
        self.volumes.push(vref);
    }
}

/// A storage pool definition with its per-node instances.
#[derive(Debug, Clone)]
pub struct StorPoolDefinition {
    name: StorPoolName,
    protection: ObjectProtection,
    instances: BTreeMap<NodeName, StorPoolInstance>,
}

impl StorPoolDefinition {
    /// Create a definition with no instances and an empty ACL.
    #[must_use]
    pub fn new(name: StorPoolName) -> Self {
        Self {
            name,
            protection: ObjectProtection::new(),
            instances: BTreeMap::new(),
        }
    }

    /// Builder: replace the definition's protection.
    #[must_use]
    pub fn with_protection(mut self, protection: ObjectProtection) -> Self {
        self.protection = protection;
        self
    }

    /// The pool's name.
    #[must_use]
    pub fn name(&self) -> &StorPoolName {
        &self.name
    }

    /// The definition's access-control list.
    #[must_use]
    pub fn protection(&self) -> &ObjectProtection {
        &self.protection
    }

    /// Mutable access to the definition's ACL, for the owning registry.
    pub fn protection_mut(&mut self) -> &mut ObjectProtection {
        &mut self.protection
    }

    /// Iterate this pool's instances in node order. Requires View.
    pub fn instances(
        &self,
        ctx: &AccessContext,
    ) -> Result<impl Iterator<Item = &StorPoolInstance>, AccessError> {
        self.protection.require_access(ctx, AccessType::View)?;
        Ok(self.instances.values())
    }

    /// The instance on `node`, if any. Requires View.
    pub fn instance(
        &self,
        ctx: &AccessContext,
        node: &NodeName,
    ) -> Result<Option<&StorPoolInstance>, AccessError> {
        self.protection.require_access(ctx, AccessType::View)?;
        Ok(self.instances.get(node))
    }

    pub(crate) fn instance_map(&self) -> &BTreeMap<NodeName, StorPoolInstance> {
        &self.instances
    }

    pub(crate) fn instance_map_mut(&mut self) -> &mut BTreeMap<NodeName, StorPoolInstance> {
        &mut self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_name(name: &str) -> StorPoolName {
        StorPoolName::new(name).unwrap()
    }

    fn node_name(name: &str) -> NodeName {
        NodeName::new(name).unwrap()
    }

    #[test]
    fn test_instance_defaults() {
        let inst = StorPoolInstance::new(pool_name("ssd"), node_name("n1"));
        assert_eq!(inst.free_space(), None);
        assert!(!inst.is_diskless());
        assert!(inst.volumes().is_empty());
    }

    #[test]
    fn test_instance_builders() {
        let inst = StorPoolInstance::new(pool_name("ssd"), node_name("n1"))
            .with_free_space(1024)
            .diskless();
        assert_eq!(inst.free_space(), Some(1024));
        assert!(inst.is_diskless());
    }

    #[test]
    fn test_hosts_volume_of_is_case_insensitive() {
        let mut inst = StorPoolInstance::new(pool_name("ssd"), node_name("n1"));
        inst.add_volume(VolumeRef {
            resource: ResourceName::new("Data").unwrap(),
            volume: VolumeNumber(0),
        });
        assert!(inst.hosts_volume_of(&ResourceName::new("DATA").unwrap()));
        assert!(!inst.hosts_volume_of(&ResourceName::new("other").unwrap()));
    }

    #[test]
    fn test_instance_serde_round_trip() {
        let mut inst = StorPoolInstance::new(pool_name("ssd"), node_name("n1")).with_free_space(512);
        inst.add_volume(VolumeRef {
            resource: ResourceName::new("data").unwrap(),
            volume: VolumeNumber(0),
        });
        let json = serde_json::to_string(&inst).unwrap();
        let back: StorPoolInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pool(), inst.pool());
        assert_eq!(back.free_space(), Some(512));
        assert_eq!(back.volumes(), inst.volumes());
    }

    #[test]
    fn test_definition_gates_instance_reads() {
        let def = StorPoolDefinition::new(pool_name("ssd"))
            .with_protection(ObjectProtection::new().with_grant("bob", AccessType::View));
        assert!(def.instances(&AccessContext::user("bob")).is_ok());
        assert!(def.instances(&AccessContext::user("eve")).is_err());
    }
}
