// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! Resource definitions.

use serde::{Deserialize, Serialize};
use spindle_core::{ResourceName, VolumeNumber};

/// Size and slot of one volume of a resource definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDefinition {
    /// The volume's slot within the resource.
    pub number: VolumeNumber,
    /// The volume's size in bytes.
    pub size: u64,
}

/// A named resource with its volume definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    name: ResourceName,
    volumes: Vec<VolumeDefinition>,
}

impl ResourceDefinition {
    /// Create a resource definition with no volumes.
    #[must_use]
    pub fn new(name: ResourceName) -> Self {
        Self {
            name,
            volumes: Vec::new(),
        }
    }

    /// Builder: append a volume of `size` bytes at the next free slot.
    #[must_use]
    pub fn with_volume(mut self, size: u64) -> Self {
        let number = VolumeNumber(self.volumes.len() as u32);
        self.volumes.push(VolumeDefinition { number, size });
        self
    }

    /// The resource's name.
    #[must_use]
    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    /// The resource's volume definitions in slot order.
    #[must_use]
    pub fn volumes(&self) -> &[VolumeDefinition] {
        &self.volumes
    }

    /// Gross size to place: the sum of all volume sizes.
    ///
    /// Placement requests for the whole resource pass this as the required
    /// free space.
    #[must_use]
    pub fn size_sum(&self) -> u64 {
        self.volumes
            .iter()
            .fold(0u64, |acc, vlm| acc.saturating_add(vlm.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_numbering() {
        let def = ResourceDefinition::new(ResourceName::new("data").unwrap())
            .with_volume(100)
            .with_volume(200);
        assert_eq!(def.volumes().len(), 2);
        assert_eq!(def.volumes()[0].number, VolumeNumber(0));
        assert_eq!(def.volumes()[1].number, VolumeNumber(1));
    }

    #[test]
    fn test_size_sum() {
        let def = ResourceDefinition::new(ResourceName::new("data").unwrap())
            .with_volume(100)
            .with_volume(200);
        assert_eq!(def.size_sum(), 300);

        let empty = ResourceDefinition::new(ResourceName::new("empty").unwrap());
        assert_eq!(empty.size_sum(), 0);
    }

    #[test]
    fn test_size_sum_saturates() {
        let def = ResourceDefinition::new(ResourceName::new("big").unwrap())
            .with_volume(u64::MAX)
            .with_volume(1);
        assert_eq!(def.size_sum(), u64::MAX);
    }
}
