// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! Error types for topology registry operations.

use spindle_core::{NodeName, ResourceName, StorPoolName};
use thiserror::Error;

/// Errors that can occur when mutating a [`ClusterView`](crate::ClusterView).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A node with this name is already registered.
    #[error("node `{0}` is already registered")]
    DuplicateNode(NodeName),

    /// A storage pool definition with this name is already registered.
    #[error("storage pool `{0}` is already registered")]
    DuplicatePool(StorPoolName),

    /// A resource definition with this name is already registered.
    #[error("resource definition `{0}` is already registered")]
    DuplicateResource(ResourceName),

    /// The pool already has an instance on the node.
    #[error("storage pool `{pool}` already has an instance on node `{node}`")]
    DuplicateInstance {
        /// The pool name.
        pool: StorPoolName,
        /// The node carrying the duplicate instance.
        node: NodeName,
    },

    /// The resource is already deployed on the node.
    #[error("resource `{resource}` is already deployed on node `{node}`")]
    AlreadyDeployed {
        /// The resource name.
        resource: ResourceName,
        /// The node in question.
        node: NodeName,
    },

    /// No node with this name is registered.
    #[error("unknown node `{0}`")]
    UnknownNode(NodeName),

    /// No storage pool definition with this name is registered.
    #[error("unknown storage pool `{0}`")]
    UnknownPool(StorPoolName),

    /// No resource definition with this name is registered.
    #[error("unknown resource definition `{0}`")]
    UnknownResource(ResourceName),

    /// The pool has no instance on the node.
    #[error("storage pool `{pool}` has no instance on node `{node}`")]
    UnknownInstance {
        /// The pool name.
        pool: StorPoolName,
        /// The node lacking the instance.
        node: NodeName,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let node = NodeName::new("node1").unwrap();
        let pool = StorPoolName::new("ssd").unwrap();
        let err = TopologyError::UnknownInstance {
            pool,
            node,
        };
        assert!(err.to_string().contains("ssd"));
        assert!(err.to_string().contains("node1"));
    }
}
