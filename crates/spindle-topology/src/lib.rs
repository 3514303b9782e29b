// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (c) 2025 The Spindle Authors

//! Cluster topology model for the Spindle control plane.
//!
//! This crate provides the read-only view of the cluster that placement
//! decisions are computed against:
//! - [`Node`]: a cluster member with its property bag and hosted resources
//! - [`StorPoolDefinition`] / [`StorPoolInstance`]: a storage pool and its
//!   per-node instances with reported free space and hosted volumes
//! - [`ResourceDefinition`]: a named resource with its volume definitions
//! - [`ClusterView`]: the registry tying the above together, with a checked
//!   mutation API for the components that own the live state
//!
//! The selector only ever borrows a `ClusterView` immutably; whatever
//! locking or versioning discipline produced the snapshot is the owner's
//! concern. Capacity figures may be stale by the time a placement decision
//! is executed, so executors re-validate against live state.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod node;
pub mod pool;
pub mod resource;
pub mod view;

pub use error::TopologyError;
pub use node::Node;
pub use pool::{StorPoolDefinition, StorPoolInstance, VolumeRef};
pub use resource::{ResourceDefinition, VolumeDefinition};
pub use view::ClusterView;
