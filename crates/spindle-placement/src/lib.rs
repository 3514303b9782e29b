//! Automatic resource placement for spindle clusters.
//!
//! This crate selects the storage pool and nodes a new replica set should
//! deploy on, given a snapshot of the cluster and the caller's access
//! context.
//!
//! # Overview
//!
//! A selection run is a fixed pipeline of narrowing stages:
//! - Scan for pool instances the caller may deploy on with enough free space
//! - Narrow to the pinned storage pool, if the filter names one
//! - Drop nodes (then, as a fallback, individual pool instances) that carry
//!   resources the filter keeps replicas away from
//! - Bucket each pool's nodes by property constraints and cut every bucket
//!   that can hold a full replica set down to a candidate
//! - Rank the candidates and pick the head
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │     ClusterView     │   nodes, pools, deployed resources
//! └──────────┬──────────┘
//!            │ snapshot + access context
//! ┌──────────┴──────────┐
//! │  eligibility scan   │   viewable pools, usable nodes, free space
//! ├─────────────────────┤
//! │  forced-pool filter │   optional exact pool pin
//! ├─────────────────────┤
//! │    anti-affinity    │   names + pattern, node level then instances
//! ├─────────────────────┤
//! │      bucketing      │   equal-value splits, distinct-value thinning
//! ├─────────────────────┤
//! │       ranking       │   strategy order, head wins
//! └──────────┬──────────┘
//!            │
//!        Candidate
//! ```
//!
//! The same snapshot serves any number of concurrent runs; the selector
//! never mutates it.
//!
//! # Usage
//!
//! ```
//! use spindle_core::{AccessContext, NodeName, StorPoolName};
//! use spindle_placement::{MostRemainingSpace, PlacementFilter, Selector};
//! use spindle_topology::{ClusterView, Node, StorPoolDefinition, StorPoolInstance};
//!
//! // Three nodes sharing one pool, with different amounts of free space.
//! let mut view = ClusterView::new();
//! let pool = StorPoolName::new("ssd").unwrap();
//! view.add_pool_definition(StorPoolDefinition::new(pool.clone())).unwrap();
//! for (name, free) in [("alpha", 80), ("beta", 120), ("gamma", 50)] {
//!     let node = NodeName::new(name).unwrap();
//!     view.add_node(Node::new(node.clone())).unwrap();
//!     view.add_instance(
//!         StorPoolInstance::new(pool.clone(), node).with_free_space(free),
//!     ).unwrap();
//! }
//!
//! // Place two 10-byte replicas wherever the most space is left.
//! let ctx = AccessContext::system();
//! let selector = Selector::new(&view, &ctx);
//! let best = selector.best_candidate(
//!     10,
//!     &PlacementFilter::default(),
//!     &MostRemainingSpace,
//!     &MostRemainingSpace,
//! ).unwrap();
//!
//! assert_eq!(best.storage_pool, pool);
//! assert_eq!(best.nodes[0].as_str(), "beta");
//! assert_eq!(best.nodes[1].as_str(), "alpha");
//! assert_eq!(best.capacity_after_deployment, 80);
//! ```

#![warn(missing_docs)]

pub mod bucket;
pub mod candidate;
pub mod error;
pub mod filter;
pub mod selector;
pub mod strategy;

mod affinity;

pub use bucket::BucketKey;
pub use candidate::Candidate;
pub use error::PlacementError;
pub use filter::PlacementFilter;
pub use selector::Selector;
pub use strategy::{CandidateSelectionStrategy, MostRemainingSpace, NodeSelectionStrategy};
