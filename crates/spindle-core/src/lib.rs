//! Core types for the Spindle storage control plane.
//!
//! This crate provides the fundamental building blocks used across all
//! Spindle components:
//! - Validated, case-insensitive cluster object names
//! - Flat property containers with checked keys
//! - The reduced role-based access-control model consumed by the
//!   placement selector

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod props;
pub mod types;

pub use access::{AccessContext, AccessError, AccessType, ObjectProtection};
pub use props::{PropertyError, PropertyMap, KEY_MAX_LENGTH};
pub use types::{
    InvalidNameError, NodeName, ResourceName, StorPoolName, VolumeNumber, NAME_MAX_LENGTH,
};
