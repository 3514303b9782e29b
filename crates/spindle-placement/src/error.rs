//! Error types for placement selection.

use spindle_core::{AccessError, PropertyError};
use thiserror::Error;

fn not_enough_detail(place_count: &usize, size: &u64, storage_pool: &Option<String>) -> String {
    let pool_clause = match storage_pool {
        Some(pool) => format!(" named `{pool}`"),
        None => String::new(),
    };
    format!(
        "not enough free nodes to place {place_count} replicas: \
         each replica requires a deployed storage pool{pool_clause} reporting \
         at least {size} bytes of free space, and the caller must hold USE \
         access on the node and VIEW access on the storage pool"
    )
}

/// Errors produced by a placement selection run.
///
/// The first error anywhere in the pipeline aborts the whole run; a partial
/// candidate list is never returned.
#[derive(Debug, Error)]
pub enum PlacementError {
    /// No candidate satisfies all constraints. Raised only by ranking, after
    /// the candidate list is known to be empty, so the message always
    /// describes the full set of active constraints.
    #[error("{}", not_enough_detail(.place_count, .size, .storage_pool))]
    NotEnoughFreeNodes {
        /// Replicas the caller asked for.
        place_count: usize,
        /// Free space each chosen instance had to report, in bytes.
        size: u64,
        /// The pinned storage pool, if the filter named one.
        storage_pool: Option<String>,
    },

    /// A property key used in filtering or a property lookup is malformed.
    #[error(transparent)]
    InvalidPropertyKey(#[from] PropertyError),

    /// The anti-affinity regular expression does not compile.
    #[error("invalid anti-affinity pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// The underlying syntax error.
        #[source]
        source: regex::Error,
    },

    /// Topology or authorization state diverged while the selection was
    /// running: an object already admitted to the run stopped being
    /// readable. Not a user-correctable condition.
    #[error("cluster state diverged during selection: {detail}")]
    Consistency {
        /// What stopped being readable.
        detail: String,
    },
}

impl PlacementError {
    pub(crate) fn consistency(detail: impl Into<String>) -> Self {
        Self::Consistency {
            detail: detail.into(),
        }
    }

    pub(crate) fn denied(object: impl std::fmt::Display, source: &AccessError) -> Self {
        Self::consistency(format!("{source} on in-scope object {object}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_enough_free_nodes_names_constraints() {
        let err = PlacementError::NotEnoughFreeNodes {
            place_count: 3,
            size: 4096,
            storage_pool: Some("fast1".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 replicas"));
        assert!(msg.contains("4096"));
        assert!(msg.contains("`fast1`"));
        assert!(msg.contains("USE"));
    }

    #[test]
    fn test_not_enough_free_nodes_without_pinned_pool() {
        let err = PlacementError::NotEnoughFreeNodes {
            place_count: 2,
            size: 0,
            storage_pool: None,
        };
        assert!(!err.to_string().contains("named"));
    }

    #[test]
    fn test_invalid_property_key_is_transparent() {
        let mut props = spindle_core::PropertyMap::new();
        let err: PlacementError = props.set("bad/key", "v").unwrap_err().into();
        assert!(err.to_string().contains("bad/key"));
    }

    #[test]
    fn test_consistency_detail() {
        let err = PlacementError::consistency("node `n1` vanished");
        assert!(err.to_string().contains("diverged"));
        assert!(err.to_string().contains("n1"));
    }
}
