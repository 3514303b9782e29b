//! Role-based access control, reduced to what the control plane's
//! decision-making code consumes.
//!
//! Objects carry an [`ObjectProtection`] (an ACL mapping role names to the
//! strongest [`AccessType`] granted). Callers carry an [`AccessContext`].
//! Code that scopes objects in or out uses [`ObjectProtection::query_access`]
//! and silently skips what the caller may not see; code operating on an
//! object already admitted to scope uses [`ObjectProtection::require_access`]
//! and treats a denial as a hard error.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Ordered access levels; each level implies all weaker ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessType {
    /// Inspect the object and its attributes.
    View,
    /// Use the object as a dependency of another operation.
    Use,
    /// Modify the object.
    Change,
    /// Full control, including ACL changes.
    Control,
}

impl AccessType {
    /// Whether this granted level satisfies `requested`.
    #[must_use]
    pub fn has_access(self, requested: AccessType) -> bool {
        self >= requested
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessType::View => "VIEW",
            AccessType::Use => "USE",
            AccessType::Change => "CHANGE",
            AccessType::Control => "CONTROL",
        };
        f.write_str(name)
    }
}

/// Caller identity for authorization checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    role: String,
    privileged: bool,
}

impl AccessContext {
    /// Privileged system context; bypasses ACL checks entirely.
    #[must_use]
    pub fn system() -> Self {
        Self {
            role: "SYSTEM".to_string(),
            privileged: true,
        }
    }

    /// Unprivileged context acting as `role`.
    #[must_use]
    pub fn user(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            privileged: false,
        }
    }

    /// The role this context acts as.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Whether ACL checks are bypassed.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}

/// Error returned when a required access level is not held.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("role `{role}` lacks {requested} access")]
pub struct AccessError {
    /// The denied role.
    pub role: String,
    /// The access level that was required.
    pub requested: AccessType,
}

/// Per-object access-control list.
#[derive(Debug, Clone, Default)]
pub struct ObjectProtection {
    acl: BTreeMap<String, AccessType>,
}

impl ObjectProtection {
    /// Create a protection granting nothing. Only privileged contexts pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `access` to `role`, replacing any earlier grant.
    pub fn grant(&mut self, role: impl Into<String>, access: AccessType) {
        self.acl.insert(role.into(), access);
    }

    /// Builder form of [`grant`](Self::grant).
    #[must_use]
    pub fn with_grant(mut self, role: impl Into<String>, access: AccessType) -> Self {
        self.grant(role, access);
        self
    }

    /// The strongest access the context holds on this object, if any.
    #[must_use]
    pub fn query_access(&self, ctx: &AccessContext) -> Option<AccessType> {
        if ctx.is_privileged() {
            Some(AccessType::Control)
        } else {
            self.acl.get(ctx.role()).copied()
        }
    }

    /// Whether the context holds at least `requested`.
    #[must_use]
    pub fn allows(&self, ctx: &AccessContext, requested: AccessType) -> bool {
        self.query_access(ctx)
            .is_some_and(|granted| granted.has_access(requested))
    }

    /// Require at least `requested`, failing when the context holds less.
    pub fn require_access(
        &self,
        ctx: &AccessContext,
        requested: AccessType,
    ) -> Result<(), AccessError> {
        if self.allows(ctx, requested) {
            Ok(())
        } else {
            Err(AccessError {
                role: ctx.role().to_string(),
                requested,
            })
        }
    }
}
