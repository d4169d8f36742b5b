//! Session identity and the permission evaluator.

use serde::{Deserialize, Serialize};

use crate::grants::{PERMISSION_WILDCARD, ROLE_SUPERADMIN, grants_for_role};

/// Who the current operator is, as far as this client knows.
///
/// Replaces the loosely-typed session/user shape of older clients with an
/// explicit tagged type: either a fully-described authenticated identity or
/// `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Identity {
    /// A signed-in operator.
    Authenticated {
        /// Stable user identifier.
        subject: String,
        /// Role name; drives the grant-table fallback.
        role: String,
        /// Explicit permission strings. Empty means "use the role grants".
        #[serde(default)]
        permissions: Vec<String>,
        /// Bearer token issued at sign-in.
        token: String,
    },
    /// No session.
    Anonymous,
}

impl Identity {
    /// Whether this identity represents a signed-in operator.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Bearer token, when authenticated.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }

    /// User identifier, when authenticated.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::Authenticated { subject, .. } => Some(subject),
            Self::Anonymous => None,
        }
    }

    /// Role name, when authenticated.
    pub fn role(&self) -> Option<&str> {
        match self {
            Self::Authenticated { role, .. } => Some(role),
            Self::Anonymous => None,
        }
    }

    /// Check a single permission. Pure and synchronous so it is safe to call
    /// from rendering logic.
    ///
    /// Resolution order: `superadmin` passes everything; then the effective
    /// set (explicit permissions, or the role grants when the explicit list
    /// is empty) is checked for the `"*"` wildcard and the exact string.
    pub fn has_permission(&self, permission: &str) -> bool {
        let Self::Authenticated {
            role, permissions, ..
        } = self
        else {
            return false;
        };

        if role == ROLE_SUPERADMIN {
            return true;
        }

        if permissions.is_empty() {
            grants_for_role(role)
                .iter()
                .any(|p| *p == PERMISSION_WILDCARD || *p == permission)
        } else {
            permissions
                .iter()
                .any(|p| p == PERMISSION_WILDCARD || p == permission)
        }
    }

    /// True iff any element of `permissions` passes [`Self::has_permission`].
    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }
}
