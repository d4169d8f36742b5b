//! Static role grant table.
//!
//! Consulted only when an authenticated identity carries no explicit
//! permission list. Immutable at runtime; an unknown role resolves to the
//! empty set.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Role with unconditional access to everything.
pub const ROLE_SUPERADMIN: &str = "superadmin";
/// Clinic-management role.
pub const ROLE_ADMIN: &str = "admin";
/// Front-desk role with the patient/appointment/reporting subset.
pub const ROLE_USER: &str = "user";

/// Explicit grant matching any permission string.
pub const PERMISSION_WILDCARD: &str = "*";

static ROLE_GRANTS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut grants: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    grants.insert(
        ROLE_ADMIN,
        &[
            "patients:view",
            "patients:manage",
            "appointments:view",
            "appointments:manage",
            "services:view",
            "services:manage",
            "staff:view",
            "staff:manage",
            "reports:view",
            "settings:manage",
        ][..],
    );
    grants.insert(
        ROLE_USER,
        &[
            "patients:view",
            "patients:manage",
            "appointments:view",
            "appointments:manage",
            "reports:view",
        ][..],
    );
    grants
});

/// Grant set for `role`. Unknown roles get the empty set; `superadmin` is
/// short-circuited by the evaluator and has no table entry.
pub fn grants_for_role(role: &str) -> &'static [&'static str] {
    ROLE_GRANTS.get(role).copied().unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_have_grants() {
        assert!(grants_for_role(ROLE_ADMIN).contains(&"settings:manage"));
        assert!(grants_for_role(ROLE_USER).contains(&"reports:view"));
        assert!(!grants_for_role(ROLE_USER).contains(&"settings:manage"));
    }

    #[test]
    fn unknown_role_is_empty() {
        assert!(grants_for_role("janitor").is_empty());
        assert!(grants_for_role("").is_empty());
    }
}
