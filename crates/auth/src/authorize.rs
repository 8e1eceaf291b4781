use thiserror::Error;

use crate::{Permission, Role, User};

/// Why a user failed a set of requirements.
///
/// Denial is a normal outcome, not a fault; callers turn it into a fallback
/// render or a redirect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{required}' required, user has {actual:?}")]
    MissingRole {
        required: String,
        actual: Option<String>,
    },

    #[error("forbidden: missing permission '{0}'")]
    MissingPermission(String),
}

/// Check a user against an optional required role and an optional list of
/// required permissions.
///
/// - An empty required role imposes no constraint.
/// - Every required permission must be present (logical AND).
/// - No IO, no panics.
pub fn authorize(
    user: &User,
    required_role: Option<&Role>,
    required_permissions: Option<&[Permission]>,
) -> Result<(), AuthzError> {
    if let Some(required) = required_role.filter(|r| !r.is_empty()) {
        if !user.has_role(required.as_str()) {
            return Err(AuthzError::MissingRole {
                required: required.to_string(),
                actual: user.role().map(ToString::to_string),
            });
        }
    }

    for perm in required_permissions.unwrap_or_default() {
        if !user.has_permission(perm.as_str()) {
            return Err(AuthzError::MissingPermission(perm.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(names: &[&'static str]) -> Vec<Permission> {
        names.iter().copied().map(Permission::new).collect()
    }

    #[test]
    fn no_requirements_always_pass() {
        assert_eq!(authorize(&User::new(), None, None), Ok(()));
    }

    #[test]
    fn role_mismatch_is_reported() {
        let user = User::new().with_role("user");
        let err = authorize(&user, Some(&Role::new("admin")), None).unwrap_err();

        assert_eq!(
            err,
            AuthzError::MissingRole {
                required: "admin".to_string(),
                actual: Some("user".to_string()),
            }
        );
    }

    #[test]
    fn missing_role_on_user_fails_required_role() {
        let err = authorize(&User::new(), Some(&Role::new("admin")), None).unwrap_err();
        assert!(matches!(err, AuthzError::MissingRole { actual: None, .. }));
    }

    #[test]
    fn empty_required_role_is_ignored() {
        let user = User::new().with_role("user");
        assert_eq!(authorize(&user, Some(&Role::new("")), None), Ok(()));
    }

    #[test]
    fn every_required_permission_must_be_present() {
        let required = perms(&["a", "b"]);

        let partial = User::new().with_permissions(["a"]);
        assert_eq!(
            authorize(&partial, None, Some(required.as_slice())),
            Err(AuthzError::MissingPermission("b".to_string()))
        );

        let full = User::new().with_permissions(["a", "b"]);
        assert_eq!(authorize(&full, None, Some(required.as_slice())), Ok(()));
    }

    #[test]
    fn empty_required_permissions_pass() {
        assert_eq!(authorize(&User::new(), None, Some(&[] as &[Permission])), Ok(()));
    }
}
