//! The access decision
//!
//! A pure ALLOW/DENY evaluation over a user's permission set. Total: every
//! input terminates in a decision, and an absent grant is a DENY, not a
//! fault. Safe to call concurrently; it reads its inputs and nothing else.

use crate::types::{Action, Permission, PermissionId, PermissionScope, User};
use serde::{Deserialize, Serialize};

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the action is allowed
    pub allowed: bool,

    /// Why the evaluation landed where it did
    pub reason: DecisionReason,
}

impl Decision {
    /// Create an allow decision
    pub fn allow(reason: DecisionReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    /// Create a deny decision
    pub fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// Reason attached to an access decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DecisionReason {
    /// The account is deactivated; no grant can apply
    Deactivated,

    /// An ALL-scope grant on the resource/action matched
    AllScopeGrant { permission_id: PermissionId },

    /// An OWN-scope grant matched and the requester owns the instance
    OwnScopeGrant { permission_id: PermissionId },

    /// No grant in the permission set covers the request
    NoMatchingGrant,

    /// The requesting user id does not resolve to an account
    UnknownUser,
}

/// Normalize an identifier representation for equality comparison
fn normalize(id: &str) -> &str {
    id.trim()
}

/// Decide whether `user` may perform `action` on `resource`, optionally on
/// an instance owned by `resource_owner_id`.
///
/// The evaluation order encodes the precedence policy:
///
/// 1. a deactivated account is denied before any grant is consulted;
/// 2. an ALL-scope grant allows regardless of ownership;
/// 3. an OWN-scope grant allows only when the caller supplied the instance
///    owner and it is the requester;
/// 4. anything else is denied. NONE-scope entries never match, so their
///    presence in the set cannot grant access.
pub fn evaluate(
    user: &User,
    permissions: &[Permission],
    resource: &str,
    action: Action,
    resource_owner_id: Option<&str>,
) -> Decision {
    if !user.is_active {
        return Decision::deny(DecisionReason::Deactivated);
    }

    if let Some(grant) = permissions
        .iter()
        .find(|p| p.covers(resource, action) && p.scope == PermissionScope::All)
    {
        return Decision::allow(DecisionReason::AllScopeGrant {
            permission_id: grant.id.clone(),
        });
    }

    if let Some(owner_id) = resource_owner_id {
        if let Some(grant) = permissions
            .iter()
            .find(|p| p.covers(resource, action) && p.scope == PermissionScope::Own)
        {
            if normalize(&user.id) == normalize(owner_id) {
                return Decision::allow(DecisionReason::OwnScopeGrant {
                    permission_id: grant.id.clone(),
                });
            }
        }
    }

    Decision::deny(DecisionReason::NoMatchingGrant)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("Alice", "alice@example.com", "digest", "role-1")
    }

    fn grant(resource: &str, action: Action, scope: PermissionScope) -> Permission {
        Permission::new(resource, action, scope)
    }

    #[test]
    fn test_all_scope_allows_without_owner() {
        let user = user();
        let permissions = vec![grant("User", Action::Read, PermissionScope::All)];

        let decision = evaluate(&user, &permissions, "User", Action::Read, None);
        assert!(decision.allowed);
        assert!(matches!(
            decision.reason,
            DecisionReason::AllScopeGrant { .. }
        ));
    }

    #[test]
    fn test_all_scope_dominates_own_scope() {
        let user = user();
        let permissions = vec![
            grant("User", Action::Update, PermissionScope::Own),
            grant("User", Action::Update, PermissionScope::All),
        ];

        // ALL wins for any owner, including somebody else's record
        for owner in [user.id.as_str(), "someone-else"] {
            let decision = evaluate(&user, &permissions, "User", Action::Update, Some(owner));
            assert!(decision.allowed);
            assert!(matches!(
                decision.reason,
                DecisionReason::AllScopeGrant { .. }
            ));
        }
    }

    #[test]
    fn test_own_scope_limits_to_own_records() {
        let user = user();
        let permissions = vec![grant("User", Action::Update, PermissionScope::Own)];

        let own = evaluate(&user, &permissions, "User", Action::Update, Some(&user.id));
        assert!(own.allowed);
        assert!(matches!(own.reason, DecisionReason::OwnScopeGrant { .. }));

        let other = evaluate(
            &user,
            &permissions,
            "User",
            Action::Update,
            Some("someone-else"),
        );
        assert!(!other.allowed);

        // Without an owner there is nothing an OWN grant can apply to
        let no_owner = evaluate(&user, &permissions, "User", Action::Update, None);
        assert!(!no_owner.allowed);
        assert_eq!(no_owner.reason, DecisionReason::NoMatchingGrant);
    }

    #[test]
    fn test_deactivated_user_is_denied_before_grants() {
        let mut user = user();
        user.is_active = false;
        let permissions = vec![grant("User", Action::Read, PermissionScope::All)];

        let decision = evaluate(&user, &permissions, "User", Action::Read, None);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::Deactivated);
    }

    #[test]
    fn test_resource_matching_is_case_insensitive() {
        let user = user();
        let permissions = vec![grant("User", Action::Read, PermissionScope::All)];

        for resource in ["User", "user", "USER", "uSeR"] {
            assert!(evaluate(&user, &permissions, resource, Action::Read, None).allowed);
        }
    }

    #[test]
    fn test_none_scope_never_grants() {
        let user = user();
        let permissions = vec![grant("User", Action::Read, PermissionScope::None)];

        for owner in [None, Some(user.id.as_str()), Some("someone-else")] {
            let decision = evaluate(&user, &permissions, "User", Action::Read, owner);
            assert!(!decision.allowed);
            assert_eq!(decision.reason, DecisionReason::NoMatchingGrant);
        }
    }

    #[test]
    fn test_empty_permission_set_is_a_deny_not_a_fault() {
        let user = user();
        let decision = evaluate(&user, &[], "User", Action::Read, None);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::NoMatchingGrant);
    }

    #[test]
    fn test_owner_comparison_normalizes_whitespace() {
        let user = user();
        let permissions = vec![grant("User", Action::Update, PermissionScope::Own)];
        let padded = format!("  {}  ", user.id);

        let decision = evaluate(&user, &permissions, "User", Action::Update, Some(&padded));
        assert!(decision.allowed);
    }
}
