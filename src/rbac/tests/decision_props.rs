//! Property coverage for the decision function

use atrium_rbac::{evaluate, Action, Permission, PermissionScope, User};
use proptest::prelude::*;

fn subject() -> User {
    User::new("Alice", "alice@example.com", "digest", "role-1")
}

proptest! {
    /// An ALL-scope grant allows for every owner value, present or absent.
    #[test]
    fn all_scope_ignores_ownership(owner in proptest::option::of("[ -~]{0,40}")) {
        let user = subject();
        let permissions = vec![Permission::new("User", Action::Read, PermissionScope::All)];

        let decision = evaluate(&user, &permissions, "User", Action::Read, owner.as_deref());
        prop_assert!(decision.allowed);
    }

    /// An OWN-scope grant never allows an owner other than the requester.
    #[test]
    fn own_scope_rejects_foreign_owners(owner in "[ -~]{0,40}") {
        let user = subject();
        prop_assume!(owner.trim() != user.id);

        let permissions = vec![Permission::new("User", Action::Update, PermissionScope::Own)];
        let decision = evaluate(&user, &permissions, "User", Action::Update, Some(&owner));
        prop_assert!(!decision.allowed);
    }

    /// An OWN-scope grant always allows the requester's own records, however
    /// the id happens to be padded.
    #[test]
    fn own_scope_accepts_self(padding_left in " {0,3}", padding_right in " {0,3}") {
        let user = subject();
        let permissions = vec![Permission::new("User", Action::Update, PermissionScope::Own)];
        let owner = format!("{padding_left}{}{padding_right}", user.id);

        let decision = evaluate(&user, &permissions, "User", Action::Update, Some(&owner));
        prop_assert!(decision.allowed);
    }

    /// Deactivation denies regardless of the permission set or owner.
    #[test]
    fn deactivated_is_always_denied(
        owner in proptest::option::of("[ -~]{0,40}"),
        scope_all: bool,
    ) {
        let mut user = subject();
        user.is_active = false;

        let scope = if scope_all { PermissionScope::All } else { PermissionScope::Own };
        let permissions = vec![Permission::new("User", Action::Read, scope)];

        let decision = evaluate(&user, &permissions, "User", Action::Read, owner.as_deref());
        prop_assert!(!decision.allowed);
    }

    /// NONE-scope entries never grant anything.
    #[test]
    fn none_scope_never_grants(owner in proptest::option::of("[ -~]{0,40}")) {
        let user = subject();
        let permissions = vec![Permission::new("User", Action::Read, PermissionScope::None)];

        let decision = evaluate(&user, &permissions, "User", Action::Read, owner.as_deref());
        prop_assert!(!decision.allowed);
    }
}
