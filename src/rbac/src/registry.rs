//! Role assignment resolution
//!
//! Resolves a user to the effective permission set their single role grants
//! and answers the access and role-membership queries the surrounding
//! system asks. Stateless: every call reads through to the stores, so a
//! role-membership edit is visible to the very next check with no
//! invalidation step. Anyone adding a cache here must invalidate every
//! cached permission set of a role's holders when that role's membership
//! changes.

use crate::decision::{evaluate, Decision, DecisionReason};
use crate::error::{RbacError, Result};
use crate::store::{PermissionStore, RoleStore, UserStore};
use crate::types::{Action, Permission, Role, User};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolver from users to their effective permissions
pub struct RoleRegistry {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
}

impl RoleRegistry {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        Self {
            users,
            roles,
            permissions,
        }
    }

    /// Effective permission set for `user`.
    ///
    /// A caller that already paid for the role join passes the row as
    /// `preloaded_role`; otherwise the role is fetched here. A dangling
    /// role reference resolves to an empty set, never an error: an access
    /// check must not crash a request over a data inconsistency.
    pub async fn permissions_for(
        &self,
        user: &User,
        preloaded_role: Option<&Role>,
    ) -> Result<Vec<Permission>> {
        let fetched;
        let role = match preloaded_role {
            Some(role) => Some(role),
            None => {
                fetched = self.roles.get(&user.role_id).await?;
                fetched.as_ref()
            }
        };

        let Some(role) = role else {
            warn!(
                user = %user.id,
                role = %user.role_id,
                "role reference does not resolve; treating as no permissions"
            );
            return Ok(Vec::new());
        };

        self.permissions.get_many(&role.permissions).await
    }

    /// Effective permission set by user id. `NotFound` when the user does
    /// not exist; a dangling role still resolves to an empty set.
    pub async fn permissions_for_user_id(&self, user_id: &str) -> Result<Vec<Permission>> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| RbacError::NotFound(format!("user {user_id}")))?;
        self.permissions_for(&user, None).await
    }

    /// Full decision for "may `user_id` perform `action` on `resource`".
    ///
    /// Fail-closed: an unknown user or an unresolvable role is a DENY, not
    /// an error.
    pub async fn check(
        &self,
        user_id: &str,
        resource: &str,
        action: Action,
        resource_owner_id: Option<&str>,
    ) -> Result<Decision> {
        let Some(user) = self.users.get(user_id).await? else {
            debug!(user = user_id, "unknown user; denying");
            return Ok(Decision::deny(DecisionReason::UnknownUser));
        };

        let permissions = self.permissions_for(&user, None).await?;
        let decision = evaluate(&user, &permissions, resource, action, resource_owner_id);
        debug!(
            user = %user.id,
            resource,
            action = %action,
            allowed = decision.allowed,
            "access check"
        );
        Ok(decision)
    }

    /// Boolean form of [`check`](Self::check); the entry point route guards
    /// call.
    pub async fn has_permission(
        &self,
        user_id: &str,
        resource: &str,
        action: Action,
        resource_owner_id: Option<&str>,
    ) -> Result<bool> {
        Ok(self
            .check(user_id, resource, action, resource_owner_id)
            .await?
            .allowed)
    }

    /// Does the user hold the named role? Name comparison is
    /// case-insensitive. Used for coarse gating independent of fine-grained
    /// grants; an unknown user or dangling role is simply false.
    pub async fn has_role(&self, user_id: &str, role_name: &str) -> Result<bool> {
        let Some(user) = self.users.get(user_id).await? else {
            return Ok(false);
        };
        let Some(role) = self.roles.get(&user.role_id).await? else {
            return Ok(false);
        };
        Ok(role.name.eq_ignore_ascii_case(role_name))
    }
}
