//! Role management
//!
//! CRUD over roles and their permission membership, honoring the
//! system-role deletion guard.

use crate::error::{RbacError, Result};
use crate::store::RoleStore;
use crate::types::{PermissionId, Role};
use std::sync::Arc;
use tracing::{debug, info};

/// Inputs for creating a role
#[derive(Debug, Clone, Default)]
pub struct NewRole {
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub permission_ids: Vec<PermissionId>,
}

/// Management operations over roles
pub struct RoleManager {
    roles: Arc<dyn RoleStore>,
}

impl RoleManager {
    pub fn new(roles: Arc<dyn RoleStore>) -> Self {
        Self { roles }
    }

    /// Create a role.
    ///
    /// The name must be non-blank and unused. A name collision seen by the
    /// pre-check is a validation failure; one raised by a concurrent writer
    /// on the insert itself propagates as the store's duplicate error, since
    /// this path is not idempotent.
    pub async fn create(&self, new_role: NewRole) -> Result<Role> {
        let name = new_role.name.trim();
        if name.is_empty() {
            return Err(RbacError::Validation("role name must not be blank".into()));
        }
        if self.roles.find_by_name(name).await?.is_some() {
            return Err(RbacError::Validation(format!(
                "role name '{name}' is already in use"
            )));
        }

        let mut role = Role::new(name).with_permissions(new_role.permission_ids);
        if let Some(description) = new_role.description {
            role = role.with_description(description);
        }
        if new_role.is_system_role {
            role = role.system();
        }

        self.roles.insert(role.clone()).await?;
        info!(role = %role.name, permissions = role.permissions.len(), "role created");
        Ok(role)
    }

    /// Add a permission to a role's membership. Idempotent; `NotFound` when
    /// the role does not exist.
    pub async fn add_permission(&self, role_id: &str, permission_id: &str) -> Result<()> {
        self.roles.add_permission(role_id, permission_id).await?;
        debug!(role = role_id, permission = permission_id, "permission added");
        Ok(())
    }

    /// Remove a permission from a role's membership. Idempotent; `NotFound`
    /// when the role does not exist.
    pub async fn remove_permission(&self, role_id: &str, permission_id: &str) -> Result<()> {
        self.roles.remove_permission(role_id, permission_id).await?;
        debug!(role = role_id, permission = permission_id, "permission removed");
        Ok(())
    }

    /// Delete a role. System roles are refused atomically by the store's
    /// delete; the refusal is never retried or silently ignored.
    pub async fn delete(&self, role_id: &str) -> Result<()> {
        self.roles.delete(role_id).await?;
        info!(role = role_id, "role deleted");
        Ok(())
    }

    /// Get a role by id; `NotFound` when absent
    pub async fn get(&self, role_id: &str) -> Result<Role> {
        self.roles
            .get(role_id)
            .await?
            .ok_or_else(|| RbacError::NotFound(format!("role {role_id}")))
    }

    /// Look up a role by exact name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.roles.find_by_name(name).await
    }

    /// All roles
    pub async fn list(&self) -> Result<Vec<Role>> {
        self.roles.list().await
    }
}
