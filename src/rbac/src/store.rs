//! Storage traits and in-memory backends
//!
//! The core talks to storage through these traits and relies on two
//! guarantees from whatever sits behind them: uniqueness indexes (the
//! permission triple, role names, user emails) and atomic single-document
//! updates. The in-memory backends uphold both under a write lock and serve
//! as the reference implementation for tests and database-free embedding.

use crate::error::{RbacError, Result};
use crate::types::{Action, Permission, PermissionId, PermissionScope, Role, RoleId, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Permission persistence
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Get a permission by id
    async fn get(&self, id: &str) -> Result<Option<Permission>>;

    /// Look up a permission by its (resource, action, scope) triple.
    /// `resource` matches case-insensitively.
    async fn find_by_key(
        &self,
        resource: &str,
        action: Action,
        scope: PermissionScope,
    ) -> Result<Option<Permission>>;

    /// Resolve a membership list to permissions, skipping dangling ids
    async fn get_many(&self, ids: &[PermissionId]) -> Result<Vec<Permission>>;

    /// Insert a new permission. Fails with `Duplicate` when the triple is
    /// already in the catalog.
    async fn insert(&self, permission: Permission) -> Result<()>;

    /// The whole catalog
    async fn list(&self) -> Result<Vec<Permission>>;
}

/// Role persistence
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Get a role by id
    async fn get(&self, id: &str) -> Result<Option<Role>>;

    /// Look up a role by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// Insert a new role. Fails with `Duplicate` when the name is taken.
    async fn insert(&self, role: Role) -> Result<()>;

    /// Add a permission to the role's membership. Idempotent; `NotFound`
    /// when the role does not exist.
    async fn add_permission(&self, role_id: &str, permission_id: &str) -> Result<()>;

    /// Remove a permission from the role's membership. Idempotent;
    /// `NotFound` when the role does not exist.
    async fn remove_permission(&self, role_id: &str, permission_id: &str) -> Result<()>;

    /// Delete a role. The system-role guard is an atomic precondition of
    /// the delete itself: the flag is checked and the row removed in one
    /// critical section.
    async fn delete(&self, id: &str) -> Result<()>;

    /// All roles
    async fn list(&self) -> Result<Vec<Role>>;
}

/// User persistence (the slice of the account record the core consults)
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by id
    async fn get(&self, id: &str) -> Result<Option<User>>;

    /// Look up a user by email, case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new user. Fails with `Duplicate` when the email is taken.
    async fn insert(&self, user: User) -> Result<()>;

    /// Flip the active flag. `NotFound` when the user does not exist.
    async fn set_active(&self, id: &str, active: bool) -> Result<()>;

    /// Record a successful sign-in
    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<()>;
}

/// In-memory permission store
pub struct InMemoryPermissionStore {
    permissions: Arc<RwLock<HashMap<PermissionId, Permission>>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self {
            permissions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn get(&self, id: &str) -> Result<Option<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permissions.get(id).cloned())
    }

    async fn find_by_key(
        &self,
        resource: &str,
        action: Action,
        scope: PermissionScope,
    ) -> Result<Option<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permissions
            .values()
            .find(|p| p.same_key(resource, action, scope))
            .cloned())
    }

    async fn get_many(&self, ids: &[PermissionId]) -> Result<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| permissions.get(id).cloned())
            .collect())
    }

    async fn insert(&self, permission: Permission) -> Result<()> {
        let mut permissions = self.permissions.write().await;
        if permissions
            .values()
            .any(|p| p.same_key(&permission.resource, permission.action, permission.scope))
        {
            return Err(RbacError::Duplicate(format!(
                "permission {}:{}:{}",
                permission.resource, permission.action, permission.scope
            )));
        }
        permissions.insert(permission.id.clone(), permission);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permissions.values().cloned().collect())
    }
}

/// In-memory role store
pub struct InMemoryRoleStore {
    roles: Arc<RwLock<HashMap<RoleId, Role>>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self {
            roles: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRoleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn get(&self, id: &str) -> Result<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.values().find(|r| r.name == name).cloned())
    }

    async fn insert(&self, role: Role) -> Result<()> {
        let mut roles = self.roles.write().await;
        if roles.values().any(|r| r.name == role.name) {
            return Err(RbacError::Duplicate(format!("role name '{}'", role.name)));
        }
        roles.insert(role.id.clone(), role);
        Ok(())
    }

    async fn add_permission(&self, role_id: &str, permission_id: &str) -> Result<()> {
        let mut roles = self.roles.write().await;
        let role = roles
            .get_mut(role_id)
            .ok_or_else(|| RbacError::NotFound(format!("role {role_id}")))?;

        if !role.has_permission_id(permission_id) {
            role.permissions.push(permission_id.to_string());
            role.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn remove_permission(&self, role_id: &str, permission_id: &str) -> Result<()> {
        let mut roles = self.roles.write().await;
        let role = roles
            .get_mut(role_id)
            .ok_or_else(|| RbacError::NotFound(format!("role {role_id}")))?;

        if role.has_permission_id(permission_id) {
            role.permissions.retain(|id| id != permission_id);
            role.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut roles = self.roles.write().await;
        match roles.get(id) {
            None => Err(RbacError::NotFound(format!("role {id}"))),
            Some(role) if role.is_system_role => Err(RbacError::ProtectedRole(format!(
                "system role '{}' cannot be deleted",
                role.name
            ))),
            Some(_) => {
                roles.remove(id);
                Ok(())
            }
        }
    }

    async fn list(&self) -> Result<Vec<Role>> {
        let roles = self.roles.read().await;
        Ok(roles.values().cloned().collect())
    }
}

/// In-memory user store
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RbacError::Duplicate(format!("user email '{}'", user.email)));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn set_active(&self, id: &str, active: bool) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| RbacError::NotFound(format!("user {id}")))?;
        user.is_active = active;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| RbacError::NotFound(format!("user {id}")))?;
        user.last_login = Some(at);
        user.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permission_triple_is_unique() {
        let store = InMemoryPermissionStore::new();
        store
            .insert(Permission::new("User", Action::Read, PermissionScope::All))
            .await
            .unwrap();

        // Same triple, different casing: same catalog slot
        let result = store
            .insert(Permission::new("user", Action::Read, PermissionScope::All))
            .await;
        assert!(matches!(result, Err(RbacError::Duplicate(_))));

        // Different scope: its own slot
        store
            .insert(Permission::new("User", Action::Read, PermissionScope::Own))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_many_skips_dangling_ids() {
        let store = InMemoryPermissionStore::new();
        let permission = Permission::new("User", Action::Read, PermissionScope::All);
        let id = permission.id.clone();
        store.insert(permission).await.unwrap();

        let found = store
            .get_many(&[id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[tokio::test]
    async fn test_role_name_is_unique() {
        let store = InMemoryRoleStore::new();
        store.insert(Role::new("Admin")).await.unwrap();

        let result = store.insert(Role::new("Admin")).await;
        assert!(matches!(result, Err(RbacError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_membership_edits_are_idempotent() {
        let store = InMemoryRoleStore::new();
        let role = Role::new("Editor");
        let role_id = role.id.clone();
        store.insert(role).await.unwrap();

        store.add_permission(&role_id, "p-1").await.unwrap();
        store.add_permission(&role_id, "p-1").await.unwrap();
        assert_eq!(store.get(&role_id).await.unwrap().unwrap().permissions, vec!["p-1"]);

        store.remove_permission(&role_id, "p-1").await.unwrap();
        store.remove_permission(&role_id, "p-1").await.unwrap();
        assert!(store.get(&role_id).await.unwrap().unwrap().permissions.is_empty());
    }

    #[tokio::test]
    async fn test_membership_edit_on_missing_role_fails() {
        let store = InMemoryRoleStore::new();
        let result = store.add_permission("missing", "p-1").await;
        assert!(matches!(result, Err(RbacError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_system_role_delete_is_refused() {
        let store = InMemoryRoleStore::new();
        let system = Role::new("Admin").system();
        let custom = Role::new("Guest");
        let system_id = system.id.clone();
        let custom_id = custom.id.clone();
        store.insert(system).await.unwrap();
        store.insert(custom).await.unwrap();

        let result = store.delete(&system_id).await;
        assert!(matches!(result, Err(RbacError::ProtectedRole(_))));
        assert!(store.get(&system_id).await.unwrap().is_some());

        store.delete(&custom_id).await.unwrap();
        assert!(store.get(&custom_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_email_is_unique_case_insensitively() {
        let store = InMemoryUserStore::new();
        store
            .insert(User::new("Alice", "alice@example.com", "digest", "role-1"))
            .await
            .unwrap();

        let result = store
            .insert(User::new("Other", "ALICE@example.com", "digest", "role-1"))
            .await;
        assert!(matches!(result, Err(RbacError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_set_active_flips_flag() {
        let store = InMemoryUserStore::new();
        let user = User::new("Alice", "alice@example.com", "digest", "role-1");
        let id = user.id.clone();
        store.insert(user).await.unwrap();

        store.set_active(&id, false).await.unwrap();
        assert!(!store.get(&id).await.unwrap().unwrap().is_active);

        let result = store.set_active("missing", false).await;
        assert!(matches!(result, Err(RbacError::NotFound(_))));
    }
}
