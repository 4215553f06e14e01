//! Core access-control types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique permission identifier
pub type PermissionId = String;

/// Unique role identifier
pub type RoleId = String;

/// Unique user identifier
pub type UserId = String;

/// Action a grant covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Breadth of a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionScope {
    /// Every instance of the resource
    All,
    /// Only instances owned by the requester
    Own,
    /// No access; an informational default that never grants
    None,
}

impl PermissionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionScope::All => "all",
            PermissionScope::Own => "own",
            PermissionScope::None => "none",
        }
    }
}

impl std::fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grantable capability: a (resource, action, scope) triple.
///
/// The triple is unique across the catalog; `resource` participates in that
/// key case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,

    /// Domain entity type the grant covers (e.g. "User", "Post")
    pub resource: String,

    pub action: Action,

    pub scope: PermissionScope,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Create a new permission for a (resource, action, scope) triple
    pub fn new(resource: impl Into<String>, action: Action, scope: PermissionScope) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            resource: resource.into(),
            action,
            scope,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a free-text description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this entry covers the given resource and action. Resource
    /// names compare case-insensitively; scope is the caller's concern.
    pub fn covers(&self, resource: &str, action: Action) -> bool {
        self.action == action && self.resource.eq_ignore_ascii_case(resource)
    }

    /// Whether this entry occupies the same catalog slot as the given triple
    pub fn same_key(&self, resource: &str, action: Action, scope: PermissionScope) -> bool {
        self.covers(resource, action) && self.scope == scope
    }
}

/// A named bundle of permission grants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,

    /// Unique role name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Permission membership by id; order carries no meaning
    #[serde(default)]
    pub permissions: Vec<PermissionId>,

    /// System roles cannot be deleted
    #[serde(default)]
    pub is_system_role: bool,

    /// Advisory validity window; access decisions do not consult it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_from: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_to: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new custom role with no permissions
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            permissions: Vec::new(),
            is_system_role: false,
            effective_from: Some(now),
            effective_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a free-text description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the permission membership
    pub fn with_permissions(mut self, permission_ids: Vec<PermissionId>) -> Self {
        self.permissions = permission_ids;
        self
    }

    /// Mark the role as a protected system role
    pub fn system(mut self) -> Self {
        self.is_system_role = true;
        self
    }

    /// Whether the given permission id is in the membership
    pub fn has_permission_id(&self, permission_id: &str) -> bool {
        self.permissions.iter().any(|id| id == permission_id)
    }
}

/// The slice of an account record the core consults. Profile fields beyond
/// these live in the embedding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    pub name: String,

    /// Unique, stored lowercase
    pub email: String,

    /// PHC digest of the account secret; excluded from serialized output
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Exactly one role per user
    pub role_id: RoleId,

    /// Deactivated accounts are denied all access regardless of role
    pub is_active: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an active user bound to a role
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role_id: impl Into<RoleId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role_id: role_id.into(),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_and_scope_wire_format() {
        assert_eq!(serde_json::to_string(&Action::Create).unwrap(), "\"create\"");
        assert_eq!(
            serde_json::to_string(&PermissionScope::All).unwrap(),
            "\"all\""
        );

        let scope: PermissionScope = serde_json::from_str("\"own\"").unwrap();
        assert_eq!(scope, PermissionScope::Own);
    }

    #[test]
    fn test_permission_covers_is_case_insensitive() {
        let permission = Permission::new("User", Action::Read, PermissionScope::All);

        assert!(permission.covers("User", Action::Read));
        assert!(permission.covers("user", Action::Read));
        assert!(permission.covers("USER", Action::Read));
        assert!(!permission.covers("User", Action::Update));
        assert!(!permission.covers("Post", Action::Read));
    }

    #[test]
    fn test_permission_same_key_distinguishes_scope() {
        let permission = Permission::new("User", Action::Read, PermissionScope::All);

        assert!(permission.same_key("user", Action::Read, PermissionScope::All));
        assert!(!permission.same_key("user", Action::Read, PermissionScope::Own));
    }

    #[test]
    fn test_role_builders() {
        let role = Role::new("Moderator")
            .with_description("Moderates comments")
            .with_permissions(vec!["p-1".to_string(), "p-2".to_string()])
            .system();

        assert!(role.is_system_role);
        assert!(role.has_permission_id("p-1"));
        assert!(!role.has_permission_id("p-3"));
        assert_eq!(role.permissions.len(), 2);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("Alice", "alice@example.com", "$argon2id$...", "role-1");
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
