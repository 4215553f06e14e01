//! Permission catalog
//!
//! Holds the fixed vocabulary of grantable (resource, action, scope) triples
//! and guards its uniqueness. All permission creation goes through the
//! catalog; no other component writes to the permission store.

use crate::bootstrap::BootstrapObserver;
use crate::error::{RbacError, Result};
use crate::store::PermissionStore;
use crate::types::{Action, Permission, PermissionScope};
use std::sync::Arc;
use tracing::debug;

/// The default vocabulary seeded at bootstrap: full ALL-scope CRUD on the
/// access-control entities themselves, plus the OWN-scope self-management
/// grants on User.
pub const DEFAULT_PERMISSIONS: &[(&str, Action, PermissionScope, &str)] = &[
    (
        "User",
        Action::Create,
        PermissionScope::All,
        "Create any user",
    ),
    ("User", Action::Read, PermissionScope::All, "Read any user"),
    (
        "User",
        Action::Update,
        PermissionScope::All,
        "Update any user",
    ),
    (
        "User",
        Action::Delete,
        PermissionScope::All,
        "Delete any user",
    ),
    (
        "Permission",
        Action::Create,
        PermissionScope::All,
        "Create permissions",
    ),
    (
        "Permission",
        Action::Read,
        PermissionScope::All,
        "Read permissions",
    ),
    (
        "Permission",
        Action::Update,
        PermissionScope::All,
        "Update permissions",
    ),
    (
        "Permission",
        Action::Delete,
        PermissionScope::All,
        "Delete permissions",
    ),
    (
        "Role",
        Action::Create,
        PermissionScope::All,
        "Create roles",
    ),
    ("Role", Action::Read, PermissionScope::All, "Read roles"),
    (
        "Role",
        Action::Update,
        PermissionScope::All,
        "Update roles",
    ),
    (
        "Role",
        Action::Delete,
        PermissionScope::All,
        "Delete roles",
    ),
    (
        "User",
        Action::Read,
        PermissionScope::Own,
        "Read own profile",
    ),
    (
        "User",
        Action::Update,
        PermissionScope::Own,
        "Update own profile",
    ),
    (
        "User",
        Action::Delete,
        PermissionScope::Own,
        "Delete own account",
    ),
];

/// The grantable-capability vocabulary
pub struct PermissionCatalog {
    store: Arc<dyn PermissionStore>,
}

impl PermissionCatalog {
    pub fn new(store: Arc<dyn PermissionStore>) -> Self {
        Self { store }
    }

    /// Idempotent create: returns the existing permission when the triple is
    /// already in the catalog, otherwise creates it.
    ///
    /// Two concurrent calls can both miss the find and race the insert; the
    /// store's uniqueness index decides the winner and the loser re-reads
    /// the row the winner created. "Already exists" is never an error here.
    pub async fn ensure(
        &self,
        resource: &str,
        action: Action,
        scope: PermissionScope,
        description: Option<&str>,
    ) -> Result<Permission> {
        if let Some(existing) = self.store.find_by_key(resource, action, scope).await? {
            return Ok(existing);
        }

        let mut permission = Permission::new(resource, action, scope);
        if let Some(description) = description {
            permission = permission.with_description(description);
        }

        match self.store.insert(permission.clone()).await {
            Ok(()) => {
                debug!(resource, action = %action, scope = %scope, "permission created");
                Ok(permission)
            }
            Err(RbacError::Duplicate(_)) => {
                // Lost the race past the find-then-create gap; the row
                // exists now, so re-read it.
                self.store
                    .find_by_key(resource, action, scope)
                    .await?
                    .ok_or_else(|| {
                        RbacError::Storage(format!(
                            "permission {resource}:{action}:{scope} missing after duplicate insert"
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Look up a permission by its triple
    pub async fn find(
        &self,
        resource: &str,
        action: Action,
        scope: PermissionScope,
    ) -> Result<Option<Permission>> {
        self.store.find_by_key(resource, action, scope).await
    }

    /// The whole vocabulary
    pub async fn list(&self) -> Result<Vec<Permission>> {
        self.store.list().await
    }

    /// Seed the default vocabulary. Safe to re-run; existing triples are
    /// returned as-is and reported to the observer only when newly created.
    pub async fn ensure_defaults(&self, observer: &dyn BootstrapObserver) -> Result<()> {
        for (resource, action, scope, description) in DEFAULT_PERMISSIONS {
            let already = self.find(resource, *action, *scope).await?.is_some();
            self.ensure(resource, *action, *scope, Some(description))
                .await?;
            if !already {
                observer.permission_ensured(resource, *action, *scope);
            }
        }
        Ok(())
    }
}
