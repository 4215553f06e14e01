//! Bootstrap seeding
//!
//! Idempotent seeding of the default permission vocabulary, the four system
//! roles and the initial administrator account. Every step is
//! find-or-create, so the whole routine can run on each application startup
//! and a crash between steps is recovered by simply running it again.

use crate::catalog::PermissionCatalog;
use crate::error::{RbacError, Result};
use crate::roles::{NewRole, RoleManager};
use crate::store::UserStore;
use crate::types::{Action, PermissionScope, User};
use atrium_credential::CredentialHasher;
use tracing::warn;

/// Name of the seeded administrator role
pub const ADMIN_ROLE: &str = "Admin";

/// Receives bootstrap progress. Implementations decide whether an event
/// becomes a log line, a metric or nothing; the seeding routines themselves
/// stay silent.
pub trait BootstrapObserver: Send + Sync {
    fn permission_ensured(&self, _resource: &str, _action: Action, _scope: PermissionScope) {}
    fn role_created(&self, _name: &str, _permission_count: usize) {}
    fn role_exists(&self, _name: &str) {}
    fn admin_created(&self, _email: &str) {}
    fn admin_exists(&self, _email: &str) {}
}

/// Observer that swallows every event
pub struct SilentObserver;

impl BootstrapObserver for SilentObserver {}

/// Identity of the initial administrator account, supplied as opaque values
/// by the startup layer (typically from environment configuration).
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_name: "System Administrator".into(),
            admin_email: "admin@example.com".into(),
            admin_password: "Admin@123".into(),
        }
    }
}

struct RoleSeed {
    name: &'static str,
    description: &'static str,
    grants: &'static [(&'static str, Action, PermissionScope)],
}

const ADMIN_GRANTS: &[(&str, Action, PermissionScope)] = &[
    ("User", Action::Create, PermissionScope::All),
    ("User", Action::Read, PermissionScope::All),
    ("User", Action::Update, PermissionScope::All),
    ("User", Action::Delete, PermissionScope::All),
    ("Permission", Action::Create, PermissionScope::All),
    ("Permission", Action::Read, PermissionScope::All),
    ("Permission", Action::Update, PermissionScope::All),
    ("Permission", Action::Delete, PermissionScope::All),
    ("Role", Action::Create, PermissionScope::All),
    ("Role", Action::Read, PermissionScope::All),
    ("Role", Action::Update, PermissionScope::All),
    ("Role", Action::Delete, PermissionScope::All),
];

const MEMBER_GRANTS: &[(&str, Action, PermissionScope)] = &[
    ("User", Action::Read, PermissionScope::All),
    ("User", Action::Update, PermissionScope::Own),
];

const DEFAULT_ROLES: &[RoleSeed] = &[
    RoleSeed {
        name: ADMIN_ROLE,
        description: "Full access to every resource",
        grants: ADMIN_GRANTS,
    },
    RoleSeed {
        name: "Editor",
        description: "Creates and edits content",
        grants: MEMBER_GRANTS,
    },
    RoleSeed {
        name: "Viewer",
        description: "View-only access",
        grants: MEMBER_GRANTS,
    },
    RoleSeed {
        name: "User",
        description: "Manages own profile only",
        grants: MEMBER_GRANTS,
    },
];

/// Seed the default permission vocabulary and the four system roles.
///
/// Re-running leaves existing rows untouched; a role-create race lost to a
/// concurrent bootstrap is treated as "already seeded".
pub async fn seed_default_roles(
    catalog: &PermissionCatalog,
    roles: &RoleManager,
    observer: &dyn BootstrapObserver,
) -> Result<()> {
    catalog.ensure_defaults(observer).await?;

    for seed in DEFAULT_ROLES {
        if roles.find_by_name(seed.name).await?.is_some() {
            observer.role_exists(seed.name);
            continue;
        }

        let mut permission_ids = Vec::with_capacity(seed.grants.len());
        for (resource, action, scope) in seed.grants {
            match catalog.find(resource, *action, *scope).await? {
                Some(permission) => permission_ids.push(permission.id),
                None => warn!(
                    resource,
                    action = %action,
                    scope = %scope,
                    "grant not in the default vocabulary; skipping"
                ),
            }
        }

        let created = roles
            .create(NewRole {
                name: seed.name.into(),
                description: Some(seed.description.into()),
                is_system_role: true,
                permission_ids,
            })
            .await;

        match created {
            Ok(role) => observer.role_created(&role.name, role.permissions.len()),
            // The seed names are static and non-blank, so a validation or
            // duplicate failure here means a concurrent bootstrap won the
            // create; the role exists now.
            Err(RbacError::Validation(_)) | Err(RbacError::Duplicate(_)) => {
                observer.role_exists(seed.name)
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Create the initial administrator account bound to the Admin role.
///
/// Idempotent on the configured email. `NotFound` when the Admin role has
/// not been seeded yet; run [`seed_default_roles`] first.
pub async fn seed_admin_user(
    config: &BootstrapConfig,
    users: &dyn UserStore,
    roles: &RoleManager,
    hasher: &CredentialHasher,
    observer: &dyn BootstrapObserver,
) -> Result<()> {
    if users.find_by_email(&config.admin_email).await?.is_some() {
        observer.admin_exists(&config.admin_email);
        return Ok(());
    }

    let admin_role = roles.find_by_name(ADMIN_ROLE).await?.ok_or_else(|| {
        RbacError::NotFound("Admin role is not seeded; seed the default roles first".into())
    })?;

    let digest = hasher.hash(&config.admin_password)?;
    let user = User::new(
        &config.admin_name,
        config.admin_email.to_lowercase(),
        digest,
        admin_role.id,
    );

    match users.insert(user).await {
        Ok(()) => observer.admin_created(&config.admin_email),
        Err(RbacError::Duplicate(_)) => observer.admin_exists(&config.admin_email),
        Err(e) => return Err(e),
    }

    Ok(())
}
