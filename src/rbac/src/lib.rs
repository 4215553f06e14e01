//! # Atrium access control
//!
//! Role-based access control core for a content portal: a catalog of
//! (resource, action, scope) grants, roles that bundle them, a pure
//! ALLOW/DENY decision function and the registry that resolves a user to
//! its effective permission set. Storage is abstract; the embedding
//! application supplies the HTTP layer and the database-backed stores, or
//! uses the in-memory ones.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use atrium_rbac::{
//!     bootstrap::{seed_default_roles, SilentObserver},
//!     Action, InMemoryPermissionStore, InMemoryRoleStore, InMemoryUserStore,
//!     PermissionCatalog, RoleManager, RoleRegistry,
//! };
//!
//! # async fn example() -> atrium_rbac::Result<()> {
//! let permissions = Arc::new(InMemoryPermissionStore::new());
//! let roles = Arc::new(InMemoryRoleStore::new());
//! let users = Arc::new(InMemoryUserStore::new());
//!
//! let catalog = PermissionCatalog::new(permissions.clone());
//! let manager = RoleManager::new(roles.clone());
//! seed_default_roles(&catalog, &manager, &SilentObserver).await?;
//!
//! let registry = RoleRegistry::new(users, roles, permissions);
//! let allowed = registry
//!     .has_permission("some-user", "User", Action::Read, None)
//!     .await?;
//! assert!(!allowed); // unknown users are denied, not errored
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod catalog;
pub mod decision;
pub mod error;
pub mod provision;
pub mod registry;
pub mod roles;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use catalog::PermissionCatalog;
pub use decision::{evaluate, Decision, DecisionReason};
pub use error::{RbacError, Result};
pub use provision::{SignUp, UserProvisioning};
pub use registry::RoleRegistry;
pub use roles::{NewRole, RoleManager};
pub use store::{
    InMemoryPermissionStore, InMemoryRoleStore, InMemoryUserStore, PermissionStore, RoleStore,
    UserStore,
};
pub use types::{
    Action, Permission, PermissionId, PermissionScope, Role, RoleId, User, UserId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
