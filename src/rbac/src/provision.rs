//! User provisioning
//!
//! Sign-up, credential verification and activation toggles. Plaintext
//! passwords are hashed before they reach the store and are never returned.

use crate::error::{RbacError, Result};
use crate::store::{RoleStore, UserStore};
use crate::types::{RoleId, User};
use atrium_credential::{validate_strength, CredentialHasher};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// Inputs for creating an account
#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: RoleId,
}

/// Account provisioning over the user store
pub struct UserProvisioning {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    hasher: CredentialHasher,
}

impl UserProvisioning {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            users,
            roles,
            hasher,
        }
    }

    /// Create an account. Validates the profile fields, the password
    /// strength and the role reference before hashing and storing; an email
    /// already in use propagates as the store's duplicate error.
    pub async fn sign_up(&self, request: SignUp) -> Result<User> {
        let name = request.name.trim();
        let email = request.email.trim().to_lowercase();

        if name.chars().count() < 2 {
            return Err(RbacError::Validation(
                "name must be at least 2 characters long".into(),
            ));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(RbacError::Validation(
                "a valid email address is required".into(),
            ));
        }

        let strength = validate_strength(&request.password);
        if !strength.valid {
            return Err(RbacError::Validation(strength.errors.join("; ")));
        }

        if self.roles.get(&request.role_id).await?.is_none() {
            return Err(RbacError::Validation("invalid role".into()));
        }

        let digest = self.hasher.hash(&request.password)?;
        let user = User::new(name, email, digest, request.role_id);
        self.users.insert(user.clone()).await?;

        info!(user = %user.id, "account created");
        Ok(user)
    }

    /// Verify a credential pair. `None` for an unknown email, a wrong
    /// password or a deactivated account; the caller cannot tell which.
    /// Records the sign-in time on success.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.users.find_by_email(email.trim()).await? else {
            debug!("authentication failed");
            return Ok(None);
        };

        if !user.is_active || !self.hasher.verify(password, &user.password_hash) {
            debug!("authentication failed");
            return Ok(None);
        }

        let now = Utc::now();
        self.users.touch_last_login(&user.id, now).await?;
        Ok(Some(User {
            last_login: Some(now),
            ..user
        }))
    }

    /// Deactivate or reactivate an account. Deactivation revokes all access
    /// at the next decision, regardless of role.
    pub async fn set_active(&self, user_id: &str, active: bool) -> Result<()> {
        self.users.set_active(user_id, active).await
    }
}
