//! Password credential handling
//!
//! One-way hashing and verification of user secrets, plus a pure strength
//! check usable before hashing. Digests are PHC strings produced by
//! Argon2id, so the salt and cost parameters travel with the hash and old
//! digests keep verifying after the work factor is retuned.

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

/// Default work factor (Argon2 time cost) when none is configured.
pub const DEFAULT_WORK_FACTOR: u32 = 3;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Memory cost in KiB. Fixed; the work factor is the only operator-facing
/// tunable.
const MEMORY_COST_KIB: u32 = 19_456;

const PARALLELISM: u32 = 1;

const SALT_LENGTH: usize = 16;

/// Credential errors
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Hashing could not run (parameter rejection or RNG failure)
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Result type for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Work-factor configuration, read once at startup.
#[derive(Debug, Clone, Copy)]
pub struct CredentialConfig {
    /// Argon2 time cost. Higher is slower to hash and to attack.
    pub work_factor: u32,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
        }
    }
}

/// Salted, work-factor-tunable hasher for user secrets.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Create a hasher with the given configuration.
    pub fn new(config: CredentialConfig) -> Result<Self> {
        let params = Params::new(MEMORY_COST_KIB, config.work_factor.max(1), PARALLELISM, None)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext secret into a storable PHC digest.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_LENGTH];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;

        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(digest.to_string())
    }

    /// Verify a plaintext secret against a stored digest.
    ///
    /// Returns false on any failure, including a digest that does not parse;
    /// the caller cannot tell a corrupt digest from a wrong password.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Outcome of a strength check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthReport {
    /// Whether the password passed every rule
    pub valid: bool,
    /// One message per failed rule
    pub errors: Vec<String>,
}

/// Check a candidate password against the strength rules. Pure; intended to
/// run before [`CredentialHasher::hash`].
pub fn validate_strength(plaintext: &str) -> StrengthReport {
    let mut errors = Vec::new();

    if plaintext.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    if !plaintext.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("password must contain at least one uppercase letter".to_string());
    }
    if !plaintext.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("password must contain at least one lowercase letter".to_string());
    }
    if !plaintext.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password must contain at least one number".to_string());
    }

    StrengthReport {
        valid: errors.is_empty(),
        errors,
    }
}
