/// Credential hashing and verification
///
/// Credentials are stored as Argon2id PHC strings with a random salt per hash.
/// Verification goes through `PasswordVerifier`, which compares digests in
/// constant time.

use crate::error::{GateError, GateResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;

lazy_static! {
    /// Hash checked when no account matches, so an unknown email costs the
    /// same as a wrong credential.
    static ref DUMMY_HASH: String =
        hash_credential("study-gate-dummy-credential").unwrap_or_default();
}

/// Hash a credential with a fresh salt
pub fn hash_credential(credential: &str) -> GateResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(credential.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| GateError::Internal(format!("Credential hashing failed: {}", e)))
}

/// Check a submitted credential against a stored hash
///
/// A malformed stored hash never matches.
pub fn verify_credential(credential: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Stored credential hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(credential.as_bytes(), &parsed)
        .is_ok()
}

/// Run KDF work on the blocking pool so it never stalls a runtime worker
pub(crate) async fn run_blocking<T, F>(work: F) -> GateResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| GateError::Internal(format!("Credential task failed: {}", e)))
}

/// `hash_credential` on the blocking pool
pub async fn hash_credential_async(credential: &str) -> GateResult<String> {
    let credential = credential.to_owned();
    run_blocking(move || hash_credential(&credential)).await?
}

/// `verify_credential` on the blocking pool
pub async fn verify_credential_async(credential: &str, stored_hash: &str) -> GateResult<bool> {
    let credential = credential.to_owned();
    let stored_hash = stored_hash.to_owned();
    run_blocking(move || verify_credential(&credential, &stored_hash)).await
}

/// Burn one verification against the dummy hash; always false
pub fn verify_against_dummy(credential: &str) -> bool {
    let _ = verify_credential(credential, &DUMMY_HASH);
    false
}
