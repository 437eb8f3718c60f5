/// Cryptography module for credential storage
///
/// Handles salted Argon2id hashing of student credentials and the admin secret

pub mod password;

pub use password::{
    hash_credential, hash_credential_async, verify_against_dummy, verify_credential,
    verify_credential_async,
};
pub(crate) use password::run_blocking;
