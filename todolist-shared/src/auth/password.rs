/// Password hashing with Argon2id
///
/// # Parameters
///
/// - **Memory**: 64 MiB (65536 KiB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Salt**: 16 random bytes from the OS RNG
///
/// Hashes are PHC strings that embed their parameters, so verification works
/// for hashes produced with older settings.
///
/// Both functions are CPU-bound for tens of milliseconds. Async callers run
/// them through `tokio::task::spawn_blocking`.
///
/// # Example
///
/// ```
/// use todolist_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("pw123456")?;
/// assert!(verify_password("pw123456", &hash)?);
/// assert!(!verify_password("pw654321", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, ParamsBuilder, Version,
};

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 8;

/// Longest accepted password (bounds hashing work per request)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params: Params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with a fresh random salt
///
/// Output looks like `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored hash in constant time
///
/// `Ok(false)` means the password is wrong; `Err` means the hash itself is
/// unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks the registration password policy
///
/// Only length is enforced: between [`MIN_PASSWORD_LEN`] and
/// [`MAX_PASSWORD_LEN`] characters.
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LEN
        ));
    }

    Ok(())
}
