//! Password hashing via bcrypt.
//!
//! The salt and cost factor are embedded in the hash output, so nothing
//! needs to be stored alongside it. Verification is bcrypt's own
//! constant-time digest comparison.

/// Hash a plaintext password. Each call salts freshly, so hashing the
/// same password twice yields different strings.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST).map_err(PasswordError::Hash)
}

/// Verify a plaintext password against a stored hash.
///
/// A mismatch is `Ok(false)`, not an error. An error means the stored
/// hash itself is structurally invalid.
pub fn verify_password(plaintext: &str, hashed: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(plaintext, hashed).map_err(PasswordError::Verify)
}

/// Errors from password hashing operations.
#[derive(Debug)]
pub enum PasswordError {
    /// Hashing failed (entropy or allocation failure)
    Hash(bcrypt::BcryptError),
    /// The stored hash is not a valid bcrypt string
    Verify(bcrypt::BcryptError),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Hash(e) => write!(f, "Failed to hash password: {}", e),
            PasswordError::Verify(e) => write!(f, "Invalid password hash: {}", e),
        }
    }
}

impl std::error::Error for PasswordError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_is_false_not_error() {
        let hash = hash_password("secret1").unwrap();
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let h1 = hash_password("secret1").unwrap();
        let h2 = hash_password("secret1").unwrap();
        assert_ne!(h1, h2);
        assert_ne!(h1, "secret1");
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("secret1", "not-a-bcrypt-hash").is_err());
    }
}
