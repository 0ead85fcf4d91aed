//! PBKDF2 password hashing adapter.
//!
//! Hashes are PHC strings (`$pbkdf2-sha256$i=...,l=32$salt$hash`) so the
//! round count travels with each stored credential and can be raised later
//! without invalidating existing accounts.

use pbkdf2::Pbkdf2;
use pbkdf2::password_hash::{
    Error as PhcError, PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _,
    SaltString,
};
use rand::Rng;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Default PBKDF2-SHA256 iteration count.
pub const DEFAULT_PASSWORD_ROUNDS: u32 = 100_000;

const OUTPUT_LENGTH: usize = 32;
const SALT_BYTES: usize = 16;

/// [`PasswordHasher`] backed by PBKDF2-HMAC-SHA256.
///
/// # Examples
/// ```
/// use labflow::domain::ports::PasswordHasher;
/// use labflow::outbound::credentials::Pbkdf2PasswordHasher;
///
/// let hasher = Pbkdf2PasswordHasher::new(1_000);
/// let hash = hasher.hash("tech123").unwrap();
/// assert!(hasher.verify("tech123", &hash).unwrap());
/// assert!(!hasher.verify("tech124", &hash).unwrap());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2PasswordHasher {
    rounds: u32,
}

impl Pbkdf2PasswordHasher {
    /// Hasher producing hashes with `rounds` iterations.
    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_ROUNDS)
    }
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let mut salt_bytes = [0_u8; SALT_BYTES];
        rand::rng().fill(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        let params = pbkdf2::Params {
            rounds: self.rounds,
            output_length: OUTPUT_LENGTH,
        };
        let hash = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(PasswordHash::new(hash.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed = PhcHash::new(hash.as_str())
            .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
        match Pbkdf2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::malformed_hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Pbkdf2PasswordHasher {
        Pbkdf2PasswordHasher::new(1_000)
    }

    #[rstest]
    fn hashes_are_salted_phc_strings(hasher: Pbkdf2PasswordHasher) {
        let first = hasher.hash("admin123").expect("hash");
        let second = hasher.hash("admin123").expect("hash");

        assert!(first.as_str().starts_with("$pbkdf2-sha256$i=1000,l=32$"));
        assert_ne!(first, second);
    }

    #[rstest]
    fn verification_matches_only_the_original_password(hasher: Pbkdf2PasswordHasher) {
        let hash = hasher.hash("super123").expect("hash");

        assert!(hasher.verify("super123", &hash).expect("verify"));
        assert!(!hasher.verify("Super123", &hash).expect("verify"));
    }

    #[rstest]
    fn round_counts_come_from_the_stored_hash(hasher: Pbkdf2PasswordHasher) {
        let hash = hasher.hash("tech123").expect("hash");

        assert!(
            Pbkdf2PasswordHasher::new(5_000)
                .verify("tech123", &hash)
                .expect("verify")
        );
    }

    #[rstest]
    fn malformed_hashes_are_errors(hasher: Pbkdf2PasswordHasher) {
        let err = hasher
            .verify("pw", &PasswordHash::new("plaintext"))
            .expect_err("not a PHC string");

        assert!(matches!(err, PasswordHasherError::MalformedHash { .. }));
    }
}
