//! Confirmation-token key generation.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of a confirmation token key.
pub const TOKEN_KEY_LENGTH: usize = 64;

/// Source of opaque token keys.
///
/// Injected into [`crate::services::AccountService`] so tests can pin the
/// generated key instead of fishing it out of the database.
pub trait TokenGenerator: Send + Sync {
    /// Produce a fresh opaque key.
    fn generate_key(&self) -> String;
}

/// Default generator backed by the OS entropy pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn generate_key(&self) -> String {
        let mut rng = rand::rng();
        (0..TOKEN_KEY_LENGTH)
            .map(|_| rng.sample(Alphanumeric) as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_are_long_and_alphanumeric() {
        let generator = OsTokenGenerator;
        let key = generator.generate_key();
        assert_eq!(key.len(), TOKEN_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_keys_differ() {
        let generator = OsTokenGenerator;
        assert_ne!(generator.generate_key(), generator.generate_key());
    }
}
