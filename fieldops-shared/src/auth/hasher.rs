/// Credential hashing for password storage and verification
///
/// Passwords are never stored in plaintext. Each user gets a random
/// high-entropy salt at registration, and the stored digest is an
/// HMAC-SHA256 keyed by `salt + "/" + password` over a process-wide
/// secret. Recomputing the digest with the stored salt and a supplied
/// password is how login verifies credentials.
///
/// Mixing the process-wide secret into the digest means a leaked
/// database dump alone is not enough to brute-force passwords offline;
/// the attacker also needs the secret.
///
/// # Example
///
/// ```
/// use fieldops_shared::auth::hasher::{random_salt, CredentialHasher};
///
/// let hasher = CredentialHasher::new("process-secret");
/// let salt = random_salt();
///
/// let digest = hasher.digest(&salt, "pw1");
///
/// // Deterministic for the same (salt, password, secret) triple
/// assert_eq!(digest, hasher.digest(&salt, "pw1"));
///
/// // 32-byte HMAC-SHA256 output, base64-encoded
/// assert_eq!(digest.len(), 44);
/// ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Width of the raw salt in bytes, before base64 encoding.
pub const SALT_BYTES: usize = 128;

/// Generates a fresh high-entropy salt, base64-encoded.
///
/// Called once per user at registration. 128 bytes from the OS CSPRNG,
/// so salts are unpredictable and collisions are not a practical concern.
pub fn random_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Keyed credential hasher.
///
/// Holds the process-wide hashing secret, injected once at startup from
/// configuration rather than read ambiently from the environment.
#[derive(Clone)]
pub struct CredentialHasher {
    secret: String,
}

impl CredentialHasher {
    /// Creates a hasher around the process-wide hashing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Computes the storage digest for a (salt, password) pair.
    ///
    /// Deterministic: the same salt, password, and process secret always
    /// produce the same digest. The output is the base64 encoding of a
    /// 32-byte HMAC-SHA256 value, so it is always exactly 44 characters.
    pub fn digest(&self, salt: &str, password: &str) -> String {
        let key = format!("{}/{}", salt, password);
        // HMAC-SHA256 accepts keys of arbitrary length
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(self.secret.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print the secret
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let hasher = CredentialHasher::new("secret");
        let salt = random_salt();

        assert_eq!(hasher.digest(&salt, "password"), hasher.digest(&salt, "password"));
    }

    #[test]
    fn test_digest_is_44_base64_chars() {
        let hasher = CredentialHasher::new("secret");
        let digest = hasher.digest(&random_salt(), "password");

        assert_eq!(digest.len(), 44);
        assert!(BASE64.decode(&digest).is_ok());
        assert_eq!(BASE64.decode(&digest).unwrap().len(), 32);
    }

    #[test]
    fn test_digest_differs_by_salt() {
        let hasher = CredentialHasher::new("secret");

        let a = hasher.digest(&random_salt(), "password");
        let b = hasher.digest(&random_salt(), "password");

        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_differs_by_password() {
        let hasher = CredentialHasher::new("secret");
        let salt = random_salt();

        assert_ne!(hasher.digest(&salt, "password1"), hasher.digest(&salt, "password2"));
    }

    #[test]
    fn test_digest_differs_by_process_secret() {
        let salt = random_salt();

        let a = CredentialHasher::new("secret-a").digest(&salt, "password");
        let b = CredentialHasher::new("secret-b").digest(&salt, "password");

        assert_ne!(a, b);
    }

    #[test]
    fn test_random_salt_has_full_width() {
        let salt = random_salt();
        let raw = BASE64.decode(&salt).expect("salt should be valid base64");

        assert_eq!(raw.len(), SALT_BYTES);
    }

    #[test]
    fn test_random_salt_is_unique() {
        assert_ne!(random_salt(), random_salt());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let hasher = CredentialHasher::new("super-secret-value");
        let printed = format!("{:?}", hasher);

        assert!(!printed.contains("super-secret-value"));
    }
}
