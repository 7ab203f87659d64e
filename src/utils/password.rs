use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid hash format")]
    InvalidFormat,
    #[error("Hashing failed: {0}")]
    Hashing(String),
}

/// Hash un mot de passe au format Werkzeug
/// PBKDF2-HMAC-SHA256, 260000 itérations, salt aléatoire de 16 bytes
/// Format produit: pbkdf2:sha256:iterations$salt$hash (base64 URL-safe sans padding)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", ITERATIONS, salt_b64, hash_b64))
}

/// Vérifie un mot de passe contre un hash stocké
/// Les itérations sont relues depuis le header, pas depuis la constante
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    // Format attendu: pbkdf2:sha256:iterations$salt$hash
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err(PasswordError::InvalidFormat);
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err(PasswordError::InvalidFormat);
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| PasswordError::InvalidFormat)?;

    let salt = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| PasswordError::InvalidFormat)?;
    let expected_hash = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| PasswordError::InvalidFormat)?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;

    Ok(computed == expected_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("pbkdf2:sha256:260000$"));
        assert!(verify_password("s3cret", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_two_hashes_differ() {
        // Le salt est aléatoire, deux hashs du même mot de passe diffèrent
        let h1 = hash_password("same").unwrap();
        let h2 = hash_password("same").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("same", &h1).unwrap());
        assert!(verify_password("same", &h2).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            verify_password("x", "not-a-valid-hash"),
            Err(PasswordError::InvalidFormat)
        ));
        assert!(matches!(
            verify_password("x", "scrypt:sha256:1$abc$def"),
            Err(PasswordError::InvalidFormat)
        ));
    }
}
