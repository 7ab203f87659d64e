use jsonwebtoken::{encode, decode, errors::ErrorKind, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use chrono::{Utc, Duration};
use thiserror::Error;
use std::env;

/// Durée de vie par défaut d'un token, en minutes
const DEFAULT_LIFETIME_MINUTES: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,      // user_id (immuable, contrairement à l'email)
    pub email: String,
    pub iat: i64,      // issued-at timestamp
    pub exp: i64,      // expiration timestamp
}

/// Un token refusé est soit expiré, soit invalide (signature/claims).
/// Les deux finissent en 401, mais on les distingue pour le diagnostic.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Failed to generate token: {0}")]
    Generation(String),
}

/// Récupère la clé secrète JWT depuis les variables d'environnement
fn get_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| {
        eprintln!("⚠️  WARNING: JWT_SECRET not found in .env, using default (INSECURE)");
        "default-insecure-key-change-this".to_string()
    })
}

/// Algorithme de signature configurable (HS256 par défaut)
fn get_algorithm() -> Algorithm {
    match env::var("JWT_ALGORITHM").as_deref() {
        Ok("HS384") => Algorithm::HS384,
        Ok("HS512") => Algorithm::HS512,
        _ => Algorithm::HS256,
    }
}

/// Durée de vie configurable du token, en minutes
fn get_lifetime_minutes() -> i64 {
    env::var("TOKEN_LIFETIME_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LIFETIME_MINUTES)
}

/// Génère un JWT token pour un utilisateur
pub fn generate_token(user_id: i32, email: &str) -> Result<String, TokenError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::minutes(get_lifetime_minutes()))
        .ok_or_else(|| TokenError::Generation("Failed to calculate expiration".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        iat: now.timestamp(),
        exp: expiration,
    };

    let secret = get_jwt_secret();

    encode(
        &Header::new(get_algorithm()),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Vérifie et décode un JWT token, en distinguant expiré de invalide
pub fn decode_token(token: &str) -> Result<Claims, TokenError> {
    let secret = get_jwt_secret();
    let mut validation = Validation::new(get_algorithm());
    validation.leeway = 0; // expiration exacte: valide avant now+L, expiré après

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_decode_token() {
        let user_id = 123;
        let email = "test@example.com";

        let token = generate_token(user_id, email).unwrap();
        let claims = decode_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token() {
        let result = decode_token("aaabbbccceeeeefffffggggg");
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token() {
        // Token forgé avec une expiration dans le passé
        let claims = Claims {
            sub: 1,
            email: "old@example.com".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::new(get_algorithm()),
            &claims,
            &EncodingKey::from_secret(get_jwt_secret().as_ref()),
        )
        .unwrap();

        let result = decode_token(&token);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn test_tampered_token_is_invalid_not_expired() {
        let token = generate_token(42, "a@b.com").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');

        let result = decode_token(&tampered);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }
}
