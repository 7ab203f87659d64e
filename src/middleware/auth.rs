use actix_web::{dev::Payload, Error, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::utils::jwt;

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

fn unauthorized(message: String) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

/// Implémentation de FromRequest pour AuthUser
/// Cela permet à Actix-Web d'extraire automatiquement AuthUser des requêtes
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extraire le header Authorization
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => {
                return ready(Err(unauthorized(
                    "Missing Authorization header".to_string(),
                )));
            }
        };

        let auth_str = match auth_header.to_str() {
            Ok(s) => s,
            Err(_) => {
                return ready(Err(unauthorized(
                    "Invalid Authorization header".to_string(),
                )));
            }
        };

        // 2. Extraire le token (format: "Bearer <token>")
        let token = match auth_str.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                return ready(Err(unauthorized(
                    "Invalid Authorization format (expected: Bearer <token>)".to_string(),
                )));
            }
        };

        // 3. Vérifier le token JWT. Expiré et invalide finissent tous deux
        // en 401, le message fait la différence.
        let claims = match jwt::decode_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                return ready(Err(unauthorized(e.to_string())));
            }
        };

        // 4. Créer et retourner AuthUser
        ready(Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        }))
    }
}
