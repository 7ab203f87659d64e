use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::services::store::StoreError;
use crate::utils::jwt::TokenError;

/// Taxonomie des erreurs exposées aux clients.
/// Chaque variante correspond à un statut HTTP et un corps {"error": ...}.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Invalid email or password")]
    WrongCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Server(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::WrongCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

// La cause BD est conservée dans le message du 500 au lieu d'être avalée
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Resource"),
            other => ApiError::Server(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound("Recipe").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::WrongCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("Access denied").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Server("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let api: ApiError = StoreError::NotFound.into();
        assert!(matches!(api, ApiError::NotFound(_)));

        let api: ApiError = StoreError::Connectivity("pool closed".to_string()).into();
        assert!(matches!(api, ApiError::Server(_)));
    }
}
