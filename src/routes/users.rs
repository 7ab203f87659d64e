use actix_web::{post, get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::user_service::UserService;

// DTO pour l'inscription
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Réponse après inscription
#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i32,
}

// Réponse après login
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

// Réponse pour /users/profile
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub email: String,
}

/// POST /users/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let user = UserService::register(db.get_ref(), &body.email, &body.password).await?;

    Ok(HttpResponse::Ok().json(RegisterResponse { id: user.id }))
}

/// POST /users/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let access_token = UserService::login(db.get_ref(), &body.email, &body.password).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { access_token }))
}

/// GET /users/profile - Profil de l'utilisateur courant (PROTÉGÉE)
#[get("/profile")]
pub async fn profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::get_current(db.get_ref(), &auth_user).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: user.id,
        email: user.email,
    }))
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(register)
            .service(login)
            .service(profile)
    );
}
