use sea_orm::{ColumnTrait, Condition, DatabaseConnection, Set};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::users::{self, Column as UserColumn};
use crate::services::store::{self, StoreError};
use crate::utils::{jwt, password};

pub struct UserService;

impl UserService {
    /// Crée un compte: hash du mot de passe puis insertion.
    /// L'email est unique en base, un doublon remonte en 409.
    pub async fn register(
        db: &DatabaseConnection,
        email: &str,
        plain_password: &str,
    ) -> Result<users::Model, ApiError> {
        let password_hash = password::hash_password(plain_password)
            .map_err(|e| ApiError::Server(e.to_string()))?;

        let new_user = users::ActiveModel {
            email: Set(email.to_string()),
            password: Set(password_hash),
            ..Default::default()
        };

        match store::create(db, new_user).await {
            Ok(user) => Ok(user),
            Err(StoreError::ConstraintViolation(_)) => {
                Err(ApiError::Conflict("Email already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Vérifie les identifiants et émet un token.
    /// Email inconnu -> 404, mauvais mot de passe -> 401 (jamais de token).
    pub async fn login(
        db: &DatabaseConnection,
        email: &str,
        plain_password: &str,
    ) -> Result<String, ApiError> {
        let user = match store::get_one::<users::Entity>(
            db,
            Condition::all().add(UserColumn::Email.eq(email)),
        )
        .await
        {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(ApiError::NotFound("User")),
            Err(e) => return Err(e.into()),
        };

        let is_valid = password::verify_password(plain_password, &user.password)
            .map_err(|e| ApiError::Server(e.to_string()))?;

        if !is_valid {
            return Err(ApiError::WrongCredentials);
        }

        jwt::generate_token(user.id, &user.email).map_err(ApiError::from)
    }

    /// Résout l'utilisateur courant depuis les claims du token.
    /// La recherche se fait par id (claim sub), pas par email.
    /// Tout échec est un 401, jamais une faute non gérée.
    pub async fn get_current(
        db: &DatabaseConnection,
        auth: &AuthUser,
    ) -> Result<users::Model, ApiError> {
        store::get_one::<users::Entity>(db, Condition::all().add(UserColumn::Id.eq(auth.user_id)))
            .await
            .map_err(|_| ApiError::Unauthorized("Unknown user for this token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_fixture(password_hash: String) -> users::Model {
        users::Model {
            id: 7,
            email: "a@b.com".to_string(),
            password: password_hash,
        }
    }

    #[tokio::test]
    async fn test_register_then_login_yields_token() {
        let hash = password::hash_password("x").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // insertion avec RETURNING, puis lookup par email au login
            .append_query_results([vec![user_fixture(hash.clone())]])
            .append_query_results([vec![user_fixture(hash)]])
            .into_connection();

        let registered = UserService::register(&db, "a@b.com", "x").await.unwrap();
        assert_eq!(registered.id, 7);

        let token = UserService::login(&db, "a@b.com", "x").await.unwrap();
        let claims = jwt::decode_token(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password_never_yields_token() {
        let hash = password::hash_password("right").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_fixture(hash)]])
            .into_connection();

        let result = UserService::login(&db, "a@b.com", "wrong").await;
        assert!(matches!(result, Err(ApiError::WrongCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .into_connection();

        let result = UserService::login(&db, "ghost@b.com", "x").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
