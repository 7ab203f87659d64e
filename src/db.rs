// connexion BD

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;

/// DATABASE_URL prime; sinon l'URL est assemblée depuis les
/// variables POSTGRES_* individuelles
fn database_url() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        return url;
    }

    let user = env::var("POSTGRES_USER").expect("DATABASE_URL or POSTGRES_* must be set in .env");
    let password = env::var("POSTGRES_PASSWORD").expect("POSTGRES_PASSWORD must be set");
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db = env::var("POSTGRES_DB").expect("POSTGRES_DB must be set");

    format!("postgresql://{user}:{password}@{host}:{port}/{db}")
}

pub async fn establish_connection() -> Result<DatabaseConnection, DbErr> {
    Database::connect(&database_url()).await
}
