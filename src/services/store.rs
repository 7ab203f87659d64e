// Couche d'accès générique: CRUD paramétré sur le type d'entité SeaORM.
// Chaque fonction prend un ConnectionTrait, donc le même appel fonctionne
// sur la connexion directe ou à l'intérieur d'une DatabaseTransaction.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PrimaryKeyTrait, QueryFilter, SqlErr,
};
use thiserror::Error;

/// Erreurs de la couche de persistance, classifiées au lieu d'être
/// avalées en résultats vides: le NotFound logique reste distinct
/// d'une panne de connexion ou d'une violation de contrainte.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Row not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database connectivity failure: {0}")]
    Connectivity(String),

    #[error("Database error: {0}")]
    Other(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if let Some(sql_err) = err.sql_err() {
            return match sql_err {
                SqlErr::UniqueConstraintViolation(msg) => StoreError::ConstraintViolation(msg),
                SqlErr::ForeignKeyConstraintViolation(msg) => StoreError::ConstraintViolation(msg),
                _ => StoreError::Other(err.to_string()),
            };
        }

        match &err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => StoreError::NotFound,
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                StoreError::Connectivity(err.to_string())
            }
            _ => StoreError::Other(err.to_string()),
        }
    }
}

/// Insère une ligne et retourne la représentation persistée
/// (champs générés inclus)
pub async fn create<A>(
    conn: &impl ConnectionTrait,
    model: A,
) -> Result<<A::Entity as EntityTrait>::Model, StoreError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    model.insert(conn).await.map_err(StoreError::from)
}

/// Sélectionne une ligne par filtre d'égalité; au plus une attendue
pub async fn get_one<E>(
    conn: &impl ConnectionTrait,
    condition: Condition,
) -> Result<E::Model, StoreError>
where
    E: EntityTrait,
{
    E::find()
        .filter(condition)
        .one(conn)
        .await
        .map_err(StoreError::from)?
        .ok_or(StoreError::NotFound)
}

/// Toutes les lignes d'une table
pub async fn get_list<E>(conn: &impl ConnectionTrait) -> Result<Vec<E::Model>, StoreError>
where
    E: EntityTrait,
{
    E::find().all(conn).await.map_err(StoreError::from)
}

/// Met à jour une ligne par sa clé primaire (portée par l'ActiveModel)
/// et retourne la représentation après mise à jour
pub async fn update<A>(
    conn: &impl ConnectionTrait,
    model: A,
) -> Result<<A::Entity as EntityTrait>::Model, StoreError>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    model.update(conn).await.map_err(StoreError::from)
}

/// Supprime par clé primaire. Ok(false) quand aucune ligne n'a été touchée:
/// "rien à supprimer" est distingué de l'exécution réussie.
pub async fn delete_by_id<E>(
    conn: &impl ConnectionTrait,
    id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType,
) -> Result<bool, StoreError>
where
    E: EntityTrait,
{
    let result = E::delete_by_id(id)
        .exec(conn)
        .await
        .map_err(StoreError::from)?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ingredient;
    use sea_orm::{ColumnTrait, DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_get_list_returns_all_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                ingredient::Model {
                    id: 1,
                    name: "salt".to_string(),
                },
                ingredient::Model {
                    id: 2,
                    name: "pepper".to_string(),
                },
            ]])
            .into_connection();

        let rows = get_list::<ingredient::Entity>(&db).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "pepper");
    }

    #[tokio::test]
    async fn test_get_one_no_match_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ingredient::Model>::new()])
            .into_connection();

        let result = get_one::<ingredient::Entity>(
            &db,
            Condition::all().add(ingredient::Column::Id.eq(42)),
        )
        .await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[test]
    fn test_record_not_found_classification() {
        let err: StoreError = DbErr::RecordNotFound("recipes".to_string()).into();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_record_not_updated_classification() {
        let err: StoreError = DbErr::RecordNotUpdated.into();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_unclassified_error_is_other() {
        let err: StoreError = DbErr::Custom("oops".to_string()).into();
        assert!(matches!(err, StoreError::Other(_)));
    }
}
