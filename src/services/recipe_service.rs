use std::collections::HashSet;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, QueryTrait, Select, Set, TransactionTrait,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::{AuthorInfo, RecipeDetail, RecipeListItem, RecipePage};
use crate::models::{category, category_value, ingredient, ingredient_value, recipe, users};
use crate::services::store::{self, StoreError};
use crate::services::user_service::UserService;
use crate::utils::html;

/// Longueur maximale de la description en vue liste
const LIST_DESCRIPTION_LIMIT: usize = 25;

#[derive(Debug, Deserialize)]
pub struct RecipeCreate {
    pub title: String,
    pub description: String,
    pub cooking_time: i32,
    #[serde(default)]
    pub categories: Vec<i32>,
    #[serde(default)]
    pub ingredients: Vec<i32>,
}

/// Mise à jour partielle: un champ absent ou vide = "pas de changement".
/// Conséquence assumée: impossible de vider toutes les associations.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cooking_time: Option<i32>,
    pub categories: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

pub struct RecipeService;

impl RecipeService {
    /// Crée une recette avec ses associations catégories/ingrédients.
    /// La ligne recette et toutes les lignes de jointure partent dans une
    /// seule transaction: un échec partiel annule tout.
    pub async fn add_recipe(
        db: &DatabaseConnection,
        auth: &AuthUser,
        data: RecipeCreate,
    ) -> Result<recipe::Model, ApiError> {
        let author = UserService::get_current(db, auth).await?;

        // Les noms sont résolus avant la transaction; un id inconnu
        // est rejeté ici (404) plutôt qu'en violation de FK
        let searchable_content = Self::build_searchable_content(
            db,
            &data.title,
            &data.description,
            &data.categories,
            &data.ingredients,
        )
        .await?;

        let txn = db
            .begin()
            .await
            .map_err(|e| ApiError::Server(e.to_string()))?;

        let new_recipe = recipe::ActiveModel {
            title: Set(data.title),
            description: Set(data.description),
            cooking_time: Set(data.cooking_time),
            author_id: Set(author.id),
            searchable_content: Set(searchable_content),
            ..Default::default()
        };

        // Un `?` ici abandonne la transaction, qui rollback au drop
        let created = store::create(&txn, new_recipe).await?;

        for category_id in data.categories {
            store::create(
                &txn,
                category_value::ActiveModel {
                    recipe_id: Set(created.id),
                    category_id: Set(category_id),
                },
            )
            .await?;
        }

        for ingredient_id in data.ingredients {
            store::create(
                &txn,
                ingredient_value::ActiveModel {
                    recipe_id: Set(created.id),
                    ingredient_id: Set(ingredient_id),
                },
            )
            .await?;
        }

        txn.commit()
            .await
            .map_err(|e| ApiError::Server(e.to_string()))?;

        Ok(created)
    }

    /// Liste paginée, sans filtre. Les pages sont numérotées à partir de 1.
    pub async fn list(
        db: &DatabaseConnection,
        page: u64,
        page_size: u64,
    ) -> Result<RecipePage, ApiError> {
        Self::paginate(db, recipe::Entity::find(), page, page_size).await
    }

    /// Recherche filtrée: tous les filtres fournis se combinent en AND.
    /// - cooking_time: égalité exacte
    /// - categories: appartenance "any of" via les lignes de jointure
    /// - query: recherche plein texte sur searchable_content
    /// Le total reflète l'ensemble filtré, indépendamment de la fenêtre.
    pub async fn filter(
        db: &DatabaseConnection,
        cooking_time: Option<i32>,
        categories: Option<Vec<i32>>,
        query: Option<String>,
        page: u64,
        page_size: u64,
    ) -> Result<RecipePage, ApiError> {
        let mut condition = Condition::all();

        if let Some(cooking_time) = cooking_time {
            condition = condition.add(recipe::Column::CookingTime.eq(cooking_time));
        }

        if let Some(category_ids) = categories.filter(|ids| !ids.is_empty()) {
            let subquery = category_value::Entity::find()
                .select_only()
                .column(category_value::Column::RecipeId)
                .filter(category_value::Column::CategoryId.is_in(category_ids))
                .into_query();
            condition = condition.add(recipe::Column::Id.in_subquery(subquery));
        }

        if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
            // searchable_content est déjà en minuscules, on aligne la requête
            condition = condition.add(Expr::cust_with_values(
                "to_tsvector(searchable_content) @@ plainto_tsquery(?)",
                [query.to_lowercase()],
            ));
        }

        Self::paginate(db, recipe::Entity::find().filter(condition), page, page_size).await
    }

    /// Une recette complète, avec auteur et ids des associations
    pub async fn get_by_id(db: &DatabaseConnection, recipe_id: i32) -> Result<RecipeDetail, ApiError> {
        let recipe = Self::find_recipe(db, recipe_id).await?;

        let author = store::get_one::<users::Entity>(
            db,
            Condition::all().add(users::Column::Id.eq(recipe.author_id)),
        )
        .await?;

        let categories = Self::current_category_ids(db, recipe_id).await?;
        let ingredients = Self::current_ingredient_ids(db, recipe_id).await?;

        Ok(RecipeDetail {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            cooking_time: recipe.cooking_time,
            author: AuthorInfo {
                id: author.id,
                email: author.email,
            },
            categories,
            ingredients,
        })
    }

    /// Mise à jour partielle par l'auteur uniquement.
    /// Ordre des vérifications: existence (404) puis propriété (403).
    /// Les associations sont diffées par ensembles: lignes de jointure
    /// ajoutées pour les nouveaux ids, supprimées pour les ids retirés.
    /// searchable_content n'est PAS recalculé ici.
    /// Répond avec la même forme complète que GET /recipes/{id}.
    pub async fn update_recipe(
        db: &DatabaseConnection,
        auth: &AuthUser,
        recipe_id: i32,
        data: RecipeUpdate,
    ) -> Result<RecipeDetail, ApiError> {
        let current = Self::find_recipe(db, recipe_id).await?;

        if auth.user_id != current.author_id {
            return Err(ApiError::Forbidden(
                "Access denied. You can edit only your own recipes",
            ));
        }

        let txn = db
            .begin()
            .await
            .map_err(|e| ApiError::Server(e.to_string()))?;

        let mut changed = false;

        if let Some(desired) = data.categories.as_deref().filter(|ids| !ids.is_empty()) {
            let current_ids: HashSet<i32> =
                Self::current_category_ids(&txn, recipe_id).await?.into_iter().collect();
            let desired: HashSet<i32> = desired.iter().copied().collect();
            let (to_add, to_remove) = association_diff(&current_ids, &desired);

            for category_id in to_add {
                store::create(
                    &txn,
                    category_value::ActiveModel {
                        recipe_id: Set(recipe_id),
                        category_id: Set(category_id),
                    },
                )
                .await?;
                changed = true;
            }
            for category_id in to_remove {
                store::delete_by_id::<category_value::Entity>(&txn, (recipe_id, category_id))
                    .await?;
                changed = true;
            }
        }

        if let Some(desired) = data.ingredients.as_deref().filter(|ids| !ids.is_empty()) {
            let current_ids: HashSet<i32> =
                Self::current_ingredient_ids(&txn, recipe_id).await?.into_iter().collect();
            let desired: HashSet<i32> = desired.iter().copied().collect();
            let (to_add, to_remove) = association_diff(&current_ids, &desired);

            for ingredient_id in to_add {
                store::create(
                    &txn,
                    ingredient_value::ActiveModel {
                        recipe_id: Set(recipe_id),
                        ingredient_id: Set(ingredient_id),
                    },
                )
                .await?;
                changed = true;
            }
            for ingredient_id in to_remove {
                store::delete_by_id::<ingredient_value::Entity>(&txn, (recipe_id, ingredient_id))
                    .await?;
                changed = true;
            }
        }

        // Champs scalaires: appliqués seulement si présents et non vides
        // (un cooking_time à 0 compte comme "pas de changement")
        let mut active: recipe::ActiveModel = current.into();
        let mut fields_changed = false;

        if let Some(title) = data.title.filter(|t| !t.is_empty()) {
            active.title = Set(title);
            fields_changed = true;
        }
        if let Some(description) = data.description.filter(|d| !d.is_empty()) {
            active.description = Set(description);
            fields_changed = true;
        }
        if let Some(cooking_time) = data.cooking_time.filter(|ct| *ct != 0) {
            active.cooking_time = Set(cooking_time);
            fields_changed = true;
        }

        if fields_changed {
            changed = true;
            store::update(&txn, active).await?;
        }

        if !changed {
            return Err(ApiError::Server("Nothing to update".to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| ApiError::Server(e.to_string()))?;

        Self::get_by_id(db, recipe_id).await
    }

    /// Suppression par l'auteur uniquement, lignes de jointure comprises
    pub async fn delete_recipe(
        db: &DatabaseConnection,
        auth: &AuthUser,
        recipe_id: i32,
    ) -> Result<(), ApiError> {
        let recipe = Self::find_recipe(db, recipe_id).await?;

        if auth.user_id != recipe.author_id {
            return Err(ApiError::Forbidden(
                "Access denied. You can delete only your own recipes",
            ));
        }

        let txn = db
            .begin()
            .await
            .map_err(|e| ApiError::Server(e.to_string()))?;

        // Les jointures d'abord, les FK pointent vers la recette
        category_value::Entity::delete_many()
            .filter(category_value::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(StoreError::from)?;
        ingredient_value::Entity::delete_many()
            .filter(ingredient_value::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await
            .map_err(StoreError::from)?;

        let deleted = store::delete_by_id::<recipe::Entity>(&txn, recipe_id).await?;

        txn.commit()
            .await
            .map_err(|e| ApiError::Server(e.to_string()))?;

        if !deleted {
            return Err(ApiError::NotFound("Recipe"));
        }

        Ok(())
    }

    /// Toutes les catégories disponibles (pour composer ou filtrer une recette)
    pub async fn categories(db: &DatabaseConnection) -> Result<Vec<category::Model>, ApiError> {
        store::get_list::<category::Entity>(db)
            .await
            .map_err(ApiError::from)
    }

    /// Tous les ingrédients disponibles
    pub async fn ingredients(db: &DatabaseConnection) -> Result<Vec<ingredient::Model>, ApiError> {
        store::get_list::<ingredient::Entity>(db)
            .await
            .map_err(ApiError::from)
    }

    async fn find_recipe(
        conn: &impl ConnectionTrait,
        recipe_id: i32,
    ) -> Result<recipe::Model, ApiError> {
        match store::get_one::<recipe::Entity>(
            conn,
            Condition::all().add(recipe::Column::Id.eq(recipe_id)),
        )
        .await
        {
            Ok(recipe) => Ok(recipe),
            Err(StoreError::NotFound) => Err(ApiError::NotFound("Recipe")),
            Err(e) => Err(e.into()),
        }
    }

    async fn paginate(
        db: &DatabaseConnection,
        select: Select<recipe::Entity>,
        page: u64,
        page_size: u64,
    ) -> Result<RecipePage, ApiError> {
        let paginator = select.paginate(db, page_size.max(1));

        let total = paginator.num_items().await.map_err(StoreError::from)?;
        let recipes = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(StoreError::from)?;

        let items = recipes
            .into_iter()
            .map(|r| RecipeListItem {
                id: r.id,
                title: r.title,
                description: truncate_description(&r.description),
                cooking_time: r.cooking_time,
                author_id: r.author_id,
            })
            .collect();

        Ok(RecipePage { items, total })
    }

    /// Assemble le blob recherchable: titre + description nettoyée du HTML
    /// + noms des catégories et ingrédients, tout en minuscules.
    /// Calculé une seule fois, à la création de la recette.
    async fn build_searchable_content(
        db: &DatabaseConnection,
        title: &str,
        description: &str,
        category_ids: &[i32],
        ingredient_ids: &[i32],
    ) -> Result<String, ApiError> {
        let mut names = Vec::new();

        for id in category_ids {
            let cat = store::get_one::<category::Entity>(
                db,
                Condition::all().add(category::Column::Id.eq(*id)),
            )
            .await?;
            names.push(cat.name);
        }

        for id in ingredient_ids {
            let ingr = store::get_one::<ingredient::Entity>(
                db,
                Condition::all().add(ingredient::Column::Id.eq(*id)),
            )
            .await?;
            names.push(ingr.name);
        }

        Ok(assemble_searchable_content(title, description, &names))
    }

    async fn current_category_ids(
        conn: &impl ConnectionTrait,
        recipe_id: i32,
    ) -> Result<Vec<i32>, ApiError> {
        let rows = category_value::Entity::find()
            .filter(category_value::Column::RecipeId.eq(recipe_id))
            .all(conn)
            .await
            .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(|row| row.category_id).collect())
    }

    async fn current_ingredient_ids(
        conn: &impl ConnectionTrait,
        recipe_id: i32,
    ) -> Result<Vec<i32>, ApiError> {
        let rows = ingredient_value::Entity::find()
            .filter(ingredient_value::Column::RecipeId.eq(recipe_id))
            .all(conn)
            .await
            .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(|row| row.ingredient_id).collect())
    }
}

fn assemble_searchable_content(title: &str, description: &str, names: &[String]) -> String {
    let mut parts = vec![
        title.to_lowercase(),
        html::strip_markup(description).to_lowercase(),
    ];
    parts.extend(names.iter().map(|name| name.to_lowercase()));
    parts.retain(|part| !part.is_empty());
    parts.join(" ")
}

/// Diff entre associations courantes et désirées.
/// Retourne (à ajouter, à retirer), triés pour un ordre d'exécution stable.
fn association_diff(current: &HashSet<i32>, desired: &HashSet<i32>) -> (Vec<i32>, Vec<i32>) {
    let mut to_add: Vec<i32> = desired.difference(current).copied().collect();
    let mut to_remove: Vec<i32> = current.difference(desired).copied().collect();
    to_add.sort_unstable();
    to_remove.sort_unstable();
    (to_add, to_remove)
}

/// Tronque la description pour les vues liste (25 caractères + "...")
fn truncate_description(description: &str) -> String {
    let mut chars = description.chars();
    let truncated: String = chars.by_ref().take(LIST_DESCRIPTION_LIMIT).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn recipe_fixture(author_id: i32) -> recipe::Model {
        recipe::Model {
            id: 5,
            title: "Soup".to_string(),
            description: "hot soup".to_string(),
            cooking_time: 20,
            author_id,
            searchable_content: "soup hot soup".to_string(),
        }
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        // La recette appartient à l'utilisateur 99, l'appelant est le 1
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![recipe_fixture(99)]])
            .into_connection();

        let caller = AuthUser {
            user_id: 1,
            email: "other@example.com".to_string(),
        };
        let data = RecipeUpdate {
            title: Some("Hijacked".to_string()),
            cooking_time: Some(5),
            ..Default::default()
        };

        let result = RecipeService::update_recipe(&db, &caller, 5, data).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![recipe_fixture(99)]])
            .into_connection();

        let caller = AuthUser {
            user_id: 1,
            email: "other@example.com".to_string(),
        };

        let result = RecipeService::delete_recipe(&db, &caller, 5).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_unknown_recipe_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<recipe::Model>::new()])
            .into_connection();

        let caller = AuthUser {
            user_id: 1,
            email: "other@example.com".to_string(),
        };

        let result = RecipeService::update_recipe(&db, &caller, 123, RecipeUpdate::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filter_total_independent_of_page_window() {
        // 12 lignes correspondent au filtre, la fenêtre n'en montre qu'une
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(12)),
            )])]])
            .append_query_results([vec![recipe_fixture(1)]])
            .into_connection();

        let page = RecipeService::filter(&db, Some(30), None, None, 2, 1)
            .await
            .unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_association_diff_adds_and_removes() {
        // catégories [1,2] -> [2,3]: 1 retiré, 3 ajouté, 2 intact
        let current: HashSet<i32> = [1, 2].into_iter().collect();
        let desired: HashSet<i32> = [2, 3].into_iter().collect();

        let (to_add, to_remove) = association_diff(&current, &desired);
        assert_eq!(to_add, vec![3]);
        assert_eq!(to_remove, vec![1]);
    }

    #[test]
    fn test_association_diff_no_change() {
        let current: HashSet<i32> = [4, 5].into_iter().collect();
        let desired = current.clone();

        let (to_add, to_remove) = association_diff(&current, &desired);
        assert!(to_add.is_empty());
        assert!(to_remove.is_empty());
    }

    #[test]
    fn test_searchable_content_strips_markup_and_lowercases() {
        let names = vec!["Soups".to_string(), "Carrot".to_string()];
        let content = assemble_searchable_content("Hot Soup", "<b>hot</b> soup", &names);
        assert_eq!(content, "hot soup hot soup soups carrot");
    }

    #[test]
    fn test_searchable_content_without_associations() {
        let content = assemble_searchable_content("Toast", "Just &amp; bread", &[]);
        assert_eq!(content, "toast just bread");
    }

    #[test]
    fn test_truncate_long_description() {
        let long = "a very long description that keeps going";
        let truncated = truncate_description(long);
        assert_eq!(truncated, format!("{}...", &long[..25]));
        assert_eq!(truncated.chars().count(), 28);
    }

    #[test]
    fn test_truncate_short_description_untouched() {
        assert_eq!(truncate_description("short"), "short");
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        // Plus de 25 caractères, avec accents: la coupe se fait par caractère
        let text = "crème brûlée aux éclats dorée";
        let truncated = truncate_description(text);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 28);
    }
}
