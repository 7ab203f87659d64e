use actix_web::{delete, get, patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::recipe_service::{RecipeCreate, RecipeService, RecipeUpdate};

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

// Pagination simple (pages numérotées à partir de 1)
#[derive(Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

// Filtres optionnels, combinés en AND
#[derive(Deserialize)]
pub struct FilterParams {
    pub cooking_time: Option<i32>,
    pub categories: Option<String>, // ids séparés par des virgules: "1,2,3"
    pub query: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

// Réponse après création
#[derive(Serialize)]
pub struct RecipeCreateResponse {
    pub id: i32,
}

// Réponse après suppression
#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

fn parse_id_list(raw: &str) -> Result<Vec<i32>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| ApiError::Validation(format!("Invalid category id: {part}")))
        })
        .collect()
}

/// POST /recipes/add - Créer une recette (PROTÉGÉE)
#[post("/add")]
pub async fn add_recipe(
    auth_user: AuthUser,
    body: web::Json<RecipeCreate>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let recipe = RecipeService::add_recipe(db.get_ref(), &auth_user, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(RecipeCreateResponse { id: recipe.id }))
}

/// GET /recipes/list - Liste paginée (PUBLIC)
#[get("/list")]
pub async fn list_recipes(
    params: web::Query<PageParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let page = RecipeService::list(db.get_ref(), params.page, params.page_size).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /recipes/list/filter - Recherche filtrée et paginée (PUBLIC)
#[get("/list/filter")]
pub async fn filter_recipes(
    params: web::Query<FilterParams>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let categories = match params.categories.as_deref() {
        Some(raw) => Some(parse_id_list(raw)?),
        None => None,
    };

    let page = RecipeService::filter(
        db.get_ref(),
        params.cooking_time,
        categories,
        params.query.clone(),
        params.page,
        params.page_size,
    )
    .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /recipes/categories - Catégories disponibles (PUBLIC)
#[get("/categories")]
pub async fn list_categories(
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let categories = RecipeService::categories(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(categories))
}

/// GET /recipes/ingredients - Ingrédients disponibles (PUBLIC)
#[get("/ingredients")]
pub async fn list_ingredients(
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let ingredients = RecipeService::ingredients(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(ingredients))
}

/// GET /recipes/{recipe_id} - Une recette complète (PUBLIC)
#[get("/{recipe_id}")]
pub async fn get_recipe(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let recipe = RecipeService::get_by_id(db.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(recipe))
}

/// PATCH /recipes/{recipe_id} - Mise à jour partielle par l'auteur (PROTÉGÉE)
#[patch("/{recipe_id}")]
pub async fn update_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RecipeUpdate>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let recipe = RecipeService::update_recipe(
        db.get_ref(),
        &auth_user,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(recipe))
}

/// DELETE /recipes/{recipe_id} - Suppression par l'auteur (PROTÉGÉE)
#[delete("/{recipe_id}")]
pub async fn delete_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    RecipeService::delete_recipe(db.get_ref(), &auth_user, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(DeleteResponse { success: true }))
}

pub fn recipes_routes(cfg: &mut web::ServiceConfig) {
    // Les chemins littéraux avant le chemin dynamique /{recipe_id}
    cfg.service(
        web::scope("/recipes")
            .service(add_recipe)
            .service(filter_recipes)
            .service(list_recipes)
            .service(list_categories)
            .service(list_ingredients)
            .service(get_recipe)
            .service(update_recipe)
            .service(delete_recipe)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list(" 4 , 5 ").unwrap(), vec![4, 5]);
        assert_eq!(parse_id_list("").unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_parse_id_list_rejects_garbage() {
        assert!(matches!(
            parse_id_list("1,two,3"),
            Err(ApiError::Validation(_))
        ));
    }
}
