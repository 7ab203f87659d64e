//pour les réponses structurées
use serde::Serialize;

// Auteur embarqué dans une recette (jamais le hash du mot de passe)
#[derive(Debug, Serialize)]
pub struct AuthorInfo {
    pub id: i32,
    pub email: String,
}

// 1 recette complète (GET /recipes/{id})
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub cooking_time: i32,
    pub author: AuthorInfo,
    pub categories: Vec<i32>,
    pub ingredients: Vec<i32>,
}

// 1 recette en vue liste: description tronquée à 25 caractères + "..."
#[derive(Debug, Serialize)]
pub struct RecipeListItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub cooking_time: i32,
    pub author_id: i32,
}

// Page de résultats: total = nombre de lignes filtrées, indépendant de la page
#[derive(Debug, Serialize)]
pub struct RecipePage {
    pub items: Vec<RecipeListItem>,
    pub total: u64,
}
