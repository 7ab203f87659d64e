// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - users : Utilisateurs (email unique + hash de mot de passe)
//   - recipe : Recettes (titre, description, temps de cuisson, auteur,
//              contenu recherchable dénormalisé)
//   - category : Catégories de recettes (arbre via parent_id)
//   - ingredient : Ingrédients
//   - category_value : Lignes de jointure recette <-> catégorie
//   - ingredient_value : Lignes de jointure recette <-> ingrédient
//   - dto : Data Transfer Objects pour les réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les jointures many-to-many ont une clé primaire composite
//   - Les relations entre tables sont définies dans chaque modèle
//
// ============================================================================

pub mod health;
pub mod users;
pub mod recipe;
pub mod category;
pub mod ingredient;
pub mod category_value;
pub mod ingredient_value;
pub mod dto;
