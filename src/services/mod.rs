pub mod store;
pub mod user_service;
pub mod recipe_service;
