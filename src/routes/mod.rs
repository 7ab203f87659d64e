pub mod health;
pub mod users;
pub mod recipes;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        .configure(users::users_routes)
        .configure(recipes::recipes_routes);
}
