mod models;
mod routes;
mod db;
mod error;
mod services;
mod utils;
mod middleware;
use actix_web::{App, HttpServer, web};
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    println!("🔌 Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    println!("🚀 Starting server on http://{}:{}", host, port);

    let db = web::Data::new(db);
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .configure(routes::configure_routes)
    })
        .bind((host, port))?
        .run()
        .await
}
