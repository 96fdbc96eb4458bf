use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPool;
use std::sync::Arc;

use tasknest::auth::AuthMiddleware;
use tasknest::config::Config;
use tasknest::error::json_error_handler;
use tasknest::routes;
use tasknest::store::{PgStore, TaskStore, UserStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    let store = Arc::new(PgStore::new(pool));
    let users: Arc<dyn UserStore> = store.clone();
    let tasks: Arc<dyn TaskStore> = store;

    log::info!("Starting TaskNest server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::from(users.clone()))
            .app_data(web::Data::from(tasks.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(users.clone(), &config))
                    .configure(routes::config),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
