use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod views;

use config::Config;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        database = %config.database_url,
        addr = %config.bind_addr,
        diagnosis_delete_policy = %config.diagnosis_delete_policy,
        "starting medisample"
    );

    // create db connection pool; the schema is created here if missing
    let pool = db::init_pool(&config.database_url, config.pool_size)
        .with_context(|| format!("opening database {}", config.database_url))?;

    let policy = config.diagnosis_delete_policy;
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(policy))
            .configure(routes::configure)
    })
    .bind(config.bind_addr)?
    .run()
    .await?;

    Ok(())
}
