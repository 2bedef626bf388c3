use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use bookstore_service::{
    api::stripe::StripeGateway,
    app::{bootstrap, config, db, state::AppState, swagger},
    routes,
    store::PgStore,
};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Migrations embedded into the binary so the image ships without SQL files.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load()?;

    let (router, mut openapi) = routes::router().split_for_parts();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Bookstore API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi);

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let pool = db::create_pool(&config.database).await?;
    let payments = StripeGateway::new(reqwest::Client::new(), &config.stripe);
    let server = config.server.clone();
    let state = AppState::new(Arc::new(PgStore::new(pool)), Arc::new(payments), config);

    let app = Router::new()
        .merge(router.with_state(state))
        .merge(swagger_ui);

    tracing::info!("Bootstrapping...");
    bootstrap::serve("Bookstore", app, &server).await?;
    Ok(())
}
