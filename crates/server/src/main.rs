mod handlers;
mod origin;
mod pagination;
mod scan_client;
mod schema;
mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use aide::{axum::ApiRouter, openapi::OpenApi};
use axum::{Extension, Router, Server};
use common::{config::Config, logging, origin::OriginResolver};
use db::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::new()?;

    logging::init(&config);

    let Some(server_config) = config.server.as_ref() else {
        return Err(anyhow::Error::msg("unable to load server config"));
    };

    let resolver = Arc::new(OriginResolver::from_config(&config.origin)?);

    info!("connecting to database");
    let database = Arc::new(Database::connect(&config.database.url).await?);
    let server = Server::bind(&server_config.address);

    info!(
        address = %server_config.address,
        fallback_origin = %resolver.fallback(),
        "serving code requests"
    );

    server
        .serve(app_router(database, resolver).into_make_service())
        .await?;

    Ok(())
}

fn app_router(database: Arc<DatabaseConnection>, resolver: Arc<OriginResolver>) -> Router {
    let mut api = OpenApi::default();

    ApiRouter::new()
        .nest("/codes", handlers::codes::routes())
        .nest("/docs", handlers::docs::routes())
        .merge(handlers::scan::routes())
        .finish_api_with(&mut api, |api| {
            api.title("Dynamic code API")
                .description("Mint, edit and resolve dynamic optical codes.")
        })
        .layer(Extension(Arc::new(api)))
        .layer(Extension(resolver))
        .with_state(database)
}
