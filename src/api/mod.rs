//! HTTP interface
//!
//! A thin axum layer over the store and the import pipeline. JSON for
//! single-entity operations, multipart uploads for CSV imports, and the
//! front-end UI served from a static directory for everything else.

pub mod error_response;
pub mod handlers;
pub mod middleware;
pub mod paths;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};

use crate::config::Settings;
use crate::import::ImportPipeline;
use crate::infrastructure::{Database, InventoryStore, SqliteStore};
use middleware::ApiMiddlewareStack;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub store: Arc<dyn InventoryStore>,
    pub imports: ImportPipeline,
}

impl AppState {
    pub fn new(database: Database) -> Self {
        let store: Arc<dyn InventoryStore> = Arc::new(SqliteStore::new(&database));
        Self {
            imports: ImportPipeline::new(Arc::clone(&store)),
            database,
            store,
        }
    }
}

/// Build the complete router, middleware included
pub fn router(state: AppState, settings: &Settings) -> Router {
    let imports = Router::new()
        .route(
            paths::APPLICATION_IMPORT,
            post(handlers::import_applications),
        )
        .route(paths::SERVER_IMPORT, post(handlers::import_servers))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.import.max_upload_bytes));

    let router = Router::new()
        .route(
            paths::APPLICATIONS,
            get(handlers::list_applications).post(handlers::create_application),
        )
        .route(paths::APPLICATION, put(handlers::update_application))
        .route(
            paths::APPLICATION_TEMPLATE,
            get(handlers::application_template),
        )
        .route(
            paths::SERVERS,
            get(handlers::list_servers).post(handlers::create_server),
        )
        .route(paths::SERVER_TEMPLATE, get(handlers::server_template))
        .route(paths::HEALTH, get(handlers::health))
        .merge(imports)
        .fallback_service(ServeDir::new(&settings.application.static_dir))
        .with_state(state);

    ApiMiddlewareStack::new(&settings.cors).apply_to_router(router)
}
