pub mod agents;
pub mod config;
pub mod dbs;
mod handlers;
pub mod normalize;
pub mod remote;
pub mod resolver;

use crate::config::Settings;
use crate::dbs::HeroStore;
use crate::handlers::query_heroes;
use crate::resolver::{ResolverFactory, SettingsResolverFactory};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub resolvers: Arc<dyn ResolverFactory>,
}

impl AppState {
    pub fn new(resolvers: Arc<dyn ResolverFactory>) -> Self {
        Self { resolvers }
    }

    pub fn from_settings(settings: Settings, store: Arc<dyn HeroStore>) -> Self {
        Self::new(Arc::new(SettingsResolverFactory::new(Arc::new(settings), store)))
    }
}

pub fn init(router: Router<AppState>, state: AppState) -> Router<()> {
    router
        .route("/api/health", get(|| async { "OK" }))
        .route("/heroes", get(query_heroes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
