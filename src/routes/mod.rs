pub mod admin;
pub mod category;
pub mod item;
use std::sync::Arc;

use crate::{controllers::health, ServiceState};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn create_router(state: Arc<ServiceState>) -> Router {
    let router = Router::new().route("/", get(health::root));
    let router = admin::add_routers(router, state.clone());
    let router = category::add_routers(router, state.clone());
    let router = item::add_routers(router, state.clone());

    router
        .nest_service("/uploads", ServeDir::new(state.storage.root()))
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(state.config.upload.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}
