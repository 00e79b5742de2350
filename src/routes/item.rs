use std::sync::Arc;

use crate::controllers::item;
use crate::utils::auth::require_admin;
use crate::ServiceState;
use axum::{
    middleware,
    routing::{get, post},
};

pub fn add_routers(
    router: axum::Router<Arc<ServiceState>>,
    state: Arc<ServiceState>,
) -> axum::Router<Arc<ServiceState>> {
    router
        .route(
            "/admin/items",
            post(item::create).layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin,
            )),
        )
        .route(
            "/admin/items/:id",
            get(item::get)
                .put(item::update)
                .delete(item::delete)
                .layer(middleware::from_fn_with_state(state, require_admin)),
        )
}
