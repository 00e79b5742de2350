use std::sync::Arc;

use crate::controllers::category;
use crate::utils::auth::require_admin;
use crate::ServiceState;
use axum::{
    middleware,
    routing::{get, post, put},
};

pub fn add_routers(
    router: axum::Router<Arc<ServiceState>>,
    state: Arc<ServiceState>,
) -> axum::Router<Arc<ServiceState>> {
    router
        .route("/categories", get(category::list))
        .route("/admin/categories", get(category::list))
        .route(
            "/admin/categories",
            post(category::create).layer(middleware::from_fn_with_state(
                state.clone(),
                require_admin,
            )),
        )
        .route(
            "/admin/categories/:id",
            put(category::update)
                .delete(category::delete)
                .layer(middleware::from_fn_with_state(state, require_admin)),
        )
}
