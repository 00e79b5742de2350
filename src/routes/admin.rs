use std::sync::Arc;

use crate::controllers::admin;
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
    router.route("/admin/login", post(admin::login)).route(
        "/admin/test",
        get(admin::protected).layer(middleware::from_fn_with_state(state, require_admin)),
    )
}
