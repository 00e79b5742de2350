use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    dto::{
        form::CategoryForm,
        response::{CategoryResponse, MessageResponse},
    },
    errors::ApiResult,
    services,
    utils::request::BaseUrl,
    ServiceState,
};

pub async fn create(
    State(state): State<Arc<ServiceState>>,
    base: BaseUrl,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = CategoryForm::from_multipart(multipart).await?;
    info!(slug = ?form.slug, "Received 'create_category' request");

    let created = services::category::create(&state.db, &state.storage, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse::from_model(created, base.as_str())),
    ))
}

pub async fn list(
    State(state): State<Arc<ServiceState>>,
    base: BaseUrl,
) -> ApiResult<impl IntoResponse> {
    let categories = services::category::list(&state.db).await?;
    let response: Vec<CategoryResponse> = categories
        .into_iter()
        .map(|category| CategoryResponse::from_model(category, base.as_str()))
        .collect();
    Ok(Json(response))
}

pub async fn update(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<i32>,
    base: BaseUrl,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = CategoryForm::from_multipart(multipart).await?;
    info!(id, "Received 'update_category' request");

    let updated = services::category::update(&state.db, &state.storage, id, form).await?;

    Ok(Json(CategoryResponse::from_model(updated, base.as_str())))
}

pub async fn delete(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    info!(id, "Received 'delete_category' request");
    services::category::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
