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
        form::ItemForm,
        response::{ItemResponse, MessageResponse},
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
    let form = ItemForm::from_multipart(multipart).await?;
    info!(
        slug = ?form.slug,
        images = form.images.len(),
        "Received 'create_item' request"
    );

    let created = services::item::create(&state.db, &state.storage, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse::from_detail(created, base.as_str())),
    ))
}

pub async fn get(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<i32>,
    base: BaseUrl,
) -> ApiResult<impl IntoResponse> {
    let detail = services::item::get(&state.db, id).await?;
    Ok(Json(ItemResponse::from_detail(detail, base.as_str())))
}

pub async fn update(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = ItemForm::from_multipart(multipart).await?;
    info!(
        id,
        images = form.images.len(),
        categories = form.category_ids.is_some(),
        prices = form.prices.as_ref().map(Vec::len),
        "Received 'update_item' request"
    );

    services::item::update(&state.db, &state.storage, id, form).await?;

    Ok(Json(MessageResponse::new("Item updated successfully")))
}

pub async fn delete(
    State(state): State<Arc<ServiceState>>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    info!(id, "Received 'delete_item' request");
    services::item::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Item deleted successfully")))
}
