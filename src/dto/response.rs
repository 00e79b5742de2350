use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{entity, utils::storage::url_for};

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub role: String,
}

impl From<entity::user::Model> for UserResponse {
    fn from(user: entity::user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub icon: String,
}

impl CategoryResponse {
    pub fn from_model(model: entity::category::Model, base_url: &str) -> Self {
        Self {
            id: model.id,
            icon: url_for(base_url, &model.icon),
            name: model.name,
            slug: model.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    pub id: i32,
    pub min_price: f64,
    pub max_price: f64,
    pub division: String,
    pub date: DateTime<Utc>,
}

impl From<entity::item_price::Model> for PriceResponse {
    fn from(price: entity::item_price::Model) -> Self {
        Self {
            id: price.id,
            min_price: price.min_price,
            max_price: price.max_price,
            division: price.division,
            date: price.date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub slug: String,
    pub images: Vec<String>,
    pub category_ids: Vec<i32>,
    pub prices: Vec<PriceResponse>,
}

impl ItemResponse {
    pub fn from_detail(detail: crate::services::item::ItemDetail, base_url: &str) -> Self {
        let crate::services::item::ItemDetail {
            item,
            images,
            category_ids,
            prices,
        } = detail;
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            unit: item.unit,
            slug: item.slug,
            images: images
                .iter()
                .map(|image| url_for(base_url, &image.image_link))
                .collect(),
            category_ids,
            prices: prices.into_iter().map(PriceResponse::from).collect(),
        }
    }
}
