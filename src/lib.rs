pub mod client;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod entity;
pub mod errors;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::{client::db::DatabaseClient, config::ServiceConfig, utils::storage::Storage};

pub use routes::create_router;

#[derive(Clone)]
pub struct ServiceState {
    pub config: Arc<ServiceConfig>,
    pub db: Arc<DatabaseClient>,
    pub storage: Storage,
}

impl ServiceState {
    pub fn new(config: ServiceConfig, db: DatabaseClient) -> Self {
        let storage = Storage::new(config.upload.dir.clone());
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            storage,
        }
    }
}
