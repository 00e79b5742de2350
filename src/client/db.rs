use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::info;

use crate::{config::ServiceConfig, entity};

pub type DatabaseClient = DatabaseConnection;

pub trait DatabaseClientExt: Sized {
    fn build_from_config(
        config: &ServiceConfig,
    ) -> impl std::future::Future<Output = Result<DatabaseConnection, String>>;
}

impl DatabaseClientExt for DatabaseClient {
    async fn build_from_config(config: &ServiceConfig) -> Result<DatabaseConnection, String> {
        let mut opt = ConnectOptions::new(config.db.get_url());
        opt.max_connections(100)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8))
            .sqlx_logging(false);
        let db = Database::connect(opt)
            .await
            .map_err(|e| format!("Error in connecting to database: {}", e))?;
        Ok(db)
    }
}

/// Creates every catalog table and index that does not exist yet.
/// Tables are created parents first so foreign keys resolve.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_entity(db, entity::user::Entity).await?;
    create_entity(db, entity::session::Entity).await?;
    create_entity(db, entity::category::Entity).await?;
    create_entity(db, entity::item::Entity).await?;
    create_entity(db, entity::item_image::Entity).await?;
    create_entity(db, entity::item_category::Entity).await?;
    create_entity(db, entity::item_price::Entity).await?;
    info!("Database schema is ready");
    Ok(())
}

async fn create_entity<E>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }
    Ok(())
}
