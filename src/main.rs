use std::{net::SocketAddr, sync::Arc};

use catalog_admin_service::{
    client::db::{create_schema, DatabaseClient, DatabaseClientExt},
    config::{self, tracing::subscribe_tracing},
    create_router, services, ServiceState,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    subscribe_tracing();

    let mut service_config = config::ServiceConfig::default();
    service_config.init_from_env()?;

    let db_client = DatabaseClient::build_from_config(&service_config)
        .await
        .map_err(|e| {
            error!("💥 Error in database connection: {}", e);
            "Failed to build database client"
        })?;

    create_schema(&db_client).await.map_err(|e| {
        error!("💥 Failed to create database schema: {}", e);
        "Failed to create database schema"
    })?;

    if let (Some(name), Some(password)) = (
        service_config.auth.admin_username.as_deref(),
        service_config.auth.admin_password.as_deref(),
    ) {
        services::auth::ensure_admin(&db_client, name, password)
            .await
            .map_err(|e| {
                error!("💥 Failed to seed admin user: {}", e);
                "Failed to seed admin user"
            })?;
    }

    let listener_addr = service_config.server.get_socket_addr().map_err(|e| {
        error!("💥 Failed to get socket address: {}", e);
        "Invalid socket address"
    })?;

    let service_state = Arc::new(ServiceState::new(service_config, db_client.clone()));

    let tcp_listener = tokio::net::TcpListener::bind(listener_addr)
        .await
        .map_err(|e| {
            error!("💥 Failed to bind TCP listener: {}", e);
            "Failed to bind TCP listener"
        })?;

    let addr = tcp_listener.local_addr().map_err(|e| {
        error!("💥 Failed to get addr of the listener: {}", e);
        "Failed to get local listener address"
    })?;

    info!("🚀 The server is listening on: {}", addr);

    let router = create_router(service_state);
    axum::serve(
        tcp_listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| {
        error!("💥 Server error: {}", e);
        "Server error occurred"
    })?;

    info!("Closing database connections");
    db_client.close().await.map_err(|e| {
        error!("💥 Failed to close database connections: {}", e);
        "Failed to close database connections"
    })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("💥 Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
