//! Shared test setup: in-memory database, services and application state

use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;

use libris_server::{
    config::{AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig},
    repository::Repository,
    services::Services,
    AppState,
};

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        jwt_expiration_hours: 1,
        admin_usernames: vec!["James1".to_string(), "James2".to_string()],
    }
}

/// Fresh in-memory database with migrations applied.
///
/// A single connection keeps every query on the same private memory
/// database.
pub async fn test_repository() -> Repository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Repository::new(pool)
}

pub async fn test_services() -> (Services, Repository) {
    let repository = test_repository().await;
    (Services::new(repository.clone(), test_auth_config()), repository)
}

pub async fn test_state() -> AppState {
    let (services, _) = test_services().await;

    let config = AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig::default(),
        auth: test_auth_config(),
        logging: LoggingConfig::default(),
    };

    AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    }
}
