//! Shared fixtures for handler and store tests.

use crate::auth::password::AdminCredentials;
use crate::clock::{Clock, FixedClock};
use crate::config::Config;
use crate::error;
use crate::model::user::User;
use actix_web::{
    App, Error,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web::{self, Data},
};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

/// In-memory database with the real schema. A single connection keeps the
/// memory database alive for the whole test.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    crate::db::create_schema(&pool).await.unwrap();
    pool
}

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        database_max_connections: 1,
        jwt_secret: "test-secret".into(),
        access_token_ttl: 600,
        admin_username: "admin".into(),
        admin_password: Some("s3cret".into()),
        admin_password_hash: None,
        admin_guard: false,
        rate_login_per_min: 1000,
        rate_api_per_min: 1000,
        api_prefix: "/api".into(),
        log_dir: "logs".into(),
        log_level: tracing::Level::DEBUG,
    }
}

pub async fn seed_user(pool: &SqlitePool, name: &str, email: &str) -> User {
    crate::store::user::insert_user(pool, name, email).await.unwrap()
}

/// Pre-marks a user absent for `date` (YYYY-MM-DD), the way an admin import would.
pub async fn seed_absent(pool: &SqlitePool, user_id: i64, date: &str) -> i64 {
    sqlx::query("INSERT INTO attendance (user_id, date, status) VALUES (?, ?, 'Absent')")
        .bind(user_id)
        .bind(date)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub struct TestState {
    pub pool: SqlitePool,
    pub config: Config,
    pub clock: Arc<FixedClock>,
    pub admin: Arc<AdminCredentials>,
}

impl TestState {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let admin = AdminCredentials::from_config(&config).unwrap();
        TestState {
            pool: test_pool().await,
            config,
            clock: Arc::new(FixedClock::at("2024-07-20 08:30:00")),
            admin: Arc::new(admin),
        }
    }

    /// App with the same application data `main` registers, without rate limiting.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        let clock: Arc<dyn Clock> = self.clock.clone();
        App::new()
            .app_data(Data::new(self.pool.clone()))
            .app_data(Data::new(self.config.clone()))
            .app_data(Data::from(self.admin.clone()))
            .app_data(Data::from(clock))
            .app_data(error::json_config())
            .app_data(error::query_config())
            .service(crate::index)
            .service(web::scope("/auth").configure(crate::routes::auth_routes))
            .service(web::scope(&self.config.api_prefix).configure(crate::routes::api_routes))
    }
}
