use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )
"#;

// One row per user per day. Times are HH:MM:SS text, location_verified is 0/1.
const CREATE_ATTENDANCE: &str = r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        clock_in_time TEXT,
        clock_out_time TEXT,
        status TEXT NOT NULL CHECK(status IN ('Present', 'Absent', 'Late', 'Clocked In')),
        location_verified INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (user_id) REFERENCES users(id),
        UNIQUE (user_id, date)
    )
"#;

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the `users` and `attendance` tables when they are missing.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_USERS)
        .execute(pool)
        .await
        .context("Failed to create users table")?;
    sqlx::query(CREATE_ATTENDANCE)
        .execute(pool)
        .await
        .context("Failed to create attendance table")?;

    tracing::info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_pool;

    #[actix_web::test]
    async fn schema_creation_is_idempotent() {
        let pool = test_pool().await;
        super::create_schema(&pool).await.unwrap();

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'attendance') ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(tables, vec![("attendance".to_string(),), ("users".to_string(),)]);
    }

    #[actix_web::test]
    async fn status_column_rejects_unknown_values() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO users (name, email) VALUES ('A', 'a@example.com')")
            .execute(&pool)
            .await
            .unwrap();

        let result = sqlx::query(
            "INSERT INTO attendance (user_id, date, status) VALUES (1, '2024-07-20', 'Sleeping')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[actix_web::test]
    async fn attendance_requires_an_existing_user() {
        let pool = test_pool().await;

        let result = sqlx::query(
            "INSERT INTO attendance (user_id, date, status) VALUES (99, '2024-07-20', 'Absent')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }

    #[actix_web::test]
    async fn file_database_is_created_on_first_connect() {
        let path = std::env::temp_dir().join(format!("attendease-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());

        let pool = super::init_db(&url, 2).await.unwrap();
        pool.close().await;

        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }
}
