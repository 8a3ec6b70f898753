use crate::model::user::User;
use sqlx::SqlitePool;

pub async fn find_user(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Fails with a unique violation when the email is taken.
pub async fn insert_user(pool: &SqlitePool, name: &str, email: &str) -> Result<User, sqlx::Error> {
    let result = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
        .bind(name)
        .bind(email)
        .execute(pool)
        .await?;

    Ok(User {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        email: email.to_string(),
    })
}
