use crate::{
    auth::session::AdminSession, config::Config, error::ApiError, store::user,
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(value_type = String, example = "Jane Doe")]
    pub name: Option<Value>,
    #[schema(value_type = String, example = "jane@example.com", format = "email")]
    pub email: Option<Value>,
}

/// JS-style falsiness: missing, null, false, 0 and blank strings all count as absent.
fn is_blank(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn validate(payload: &CreateUser) -> Result<(String, String), ApiError> {
    if is_blank(&payload.name) || is_blank(&payload.email) {
        return Err(ApiError::validation("Name and email are required"));
    }

    match (
        payload.name.as_ref().and_then(Value::as_str),
        payload.email.as_ref().and_then(Value::as_str),
    ) {
        (Some(name), Some(email)) => Ok((name.trim().to_string(), email.trim().to_string())),
        _ => Err(ApiError::validation("Name and email must be strings")),
    }
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All registered users", body = [crate::model::user::User]),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Failed to fetch users"
        }))
    ),
    tag = "User"
)]
pub async fn list_users(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let users = user::list_users(pool.get_ref())
        .await
        .map_err(|e| ApiError::database(e, "Failed to fetch users"))?;

    Ok(HttpResponse::Ok().json(users))
}

/// Add a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = crate::model::user::User),
        (status = 400, description = "Missing or non-string name/email", body = Object, example = json!({
            "error": "Name and email are required"
        })),
        (status = 401, description = "Admin session required (ADMIN_GUARD)"),
        (status = 409, description = "Email already registered", body = Object, example = json!({
            "error": "User with this email already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn create_user(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    session: Option<AdminSession>,
    payload: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    AdminSession::require_if_guarded(&session, &config)?;
    let (name, email) = validate(&payload)?;

    let created = user::insert_user(pool.get_ref(), &name, &email)
        .await
        .map_err(|e| {
            ApiError::database_or_conflict(
                e,
                "User with this email already exists",
                "Failed to create user",
            )
        })?;

    info!(user_id = created.id, "User created");
    Ok(HttpResponse::Created().json(created))
}
