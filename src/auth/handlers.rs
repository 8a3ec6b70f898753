use crate::{
    auth::{jwt::generate_access_token, password::AdminCredentials, session::AdminSession},
    config::Config,
    error::ApiError,
    models::{LoginReqDto, LoginResponse},
};
use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// Admin login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Admin session started", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = Object, example = json!({
            "error": "Username and password are required"
        })),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "Invalid credentials"
        })),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(admin, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    admin: web::Data<AdminCredentials>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(ApiError::validation("Username and password are required"));
    }

    debug!("Verifying credentials");
    if !admin.verify(user.username.trim(), &user.password) {
        info!("Invalid credentials");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let access_token =
        generate_access_token(&admin.username, &config.jwt_secret, config.access_token_ttl)
            .map_err(|e| {
                error!(error = %e, "Failed to sign access token");
                ApiError::Internal("Failed to start session".into())
            })?;

    info!("Admin logged in");
    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".into(),
        expires_in: config.access_token_ttl,
    }))
}

/// Current admin session
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Token is valid", body = Object, example = json!({
            "username": "admin",
            "expires_at": 1721467800
        })),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn session(session: AdminSession) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "username": session.username,
        "expires_at": session.expires_at,
    }))
}
