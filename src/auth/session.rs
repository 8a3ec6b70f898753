use crate::auth::jwt::verify_token;
use crate::auth::password::AdminCredentials;
use crate::config::Config;
use crate::error::ApiError;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// An authenticated admin, taken from `Authorization: Bearer <token>`.
#[derive(Debug)]
pub struct AdminSession {
    pub username: String,
    /// Unix seconds
    pub expires_at: usize,
}

impl FromRequest for AdminSession {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AdminSession, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Missing token"))?;

    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| ApiError::Internal("Config missing".into()))?;

    let admin = req
        .app_data::<Data<AdminCredentials>>()
        .ok_or_else(|| ApiError::Internal("Admin credentials missing".into()))?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::unauthorized("Invalid or expired token")
    })?;

    // only the configured admin holds a session
    if claims.sub != admin.username {
        tracing::debug!(sub = %claims.sub, "Rejected token for unknown subject");
        return Err(ApiError::unauthorized("Invalid or expired token"));
    }

    Ok(AdminSession {
        username: claims.sub,
        expires_at: claims.exp,
    })
}

impl AdminSession {
    /// Enforces the admin guard: with `ADMIN_GUARD` off, anyone passes.
    pub fn require_if_guarded(
        session: &Option<AdminSession>,
        config: &Config,
    ) -> Result<(), ApiError> {
        if config.admin_guard && session.is_none() {
            return Err(ApiError::unauthorized("Admin session required"));
        }
        Ok(())
    }
}
