use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Every failure a handler can surface. The message is what the client sees.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "Method not allowed")]
    MethodNotAllowed,
    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    /// Logs the persistence failure and hides it behind `message`.
    pub fn database(e: sqlx::Error, message: &str) -> Self {
        error!(error = %e, "{message}");
        ApiError::Internal(message.to_string())
    }

    /// Like [`ApiError::database`], but a UNIQUE violation becomes a conflict.
    pub fn database_or_conflict(e: sqlx::Error, conflict: &str, message: &str) -> Self {
        if is_unique_violation(&e) {
            return ApiError::conflict(conflict);
        }
        Self::database(e, message)
    }
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

/// Malformed JSON bodies come back as `{"error": ...}` like everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::validation(format!("Invalid request body: {err}")).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::validation(format!("Invalid query string: {err}")).into()
    })
}

/// Default service for resources hit with an unsupported verb.
pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    tracing::debug!(method = %req.method(), path = %req.path(), "Method not allowed");
    Err(ApiError::MethodNotAllowed)
}
