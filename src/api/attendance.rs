use crate::{
    auth::session::AdminSession,
    clock::Clock,
    config::Config,
    error::ApiError,
    model::attendance::{AttendanceRecord, AttendanceWithUser},
    store::{attendance, user},
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};

const USER_ID_REQUIRED: &str = "User ID is required";
const USER_ID_INVALID: &str = "User ID must be a valid number.";
const LOCATION_REQUIRED: &str = "Location verification status is required and must be a boolean.";
const CLOCK_IN_FAILED: &str = "Failed to record clock-in";
const CLOCK_OUT_FAILED: &str = "Failed to record clock-out";
const DUPLICATE_DAY: &str = "Attendance record for this user and date already exists";
const ALREADY_CLOCKED_IN: &str = "User already clocked in today";
const NO_ACTIVE_CLOCK_IN: &str = "No active clock-in found for today to clock out";

/// Body of a clock-in. Fields stay loosely typed so bad input gets the
/// specific validation message instead of a generic deserialization error.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClockInRequest {
    /// Integer, or a string holding one
    #[schema(value_type = i64, example = 1)]
    pub user_id: Option<Value>,
    #[schema(value_type = bool, example = true)]
    pub location_verified: Option<Value>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutRequest {
    #[schema(value_type = i64, example = 1)]
    pub user_id: Option<Value>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Only this user's records; all records (admin view) when omitted
    #[serde(rename = "userId")]
    #[param(example = "1")]
    pub user_id: Option<String>,
}

/// A record plus a confirmation for the person at the kiosk.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    #[schema(example = "Successfully clocked in User ID 1.")]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockInOutcome {
    /// A new row for the day was inserted
    Created,
    /// An existing row without a clock-in (e.g. pre-marked absent) was reused
    Updated,
}

fn parse_user_id(value: Option<&Value>) -> Result<i64, ApiError> {
    match value {
        None | Some(Value::Null) => Err(ApiError::validation(USER_ID_REQUIRED)),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| ApiError::validation(USER_ID_INVALID)),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| ApiError::validation(USER_ID_INVALID)),
        Some(_) => Err(ApiError::validation(USER_ID_INVALID)),
    }
}

/// Moves today's row for `user_id` into `ClockedIn`, creating it if needed.
pub async fn record_clock_in(
    pool: &SqlitePool,
    user_id: i64,
    location_verified: bool,
    clock: &dyn Clock,
) -> Result<(ClockInOutcome, AttendanceRecord), ApiError> {
    let db_err = |e: sqlx::Error| ApiError::database_or_conflict(e, DUPLICATE_DAY, CLOCK_IN_FAILED);
    let today = clock.today();
    let now = clock.time_of_day();

    if user::find_user(pool, user_id).await.map_err(db_err)?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let (outcome, record_id) = match attendance::find_for_day(pool, user_id, today)
        .await
        .map_err(db_err)?
    {
        Some(existing) if existing.clock_in_time.is_some() => {
            return Err(ApiError::conflict(ALREADY_CLOCKED_IN));
        }
        Some(existing) => {
            let updated = attendance::update_clock_in(pool, existing.id, now, location_verified)
                .await
                .map_err(db_err)?;
            if updated == 0 {
                // another request clocked this row in after we read it
                return Err(ApiError::conflict(ALREADY_CLOCKED_IN));
            }
            (ClockInOutcome::Updated, existing.id)
        }
        None => {
            let id = attendance::insert_clock_in(pool, user_id, today, now, location_verified)
                .await
                .map_err(db_err)?;
            (ClockInOutcome::Created, id)
        }
    };

    let record = attendance::find_by_id(pool, record_id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| {
            error!(record_id, "Attendance record vanished after clock-in");
            ApiError::Internal(CLOCK_IN_FAILED.into())
        })?;

    Ok((outcome, record))
}

/// Moves today's `ClockedIn` row for `user_id` to `Present`.
pub async fn record_clock_out(
    pool: &SqlitePool,
    user_id: i64,
    clock: &dyn Clock,
) -> Result<AttendanceRecord, ApiError> {
    let db_err = |e: sqlx::Error| ApiError::database(e, CLOCK_OUT_FAILED);

    let record = attendance::find_clocked_in_for_day(pool, user_id, clock.today())
        .await
        .map_err(db_err)?
        .ok_or_else(|| ApiError::not_found(NO_ACTIVE_CLOCK_IN))?;

    if record.clock_in_time.is_none() {
        return Err(ApiError::validation(
            "Cannot clock out. User was never clocked in today.",
        ));
    }

    let updated = attendance::update_clock_out(pool, record.id, clock.time_of_day())
        .await
        .map_err(db_err)?;
    if updated == 0 {
        return Err(ApiError::not_found(NO_ACTIVE_CLOCK_IN));
    }

    attendance::find_by_id(pool, record.id)
        .await
        .map_err(db_err)?
        .ok_or_else(|| {
            error!(record_id = record.id, "Attendance record vanished after clock-out");
            ApiError::Internal(CLOCK_OUT_FAILED.into())
        })
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    request_body = ClockInRequest,
    responses(
        (status = 201, description = "New attendance record for today", body = AttendanceResponse),
        (status = 200, description = "Existing record for today clocked in", body = AttendanceResponse),
        (status = 400, description = "Invalid user id or location flag", body = Object, example = json!({
            "error": "User ID must be a valid number."
        })),
        (status = 404, description = "Unknown user", body = Object, example = json!({
            "error": "User not found"
        })),
        (status = 409, description = "Already clocked in today", body = Object, example = json!({
            "error": "User already clocked in today"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(skip_all)]
pub async fn clock_in(
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<ClockInRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = parse_user_id(payload.user_id.as_ref())?;
    let location_verified = payload
        .location_verified
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::validation(LOCATION_REQUIRED))?;

    let (outcome, record) =
        record_clock_in(pool.get_ref(), user_id, location_verified, clock.get_ref()).await?;
    info!(user_id, record_id = record.id, ?outcome, location_verified, "Clocked in");

    let mut response = match outcome {
        ClockInOutcome::Created => HttpResponse::Created(),
        ClockInOutcome::Updated => HttpResponse::Ok(),
    };
    Ok(response.json(AttendanceResponse {
        record,
        message: format!("Successfully clocked in User ID {user_id}."),
    }))
}

/// Clock-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance/clock-out",
    request_body = ClockOutRequest,
    responses(
        (status = 200, description = "Clocked out, day marked present", body = AttendanceResponse),
        (status = 400, description = "Invalid user id", body = Object, example = json!({
            "error": "User ID must be a valid number."
        })),
        (status = 404, description = "Nothing to clock out of", body = Object, example = json!({
            "error": "No active clock-in found for today to clock out"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
#[instrument(skip_all)]
pub async fn clock_out(
    pool: web::Data<SqlitePool>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<ClockOutRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = parse_user_id(payload.user_id.as_ref())?;

    let record = record_clock_out(pool.get_ref(), user_id, clock.get_ref()).await?;
    info!(user_id, record_id = record.id, "Clocked out");

    Ok(HttpResponse::Ok().json(AttendanceResponse {
        record,
        message: format!("Successfully clocked out User ID {user_id}."),
    }))
}

/// Attendance history
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Records newest first; user_name/user_email are only present in the all-users view", body = [AttendanceWithUser]),
        (status = 400, description = "Non-numeric userId", body = Object, example = json!({
            "error": "User ID query parameter must be a valid number."
        })),
        (status = 401, description = "Admin session required (ADMIN_GUARD)"),
        (status = 500, description = "Internal server error")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    session: Option<AdminSession>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let db_err = |e: sqlx::Error| ApiError::database(e, "Failed to fetch attendance records");

    match query.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let user_id: i64 = raw.parse().map_err(|_| {
                ApiError::validation("User ID query parameter must be a valid number.")
            })?;
            let records = attendance::list_for_user(pool.get_ref(), user_id)
                .await
                .map_err(db_err)?;
            Ok(HttpResponse::Ok().json(records))
        }
        None => {
            AdminSession::require_if_guarded(&session, &config)?;
            let records: Vec<AttendanceWithUser> = attendance::list_all_with_users(pool.get_ref())
                .await
                .map_err(db_err)?;
            Ok(HttpResponse::Ok().json(records))
        }
    }
}
