use crate::api::attendance::{AttendanceResponse, ClockInRequest, ClockOutRequest};
use crate::api::user::CreateUser;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceWithUser};
use crate::model::user::User;
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AttendEase API",
        version = "0.1.0",
        description = r#"
## AttendEase

Attendance tracking for small teams: people clock in when they arrive
(optionally after scanning the kiosk QR code) and clock out when they leave.

- **Attendance**: one record per user per day. Clock-in creates it (or reuses a
  pre-marked absent row), clock-out marks the day present.
- **Users**: the registry of people who can clock in.
- **Auth**: admin login returning a bearer token. With `ADMIN_GUARD` enabled,
  the all-users attendance view and user creation need it.

Errors are always `{"error": "<message>"}`.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::list_attendance,

        crate::api::user::list_users,
        crate::api::user::create_user,

        crate::auth::handlers::login,
        crate::auth::handlers::session
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            AttendanceWithUser,
            AttendanceResponse,
            ClockInRequest,
            ClockOutRequest,
            User,
            CreateUser,
            LoginReqDto,
            LoginResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Clock-in, clock-out and history"),
        (name = "User", description = "User registry"),
        (name = "Auth", description = "Admin session"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
