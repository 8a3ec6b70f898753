use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Day status of an attendance row.
///
/// `Display`/`FromStr` give the text kept in the `status` column; serde gives
/// the JSON name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    /// Storable, but nothing assigns it yet.
    Late,
    #[strum(serialize = "Clocked In")]
    ClockedIn,
}

impl TryFrom<String> for AttendanceStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 1,
        "date": "2024-07-20",
        "clock_in_time": "08:30:00",
        "clock_out_time": null,
        "status": "ClockedIn",
        "location_verified": true
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub user_id: i64,

    #[schema(example = "2024-07-20", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "08:30:00", value_type = Option<String>, nullable = true)]
    pub clock_in_time: Option<NaiveTime>,

    #[schema(example = "17:00:00", value_type = Option<String>, nullable = true)]
    pub clock_out_time: Option<NaiveTime>,

    #[sqlx(try_from = "String")]
    pub status: AttendanceStatus,

    /// Stored as 0/1
    pub location_verified: bool,
}

/// Admin view row: the record plus who it belongs to.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceWithUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub record: AttendanceRecord,

    #[schema(example = "Jane Doe")]
    pub user_name: String,

    #[schema(example = "jane@example.com")]
    pub user_email: String,
}
