use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Permit,
    Leave,
    Sick,
}

impl AttendanceStatus {
    /// Permit, leave and sick days are excused: counted as permits, never as late or absent.
    pub fn is_excused(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Permit | AttendanceStatus::Leave | AttendanceStatus::Sick
        )
    }
}

/// Attendance row as stored. Sensitive columns hold ciphertext.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub user_id: u64,
    pub date: NaiveDate,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub status: Option<String>,
    pub is_holiday: bool,
    pub notes: Option<String>,
}

/// Decrypted attendance record, one per user and calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-05T08:07:00", format = "date-time", value_type = Option<String>)]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(example = "2026-01-05T17:02:00", format = "date-time", value_type = Option<String>)]
    pub clock_out: Option<NaiveDateTime>,
    pub status: Option<AttendanceStatus>,
    pub is_holiday: bool,
    pub notes: Option<String>,
}

impl Attendance {
    /// A blank record for `user_id` on `date`, not yet persisted.
    pub fn blank(user_id: u64, date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            date,
            clock_in: None,
            clock_out: None,
            status: None,
            is_holiday: false,
            notes: None,
        }
    }
}
