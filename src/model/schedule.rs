use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard schedule for one weekday (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WorkSchedule {
    #[schema(example = 1)]
    pub day_of_week: u8,
    #[schema(example = true)]
    pub is_work_day: bool,
    #[schema(example = "08:00:00", value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(example = "17:00:00", value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
}

/// Date-range override of the weekly schedule. Every date it covers is a work day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CustomWorkSchedule {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "Stock opname")]
    pub name: String,
    #[schema(example = "2026-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "07:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "15:00:00", value_type = String)]
    pub end_time: NaiveTime,
    #[schema(example = "2026-01-02T09:00:00", format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
}

impl CustomWorkSchedule {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
