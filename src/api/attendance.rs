use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::{AuthUser, Page};
use crate::crypto::FieldCipher;
use crate::error::AppError;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::store::{AttendanceStore, ClockOutcome, UserStore};

#[derive(Deserialize, IntoParams)]
pub struct DateQuery {
    /// Calendar day, `YYYY-MM-DD`
    #[param(value_type = Option<String>, example = "2026-01-05")]
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct DailyAttendanceEntry {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "Sari Wulandari")]
    pub name: String,
    pub department: Option<String>,
    pub attendance: Option<Attendance>,
}

/// Admin form for creating or correcting a day's record.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertAttendance {
    #[schema(example = 7)]
    pub user_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    /// Time of day on `date`
    #[schema(example = "08:05:00", value_type = Option<String>)]
    pub clock_in: Option<NaiveTime>,
    #[schema(example = "17:00:00", value_type = Option<String>)]
    pub clock_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub is_holiday: bool,
    pub notes: Option<String>,
}

impl UpsertAttendance {
    pub fn into_record(self) -> Result<Attendance, AppError> {
        let user_id = self
            .user_id
            .ok_or_else(|| AppError::bad_request("user_id is required"))?;
        let date = self
            .date
            .ok_or_else(|| AppError::bad_request("date is required"))?;

        if let (Some(clock_in), Some(clock_out)) = (self.clock_in, self.clock_out) {
            if clock_out < clock_in {
                return Err(AppError::bad_request("clock_out cannot be before clock_in"));
            }
        }

        Ok(Attendance {
            id: 0,
            user_id,
            date,
            clock_in: self.clock_in.map(|t| date.and_time(t)),
            clock_out: self.clock_out.map(|t| date.and_time(t)),
            status: self.status,
            is_holiday: self.is_holiday,
            notes: self
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HolidayRequest {
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_holiday: bool,
    #[schema(example = "Tahun Baru")]
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Attendance of every active user on one day
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(DateQuery),
    responses(
        (status = 200, description = "One entry per active user", body = [DailyAttendanceEntry]),
        (status = 400, description = "date is required"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_attendances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::AttendanceAdmin)?;
    let date = query
        .date
        .ok_or_else(|| AppError::bad_request("date is required"))?;

    let users = UserStore::new(pool.get_ref()).active().await?;
    let mut by_user: HashMap<u64, Attendance> = AttendanceStore::new(pool.get_ref(), cipher.get_ref())
        .find_by_date(date)
        .await?
        .into_iter()
        .map(|a| (a.user_id, a))
        .collect();

    let entries: Vec<DailyAttendanceEntry> = users
        .into_iter()
        .map(|u| DailyAttendanceEntry {
            attendance: by_user.remove(&u.id),
            user_id: u.id,
            name: u.name,
            department: u.department,
        })
        .collect();

    Ok(HttpResponse::Ok().json(entries))
}

/// Create or replace a user's record for a day
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = UpsertAttendance,
    responses(
        (status = 200, description = "Attendance saved", body = Object, example = json!({
            "message": "Attendance saved"
        })),
        (status = 400, description = "Missing user_id or date"),
        (status = 404, description = "User not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(name = "attendance_upsert", skip_all, fields(actor = auth.user_id))]
pub async fn upsert_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    payload: web::Json<UpsertAttendance>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::AttendanceAdmin)?;
    let record = payload.into_inner().into_record()?;

    if UserStore::new(pool.get_ref()).find(record.user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    AttendanceStore::new(pool.get_ref(), cipher.get_ref())
        .upsert(&record)
        .await?;

    info!(user_id = record.user_id, date = %record.date, "Attendance saved");
    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance saved" })))
}

/// Delete one attendance record
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id", Path, description = "Attendance record id")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::AttendanceAdmin)?;
    let id = path.into_inner();

    let deleted = AttendanceStore::new(pool.get_ref(), cipher.get_ref())
        .delete(id)
        .await?;

    if !deleted {
        return Err(AppError::not_found("Attendance not found"));
    }

    info!(id, actor = auth.user_id, "Attendance deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

/// Mark or unmark a holiday for every active user at once
#[utoipa::path(
    post,
    path = "/api/attendance/holiday",
    request_body = HolidayRequest,
    responses(
        (status = 200, description = "Holiday applied", body = Object, example = json!({
            "message": "Holiday applied",
            "users": 42
        })),
        (status = 400, description = "date is required")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn apply_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    payload: web::Json<HolidayRequest>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::AttendanceAdmin)?;
    let payload = payload.into_inner();
    let date = payload
        .date
        .ok_or_else(|| AppError::bad_request("date is required"))?;

    let user_ids: Vec<u64> = UserStore::new(pool.get_ref())
        .active()
        .await?
        .iter()
        .map(|u| u.id)
        .collect();

    let notes = payload.notes.filter(|n| !n.trim().is_empty());
    let applied = AttendanceStore::new(pool.get_ref(), cipher.get_ref())
        .apply_holiday(&user_ids, date, payload.is_holiday, notes.as_ref())
        .await?;

    let message = if payload.is_holiday {
        "Holiday applied"
    } else {
        "Holiday removed"
    };
    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "users": applied
    })))
}

/// Clock in for today
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    responses(
        (status = 200, description = "Clocked in successfully"),
        (status = 400, description = "Already clocked in today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::SelfService)?;

    let outcome = AttendanceStore::new(pool.get_ref(), cipher.get_ref())
        .clock_in(auth.user_id, Local::now().naive_local())
        .await?;

    match outcome {
        ClockOutcome::Recorded => Ok(HttpResponse::Ok().json(json!({
            "message": "Clocked in successfully"
        }))),
        _ => Err(AppError::bad_request("Already clocked in today")),
    }
}

/// Clock out for today
#[utoipa::path(
    put,
    path = "/api/attendance/clock-out",
    responses(
        (status = 200, description = "Clocked out successfully"),
        (status = 400, description = "No active clock-in found for today"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::SelfService)?;

    let outcome = AttendanceStore::new(pool.get_ref(), cipher.get_ref())
        .clock_out(auth.user_id, Local::now().naive_local())
        .await?;

    match outcome {
        ClockOutcome::Recorded => Ok(HttpResponse::Ok().json(json!({
            "message": "Clocked out successfully"
        }))),
        _ => Err(AppError::bad_request("No active clock-in found for today")),
    }
}
