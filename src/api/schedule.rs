use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::{AuthUser, Page};
use crate::error::AppError;
use crate::model::schedule::WorkSchedule;
use crate::store::{NewCustomSchedule, ScheduleStore};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomSchedule {
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
}

fn validate_weekly(schedule: &WorkSchedule) -> Result<(), AppError> {
    if schedule.day_of_week > 6 {
        return Err(AppError::bad_request("day_of_week must be between 0 (Sunday) and 6"));
    }
    match (schedule.start_time, schedule.end_time) {
        (Some(start), Some(end)) if start >= end => {
            Err(AppError::bad_request("start_time must be before end_time"))
        }
        (None, _) | (_, None) if schedule.is_work_day => Err(AppError::bad_request(
            "a work day needs start_time and end_time",
        )),
        _ => Ok(()),
    }
}

fn validate_custom(payload: &CreateCustomSchedule) -> Result<(), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    if payload.start_date > payload.end_date {
        return Err(AppError::bad_request("start_date cannot be after end_date"));
    }
    if payload.start_time >= payload.end_time {
        return Err(AppError::bad_request("start_time must be before end_time"));
    }
    Ok(())
}

/// Standard weekly schedule, Sunday first
#[utoipa::path(
    get,
    path = "/api/schedules/work",
    responses((status = 200, body = [WorkSchedule])),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn list_work_schedules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::Schedules)?;
    let rows = ScheduleStore::new(pool.get_ref()).weekly().await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    put,
    path = "/api/schedules/work",
    request_body = WorkSchedule,
    responses(
        (status = 200, description = "Work schedule saved"),
        (status = 400, description = "Invalid schedule")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn update_work_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<WorkSchedule>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::Schedules)?;
    validate_weekly(&payload)?;

    ScheduleStore::new(pool.get_ref())
        .upsert_weekly(&payload)
        .await?;

    info!(day_of_week = payload.day_of_week, actor = auth.user_id, "Work schedule updated");
    Ok(HttpResponse::Ok().json(json!({ "message": "Work schedule saved" })))
}

#[utoipa::path(
    get,
    path = "/api/schedules/custom",
    responses((status = 200, body = [crate::model::schedule::CustomWorkSchedule])),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn list_custom_schedules(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::Schedules)?;
    let rows = ScheduleStore::new(pool.get_ref()).custom().await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/schedules/custom",
    request_body = CreateCustomSchedule,
    responses(
        (status = 201, description = "Custom schedule created", body = Object, example = json!({
            "message": "Custom schedule created",
            "id": 3
        })),
        (status = 400, description = "Invalid schedule")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn create_custom_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCustomSchedule>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::Schedules)?;
    validate_custom(&payload)?;

    let id = ScheduleStore::new(pool.get_ref())
        .create_custom(NewCustomSchedule {
            name: payload.name.trim(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            start_time: payload.start_time,
            end_time: payload.end_time,
        })
        .await?;

    info!(id, start = %payload.start_date, end = %payload.end_date, "Custom schedule created");
    Ok(HttpResponse::Created().json(json!({
        "message": "Custom schedule created",
        "id": id
    })))
}

#[utoipa::path(
    delete,
    path = "/api/schedules/custom/{id}",
    params(("id", Path, description = "Custom schedule id")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Custom schedule not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedules"
)]
pub async fn delete_custom_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::Schedules)?;
    let id = path.into_inner();

    if !ScheduleStore::new(pool.get_ref()).delete_custom(id).await? {
        return Err(AppError::not_found("Custom schedule not found"));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
