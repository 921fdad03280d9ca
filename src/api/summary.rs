use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::attendance::period::DateWindow;
use crate::attendance::report::UserMonthlyReport;
use crate::attendance::service::{monthly_report, payroll_period_summary};
use crate::attendance::summary::PeriodSummary;
use crate::attendance::Scope;
use crate::auth::auth::{AuthUser, Page};
use crate::config::Config;
use crate::crypto::FieldCipher;
use crate::error::AppError;
use crate::model::attendance::Attendance;
use crate::store::{AttendanceStore, UserStore};

#[derive(Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// Payroll anchor day; defaults to the configured salary calculation day
    #[param(example = 25)]
    pub day: Option<u32>,
    #[param(example = 1)]
    pub month: u32,
    #[param(example = 2026)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    /// Defaults to the caller
    #[param(example = 7)]
    pub user_id: Option<u64>,
    #[param(example = 1)]
    pub month: u32,
    #[param(example = 2026)]
    pub year: i32,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollSummaryResponse {
    #[schema(example = "2025-12-25T00:00:00", format = "date-time", value_type = String)]
    pub start_date: NaiveDateTime,
    #[schema(example = "2026-01-24T23:59:59.999", format = "date-time", value_type = String)]
    pub end_date: NaiveDateTime,
    pub data: Vec<PeriodSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyAttendanceResponse {
    pub user_id: u64,
    pub month: u32,
    pub year: i32,
    pub records: Vec<Attendance>,
}

#[derive(Serialize, ToSchema)]
pub struct AdminMonthlyReportResponse {
    pub month: u32,
    pub year: i32,
    #[schema(format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub users: Vec<UserMonthlyReport>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A user's stored records for one calendar month
#[utoipa::path(
    get,
    path = "/api/attendance/monthly",
    params(MonthQuery),
    responses(
        (status = 200, body = MonthlyAttendanceResponse),
        (status = 403, description = "Another user's attendance needs the admin page"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Summary"
)]
pub async fn get_monthly_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = query.user_id.unwrap_or(auth.user_id);
    auth.require_self_or(user_id, Page::AttendanceAdmin)?;

    let window = DateWindow::month(query.year, query.month)?;
    if UserStore::new(pool.get_ref()).find(user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let records = AttendanceStore::new(pool.get_ref(), cipher.get_ref())
        .find_for_user_in_range(user_id, window.start, window.end)
        .await?;

    Ok(HttpResponse::Ok().json(MonthlyAttendanceResponse {
        user_id,
        month: query.month,
        year: query.year,
        records,
    }))
}

/// Payroll-period attendance summary for every active user
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    params(PeriodQuery),
    responses(
        (status = 200, body = PayrollSummaryResponse),
        (status = 400, description = "Invalid day or month"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Summary"
)]
#[instrument(name = "payroll_summary", skip_all, fields(month = query.month, year = query.year))]
pub async fn get_payroll_period_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    config: web::Data<Config>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::AttendanceAdmin)?;
    let day = query.day.unwrap_or(config.salary_calc_day);

    let (window, data) = payroll_period_summary(
        pool.get_ref(),
        cipher.get_ref(),
        Scope::AllUsers,
        day,
        query.month,
        query.year,
        today(),
    )
    .await?;

    info!(users = data.len(), start = %window.start, end = %window.end, "Payroll summary computed");
    Ok(HttpResponse::Ok().json(PayrollSummaryResponse {
        start_date: window.start_at(),
        end_date: window.end_at(),
        data,
    }))
}

/// The caller's own payroll-period attendance summary
#[utoipa::path(
    get,
    path = "/api/attendance/summary/me",
    params(PeriodQuery),
    responses(
        (status = 200, body = PeriodSummary),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Summary"
)]
pub async fn get_my_payroll_period_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    config: web::Data<Config>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::SelfService)?;
    let day = query.day.unwrap_or(config.salary_calc_day);

    let (_, mut data) = payroll_period_summary(
        pool.get_ref(),
        cipher.get_ref(),
        Scope::SingleUser(auth.user_id),
        day,
        query.month,
        query.year,
        today(),
    )
    .await?;

    let summary = data
        .pop()
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Day-by-day lateness, early departure and absence report for a calendar month
#[utoipa::path(
    get,
    path = "/api/attendance/report",
    params(MonthQuery),
    responses(
        (status = 200, body = AdminMonthlyReportResponse),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance Summary"
)]
pub async fn get_admin_monthly_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cipher: web::Data<FieldCipher>,
    query: web::Query<MonthQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_page_access(Page::AttendanceAdmin)?;

    let scope = match query.user_id {
        Some(id) => Scope::SingleUser(id),
        None => Scope::AllUsers,
    };

    let (window, users) = monthly_report(
        pool.get_ref(),
        cipher.get_ref(),
        scope,
        query.month,
        query.year,
        today(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(AdminMonthlyReportResponse {
        month: query.month,
        year: query.year,
        start_date: window.start,
        end_date: window.end,
        users,
    }))
}
