use crate::api::attendance::{DailyAttendanceEntry, HolidayRequest, UpsertAttendance};
use crate::api::schedule::CreateCustomSchedule;
use crate::api::summary::{
    AdminMonthlyReportResponse, MonthlyAttendanceResponse, PayrollSummaryResponse,
};
use crate::attendance::report::{DailyReportRow, UserMonthlyReport};
use crate::attendance::summary::PeriodSummary;
use crate::attendance::walk::DayLabel;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::schedule::{CustomWorkSchedule, WorkSchedule};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Operations Dashboard Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance for the operations dashboard

Tracks daily attendance for staff and turns it into payroll-period figures.

### 🔹 Key Features
- **Daily Attendance**
  - Clock in and out, admin corrections, company-wide holidays
- **Payroll Period Summary**
  - Late, absent, permit and missing clock-out counts from one payroll day to the next
- **Monthly Report**
  - Day-by-day lateness and early departure per user
- **Work Schedules**
  - Standard weekly hours and date-range overrides

### 🔐 Security
Endpoints are protected using **JWT Bearer authentication**.
Each page is open to a fixed set of roles. Clock times, status and notes are stored encrypted.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::get_attendances,
        crate::api::attendance::upsert_attendance,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::apply_holiday,
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,

        crate::api::summary::get_monthly_attendance,
        crate::api::summary::get_payroll_period_summary,
        crate::api::summary::get_my_payroll_period_summary,
        crate::api::summary::get_admin_monthly_report,

        crate::api::schedule::list_work_schedules,
        crate::api::schedule::update_work_schedule,
        crate::api::schedule::list_custom_schedules,
        crate::api::schedule::create_custom_schedule,
        crate::api::schedule::delete_custom_schedule
    ),
    components(
        schemas(
            Attendance,
            AttendanceStatus,
            DailyAttendanceEntry,
            UpsertAttendance,
            HolidayRequest,
            PeriodSummary,
            PayrollSummaryResponse,
            MonthlyAttendanceResponse,
            AdminMonthlyReportResponse,
            UserMonthlyReport,
            DailyReportRow,
            DayLabel,
            WorkSchedule,
            CustomWorkSchedule,
            CreateCustomSchedule
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Attendance Summary", description = "Payroll period and monthly report APIs"),
        (name = "Schedules", description = "Work schedule APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_attendance_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/attendance",
            "/api/attendance/{id}",
            "/api/attendance/summary",
            "/api/attendance/summary/me",
            "/api/attendance/report",
            "/api/schedules/custom",
            "/api/schedules/custom/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
