use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::walk::{DayKind, DayLabel, DayReducer, minutes_early, minutes_late};
use crate::model::attendance::AttendanceStatus;
use crate::model::role::Role;
use crate::model::user::UserProfile;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyReportRow {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub day: DayLabel,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub clock_in: Option<NaiveDateTime>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub clock_out: Option<NaiveDateTime>,
    pub status: Option<AttendanceStatus>,
    pub is_late: bool,
    pub is_early_departure: bool,
    pub late_minutes: i64,
    pub early_minutes: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserMonthlyReport {
    pub id: u64,
    pub name: String,
    pub department: Option<String>,
    #[schema(value_type = String)]
    pub role: Role,
    pub days: Vec<DailyReportRow>,
    pub late_days: u32,
    pub early_departure_days: u32,
    pub absent_days: u32,
    pub total_late_minutes: i64,
    pub total_early_minutes: i64,
}

/// Per-day breakdown of a calendar month for one user.
pub struct MonthlyReport {
    report: UserMonthlyReport,
}

impl MonthlyReport {
    pub fn new(user: &UserProfile) -> Self {
        Self {
            report: UserMonthlyReport {
                id: user.id,
                name: user.name.clone(),
                department: user.department.clone(),
                role: user.role,
                days: Vec::new(),
                late_days: 0,
                early_departure_days: 0,
                absent_days: 0,
                total_late_minutes: 0,
                total_early_minutes: 0,
            },
        }
    }
}

impl DayReducer for MonthlyReport {
    type Output = UserMonthlyReport;

    fn visit(&mut self, date: NaiveDate, day: &DayKind<'_>) {
        let record = day.record();
        let mut row = DailyReportRow {
            date,
            day: day.label(),
            clock_in: record.and_then(|r| r.clock_in),
            clock_out: record.and_then(|r| r.clock_out),
            status: record.and_then(|r| r.status),
            is_late: false,
            is_early_departure: false,
            late_minutes: 0,
            early_minutes: 0,
            notes: record.and_then(|r| r.notes.clone()),
        };

        let r = &mut self.report;
        match day {
            DayKind::Absent => r.absent_days += 1,
            DayKind::Worked { record, schedule } => {
                if let Some(minutes) = minutes_late(record, schedule) {
                    row.is_late = true;
                    row.late_minutes = minutes;
                    r.late_days += 1;
                    r.total_late_minutes += minutes;
                }
                if let Some(minutes) = minutes_early(record, schedule) {
                    row.is_early_departure = true;
                    row.early_minutes = minutes;
                    r.early_departure_days += 1;
                    r.total_early_minutes += minutes;
                }
            }
            _ => {}
        }

        r.days.push(row);
    }

    fn finish(self) -> UserMonthlyReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::period::DateWindow;
    use crate::attendance::schedule::ScheduleBook;
    use crate::attendance::schedule::fixtures::{custom, hm, office_week};
    use crate::attendance::walk::{AttendanceIndex, walk};
    use crate::model::attendance::Attendance;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budi() -> UserProfile {
        UserProfile {
            id: 2,
            name: "Budi".into(),
            department: Some("Gudang".into()),
            role: Role::Warehouse,
        }
    }

    fn shift(date: NaiveDate, clock_in: (u32, u32), clock_out: (u32, u32)) -> Attendance {
        Attendance {
            clock_in: Some(date.and_hms_opt(clock_in.0, clock_in.1, 0).unwrap()),
            clock_out: Some(date.and_hms_opt(clock_out.0, clock_out.1, 0).unwrap()),
            status: Some(AttendanceStatus::Present),
            ..Attendance::blank(2, date)
        }
    }

    fn report(records: Vec<Attendance>, book: &ScheduleBook, today: NaiveDate) -> UserMonthlyReport {
        let window = DateWindow::month(2026, 1).unwrap();
        let index = AttendanceIndex::new(records);
        walk(&[budi()], &window, &index, book, today, MonthlyReport::new)
            .pop()
            .unwrap()
    }

    #[test]
    fn test_one_row_per_calendar_day() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let r = report(vec![], &book, ymd(2025, 12, 31));
        assert_eq!(r.days.len(), 31);
        assert_eq!(r.days[0].date, ymd(2026, 1, 1));
        assert!(r.days.iter().all(|d| matches!(d.day, DayLabel::Future | DayLabel::Sunday)));
        assert_eq!(r.absent_days, 0);
    }

    #[test]
    fn test_late_and_early_flags() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let records = vec![
            shift(ymd(2026, 1, 5), (8, 20), (17, 0)),
            shift(ymd(2026, 1, 6), (8, 0), (16, 30)),
            shift(ymd(2026, 1, 7), (8, 5), (15, 0)),
        ];
        let r = report(records, &book, ymd(2026, 1, 7));

        let mon = &r.days[4];
        assert_eq!(mon.date, ymd(2026, 1, 5));
        assert!(mon.is_late && !mon.is_early_departure);
        assert_eq!(mon.late_minutes, 20);

        let tue = &r.days[5];
        assert!(!tue.is_late && tue.is_early_departure);
        assert_eq!(tue.early_minutes, 30);

        assert_eq!(r.late_days, 2);
        assert_eq!(r.early_departure_days, 2);
        assert_eq!(r.total_late_minutes, 25);
        assert_eq!(r.total_early_minutes, 30 + 120);
        // Jan 1-3 (Thu, Fri, Sat) were missed
        assert_eq!(r.absent_days, 3);
    }

    #[test]
    fn test_custom_end_time_drives_early_departure() {
        let created = ymd(2026, 1, 1).and_hms_opt(8, 0, 0).unwrap();
        let book = ScheduleBook::new(
            office_week(),
            vec![custom(1, ymd(2026, 1, 5), ymd(2026, 1, 5), (hm(8, 0), hm(14, 0)), created)],
        );
        let r = report(vec![shift(ymd(2026, 1, 5), (8, 0), (14, 0))], &book, ymd(2026, 1, 5));
        assert!(!r.days[4].is_early_departure);
        assert_eq!(r.total_early_minutes, 0);
    }

    #[test]
    fn test_excused_day_carries_record_details() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let sick = Attendance {
            status: Some(AttendanceStatus::Sick),
            notes: Some("Demam".into()),
            ..Attendance::blank(2, ymd(2026, 1, 8))
        };
        let r = report(vec![sick], &book, ymd(2026, 1, 8));
        let row = &r.days[7];
        assert_eq!(row.day, DayLabel::Excused);
        assert_eq!(row.status, Some(AttendanceStatus::Sick));
        assert_eq!(row.notes.as_deref(), Some("Demam"));
        assert!(!row.is_late);
    }
}
