use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::period::DateWindow;
use super::walk::{DayKind, DayReducer, minutes_late};
use crate::model::role::Role;
use crate::model::user::UserProfile;

/// Payroll-period attendance figures for one user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodSummary {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Sari Wulandari")]
    pub name: String,
    #[schema(example = "Gudang")]
    pub department: Option<String>,
    #[schema(example = "EMPLOYEE", value_type = String)]
    pub role: Role,
    /// Calendar days in the period, Sundays and days off included.
    #[schema(example = 31)]
    pub total_work_days: u32,
    #[schema(example = 2)]
    pub late_count: u32,
    #[schema(example = 23)]
    pub late_minutes: i64,
    #[schema(example = 1)]
    pub absent_count: u32,
    #[schema(example = 0)]
    pub permit_count: u32,
    #[schema(example = 1)]
    pub no_clock_out_count: u32,
    #[schema(example = "2025-12-25T00:00:00", format = "date-time", value_type = String)]
    pub start_date: NaiveDateTime,
    #[schema(example = "2026-01-24T23:59:59.999", format = "date-time", value_type = String)]
    pub end_date: NaiveDateTime,
}

pub struct PeriodTally {
    summary: PeriodSummary,
}

impl PeriodTally {
    pub fn new(user: &UserProfile, window: &DateWindow) -> Self {
        Self {
            summary: PeriodSummary {
                id: user.id,
                name: user.name.clone(),
                department: user.department.clone(),
                role: user.role,
                total_work_days: 0,
                late_count: 0,
                late_minutes: 0,
                absent_count: 0,
                permit_count: 0,
                no_clock_out_count: 0,
                start_date: window.start_at(),
                end_date: window.end_at(),
            },
        }
    }
}

impl DayReducer for PeriodTally {
    type Output = PeriodSummary;

    fn visit(&mut self, _date: NaiveDate, day: &DayKind<'_>) {
        let s = &mut self.summary;
        s.total_work_days += 1;

        match day {
            DayKind::Absent => s.absent_count += 1,
            DayKind::Excused(_) => s.permit_count += 1,
            DayKind::Worked { record, schedule } => {
                if let Some(minutes) = minutes_late(record, schedule) {
                    s.late_count += 1;
                    s.late_minutes += minutes;
                }
                if record.clock_in.is_some() && record.clock_out.is_none() {
                    s.no_clock_out_count += 1;
                }
            }
            DayKind::Sunday | DayKind::Holiday(_) | DayKind::Off | DayKind::Future => {}
        }
    }

    fn finish(self) -> PeriodSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::schedule::ScheduleBook;
    use crate::attendance::schedule::fixtures::{custom, hm, office_week};
    use crate::attendance::walk::{AttendanceIndex, walk};
    use crate::model::attendance::{Attendance, AttendanceStatus};
    use crate::model::schedule::WorkSchedule;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sari() -> UserProfile {
        UserProfile {
            id: 1,
            name: "Sari".into(),
            department: Some("Toko".into()),
            role: Role::Cashier,
        }
    }

    fn present(date: NaiveDate, clock_in: (u32, u32), clock_out: Option<(u32, u32)>) -> Attendance {
        Attendance {
            clock_in: Some(date.and_hms_opt(clock_in.0, clock_in.1, 0).unwrap()),
            clock_out: clock_out.map(|(h, m)| date.and_hms_opt(h, m, 0).unwrap()),
            status: Some(AttendanceStatus::Present),
            ..Attendance::blank(1, date)
        }
    }

    fn run(
        window: DateWindow,
        records: Vec<Attendance>,
        book: &ScheduleBook,
        today: NaiveDate,
    ) -> PeriodSummary {
        let index = AttendanceIndex::new(records);
        let users = vec![sari()];
        walk(&users, &window, &index, book, today, |u| PeriodTally::new(u, &window))
            .pop()
            .unwrap()
    }

    // Mon 2026-01-05 .. Sun 2026-01-11
    fn one_week() -> DateWindow {
        DateWindow {
            start: ymd(2026, 1, 5),
            end: ymd(2026, 1, 11),
        }
    }

    fn full_week_present() -> Vec<Attendance> {
        (5..=10)
            .map(|d| present(ymd(2026, 1, d), (8, 0), Some((17, 0))))
            .collect()
    }

    #[test]
    fn test_perfect_week() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let s = run(one_week(), full_week_present(), &book, ymd(2026, 2, 1));
        assert_eq!(s.total_work_days, 7);
        assert_eq!(
            (s.late_count, s.absent_count, s.permit_count, s.no_clock_out_count),
            (0, 0, 0, 0)
        );
        assert_eq!(s.start_date, ymd(2026, 1, 5).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_sunday_only_counts_toward_total() {
        let book = ScheduleBook::new(office_week(), vec![]);
        // a late, unclosed Sunday record changes nothing
        let mut records = full_week_present();
        records.push(present(ymd(2026, 1, 11), (10, 0), None));
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!(s.total_work_days, 7);
        assert_eq!(s.late_count, 0);
        assert_eq!(s.no_clock_out_count, 0);
    }

    #[test]
    fn test_each_missing_work_day_is_one_absence() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let records: Vec<Attendance> = full_week_present()
            .into_iter()
            .filter(|a| a.date != ymd(2026, 1, 6) && a.date != ymd(2026, 1, 8))
            .collect();
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!(s.absent_count, 2);
    }

    #[test]
    fn test_no_records_no_schedule_rows_means_no_absence() {
        let book = ScheduleBook::new(vec![], vec![]);
        let s = run(one_week(), vec![], &book, ymd(2026, 2, 1));
        assert_eq!(s.absent_count, 0);
        assert_eq!(s.total_work_days, 7);
    }

    #[test]
    fn test_holiday_record_is_not_absent_or_late() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let mut records = full_week_present();
        records.retain(|a| a.date != ymd(2026, 1, 7));
        records.push(Attendance {
            is_holiday: true,
            clock_in: Some(ymd(2026, 1, 7).and_hms_opt(11, 0, 0).unwrap()),
            ..Attendance::blank(1, ymd(2026, 1, 7))
        });
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!((s.absent_count, s.late_count, s.no_clock_out_count), (0, 0, 0));
    }

    #[test]
    fn test_late_counts_and_minutes() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let mut records = full_week_present();
        records[0] = present(ymd(2026, 1, 5), (8, 12), Some((17, 0)));
        records[2] = present(ymd(2026, 1, 7), (9, 5), Some((17, 0)));
        // exactly on time is not late
        records[3] = present(ymd(2026, 1, 8), (8, 0), Some((17, 0)));
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!(s.late_count, 2);
        assert_eq!(s.late_minutes, 12 + 65);
    }

    #[test]
    fn test_unset_status_is_checked_for_lateness() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let mut records = full_week_present();
        records[1].status = None;
        records[1].clock_in = Some(ymd(2026, 1, 6).and_hms_opt(8, 30, 0).unwrap());
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!((s.late_count, s.late_minutes), (1, 30));
    }

    #[test]
    fn test_permit_statuses_are_never_late() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let mut records = full_week_present();
        records[0].status = Some(AttendanceStatus::Sick);
        records[0].clock_in = Some(ymd(2026, 1, 5).and_hms_opt(11, 0, 0).unwrap());
        records[0].clock_out = None;
        records[1].status = Some(AttendanceStatus::Leave);
        records[2].status = Some(AttendanceStatus::Permit);
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!(s.permit_count, 3);
        assert_eq!(s.late_count, 0);
        assert_eq!(s.no_clock_out_count, 0);
    }

    #[test]
    fn test_missing_clock_out() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let mut records = full_week_present();
        records[4].clock_out = None;
        // a row with neither clock-in nor clock-out is not "missing clock-out"
        records[5] = Attendance {
            status: Some(AttendanceStatus::Present),
            ..Attendance::blank(1, ymd(2026, 1, 10))
        };
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!(s.no_clock_out_count, 1);
        assert_eq!(s.absent_count, 0);
    }

    #[test]
    fn test_custom_schedule_turns_day_off_into_work_day() {
        let week: Vec<WorkSchedule> = office_week()
            .into_iter()
            .map(|mut w| {
                if w.day_of_week == 6 {
                    w.is_work_day = false;
                }
                w
            })
            .collect();
        let created = ymd(2026, 1, 1).and_hms_opt(8, 0, 0).unwrap();
        let saturday = ymd(2026, 1, 10);

        let plain = ScheduleBook::new(week.clone(), vec![]);
        let records: Vec<Attendance> = full_week_present()
            .into_iter()
            .filter(|a| a.date != saturday)
            .collect();
        assert_eq!(run(one_week(), records.clone(), &plain, ymd(2026, 2, 1)).absent_count, 0);

        let overridden = ScheduleBook::new(
            week,
            vec![custom(1, saturday, saturday, (hm(7, 0), hm(12, 0)), created)],
        );
        assert_eq!(run(one_week(), records, &overridden, ymd(2026, 2, 1)).absent_count, 1);
    }

    #[test]
    fn test_custom_start_time_drives_lateness() {
        let created = ymd(2026, 1, 1).and_hms_opt(8, 0, 0).unwrap();
        let book = ScheduleBook::new(
            office_week(),
            vec![custom(1, ymd(2026, 1, 5), ymd(2026, 1, 5), (hm(7, 0), hm(15, 0)), created)],
        );
        let mut records = full_week_present();
        records[0] = present(ymd(2026, 1, 5), (7, 45), Some((15, 0)));
        let s = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!((s.late_count, s.late_minutes), (1, 45));
    }

    #[test]
    fn test_future_days_are_not_absent() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let s = run(one_week(), vec![], &book, ymd(2026, 1, 6));
        // Monday and Tuesday are missed; the rest is still ahead
        assert_eq!(s.absent_count, 2);
    }

    #[test]
    fn test_same_input_same_output() {
        let book = ScheduleBook::new(office_week(), vec![]);
        let mut records = full_week_present();
        records[2] = present(ymd(2026, 1, 7), (8, 40), None);
        let first = run(one_week(), records.clone(), &book, ymd(2026, 2, 1));
        let second = run(one_week(), records, &book, ymd(2026, 2, 1));
        assert_eq!(first, second);
    }
}
