//! Day-by-day walk shared by every attendance report.
//!
//! Each date is classified once by [`classify`]; reports only differ in the
//! window they walk and the [`DayReducer`] that folds the classified days.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use super::period::DateWindow;
use super::schedule::{DaySchedule, ScheduleBook};
use crate::model::attendance::Attendance;
use crate::model::user::UserProfile;

/// Attendance records keyed by (user, date).
#[derive(Debug, Default)]
pub struct AttendanceIndex {
    by_key: HashMap<(u64, NaiveDate), Attendance>,
}

impl AttendanceIndex {
    pub fn new(records: impl IntoIterator<Item = Attendance>) -> Self {
        let by_key = records
            .into_iter()
            .map(|a| ((a.user_id, a.date), a))
            .collect();
        Self { by_key }
    }

    pub fn get(&self, user_id: u64, date: NaiveDate) -> Option<&Attendance> {
        self.by_key.get(&(user_id, date))
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DayKind<'a> {
    Sunday,
    Holiday(&'a Attendance),
    /// Not a work day by schedule.
    Off,
    /// A work day after today with nothing recorded yet.
    Future,
    Absent,
    /// Permit, leave or sick.
    Excused(&'a Attendance),
    Worked {
        record: &'a Attendance,
        schedule: DaySchedule,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DayLabel {
    Sunday,
    Holiday,
    Off,
    Future,
    Absent,
    Excused,
    Present,
}

impl DayKind<'_> {
    pub fn label(&self) -> DayLabel {
        match self {
            DayKind::Sunday => DayLabel::Sunday,
            DayKind::Holiday(_) => DayLabel::Holiday,
            DayKind::Off => DayLabel::Off,
            DayKind::Future => DayLabel::Future,
            DayKind::Absent => DayLabel::Absent,
            DayKind::Excused(_) => DayLabel::Excused,
            DayKind::Worked { .. } => DayLabel::Present,
        }
    }

    pub fn record(&self) -> Option<&Attendance> {
        match self {
            DayKind::Holiday(r) | DayKind::Excused(r) => Some(r),
            DayKind::Worked { record, .. } => Some(record),
            _ => None,
        }
    }
}

pub fn classify<'a>(
    date: NaiveDate,
    record: Option<&'a Attendance>,
    book: &ScheduleBook,
    today: NaiveDate,
) -> DayKind<'a> {
    if date.weekday() == Weekday::Sun {
        return DayKind::Sunday;
    }

    if let Some(r) = record.filter(|r| r.is_holiday) {
        return DayKind::Holiday(r);
    }

    let schedule = book.resolve(date);
    if !schedule.is_work_day {
        return DayKind::Off;
    }

    match record {
        Some(r) if r.status.is_some_and(|s| s.is_excused()) => DayKind::Excused(r),
        Some(r) => DayKind::Worked {
            record: r,
            schedule,
        },
        None if date > today => DayKind::Future,
        None => DayKind::Absent,
    }
}

/// Whole minutes the clock-in is past the scheduled start, if it is strictly later.
pub fn minutes_late(record: &Attendance, schedule: &DaySchedule) -> Option<i64> {
    let clock_in = record.clock_in?;
    let scheduled = record.date.and_time(schedule.start?);
    (clock_in > scheduled).then(|| (clock_in - scheduled).num_minutes())
}

/// Whole minutes the clock-out is before the scheduled end, if it is strictly earlier.
pub fn minutes_early(record: &Attendance, schedule: &DaySchedule) -> Option<i64> {
    let clock_out = record.clock_out?;
    let scheduled = record.date.and_time(schedule.end?);
    (clock_out < scheduled).then(|| (scheduled - clock_out).num_minutes())
}

pub trait DayReducer {
    type Output;

    fn visit(&mut self, date: NaiveDate, day: &DayKind<'_>);

    fn finish(self) -> Self::Output;
}

/// Walks every date of `window` for every user, one reducer per user.
pub fn walk<R, F>(
    users: &[UserProfile],
    window: &DateWindow,
    index: &AttendanceIndex,
    book: &ScheduleBook,
    today: NaiveDate,
    mut reducer_for: F,
) -> Vec<R::Output>
where
    R: DayReducer,
    F: FnMut(&UserProfile) -> R,
{
    users
        .iter()
        .map(|user| {
            let mut reducer = reducer_for(user);
            for date in window.days() {
                let day = classify(date, index.get(user.id, date), book, today);
                reducer.visit(date, &day);
            }
            reducer.finish()
        })
        .collect()
}
