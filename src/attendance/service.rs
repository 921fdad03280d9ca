use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::debug;

use super::period::DateWindow;
use super::report::{MonthlyReport, UserMonthlyReport};
use super::schedule::ScheduleBook;
use super::summary::{PeriodSummary, PeriodTally};
use super::walk::{AttendanceIndex, walk};
use crate::crypto::FieldCipher;
use crate::error::AppError;
use crate::model::user::UserProfile;
use crate::store::{AttendanceStore, ScheduleStore, UserStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    SingleUser(u64),
    AllUsers,
}

/// Everything one walk needs, fetched in bulk up front.
struct Snapshot {
    users: Vec<UserProfile>,
    index: AttendanceIndex,
    book: ScheduleBook,
}

async fn load(
    pool: &MySqlPool,
    cipher: &FieldCipher,
    scope: Scope,
    window: &DateWindow,
) -> Result<Snapshot, AppError> {
    let user_store = UserStore::new(pool);
    let users: Vec<UserProfile> = match scope {
        Scope::SingleUser(id) => {
            let user = user_store
                .find(id)
                .await?
                .ok_or_else(|| AppError::not_found("User not found"))?;
            vec![user.profile()]
        }
        Scope::AllUsers => user_store.active().await?.iter().map(|u| u.profile()).collect(),
    };

    let attendance = AttendanceStore::new(pool, cipher);
    let records = match scope {
        Scope::SingleUser(id) => {
            attendance
                .find_for_user_in_range(id, window.start, window.end)
                .await?
        }
        Scope::AllUsers => attendance.find_in_range(window.start, window.end).await?,
    };

    let schedules = ScheduleStore::new(pool);
    let book = ScheduleBook::new(
        schedules.weekly().await?,
        schedules.custom_overlapping(window.start, window.end).await?,
    );

    let index = AttendanceIndex::new(records);
    debug!(users = users.len(), records = index.len(), ?scope, "Attendance snapshot loaded");

    Ok(Snapshot { users, index, book })
}

/// Payroll-period attendance summary per user in scope.
pub async fn payroll_period_summary(
    pool: &MySqlPool,
    cipher: &FieldCipher,
    scope: Scope,
    reference_day: u32,
    month: u32,
    year: i32,
    today: NaiveDate,
) -> Result<(DateWindow, Vec<PeriodSummary>), AppError> {
    let window = DateWindow::payroll_period(reference_day, month, year, today)?;
    let snap = load(pool, cipher, scope, &window).await?;

    let summaries = walk(&snap.users, &window, &snap.index, &snap.book, today, |u| {
        PeriodTally::new(u, &window)
    });
    Ok((window, summaries))
}

/// Day-by-day report of a calendar month per user in scope.
pub async fn monthly_report(
    pool: &MySqlPool,
    cipher: &FieldCipher,
    scope: Scope,
    month: u32,
    year: i32,
    today: NaiveDate,
) -> Result<(DateWindow, Vec<UserMonthlyReport>), AppError> {
    let window = DateWindow::month(year, month)?;
    let snap = load(pool, cipher, scope, &window).await?;

    let reports = walk(&snap.users, &window, &snap.index, &snap.book, today, MonthlyReport::new);
    Ok((window, reports))
}
