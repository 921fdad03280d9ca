use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use derive_more::Display;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum InvalidPeriod {
    #[display(fmt = "day must be between 1 and 31, got {}", _0)]
    Day(u32),
    #[display(fmt = "month must be between 1 and 12, got {}", _0)]
    Month(u32),
    #[display(fmt = "year {} is out of range", _0)]
    Year(i32),
}

impl std::error::Error for InvalidPeriod {}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Day `day` of the given month with calendar overflow: days past the end of the
/// month roll into the next one and day 0 is the last day of the previous month.
fn rolled_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, InvalidPeriod> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(InvalidPeriod::Year(year))?;
    first
        .checked_add_signed(Duration::days(i64::from(day) - 1))
        .ok_or(InvalidPeriod::Year(year))
}

fn validate_month(month: u32) -> Result<(), InvalidPeriod> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(InvalidPeriod::Month(month))
    }
}

impl DateWindow {
    /// Payroll period anchored on `reference_day`: from that day of the previous
    /// month up to the day before it in `month`. The end is capped at `today`.
    pub fn payroll_period(
        reference_day: u32,
        month: u32,
        year: i32,
        today: NaiveDate,
    ) -> Result<Self, InvalidPeriod> {
        if !(1..=31).contains(&reference_day) {
            return Err(InvalidPeriod::Day(reference_day));
        }
        validate_month(month)?;

        let (start_year, start_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
        let start = rolled_date(start_year, start_month, reference_day)?;
        let end = rolled_date(year, month, reference_day - 1)?;

        Ok(Self {
            start,
            end: end.min(today),
        })
    }

    /// The whole calendar month, future days included.
    pub fn month(year: i32, month: u32) -> Result<Self, InvalidPeriod> {
        validate_month(month)?;
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or(InvalidPeriod::Year(year))?;
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let end = rolled_date(next_year, next_month, 0)?;
        Ok(Self { start, end })
    }

    /// Every date in the window, in order. Empty when start > end.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.succ_opt()).take_while(move |d| *d <= end)
    }

    pub fn start_at(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Last millisecond of the final day.
    pub fn end_at(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn far_future() -> NaiveDate {
        ymd(2100, 1, 1)
    }

    #[test]
    fn test_january_period_starts_in_previous_december() {
        let w = DateWindow::payroll_period(25, 1, 2026, far_future()).unwrap();
        assert_eq!(w.start, ymd(2025, 12, 25));
        assert_eq!(w.end, ymd(2026, 1, 24));
        assert_eq!(w.start_at().to_string(), "2025-12-25 00:00:00");
        assert_eq!(w.end_at().format("%Y-%m-%dT%H:%M:%S%.3f").to_string(), "2026-01-24T23:59:59.999");
    }

    #[test]
    fn test_mid_year_period() {
        let w = DateWindow::payroll_period(25, 6, 2026, far_future()).unwrap();
        assert_eq!(w.start, ymd(2026, 5, 25));
        assert_eq!(w.end, ymd(2026, 6, 24));
        assert_eq!(w.days().count(), 31);
    }

    #[test]
    fn test_end_capped_at_today() {
        let today = ymd(2026, 1, 10);
        let w = DateWindow::payroll_period(25, 1, 2026, today).unwrap();
        assert_eq!(w.start, ymd(2025, 12, 25));
        assert_eq!(w.end, today);
    }

    #[test]
    fn test_future_period_is_empty() {
        let today = ymd(2026, 1, 10);
        let w = DateWindow::payroll_period(25, 3, 2026, today).unwrap();
        assert_eq!(w.days().count(), 0);
    }

    #[test]
    fn test_reference_day_one_ends_on_last_day_of_previous_month() {
        let w = DateWindow::payroll_period(1, 3, 2026, far_future()).unwrap();
        assert_eq!(w.start, ymd(2026, 2, 1));
        assert_eq!(w.end, ymd(2026, 2, 28));
    }

    #[test]
    fn test_overflowing_reference_day_rolls_over() {
        // February has no 31st: the start rolls into March.
        let w = DateWindow::payroll_period(31, 3, 2026, far_future()).unwrap();
        assert_eq!(w.start, ymd(2026, 3, 3));
        assert_eq!(w.end, ymd(2026, 3, 30));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            DateWindow::payroll_period(0, 1, 2026, far_future()),
            Err(InvalidPeriod::Day(0))
        );
        assert_eq!(
            DateWindow::payroll_period(32, 1, 2026, far_future()),
            Err(InvalidPeriod::Day(32))
        );
        assert_eq!(
            DateWindow::payroll_period(25, 13, 2026, far_future()),
            Err(InvalidPeriod::Month(13))
        );
        assert_eq!(DateWindow::month(2026, 0), Err(InvalidPeriod::Month(0)));
    }

    #[test]
    fn test_calendar_month() {
        let feb = DateWindow::month(2024, 2).unwrap();
        assert_eq!(feb.end, ymd(2024, 2, 29));
        assert_eq!(feb.days().count(), 29);

        let dec = DateWindow::month(2025, 12).unwrap();
        assert_eq!(dec.start, ymd(2025, 12, 1));
        assert_eq!(dec.end, ymd(2025, 12, 31));
    }
}
