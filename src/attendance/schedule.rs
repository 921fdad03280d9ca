use std::cmp::Reverse;

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::model::schedule::{CustomWorkSchedule, WorkSchedule};

/// What a single date asks of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySchedule {
    pub is_work_day: bool,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl DaySchedule {
    const OFF: DaySchedule = DaySchedule {
        is_work_day: false,
        start: None,
        end: None,
    };
}

/// Weekly schedule plus custom overrides, resolved per date.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBook {
    weekly: [Option<WorkSchedule>; 7],
    // newest first
    custom: Vec<CustomWorkSchedule>,
}

impl ScheduleBook {
    pub fn new(weekly: Vec<WorkSchedule>, mut custom: Vec<CustomWorkSchedule>) -> Self {
        let mut slots: [Option<WorkSchedule>; 7] = Default::default();
        for row in weekly {
            if let Some(slot) = slots.get_mut(row.day_of_week as usize) {
                *slot = Some(row);
            }
        }

        custom.sort_by_key(|c| Reverse((c.created_at, c.id)));

        Self {
            weekly: slots,
            custom,
        }
    }

    /// The custom schedule covering `date`. Overlaps go to the most recently created one.
    pub fn custom_for(&self, date: NaiveDate) -> Option<&CustomWorkSchedule> {
        self.custom.iter().find(|c| c.covers(date))
    }

    pub fn weekly_for(&self, date: NaiveDate) -> Option<&WorkSchedule> {
        self.weekly[date.weekday().num_days_from_sunday() as usize].as_ref()
    }

    pub fn resolve(&self, date: NaiveDate) -> DaySchedule {
        if let Some(custom) = self.custom_for(date) {
            return DaySchedule {
                is_work_day: true,
                start: Some(custom.start_time),
                end: Some(custom.end_time),
            };
        }

        match self.weekly_for(date) {
            Some(w) => DaySchedule {
                is_work_day: w.is_work_day,
                start: w.start_time,
                end: w.end_time,
            },
            None => DaySchedule::OFF,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::NaiveDateTime;

    pub fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Monday to Friday 08:00-17:00, Saturday 08:00-12:00, Sunday off.
    pub fn office_week() -> Vec<WorkSchedule> {
        (0u8..7)
            .map(|day| match day {
                0 => WorkSchedule {
                    day_of_week: 0,
                    is_work_day: false,
                    start_time: None,
                    end_time: None,
                },
                6 => WorkSchedule {
                    day_of_week: 6,
                    is_work_day: true,
                    start_time: Some(hm(8, 0)),
                    end_time: Some(hm(12, 0)),
                },
                d => WorkSchedule {
                    day_of_week: d,
                    is_work_day: true,
                    start_time: Some(hm(8, 0)),
                    end_time: Some(hm(17, 0)),
                },
            })
            .collect()
    }

    pub fn custom(
        id: u64,
        start: NaiveDate,
        end: NaiveDate,
        times: (NaiveTime, NaiveTime),
        created_at: NaiveDateTime,
    ) -> CustomWorkSchedule {
        CustomWorkSchedule {
            id,
            name: format!("custom-{id}"),
            start_date: start,
            end_date: end,
            start_time: times.0,
            end_time: times.1,
            created_at,
        }
    }
}
