use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

use crate::model::schedule::{CustomWorkSchedule, WorkSchedule};

pub struct NewCustomSchedule<'a> {
    pub name: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

pub struct ScheduleStore<'a> {
    pool: &'a MySqlPool,
}

impl<'a> ScheduleStore<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn weekly(&self) -> Result<Vec<WorkSchedule>, sqlx::Error> {
        sqlx::query_as::<_, WorkSchedule>(
            r#"
            SELECT day_of_week, is_work_day, start_time, end_time
            FROM work_schedules
            ORDER BY day_of_week
            "#,
        )
        .fetch_all(self.pool)
        .await
    }

    pub async fn upsert_weekly(&self, schedule: &WorkSchedule) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO work_schedules (day_of_week, is_work_day, start_time, end_time)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                is_work_day = VALUES(is_work_day),
                start_time = VALUES(start_time),
                end_time = VALUES(end_time)
            "#,
        )
        .bind(schedule.day_of_week)
        .bind(schedule.is_work_day)
        .bind(schedule.start_time)
        .bind(schedule.end_time)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn custom(&self) -> Result<Vec<CustomWorkSchedule>, sqlx::Error> {
        sqlx::query_as::<_, CustomWorkSchedule>(
            r#"
            SELECT id, name, start_date, end_date, start_time, end_time, created_at
            FROM custom_work_schedules
            ORDER BY start_date DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await
    }

    /// Custom schedules intersecting [start, end].
    pub async fn custom_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CustomWorkSchedule>, sqlx::Error> {
        sqlx::query_as::<_, CustomWorkSchedule>(
            r#"
            SELECT id, name, start_date, end_date, start_time, end_time, created_at
            FROM custom_work_schedules
            WHERE start_date <= ? AND end_date >= ?
            "#,
        )
        .bind(end)
        .bind(start)
        .fetch_all(self.pool)
        .await
    }

    pub async fn create_custom(&self, new: NewCustomSchedule<'_>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO custom_work_schedules (name, start_date, end_date, start_time, end_time)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.name)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.start_time)
        .bind(new.end_time)
        .execute(self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    pub async fn delete_custom(&self, id: u64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM custom_work_schedules WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
