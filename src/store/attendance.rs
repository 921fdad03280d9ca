use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{MySql, MySqlPool};
use tracing::{debug, info};

use crate::crypto::{AttendanceCodec, CryptoError, FieldCipher, decode_opt, encode_opt};
use crate::error::AppError;
use crate::model::attendance::{Attendance, AttendanceRow, AttendanceStatus};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, date, clock_in, clock_out, status, is_holiday, notes FROM attendances";

/// Encrypts the sensitive columns of a record before it is written.
pub fn seal<C: AttendanceCodec>(codec: &C, a: &Attendance) -> Result<AttendanceRow, CryptoError> {
    Ok(AttendanceRow {
        id: a.id,
        user_id: a.user_id,
        date: a.date,
        clock_in: encode_opt::<NaiveDateTime, C>(codec, a.clock_in.as_ref())?,
        clock_out: encode_opt::<NaiveDateTime, C>(codec, a.clock_out.as_ref())?,
        status: encode_opt::<AttendanceStatus, C>(codec, a.status.as_ref())?,
        is_holiday: a.is_holiday,
        notes: encode_opt::<String, C>(codec, a.notes.as_ref())?,
    })
}

/// Decrypts a stored row. Absent columns stay absent.
pub fn open<C: AttendanceCodec>(codec: &C, row: AttendanceRow) -> Result<Attendance, CryptoError> {
    Ok(Attendance {
        id: row.id,
        user_id: row.user_id,
        date: row.date,
        clock_in: decode_opt::<NaiveDateTime, C>(codec, row.clock_in.as_deref())?,
        clock_out: decode_opt::<NaiveDateTime, C>(codec, row.clock_out.as_deref())?,
        status: decode_opt::<AttendanceStatus, C>(codec, row.status.as_deref())?,
        is_holiday: row.is_holiday,
        notes: decode_opt::<String, C>(codec, row.notes.as_deref())?,
    })
}

/// A holiday record with the holiday taken away: flag and holiday notes cleared,
/// or `None` when nothing else was recorded that day.
pub fn lift_holiday(mut record: Attendance) -> Option<Attendance> {
    if record.clock_in.is_none() && record.clock_out.is_none() && record.status.is_none() {
        return None;
    }
    record.is_holiday = false;
    record.notes = None;
    Some(record)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ClockOutcome {
    Recorded,
    AlreadyClockedIn,
    NoOpenClockIn,
}

async fn upsert_row<'e, E>(executor: E, row: &AttendanceRow) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    sqlx::query(
        r#"
        INSERT INTO attendances (user_id, date, clock_in, clock_out, status, is_holiday, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            clock_in = VALUES(clock_in),
            clock_out = VALUES(clock_out),
            status = VALUES(status),
            is_holiday = VALUES(is_holiday),
            notes = VALUES(notes)
        "#,
    )
    .bind(row.user_id)
    .bind(row.date)
    .bind(&row.clock_in)
    .bind(&row.clock_out)
    .bind(&row.status)
    .bind(row.is_holiday)
    .bind(&row.notes)
    .execute(executor)
    .await?;
    Ok(())
}

/// Attendance access. Every write goes through `seal`, every read through `open`.
pub struct AttendanceStore<'a, C: AttendanceCodec = FieldCipher> {
    pool: &'a MySqlPool,
    codec: &'a C,
}

impl<'a, C: AttendanceCodec> AttendanceStore<'a, C> {
    pub fn new(pool: &'a MySqlPool, codec: &'a C) -> Self {
        Self { pool, codec }
    }

    fn open_all(&self, rows: Vec<AttendanceRow>) -> Result<Vec<Attendance>, AppError> {
        rows.into_iter()
            .map(|row| open(self.codec, row).map_err(AppError::from))
            .collect()
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE date = ? ORDER BY user_id"
        ))
        .bind(date)
        .fetch_all(self.pool)
        .await?;
        self.open_all(rows)
    }

    pub async fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE date BETWEEN ? AND ? ORDER BY date, user_id"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;
        debug!(rows = rows.len(), %start, %end, "Fetched attendance range");
        self.open_all(rows)
    }

    pub async fn find_for_user_in_range(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ? AND date BETWEEN ? AND ? ORDER BY date"
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;
        self.open_all(rows)
    }

    /// Insert or replace the record for (user_id, date). Last write wins.
    pub async fn upsert(&self, attendance: &Attendance) -> Result<(), AppError> {
        let row = seal(self.codec, attendance)?;
        upsert_row(self.pool, &row).await?;
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM attendances WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sets or clears the holiday flag on `date` for every given user, all or nothing.
    /// Returns the number of rows written or removed.
    pub async fn apply_holiday(
        &self,
        user_ids: &[u64],
        date: NaiveDate,
        is_holiday: bool,
        notes: Option<&String>,
    ) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        let touched = if is_holiday {
            self.mark_holiday(&mut tx, user_ids, date, notes).await?
        } else {
            self.unmark_holiday(&mut tx, user_ids, date).await?
        };
        tx.commit().await?;

        info!(users = user_ids.len(), touched, %date, is_holiday, "Holiday flag applied");
        Ok(touched)
    }

    /// Existing clock times and statuses are kept.
    async fn mark_holiday(
        &self,
        tx: &mut sqlx::Transaction<'_, MySql>,
        user_ids: &[u64],
        date: NaiveDate,
        notes: Option<&String>,
    ) -> Result<usize, AppError> {
        let notes = encode_opt::<String, C>(self.codec, notes)?;
        for user_id in user_ids {
            sqlx::query(
                r#"
                INSERT INTO attendances (user_id, date, is_holiday, notes)
                VALUES (?, ?, TRUE, ?)
                ON DUPLICATE KEY UPDATE
                    is_holiday = TRUE,
                    notes = COALESCE(VALUES(notes), notes)
                "#,
            )
            .bind(*user_id)
            .bind(date)
            .bind(&notes)
            .execute(&mut **tx)
            .await?;
        }
        Ok(user_ids.len())
    }

    /// Never inserts. Holiday rows with nothing else recorded are removed.
    async fn unmark_holiday(
        &self,
        tx: &mut sqlx::Transaction<'_, MySql>,
        user_ids: &[u64],
        date: NaiveDate,
    ) -> Result<usize, AppError> {
        let users: HashSet<u64> = user_ids.iter().copied().collect();
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE date = ? AND is_holiday = TRUE FOR UPDATE"
        ))
        .bind(date)
        .fetch_all(&mut **tx)
        .await?;

        let mut touched = 0;
        for row in rows.into_iter().filter(|r| users.contains(&r.user_id)) {
            let id = row.id;
            match lift_holiday(open(self.codec, row)?) {
                Some(record) => upsert_row(&mut **tx, &seal(self.codec, &record)?).await?,
                None => {
                    sqlx::query("DELETE FROM attendances WHERE id = ?")
                        .bind(id)
                        .execute(&mut **tx)
                        .await?;
                }
            }
            touched += 1;
        }
        Ok(touched)
    }

    async fn locked_row(
        &self,
        tx: &mut sqlx::Transaction<'_, MySql>,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, AppError> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = ? AND date = ? FOR UPDATE"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|r| open(self.codec, r)).transpose()?)
    }

    pub async fn clock_in(&self, user_id: u64, now: NaiveDateTime) -> Result<ClockOutcome, AppError> {
        let date = now.date();
        let mut tx = self.pool.begin().await?;

        let mut record = match self.locked_row(&mut tx, user_id, date).await? {
            Some(existing) if existing.clock_in.is_some() => {
                tx.rollback().await?;
                return Ok(ClockOutcome::AlreadyClockedIn);
            }
            Some(existing) => existing,
            None => Attendance::blank(user_id, date),
        };

        record.clock_in = Some(now);
        record.status.get_or_insert(AttendanceStatus::Present);

        upsert_row(&mut *tx, &seal(self.codec, &record)?).await?;
        tx.commit().await?;
        Ok(ClockOutcome::Recorded)
    }

    pub async fn clock_out(&self, user_id: u64, now: NaiveDateTime) -> Result<ClockOutcome, AppError> {
        let date = now.date();
        let mut tx = self.pool.begin().await?;

        let mut record = match self.locked_row(&mut tx, user_id, date).await? {
            Some(existing) if existing.clock_in.is_some() && existing.clock_out.is_none() => existing,
            _ => {
                tx.rollback().await?;
                return Ok(ClockOutcome::NoOpenClockIn);
            }
        };

        record.clock_out = Some(now);
        upsert_row(&mut *tx, &seal(self.codec, &record)?).await?;
        tx.commit().await?;
        Ok(ClockOutcome::Recorded)
    }
}
