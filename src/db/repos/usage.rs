use rusqlite::{params, Row};

use crate::db::models::UsageRecord;
use crate::db::DbPool;
use crate::error::AppError;

/// Default generation allowance for a new identity. Policy value, not a
/// per-request tunable.
pub const DEFAULT_MAX_USAGE: i64 = 5;

fn row_to_usage(row: &Row) -> rusqlite::Result<UsageRecord> {
    Ok(UsageRecord {
        user_id: row.get("user_id")?,
        usage_count: row.get("usage_count")?,
        max_usage: row.get("max_usage")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn get(pool: &DbPool, user_id: &str) -> Result<UsageRecord, AppError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM user_usage WHERE user_id = ?1",
        params![user_id],
        row_to_usage,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            AppError::Internal(format!("usage record missing for {user_id}"))
        }
        other => AppError::Database(other),
    })
}

/// Insert the record at zero if the identity has never been seen.
/// Absence is the creation trigger, never an error.
fn ensure_exists(pool: &DbPool, user_id: &str) -> Result<(), AppError> {
    let now = chrono::Utc::now().to_rfc3339();
    let conn = pool.get()?;
    conn.execute(
        "INSERT OR IGNORE INTO user_usage (user_id, usage_count, max_usage, created_at, updated_at)
         VALUES (?1, 0, ?2, ?3, ?3)",
        params![user_id, DEFAULT_MAX_USAGE, now],
    )?;
    Ok(())
}

/// Return the record for `user_id`, creating it at `usage_count = 0` on
/// first sight. Never increments.
pub fn get_or_create(pool: &DbPool, user_id: &str) -> Result<UsageRecord, AppError> {
    ensure_exists(pool, user_id)?;
    get(pool, user_id)
}

/// Read-only view for status display.
pub fn peek(pool: &DbPool, user_id: &str) -> Result<UsageRecord, AppError> {
    get_or_create(pool, user_id)
}

/// Read-only quota gate: fails with `QuotaExceeded` if the cap is already
/// reached, without mutating anything.
pub fn check_remaining(pool: &DbPool, user_id: &str) -> Result<UsageRecord, AppError> {
    let record = get_or_create(pool, user_id)?;
    if !record.can_generate() {
        return Err(AppError::QuotaExceeded {
            usage_count: record.usage_count,
            max_usage: record.max_usage,
        });
    }
    Ok(record)
}

/// Consume one generation: a single conditional UPDATE so two concurrent
/// requests can never both pass the check when only one slot remains.
/// Zero rows updated means the cap is reached; nothing is mutated then.
pub fn check_and_consume(pool: &DbPool, user_id: &str) -> Result<UsageRecord, AppError> {
    ensure_exists(pool, user_id)?;

    let now = chrono::Utc::now().to_rfc3339();
    let updated = {
        let conn = pool.get()?;
        conn.execute(
            "UPDATE user_usage
             SET usage_count = usage_count + 1, updated_at = ?2
             WHERE user_id = ?1 AND usage_count < max_usage",
            params![user_id, now],
        )?
    };

    let record = get(pool, user_id)?;
    if updated == 0 {
        return Err(AppError::QuotaExceeded {
            usage_count: record.usage_count,
            max_usage: record.max_usage,
        });
    }
    Ok(record)
}
