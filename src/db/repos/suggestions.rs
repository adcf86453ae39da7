use rusqlite::{params, Row};

use crate::db::models::Suggestion;
use crate::db::DbPool;
use crate::error::AppError;

fn row_to_suggestion(row: &Row) -> rusqlite::Result<Suggestion> {
    Ok(Suggestion {
        id: row.get("id")?,
        suggestion: row.get("suggestion")?,
        created_at: row.get("created_at")?,
    })
}

/// Store a free-text suggestion. Trims the body and rejects empty or
/// whitespace-only input. No auth gate, no quota interaction.
pub fn create(pool: &DbPool, suggestion: &str) -> Result<Suggestion, AppError> {
    let trimmed = suggestion.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Suggestion cannot be empty".into()));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO suggestions (id, suggestion, created_at) VALUES (?1, ?2, ?3)",
        params![id, trimmed, now],
    )?;

    get_by_id(pool, &id)
}

pub fn get_by_id(pool: &DbPool, id: &str) -> Result<Suggestion, AppError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM suggestions WHERE id = ?1",
        params![id],
        row_to_suggestion,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            AppError::Internal(format!("Suggestion {id} missing after insert"))
        }
        other => AppError::Database(other),
    })
}
