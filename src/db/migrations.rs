use rusqlite::Connection;

use crate::error::AppError;

/// Run the idempotent schema migration.
pub fn run(conn: &Connection) -> Result<(), AppError> {
    tracing::debug!("Running database migrations");

    conn.execute_batch(SCHEMA)?;

    tracing::info!("Database migrations complete");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Per-user generation quota
-- ============================================================================

CREATE TABLE IF NOT EXISTS user_usage (
    user_id     TEXT PRIMARY KEY,
    usage_count INTEGER NOT NULL DEFAULT 0 CHECK(usage_count >= 0),
    max_usage   INTEGER NOT NULL DEFAULT 5 CHECK(max_usage > 0),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- ============================================================================
-- Free-text feature suggestions (feedback intake, no auth)
-- ============================================================================

CREATE TABLE IF NOT EXISTS suggestions (
    id          TEXT PRIMARY KEY,
    suggestion  TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_suggestions_created ON suggestions(created_at);

"#;
