use serde::{Deserialize, Serialize};

// ============================================================================
// Usage
// ============================================================================

/// Per-identity quota record. `usage_count` only ever moves up, and only
/// through the ledger's conditional increment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub user_id: String,
    pub usage_count: i64,
    pub max_usage: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl UsageRecord {
    pub fn remaining(&self) -> i64 {
        (self.max_usage - self.usage_count).max(0)
    }

    pub fn can_generate(&self) -> bool {
        self.usage_count < self.max_usage
    }
}

// ============================================================================
// Suggestions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub suggestion: String,
    pub created_at: String,
}
