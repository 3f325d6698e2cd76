//! Dashboard response models

use crate::ledger::{UserId, UserRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: UserId,
    pub balance: i64,
    pub referral_count: u64,
}

impl From<UserRecord> for UserRow {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            balance: record.balance,
            referral_count: record.referral_count,
        }
    }
}

/// One consistent view of every user in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersSnapshot {
    pub users: Vec<UserRow>,
    pub total_users: usize,
    pub total_balance: i64,
    pub generated_at: DateTime<Utc>,
}

impl UsersSnapshot {
    pub fn new(records: Vec<UserRecord>) -> Self {
        let users: Vec<UserRow> = records.into_iter().map(UserRow::from).collect();
        let total_balance = users.iter().map(|u| u.balance).sum();

        Self {
            total_users: users.len(),
            total_balance,
            users,
            generated_at: Utc::now(),
        }
    }
}
