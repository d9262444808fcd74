use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer as stored. `phone` is always the 10-digit canonical form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub name_normalized: String,
    pub phone: String,
    pub zip: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: Option<String>,
    pub phone: String,
    pub zip: Option<String>,
    pub message: Option<String>,
    pub thread_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
