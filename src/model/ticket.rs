use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tickets keyed by ticket key. Ordered so every pass walks them the same way.
pub type TicketMap = BTreeMap<String, Ticket>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    pub issue_type: String,
    /// Browse link back to the ticket source
    pub link: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Accumulated work time, in seconds
    #[serde(default)]
    pub time_spent: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
    pub key: String,
    pub link: String,
}

impl Ticket {
    pub fn hours_spent(&self) -> f64 {
        self.time_spent as f64 / 3600.0
    }
}
