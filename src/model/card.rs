use serde::{Deserialize, Serialize};

/// Separator between the ticket key and the summary in a card name.
pub const NAME_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub list_id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl Card {
    /// Ticket key parsed from the name prefix. A name without a separator
    /// yields the whole trimmed name.
    pub fn ticket_key(&self) -> &str {
        ticket_key_from_name(&self.name)
    }

    pub fn has_label(&self, label_id: &str) -> bool {
        self.label_ids.iter().any(|l| l == label_id)
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.member_ids.iter().any(|m| m == member_id)
    }
}

pub fn ticket_key_from_name(name: &str) -> &str {
    name.split(NAME_SEPARATOR).next().unwrap_or(name).trim()
}

pub fn card_name(key: &str, summary: &str) -> String {
    format!("{key} {NAME_SEPARATOR} {summary}")
}

/// Everything needed to create a card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    /// Ticket the card mirrors
    pub key: String,
    pub name: String,
    pub list_id: String,
    pub description: String,
    pub label_ids: Vec<String>,
    pub member_id: String,
}
