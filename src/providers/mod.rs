pub mod jira;
pub mod trello;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::model::card::{Card, CardSpec};
use crate::model::ticket::TicketMap;

/// Where tickets come from.
#[async_trait]
pub trait TicketSource: Send + Sync {
    fn name(&self) -> &str;
    /// Verify the service is reachable and the credentials are accepted.
    async fn connect(&self) -> Result<()>;
    async fn assigned_tickets(&self, jql: &str) -> Result<TicketMap>;
}

/// The kanban board cards are mirrored onto.
#[async_trait]
pub trait BoardSource: Send + Sync {
    fn name(&self) -> &str;
    async fn connect(&self) -> Result<()>;
    /// Member id the board credentials belong to.
    async fn current_member_id(&self) -> Result<String>;
    /// Every open card on the board, unfiltered.
    async fn cards(&self) -> Result<Vec<Card>>;
    async fn create_card(&self, spec: &CardSpec) -> Result<()>;
    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<()>;
    /// Replace the card's labels with `label_ids`, in that order.
    async fn relabel_card(&self, card_id: &str, label_ids: &[String]) -> Result<()>;
    async fn archive_cards_in_list(&self, list_id: &str) -> Result<()>;
}

#[cfg(test)]
pub mod memory;


pub fn create_ticket_source(config: &AppConfig) -> Result<jira::JiraTicketSource> {
    let cfg = config.jira()?;
    Ok(jira::JiraTicketSource::new(
        cfg.url.clone(),
        cfg.user.clone(),
        cfg.api_token.clone(),
    ))
}

pub fn create_board_source(config: &AppConfig) -> Result<trello::TrelloBoard> {
    let cfg = config.trello()?;
    Ok(trello::TrelloBoard::new(
        cfg.api_key.clone(),
        cfg.token.clone(),
        cfg.board_id.clone(),
    ))
}
