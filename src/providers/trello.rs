use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::BoardSource;
use crate::model::card::{Card, CardSpec};

const BASE_URL: &str = "https://api.trello.com/1";
const CARD_FIELDS: &str = "id,name,desc,idList,idLabels,idMembers";

pub struct TrelloBoard {
    api_key: String,
    token: String,
    board_id: String,
    client: reqwest::Client,
}

impl TrelloBoard {
    pub fn new(api_key: String, token: String, board_id: String) -> Self {
        Self {
            api_key,
            token,
            board_id,
            client: reqwest::Client::new(),
        }
    }

    fn auth_params(&self) -> [(&str, &str); 2] {
        [("key", self.api_key.as_str()), ("token", self.token.as_str())]
    }

    async fn update_card(&self, card_id: &str, field: &str, value: &str) -> Result<()> {
        self.client
            .put(format!("{BASE_URL}/cards/{card_id}"))
            .query(&self.auth_params())
            .query(&[(field, value)])
            .send()
            .await
            .with_context(|| format!("Trello card {field} update failed"))?
            .error_for_status()
            .with_context(|| format!("Trello rejected {field} update"))?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct Member {
    id: String,
}

#[derive(Deserialize)]
struct Board {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrelloCard {
    id: String,
    name: String,
    desc: Option<String>,
    id_list: String,
    #[serde(default)]
    id_labels: Vec<String>,
    #[serde(default)]
    id_members: Vec<String>,
}

impl From<TrelloCard> for Card {
    fn from(card: TrelloCard) -> Self {
        Card {
            id: card.id,
            name: card.name,
            list_id: card.id_list,
            label_ids: card.id_labels,
            member_ids: card.id_members,
            description: card.desc.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl BoardSource for TrelloBoard {
    fn name(&self) -> &str {
        "Trello"
    }

    async fn connect(&self) -> Result<()> {
        let board: Board = self
            .client
            .get(format!("{BASE_URL}/boards/{}", self.board_id))
            .query(&self.auth_params())
            .query(&[("fields", "name")])
            .send()
            .await
            .context("Trello board request failed")?
            .error_for_status()
            .with_context(|| format!("Trello board {} is not accessible", self.board_id))?
            .json()
            .await
            .context("Failed to parse Trello board")?;

        println!("Using board: {}", board.name);
        Ok(())
    }

    async fn current_member_id(&self) -> Result<String> {
        let member: Member = self
            .client
            .get(format!("{BASE_URL}/members/me"))
            .query(&self.auth_params())
            .query(&[("fields", "id")])
            .send()
            .await
            .context("Trello members/me failed")?
            .error_for_status()
            .context("Trello rejected the credentials")?
            .json()
            .await?;
        Ok(member.id)
    }

    async fn cards(&self) -> Result<Vec<Card>> {
        let cards: Vec<TrelloCard> = self
            .client
            .get(format!("{BASE_URL}/boards/{}/cards", self.board_id))
            .query(&self.auth_params())
            .query(&[("fields", CARD_FIELDS), ("filter", "open")])
            .send()
            .await
            .context("Trello cards request failed")?
            .error_for_status()
            .context("Trello rejected cards request")?
            .json()
            .await
            .context("Failed to parse Trello cards")?;

        tracing::debug!(count = cards.len(), "Fetched Trello cards");
        Ok(cards.into_iter().map(Card::from).collect())
    }

    async fn create_card(&self, spec: &CardSpec) -> Result<()> {
        let labels = spec.label_ids.join(",");
        self.client
            .post(format!("{BASE_URL}/cards"))
            .query(&self.auth_params())
            .form(&[
                ("idList", spec.list_id.as_str()),
                ("name", spec.name.as_str()),
                ("desc", spec.description.as_str()),
                ("idLabels", labels.as_str()),
                ("idMembers", spec.member_id.as_str()),
            ])
            .send()
            .await
            .context("Trello card create failed")?
            .error_for_status()
            .context("Trello rejected the new card")?;
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<()> {
        self.update_card(card_id, "idList", list_id).await
    }

    async fn relabel_card(&self, card_id: &str, label_ids: &[String]) -> Result<()> {
        self.update_card(card_id, "idLabels", &label_ids.join(",")).await
    }

    async fn archive_cards_in_list(&self, list_id: &str) -> Result<()> {
        self.client
            .post(format!("{BASE_URL}/lists/{list_id}/archiveAllCards"))
            .query(&self.auth_params())
            .send()
            .await
            .context("Trello archive request failed")?
            .error_for_status()
            .context("Trello rejected archiving the list")?;
        Ok(())
    }
}
