//! In-memory ticket source and board used by tests.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{BoardSource, TicketSource};
use crate::model::card::{Card, CardSpec};
use crate::model::ticket::{Ticket, TicketMap};

pub struct MemoryTickets {
    tickets: TicketMap,
    pub queries: Arc<Mutex<Vec<String>>>,
    fail_connect: bool,
    fail_query: bool,
}

impl MemoryTickets {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets: tickets.into_iter().map(|t| (t.key.clone(), t)).collect(),
            queries: Arc::new(Mutex::new(Vec::new())),
            fail_connect: false,
            fail_query: false,
        }
    }

    pub fn with_connect_failure(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn with_query_failure(mut self) -> Self {
        self.fail_query = true;
        self
    }
}

#[async_trait]
impl TicketSource for MemoryTickets {
    fn name(&self) -> &str {
        "Memory tickets"
    }

    async fn connect(&self) -> Result<()> {
        if self.fail_connect {
            bail!("Mock connect failure");
        }
        Ok(())
    }

    async fn assigned_tickets(&self, jql: &str) -> Result<TicketMap> {
        self.queries.lock().unwrap().push(jql.to_string());
        if self.fail_query {
            bail!("Mock query failure");
        }
        Ok(self.tickets.clone())
    }
}

/// Every board call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCall {
    Create(CardSpec),
    Move(String, String),
    Relabel(String, Vec<String>),
    Archive(String),
}

pub struct MemoryBoard {
    pub cards: Arc<Mutex<Vec<Card>>>,
    pub calls: Arc<Mutex<Vec<BoardCall>>>,
    member_id: String,
    next_id: Mutex<usize>,
    fail_connect: bool,
    /// Fail the n-th mutating call (0-based)
    fail_at: Option<usize>,
}

impl MemoryBoard {
    pub fn new(member_id: &str, cards: Vec<Card>) -> Self {
        Self {
            cards: Arc::new(Mutex::new(cards)),
            calls: Arc::new(Mutex::new(Vec::new())),
            member_id: member_id.to_string(),
            next_id: Mutex::new(0),
            fail_connect: false,
            fail_at: None,
        }
    }

    pub fn with_connect_failure(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<BoardCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn card(&self, card_id: &str) -> Option<Card> {
        self.cards.lock().unwrap().iter().find(|c| c.id == card_id).cloned()
    }

    fn record(&self, call: BoardCall) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        if self.fail_at == Some(calls.len()) {
            bail!("Mock mutation failure");
        }
        calls.push(call);
        Ok(())
    }

    fn with_card(&self, card_id: &str, f: impl FnOnce(&mut Card)) -> Result<()> {
        let mut cards = self.cards.lock().unwrap();
        match cards.iter_mut().find(|c| c.id == card_id) {
            Some(card) => {
                f(card);
                Ok(())
            }
            None => bail!("No card {card_id}"),
        }
    }
}

#[async_trait]
impl BoardSource for MemoryBoard {
    fn name(&self) -> &str {
        "Memory board"
    }

    async fn connect(&self) -> Result<()> {
        if self.fail_connect {
            bail!("Mock connect failure");
        }
        Ok(())
    }

    async fn current_member_id(&self) -> Result<String> {
        Ok(self.member_id.clone())
    }

    async fn cards(&self) -> Result<Vec<Card>> {
        Ok(self.cards.lock().unwrap().clone())
    }

    async fn create_card(&self, spec: &CardSpec) -> Result<()> {
        self.record(BoardCall::Create(spec.clone()))?;
        let n = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            *next
        };
        self.cards.lock().unwrap().push(Card {
            id: format!("new-card-{n}"),
            name: spec.name.clone(),
            list_id: spec.list_id.clone(),
            label_ids: spec.label_ids.clone(),
            member_ids: vec![spec.member_id.clone()],
            description: spec.description.clone(),
        });
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<()> {
        self.record(BoardCall::Move(card_id.to_string(), list_id.to_string()))?;
        self.with_card(card_id, |card| card.list_id = list_id.to_string())
    }

    async fn relabel_card(&self, card_id: &str, label_ids: &[String]) -> Result<()> {
        self.record(BoardCall::Relabel(card_id.to_string(), label_ids.to_vec()))?;
        self.with_card(card_id, |card| card.label_ids = label_ids.to_vec())
    }

    async fn archive_cards_in_list(&self, list_id: &str) -> Result<()> {
        self.record(BoardCall::Archive(list_id.to_string()))?;
        self.cards.lock().unwrap().retain(|c| c.list_id != list_id);
        Ok(())
    }
}
