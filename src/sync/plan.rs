//! Ticket-to-board reconciliation.
//!
//! [`reconcile`] is a pure function of the open tickets, the resolved cards
//! and the board policy. It decides which cards to create, relabel or move
//! and never talks to either service.

use crate::model::card::{card_name, CardSpec};
use crate::model::ticket::{Ticket, TicketMap};
use crate::sync::identity::CardMap;
use crate::sync::policy::BoardPolicy;

/// Trello rejects card descriptions longer than this.
pub const MAX_DESCRIPTION_CHARS: usize = 16_384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(CardSpec),
    Relabel {
        card_id: String,
        key: String,
        label_ids: Vec<String>,
    },
    Move {
        card_id: String,
        key: String,
        list_id: String,
        /// Ticket left the open set; the card is driven to Done
        completed: bool,
    },
}

impl Mutation {
    pub fn key(&self) -> &str {
        match self {
            Mutation::Create(spec) => &spec.key,
            Mutation::Relabel { key, .. } | Mutation::Move { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub mutations: Vec<Mutation>,
    /// Cards moved to Done by the completion sweep
    pub completed: usize,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }
}

/// Compute the board mutations that bring `cards` in line with `tickets`.
///
/// Tickets are visited in key order, each producing at most a create, or a
/// relabel followed by a move. The completion sweep runs last and moves every
/// card whose ticket is no longer open to the Done list.
pub fn reconcile(
    tickets: &TicketMap,
    cards: &CardMap,
    policy: &BoardPolicy,
    member_id: &str,
) -> Plan {
    let mut plan = Plan::default();

    for (key, ticket) in tickets {
        let target = policy.placement(ticket);

        let Some(card) = cards.get(key) else {
            plan.mutations.push(Mutation::Create(CardSpec {
                key: key.clone(),
                name: card_name(key, &ticket.summary),
                list_id: target.list_id,
                description: card_description(ticket),
                label_ids: target.label_ids,
                member_id: member_id.to_string(),
            }));
            continue;
        };

        // Compared as ordered sequences; the same labels in another order
        // still count as a difference.
        if card.label_ids != target.label_ids {
            plan.mutations.push(Mutation::Relabel {
                card_id: card.id.clone(),
                key: key.clone(),
                label_ids: target.label_ids,
            });
        }

        if card.list_id != target.list_id {
            if policy.is_active_target(&target.list_id) && policy.is_parked(&card.list_id) {
                tracing::debug!(
                    key = %key,
                    list = policy.list_name(&card.list_id),
                    "Card parked manually, leaving it in place"
                );
                continue;
            }
            plan.mutations.push(Mutation::Move {
                card_id: card.id.clone(),
                key: key.clone(),
                list_id: target.list_id,
                completed: false,
            });
        }
    }

    for (key, card) in cards {
        if tickets.contains_key(key) || card.list_id == policy.lists.done {
            continue;
        }
        plan.mutations.push(Mutation::Move {
            card_id: card.id.clone(),
            key: key.clone(),
            list_id: policy.lists.done.clone(),
            completed: true,
        });
        plan.completed += 1;
    }

    plan
}

/// Ticket description followed by the link/type/parent metadata lines.
/// The body is cut so the metadata always fits the board's limit.
pub fn card_description(ticket: &Ticket) -> String {
    let mut meta = format!("\nJira link: {}\nType: {}", ticket.link, ticket.issue_type);
    if let Some(parent) = &ticket.parent {
        meta.push_str("\nParent link: ");
        meta.push_str(&parent.link);
    }

    let room = MAX_DESCRIPTION_CHARS.saturating_sub(meta.chars().count());
    let mut description: String = ticket.description.chars().take(room).collect();
    description.push_str(&meta);
    description
}
