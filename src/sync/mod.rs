pub mod identity;
pub mod plan;
pub mod policy;

use std::fmt;

use crate::config::UserConfig;
use crate::error::SyncError;
use crate::model::ticket::TicketMap;
use crate::providers::jira::open_tickets_jql;
use crate::providers::{BoardSource, TicketSource};
use crate::report::tasks::tasks_table;

use identity::{resolve_cards, CardMap};
use plan::{reconcile, Mutation, Plan};
use policy::BoardPolicy;

/// What one pass changed on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub relabeled: usize,
    pub moved: usize,
    pub completed: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created: {}, relabeled: {}, moved: {}, completed: {}",
            self.created, self.relabeled, self.moved, self.completed
        )
    }
}

/// Drives reconciliation passes between one ticket source and one board.
pub struct Syncer<'a> {
    tickets: &'a dyn TicketSource,
    board: &'a dyn BoardSource,
    policy: &'a BoardPolicy,
}

impl<'a> Syncer<'a> {
    pub fn new(
        tickets: &'a dyn TicketSource,
        board: &'a dyn BoardSource,
        policy: &'a BoardPolicy,
    ) -> Self {
        Self {
            tickets,
            board,
            policy,
        }
    }

    pub async fn connect(&self) -> Result<(), SyncError> {
        self.tickets
            .connect()
            .await
            .map_err(|e| SyncError::connection(self.tickets.name(), e))?;
        self.board
            .connect()
            .await
            .map_err(|e| SyncError::connection(self.board.name(), e))
    }

    /// Sync every user in order, stopping at the first failure.
    pub async fn run(&self, users: &[UserConfig]) -> Result<Vec<(String, SyncSummary)>, SyncError> {
        self.connect().await?;

        let mut summaries = Vec::with_capacity(users.len());
        for user in users {
            let summary = self.sync_user(user).await?;
            println!("Done: {summary}");
            summaries.push((user.name.clone(), summary));
        }
        Ok(summaries)
    }

    pub async fn sync_user(&self, user: &UserConfig) -> Result<SyncSummary, SyncError> {
        println!(
            "---------------------------------\nUser: {}\n---------------------------------",
            user.name
        );

        println!("Getting Jira tasks...");
        let tickets = self.tickets_for(&open_tickets_jql(&user.email)).await?;
        if !tickets.is_empty() {
            println!("{}", tasks_table(tickets.values()));
        }

        println!("Getting Trello cards...");
        let member_id = member_id(self.board, user).await?;
        let cards = user_cards(self.board, self.policy, &member_id).await?;

        println!("Sync tasks...");
        let plan = reconcile(&tickets, &cards, self.policy, &member_id);
        tracing::info!(
            user = %user.name,
            tickets = tickets.len(),
            cards = cards.len(),
            mutations = plan.len(),
            "Reconciled"
        );
        if plan.is_empty() {
            println!("Board is up to date");
            return Ok(SyncSummary::default());
        }
        self.apply(&plan).await
    }

    pub async fn tickets_for(&self, jql: &str) -> Result<TicketMap, SyncError> {
        self.tickets
            .assigned_tickets(jql)
            .await
            .map_err(|e| SyncError::query(self.tickets.name(), "tickets", e))
    }

    /// Apply mutations one at a time. The first failure aborts the pass and
    /// leaves earlier mutations in place.
    pub async fn apply(&self, plan: &Plan) -> Result<SyncSummary, SyncError> {
        let mut summary = SyncSummary::default();

        for mutation in plan.mutations.iter() {
            match mutation {
                Mutation::Create(spec) => {
                    let list = self.policy.list_name(&spec.list_id);
                    println!("Adding {} to {list} list..", spec.key);
                    self.board
                        .create_card(spec)
                        .await
                        .map_err(|source| SyncError::Create {
                            key: spec.key.clone(),
                            source,
                        })?;
                    summary.created += 1;
                }
                Mutation::Relabel {
                    card_id,
                    key,
                    label_ids,
                } => {
                    println!("Updating labels for {key}");
                    self.board
                        .relabel_card(card_id, label_ids)
                        .await
                        .map_err(|source| SyncError::Mutation {
                            key: key.clone(),
                            action: "update labels on",
                            source,
                        })?;
                    summary.relabeled += 1;
                }
                Mutation::Move {
                    card_id,
                    key,
                    list_id,
                    completed,
                } => {
                    if !completed {
                        println!("Moving {key} to {} list", self.policy.list_name(list_id));
                    }
                    self.board
                        .move_card(card_id, list_id)
                        .await
                        .map_err(|source| SyncError::Mutation {
                            key: key.clone(),
                            action: "move",
                            source,
                        })?;
                    if *completed {
                        println!("{key} is completed!");
                        summary.completed += 1;
                    } else {
                        summary.moved += 1;
                    }
                }
            }
            tracing::info!(key = mutation.key(), "Applied {}", describe(mutation));
        }

        Ok(summary)
    }
}

fn describe(mutation: &Mutation) -> &'static str {
    match mutation {
        Mutation::Create(_) => "create",
        Mutation::Relabel { .. } => "relabel",
        Mutation::Move { completed: true, .. } => "completion move",
        Mutation::Move { .. } => "move",
    }
}

/// Board member for `user`: the configured id, or whoever owns the token.
pub async fn member_id(board: &dyn BoardSource, user: &UserConfig) -> Result<String, SyncError> {
    match &user.trello_id {
        Some(id) => Ok(id.clone()),
        None => board
            .current_member_id()
            .await
            .map_err(|e| SyncError::query(board.name(), "current member", e)),
    }
}

/// Board cards that mirror tickets of `member_id`, keyed by ticket key.
pub async fn user_cards(
    board: &dyn BoardSource,
    policy: &BoardPolicy,
    member_id: &str,
) -> Result<CardMap, SyncError> {
    let cards = board
        .cards()
        .await
        .map_err(|e| SyncError::query(board.name(), "cards", e))?;
    Ok(resolve_cards(cards, &policy.labels.origin, member_id))
}
