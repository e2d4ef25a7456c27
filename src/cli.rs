use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::{self, AppConfig, UserConfig};
use crate::model::ticket::TicketMap;
use crate::providers::jira::{open_tickets_jql, weekly_jql};
use crate::providers::{self, BoardSource, TicketSource};
use crate::report::{self, render, tasks::tasks_table};
use crate::sync::identity::CardMap;
use crate::sync::policy::BoardPolicy;
use crate::sync::{member_id, user_cards, Syncer};

/// Mirror assigned Jira tickets onto a Trello board
#[derive(Parser, Debug)]
#[command(name = "cardsync", version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.cardsync/config.toml)
    #[arg(short, long, global = true, env = "CARDSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, relabel and move cards so the board matches open tickets
    Sync,

    /// Report on synced work
    Report(ReportArgs),

    /// Print assigned Jira tickets
    Tasks {
        /// Include tickets resolved in the last 7 days
        #[arg(short, long)]
        weekly: bool,
    },
}

#[derive(Args, Debug, Default, PartialEq)]
pub struct ReportArgs {
    /// Write an HTML document instead of printing text
    #[arg(long)]
    pub html: bool,

    /// Report Jira tickets of the last 7 days instead of board cards
    #[arg(short, long)]
    pub weekly: bool,

    /// Where to write the HTML document (default: report-<year>-w<week>.html)
    #[arg(short, long, requires = "html")]
    pub output: Option<PathBuf>,

    /// Archive the Done list once the HTML document is written
    #[arg(long, requires = "html")]
    pub archive: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Sync => handle_sync(&config).await,
        Command::Report(args) => handle_report(&config, &args).await,
        Command::Tasks { weekly } => handle_tasks(&config, weekly).await,
    }
}

pub async fn handle_sync(config: &AppConfig) -> Result<()> {
    let policy = config.board_policy()?;
    let users = config.users()?;
    let tickets = providers::create_ticket_source(config)?;
    let board = providers::create_board_source(config)?;

    let syncer = Syncer::new(&tickets, &board, &policy);
    let summaries = syncer.run(&users).await.inspect_err(|e| {
        if e.is_mutation() {
            tracing::warn!("Board was left partially synced; the next run picks up from here");
        }
    })?;
    tracing::info!(users = summaries.len(), "Sync finished");
    Ok(())
}

pub async fn handle_report(config: &AppConfig, args: &ReportArgs) -> Result<()> {
    let users = config.users()?;
    let policy = config.board_policy()?;
    let jira_url = config.jira()?.url.clone();
    let tickets = providers::create_ticket_source(config)?;
    let board = providers::create_board_source(config)?;

    let sources = ReportSources {
        tickets: &tickets,
        board: &board,
        policy: &policy,
        jira_url: &jira_url,
    };
    sources
        .write_report(&users, args, chrono::Local::now().date_naive())
        .await
}

/// Everything a report run talks to.
pub struct ReportSources<'a> {
    pub tickets: &'a dyn TicketSource,
    pub board: &'a dyn BoardSource,
    pub policy: &'a BoardPolicy,
    pub jira_url: &'a str,
}

impl ReportSources<'_> {
    /// Build the report and print it, or write it as HTML. The Done list is
    /// archived only after the document is on disk.
    pub async fn write_report(
        &self,
        users: &[UserConfig],
        args: &ReportArgs,
        today: NaiveDate,
    ) -> Result<()> {
        let report = if args.weekly {
            let tickets = fetch_tickets(self.tickets, users, weekly_jql).await?;
            report::weekly_report(&tickets, today)
        } else {
            self.connect_board().await?;
            let mut cards = CardMap::new();
            for user in users {
                let member = member_id(self.board, user).await?;
                cards.extend(user_cards(self.board, self.policy, &member).await?);
            }
            report::board_report(&cards, self.policy, self.jira_url, today)
        };

        if !args.html {
            let stdout = std::io::stdout();
            render::render_plain(&report, &mut stdout.lock())
                .context("Failed to print report")?;
            return Ok(());
        }

        let path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(report.default_file_name()));
        let html = render::render_html(&report)?;
        std::fs::write(&path, html)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());

        if args.archive {
            if args.weekly {
                self.connect_board().await?;
            }
            self.board
                .archive_cards_in_list(&self.policy.lists.done)
                .await
                .context("Can't archive the Done list")?;
            println!("Archived cards in the Done list");
        }
        Ok(())
    }

    async fn connect_board(&self) -> Result<()> {
        self.board
            .connect()
            .await
            .with_context(|| format!("Can't connect to {}", self.board.name()))
    }
}

pub async fn handle_tasks(config: &AppConfig, weekly: bool) -> Result<()> {
    let users = config.users()?;
    let source = providers::create_ticket_source(config)?;
    let jql: fn(&str) -> String = if weekly { weekly_jql } else { open_tickets_jql };

    for user in &users {
        println!("User: {}", user.name);
        let tickets = fetch_tickets(&source, std::slice::from_ref(user), jql).await?;
        println!("{}", tasks_table(tickets.values()));
    }
    Ok(())
}

async fn fetch_tickets(
    source: &dyn TicketSource,
    users: &[UserConfig],
    jql: fn(&str) -> String,
) -> Result<TicketMap> {
    source
        .connect()
        .await
        .with_context(|| format!("Can't connect to {}", source.name()))?;
    let mut tickets = TicketMap::new();
    for user in users {
        let found = source
            .assigned_tickets(&jql(&user.email))
            .await
            .with_context(|| format!("Can't get tickets for {}", user.email))?;
        tickets.extend(found);
    }
    Ok(tickets)
}
