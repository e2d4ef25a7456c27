use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sync::policy::{BoardLabels, BoardLists, BoardPolicy};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub jira: Option<JiraConfig>,
    pub trello: Option<TrelloConfig>,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
    /// Base URL of the Jira server, e.g. https://acme.atlassian.net
    pub url: String,
    pub user: String,
    pub api_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrelloConfig {
    pub api_key: String,
    pub token: String,
    pub board_id: String,
    pub lists: ListsConfig,
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListsConfig {
    pub todo: String,
    pub doing: String,
    pub done: String,
    pub review: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelsConfig {
    #[serde(alias = "jira")]
    pub origin: String,
    pub blocked: String,
    pub task: String,
    pub bug: String,
    pub story: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PolicyConfig {
    /// Status substrings that send a card to the Review list
    #[serde(default)]
    pub review_statuses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserConfig {
    pub name: String,
    pub email: String,
    /// Trello member id. Falls back to the token's own member when absent.
    pub trello_id: Option<String>,
}

impl AppConfig {
    pub fn jira(&self) -> Result<&JiraConfig> {
        self.jira
            .as_ref()
            .context("Jira is not configured. Add a [jira] section to the config file")
    }

    pub fn trello(&self) -> Result<&TrelloConfig> {
        self.trello
            .as_ref()
            .context("Trello is not configured. Add a [trello] section to the config file")
    }

    /// Users to process. Without explicit `[[users]]` the Jira account itself is the user.
    pub fn users(&self) -> Result<Vec<UserConfig>> {
        if !self.users.is_empty() {
            return Ok(self.users.clone());
        }
        let jira = self.jira()?;
        Ok(vec![UserConfig {
            name: jira.user.clone(),
            email: jira.user.clone(),
            trello_id: None,
        }])
    }

    /// Resolve list and label ids into the policy used for a whole run.
    pub fn board_policy(&self) -> Result<BoardPolicy> {
        let trello = self.trello()?;
        let lists = &trello.lists;
        let labels = &trello.labels;

        let slots = [
            ("lists.todo", &lists.todo),
            ("lists.doing", &lists.doing),
            ("lists.done", &lists.done),
            ("lists.review", &lists.review),
            ("lists.bucket", &lists.bucket),
            ("labels.origin", &labels.origin),
            ("labels.blocked", &labels.blocked),
            ("labels.task", &labels.task),
            ("labels.bug", &labels.bug),
            ("labels.story", &labels.story),
        ];
        for (slot, id) in slots {
            if id.trim().is_empty() {
                bail!("trello.{slot} is empty in the config file");
            }
        }

        Ok(BoardPolicy {
            lists: BoardLists {
                todo: lists.todo.trim().to_string(),
                doing: lists.doing.trim().to_string(),
                done: lists.done.trim().to_string(),
                review: lists.review.trim().to_string(),
                bucket: lists.bucket.trim().to_string(),
            },
            labels: BoardLabels {
                origin: labels.origin.trim().to_string(),
                blocked: labels.blocked.trim().to_string(),
                task: labels.task.trim().to_string(),
                bug: labels.bug.trim().to_string(),
                story: labels.story.trim().to_string(),
            },
            review_statuses: self
                .policy
                .review_statuses
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cardsync")
        .join("config.toml")
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using empty configuration");
        return Ok(AppConfig::default());
    }
    tracing::debug!(path = %path.display(), "Loading configuration");
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    Ok(config)
}
