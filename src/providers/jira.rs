use std::future::Future;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::TicketSource;
use crate::model::ticket::{ParentRef, Ticket, TicketMap};
use crate::util::adf::extract_text_from_adf;

const PAGE_SIZE: usize = 100;
const FIELDS: &str = "summary,description,status,issuetype,created,updated,duedate,timespent,parent";
const CLOSED_STATUSES: &str = "(done, closed, close, resolved)";

pub struct JiraTicketSource {
    base_url: String,
    auth_header: String,
    client: reqwest::Client,
}

impl JiraTicketSource {
    pub fn new(url: String, user: String, api_token: String) -> Self {
        let creds = format!("{user}:{api_token}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {encoded}"),
            client: reqwest::Client::new(),
        }
    }

    async fn search_page(&self, jql: &str, start_at: usize) -> Result<SearchResponse> {
        let url = format!(
            "{}/rest/api/3/search?jql={}&startAt={start_at}&maxResults={PAGE_SIZE}&fields={FIELDS}",
            self.base_url,
            urlencoding::encode(jql)
        );
        tracing::debug!(start_at, "Jira search");

        let resp = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Jira API request failed")?
            .error_for_status()
            .context("Jira search rejected")?;

        resp.json().await.context("Failed to parse Jira response")
    }
}

/// Open tickets assigned to `user`.
pub fn open_tickets_jql(user: &str) -> String {
    format!(
        "assignee = {} AND status not in {CLOSED_STATUSES} ORDER BY priority DESC, updated DESC",
        jql_string(user)
    )
}

/// Tickets assigned to `user` that are open or were resolved in the last seven days.
pub fn weekly_jql(user: &str) -> String {
    format!(
        "assignee = {} AND (resolutiondate > startOfDay(-7d) OR status not in {CLOSED_STATUSES}) ORDER BY resolutiondate DESC",
        jql_string(user)
    )
}

/// Single-quoted JQL literal.
fn jql_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

pub fn browse_link(base_url: &str, key: &str) -> String {
    format!("{}/browse/{key}", base_url.trim_end_matches('/'))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    start_at: usize,
    #[serde(default)]
    total: usize,
    issues: Vec<JiraIssue>,
}

#[derive(Deserialize)]
struct JiraIssue {
    key: String,
    fields: IssueFields,
}

#[derive(Deserialize)]
struct IssueFields {
    summary: Option<String>,
    description: Option<serde_json::Value>,
    status: Option<NamedField>,
    #[serde(rename = "issuetype")]
    issue_type: Option<NamedField>,
    created: Option<String>,
    updated: Option<String>,
    duedate: Option<String>,
    timespent: Option<u64>,
    parent: Option<ParentField>,
}

#[derive(Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Deserialize)]
struct ParentField {
    id: String,
    key: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .with_context(|| format!("Invalid Jira timestamp `{value}`"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn parse_due_date(value: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid Jira due date `{value}`"))?;
    Ok(date.and_time(chrono::NaiveTime::default()).and_utc())
}

impl JiraIssue {
    fn into_ticket(self, base_url: &str) -> Result<Ticket> {
        let fields = self.fields;
        let key = self.key;

        let created = match fields.created.as_deref() {
            Some(ts) => parse_timestamp(ts)?,
            None => DateTime::<Utc>::default(),
        };
        let updated = match fields.updated.as_deref() {
            Some(ts) => parse_timestamp(ts)?,
            None => created,
        };
        let due_date = fields.duedate.as_deref().map(parse_due_date).transpose()?;

        let parent = fields.parent.map(|p| ParentRef {
            link: browse_link(base_url, &p.key),
            id: p.id,
            key: p.key,
        });

        Ok(Ticket {
            link: browse_link(base_url, &key),
            summary: fields.summary.unwrap_or_default(),
            description: fields
                .description
                .as_ref()
                .and_then(extract_text_from_adf)
                .unwrap_or_default(),
            status: fields.status.map(|s| s.name).unwrap_or_default(),
            issue_type: fields.issue_type.map(|t| t.name).unwrap_or_default(),
            created,
            updated,
            due_date,
            time_spent: fields.timespent.unwrap_or(0),
            parent,
            key,
        })
    }
}

/// Convert one search page into tickets, naming the offending key on failure.
pub(crate) fn tickets_from_page(page: SearchResponse, base_url: &str) -> Result<Vec<Ticket>> {
    page.issues
        .into_iter()
        .map(|issue| {
            let key = issue.key.clone();
            issue
                .into_ticket(base_url)
                .with_context(|| format!("Failed to read Jira issue {key}"))
        })
        .collect()
}

/// Follow `startAt` until `total` is reached or the server returns an empty
/// page. The server may return fewer issues than asked for.
pub(crate) async fn walk_pages<F, Fut>(base_url: &str, mut fetch_page: F) -> Result<TicketMap>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<SearchResponse>>,
{
    let mut tickets = TicketMap::new();
    let mut start_at = 0;

    loop {
        let page = fetch_page(start_at).await?;
        let fetched = page.issues.len();
        let total = page.total;
        start_at = page.start_at.max(start_at) + fetched;

        for ticket in tickets_from_page(page, base_url)? {
            tickets.insert(ticket.key.clone(), ticket);
        }

        if fetched == 0 || start_at >= total {
            break;
        }
    }

    Ok(tickets)
}

#[async_trait]
impl TicketSource for JiraTicketSource {
    fn name(&self) -> &str {
        "Jira"
    }

    async fn connect(&self) -> Result<()> {
        self.client
            .get(format!("{}/rest/api/3/myself", self.base_url))
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Jira API request failed")?
            .error_for_status()
            .context("Jira rejected the credentials")?;
        Ok(())
    }

    async fn assigned_tickets(&self, jql: &str) -> Result<TicketMap> {
        let tickets =
            walk_pages(&self.base_url, |start_at| self.search_page(jql, start_at)).await?;
        tracing::debug!(count = tickets.len(), "Fetched Jira tickets");
        Ok(tickets)
    }
}
