//! Human-facing summaries of synced work.
//!
//! Two scopes are supported: the cards currently on the board (grouped into
//! Done, In progress and In review) and the rolling seven-day window of
//! tickets straight from the ticket source.

pub mod render;
pub mod tasks;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::card::{card_name, NAME_SEPARATOR};
use crate::model::ticket::TicketMap;
use crate::providers::jira::browse_link;
use crate::sync::identity::CardMap;
use crate::sync::policy::BoardPolicy;

/// Report buckets, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    Done,
    InProgress,
    InReview,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Done => "Done",
            Bucket::InProgress => "In progress",
            Bucket::InReview => "In review",
        }
    }

    /// Bucket for a card in `list_id`. Todo, Bucket and unknown lists are
    /// not reported.
    pub fn for_list(policy: &BoardPolicy, list_id: &str) -> Option<Self> {
        if list_id == policy.lists.done {
            Some(Bucket::Done)
        } else if list_id == policy.lists.doing {
            Some(Bucket::InProgress)
        } else if list_id == policy.lists.review {
            Some(Bucket::InReview)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportItem {
    /// Card name as it appears on the board
    pub name: String,
    pub key: String,
    pub summary: String,
    pub link: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub done: usize,
    pub in_progress: usize,
    pub in_review: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// ISO week-numbering year
    pub year: i32,
    pub week: u32,
    pub items: Vec<ReportItem>,
    /// Only board reports are bucketed
    pub counts: Option<BucketCounts>,
}

impl Report {
    fn new(today: NaiveDate, items: Vec<ReportItem>, counts: Option<BucketCounts>) -> Self {
        let week = today.iso_week();
        Self {
            year: week.year(),
            week: week.week(),
            items,
            counts,
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("report-{}-w{:02}.html", self.year, self.week)
    }
}

/// Group board cards by list. Items are ordered Done, In progress,
/// In review, then by ticket key.
pub fn board_report(
    cards: &CardMap,
    policy: &BoardPolicy,
    jira_url: &str,
    today: NaiveDate,
) -> Report {
    let mut counts = BucketCounts::default();
    let mut rows: Vec<(Bucket, ReportItem)> = Vec::new();

    for (key, card) in cards {
        let Some(bucket) = Bucket::for_list(policy, &card.list_id) else {
            continue;
        };
        match bucket {
            Bucket::Done => counts.done += 1,
            Bucket::InProgress => counts.in_progress += 1,
            Bucket::InReview => counts.in_review += 1,
        }
        rows.push((
            bucket,
            ReportItem {
                name: card.name.clone(),
                key: key.clone(),
                summary: summary_from_name(&card.name).to_string(),
                link: browse_link(jira_url, key),
                status: bucket.label().to_string(),
            },
        ));
    }

    rows.sort_by(|(a, a_item), (b, b_item)| {
        a.cmp(b).then_with(|| a_item.key.cmp(&b_item.key))
    });
    let items = rows.into_iter().map(|(_, item)| item).collect();

    Report::new(today, items, Some(counts))
}

/// Tickets with their own status, ordered by key.
pub fn weekly_report(tickets: &TicketMap, today: NaiveDate) -> Report {
    let items = tickets
        .values()
        .map(|t| ReportItem {
            name: card_name(&t.key, &t.summary),
            key: t.key.clone(),
            summary: t.summary.clone(),
            link: t.link.clone(),
            status: t.status.clone(),
        })
        .collect();
    Report::new(today, items, None)
}

fn summary_from_name(name: &str) -> &str {
    match name.split_once(NAME_SEPARATOR) {
        Some((_, summary)) => summary.trim(),
        None => name.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::ticket::Ticket;
    use crate::sync::policy::test_policy;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    fn card(key: &str, list: &str) -> Card {
        Card {
            id: format!("id-{key}"),
            name: format!("{key} | Test task {key}"),
            list_id: list.into(),
            label_ids: vec!["lbl-origin".into()],
            member_ids: vec!["me".into()],
            description: String::new(),
        }
    }

    fn cards(list: Vec<Card>) -> CardMap {
        list.into_iter()
            .map(|c| (c.ticket_key().to_string(), c))
            .collect()
    }

    #[test]
    fn groups_cards_by_list_priority_then_key() {
        let cards = cards(vec![
            card("J-3", "list-review"),
            card("J-2", "list-doing"),
            card("J-1", "list-doing"),
            card("J-9", "list-done"),
            card("J-5", "list-todo"),
            card("J-6", "list-bucket"),
        ]);
        let report = board_report(&cards, &test_policy(), "https://jira-site", today());

        let order: Vec<_> = report.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(order, vec!["J-9", "J-1", "J-2", "J-3"]);
        assert_eq!(
            report.counts,
            Some(BucketCounts {
                done: 1,
                in_progress: 2,
                in_review: 1,
            })
        );
        assert_eq!(report.items[0].status, "Done");
        assert_eq!(report.items[0].summary, "Test task J-9");
        assert_eq!(report.items[0].name, "J-9 | Test task J-9");
        assert_eq!(report.items[0].link, "https://jira-site/browse/J-9");
    }

    #[test]
    fn empty_board_reports_zero_counts() {
        let report = board_report(&CardMap::new(), &test_policy(), "https://jira-site", today());
        assert!(report.items.is_empty());
        assert_eq!(report.counts, Some(BucketCounts::default()));
    }

    #[test]
    fn iso_week_of_new_year() {
        let report = board_report(&CardMap::new(), &test_policy(), "https://jira-site", today());
        assert_eq!((report.year, report.week), (2020, 1));
        assert_eq!(report.default_file_name(), "report-2020-w01.html");

        // 2021-01-01 still belongs to week 53 of 2020
        let report = weekly_report(&TicketMap::new(), NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!((report.year, report.week), (2020, 53));
    }

    #[test]
    fn weekly_report_keeps_ticket_status() {
        let ts = Utc.with_ymd_and_hms(2020, 5, 18, 10, 0, 0).unwrap();
        let ticket = Ticket {
            key: "J-1".into(),
            summary: "Ship it".into(),
            description: String::new(),
            status: "Closed".into(),
            issue_type: "Story".into(),
            link: "https://jira-site/browse/J-1".into(),
            created: ts,
            updated: ts,
            due_date: None,
            time_spent: 0,
            parent: None,
        };
        let tickets: TicketMap = [("J-1".to_string(), ticket)].into_iter().collect();

        let report = weekly_report(&tickets, today());
        assert_eq!(report.counts, None);
        assert_eq!(
            report.items,
            vec![ReportItem {
                name: "J-1 | Ship it".into(),
                key: "J-1".into(),
                summary: "Ship it".into(),
                link: "https://jira-site/browse/J-1".into(),
                status: "Closed".into(),
            }]
        );
    }

    #[test]
    fn board_items_keep_raw_card_name() {
        let mut tight = card("J-4", "list-doing");
        tight.name = "J-4|tight name".into();
        let report = board_report(&cards(vec![tight]), &test_policy(), "https://jira-site", today());
        assert_eq!(report.items[0].name, "J-4|tight name");
        assert_eq!(report.items[0].summary, "tight name");
    }

    #[test]
    fn summary_without_separator_is_whole_name() {
        assert_eq!(summary_from_name(" loose card "), "loose card");
        assert_eq!(summary_from_name("A-1 | x | y"), "x | y");
    }
}
