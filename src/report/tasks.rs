use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::model::ticket::Ticket;

const SUMMARY_WIDTH: usize = 70;
const DATE_FORMAT: &str = "%d %b %y";

/// Tickets as a table, oldest first.
pub fn tasks_table<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Table {
    tasks_table_at(tickets, Utc::now())
}

pub fn tasks_table_at<'a>(
    tickets: impl IntoIterator<Item = &'a Ticket>,
    now: DateTime<Utc>,
) -> Table {
    let mut tickets: Vec<&Ticket> = tickets.into_iter().collect();
    tickets.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.key.cmp(&b.key)));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Status", "Type", "Key", "Summary", "Created", "Due", "Spent (h)"]);

    for ticket in tickets {
        let due = match ticket.due_date {
            Some(due) => {
                let color = if now > due { Color::Red } else { Color::Green };
                Cell::new(due.format(DATE_FORMAT)).fg(color)
            }
            None => Cell::new(""),
        };
        table.add_row(vec![
            Cell::new(&ticket.status).fg(status_color(&ticket.status)),
            Cell::new(&ticket.issue_type).fg(type_color(&ticket.issue_type)),
            Cell::new(&ticket.key),
            Cell::new(ticket.summary.chars().take(SUMMARY_WIDTH).collect::<String>()),
            Cell::new(ticket.created.format(DATE_FORMAT)),
            due,
            Cell::new(format!("{:.1}", ticket.hours_spent())),
        ]);
    }

    table
}

fn status_color(status: &str) -> Color {
    match status {
        "Dependency" | "Blocked" => Color::Red,
        "ToDo" => Color::Blue,
        "In QA Review" => Color::Cyan,
        _ => Color::Yellow,
    }
}

fn type_color(issue_type: &str) -> Color {
    match issue_type {
        "Story" | "User Story" => Color::Green,
        "Bug" => Color::Red,
        _ => Color::Blue,
    }
}
