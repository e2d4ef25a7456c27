use crate::model::ticket::Ticket;

/// Board list ids for each logical slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLists {
    pub todo: String,
    pub doing: String,
    pub done: String,
    pub review: String,
    pub bucket: String,
}

/// Board label ids for each logical slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLabels {
    /// Marks a card as mirrored from the ticket source
    pub origin: String,
    pub blocked: String,
    pub task: String,
    pub bug: String,
    pub story: String,
}

/// Immutable list/label mapping for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPolicy {
    pub lists: BoardLists,
    pub labels: BoardLabels,
    /// Status substrings that route a ticket to the Review list
    pub review_statuses: Vec<String>,
}

/// Where a ticket's card should live and which labels it should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub list_id: String,
    /// Order is significant: origin, blocked (if any), type label
    pub label_ids: Vec<String>,
}

const IN_PROGRESS: &str = "In Progress";
const BLOCKED_MARKERS: [&str; 2] = ["Dependency", "Blocked"];
const STORY_TYPES: [&str; 2] = ["Story", "User Story"];
const BUG_TYPE: &str = "Bug";

impl BoardPolicy {
    pub fn placement(&self, ticket: &Ticket) -> Placement {
        self.placement_for(&ticket.status, &ticket.issue_type)
    }

    pub fn placement_for(&self, status: &str, issue_type: &str) -> Placement {
        let mut label_ids = vec![self.labels.origin.clone()];

        let list_id = if status.contains(IN_PROGRESS) {
            self.lists.doing.clone()
        } else if BLOCKED_MARKERS.iter().any(|m| status.contains(m)) {
            label_ids.push(self.labels.blocked.clone());
            self.lists.doing.clone()
        } else if self.review_statuses.iter().any(|s| status.contains(s.as_str())) {
            self.lists.review.clone()
        } else {
            self.lists.todo.clone()
        };

        label_ids.push(self.type_label(issue_type).to_string());

        Placement { list_id, label_ids }
    }

    pub fn type_label(&self, issue_type: &str) -> &str {
        if STORY_TYPES.contains(&issue_type) {
            &self.labels.story
        } else if issue_type == BUG_TYPE {
            &self.labels.bug
        } else {
            &self.labels.task
        }
    }

    /// Lists a human parks cards in; sync never drags cards out of them
    /// towards Todo or Doing.
    pub fn is_parked(&self, list_id: &str) -> bool {
        list_id == self.lists.review || list_id == self.lists.bucket
    }

    pub fn is_active_target(&self, list_id: &str) -> bool {
        list_id == self.lists.doing || list_id == self.lists.todo
    }

    pub fn list_name(&self, list_id: &str) -> &'static str {
        let lists = &self.lists;
        match list_id {
            id if id == lists.todo => "Todo",
            id if id == lists.doing => "Doing",
            id if id == lists.done => "Done",
            id if id == lists.review => "Review",
            id if id == lists.bucket => "Bucket",
            _ => "unknown",
        }
    }
}

#[cfg(test)]
pub(crate) fn test_policy() -> BoardPolicy {
    BoardPolicy {
        lists: BoardLists {
            todo: "list-todo".into(),
            doing: "list-doing".into(),
            done: "list-done".into(),
            review: "list-review".into(),
            bucket: "list-bucket".into(),
        },
        labels: BoardLabels {
            origin: "lbl-origin".into(),
            blocked: "lbl-blocked".into(),
            task: "lbl-task".into(),
            bug: "lbl-bug".into(),
            story: "lbl-story".into(),
        },
        review_statuses: vec![],
    }
}
