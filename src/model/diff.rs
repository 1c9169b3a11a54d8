//! Pure change derivation for issue updates.

use chrono::{DateTime, Utc};

use super::{ActivityType, Issue, IssueUpdate, NewActivity, Status};

/// What an update does to `closed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedAtChange {
    Unchanged,
    Set(DateTime<Utc>),
    Clear,
}

impl ClosedAtChange {
    #[must_use]
    pub fn apply(self, current: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        match self {
            Self::Unchanged => current,
            Self::Set(at) => Some(at),
            Self::Clear => None,
        }
    }
}

/// One activity per field whose value actually changes, in status,
/// priority, assignee order.
#[must_use]
pub fn derive_activities(current: &Issue, update: &IssueUpdate) -> Vec<NewActivity> {
    let mut activities = Vec::new();

    if let Some(status) = update.status {
        if status != current.status {
            activities.push(NewActivity::change(
                ActivityType::StatusChanged,
                Some(current.status.as_str()),
                Some(status.as_str()),
            ));
        }
    }

    if let Some(priority) = update.priority {
        if priority != current.priority {
            activities.push(NewActivity::change(
                ActivityType::PriorityChanged,
                Some(current.priority.as_str()),
                Some(priority.as_str()),
            ));
        }
    }

    if let Some(assignee) = &update.assignee_id {
        if *assignee != current.assignee_id {
            activities.push(NewActivity::change(
                ActivityType::AssigneeChanged,
                current.assignee_id.as_deref(),
                assignee.as_deref(),
            ));
        }
    }

    activities
}

/// `closed_at` moves only when the status crosses the open/closed boundary.
#[must_use]
pub fn closed_at_transition(
    current: Status,
    next: Option<Status>,
    now: DateTime<Utc>,
) -> ClosedAtChange {
    match next {
        Some(next) if next.is_closed() && !current.is_closed() => ClosedAtChange::Set(now),
        Some(next) if !next.is_closed() && current.is_closed() => ClosedAtChange::Clear,
        _ => ClosedAtChange::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use chrono::TimeZone;

    fn issue(status: Status, assignee: Option<&str>) -> Issue {
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();
        Issue {
            id: "iss-1".to_string(),
            project_id: "prj-1".to_string(),
            number: 1,
            title: "Fix login".to_string(),
            description: None,
            status,
            priority: Priority::Medium,
            creator_id: "user_1".to_string(),
            assignee_id: assignee.map(ToString::to_string),
            created_at: at,
            updated_at: at,
            closed_at: None,
        }
    }

    #[test]
    fn status_change_yields_one_activity() {
        let current = issue(Status::Open, None);
        let update = IssueUpdate {
            status: Some(Status::Done),
            ..IssueUpdate::default()
        };
        let activities = derive_activities(&current, &update);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, ActivityType::StatusChanged);
        assert_eq!(activities[0].metadata["from"], "OPEN");
        assert_eq!(activities[0].metadata["to"], "DONE");
    }

    #[test]
    fn identical_values_yield_nothing() {
        let current = issue(Status::InProgress, Some("user_2"));
        let update = IssueUpdate {
            title: Some("Fix login".to_string()),
            status: Some(Status::InProgress),
            priority: Some(Priority::Medium),
            assignee_id: Some(Some("user_2".to_string())),
            ..IssueUpdate::default()
        };
        assert!(derive_activities(&current, &update).is_empty());
    }

    #[test]
    fn all_three_fields_in_fixed_order() {
        let current = issue(Status::Open, Some("user_2"));
        let update = IssueUpdate {
            status: Some(Status::InProgress),
            priority: Some(Priority::Urgent),
            assignee_id: Some(None),
            ..IssueUpdate::default()
        };
        let types: Vec<ActivityType> = derive_activities(&current, &update)
            .into_iter()
            .map(|a| a.activity_type)
            .collect();
        assert_eq!(
            types,
            vec![
                ActivityType::StatusChanged,
                ActivityType::PriorityChanged,
                ActivityType::AssigneeChanged
            ]
        );
    }

    #[test]
    fn unassign_omits_to() {
        let current = issue(Status::Open, Some("user_2"));
        let update = IssueUpdate {
            assignee_id: Some(None),
            ..IssueUpdate::default()
        };
        let activities = derive_activities(&current, &update);
        assert_eq!(activities[0].metadata.get("from").map(String::as_str), Some("user_2"));
        assert!(!activities[0].metadata.contains_key("to"));
    }

    #[test]
    fn closed_at_transitions() {
        let now = Utc.with_ymd_and_hms(2026, 2, 2, 0, 0, 0).unwrap();
        assert_eq!(
            closed_at_transition(Status::Open, Some(Status::Done), now),
            ClosedAtChange::Set(now)
        );
        assert_eq!(
            closed_at_transition(Status::InProgress, Some(Status::Closed), now),
            ClosedAtChange::Set(now)
        );
        assert_eq!(
            closed_at_transition(Status::Done, Some(Status::Open), now),
            ClosedAtChange::Clear
        );
        assert_eq!(
            closed_at_transition(Status::Done, Some(Status::Closed), now),
            ClosedAtChange::Unchanged
        );
        assert_eq!(
            closed_at_transition(Status::Done, None, now),
            ClosedAtChange::Unchanged
        );
        assert_eq!(
            closed_at_transition(Status::Open, Some(Status::Open), now),
            ClosedAtChange::Unchanged
        );
    }

    #[test]
    fn apply_keeps_or_replaces() {
        let then = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(ClosedAtChange::Unchanged.apply(Some(then)), Some(then));
        assert_eq!(ClosedAtChange::Set(now).apply(Some(then)), Some(now));
        assert_eq!(ClosedAtChange::Clear.apply(Some(then)), None);
    }
}
