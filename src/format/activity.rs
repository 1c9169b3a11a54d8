//! Human-readable activity messages.

use crate::model::{ActivityMetadata, ActivityType};

const MISSING: &str = "?";

fn field<'a>(metadata: &'a ActivityMetadata, key: &str) -> &'a str {
    metadata.get(key).map_or(MISSING, String::as_str)
}

/// Render one activity entry. Missing `from`/`to` values render as `?`.
#[must_use]
pub fn format_activity_message(activity_type: ActivityType, metadata: &ActivityMetadata) -> String {
    match activity_type {
        ActivityType::IssueCreated => "Issue created".to_string(),
        ActivityType::StatusChanged => format!(
            "Status changed from {} to {}",
            field(metadata, "from"),
            field(metadata, "to")
        ),
        ActivityType::PriorityChanged => format!(
            "Priority changed from {} to {}",
            field(metadata, "from"),
            field(metadata, "to")
        ),
        ActivityType::AssigneeChanged => "Assignee updated".to_string(),
        ActivityType::CommentAdded => "Comment added".to_string(),
        ActivityType::LabelAdded => "Label added".to_string(),
        ActivityType::LabelRemoved => "Label removed".to_string(),
    }
}
