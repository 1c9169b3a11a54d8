//! Terminal text formatting for issues, projects and activities.
//!
//! Line shapes:
//! - issue: `{icon} #{number} [{priority}] {title}`
//! - project: `{slug}  {name} ({n} issues)`
//! - activity: `{message} · {user} · {date}`

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::activity::format_activity_message;
use super::display::{paint, priority_descriptor, status_descriptor};
use crate::model::{Activity, Issue, IssueDetails, Priority, ProjectWithCount, RecentIssue, Status};
use crate::util::format_date;

const DEFAULT_WIDTH: usize = 80;
const ELLIPSIS: &str = "...";

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
    pub max_width: Option<usize>,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            use_color: false,
            max_width: None,
        }
    }
}

/// Icon for a status, colored when requested.
#[must_use]
pub fn format_status_icon(status: Status, use_color: bool) -> String {
    let d = status_descriptor(status);
    paint(d.icon, d.tone, use_color)
}

/// `○ Open`, `◐ In Progress`, ...
#[must_use]
pub fn format_status_label(status: Status, use_color: bool) -> String {
    let d = status_descriptor(status);
    paint(&format!("{} {}", d.icon, d.label), d.tone, use_color)
}

/// `▽ Low`, `◇ Medium`, ...
#[must_use]
pub fn format_priority_label(priority: Priority, use_color: bool) -> String {
    let d = priority_descriptor(priority);
    paint(&format!("{} {}", d.icon, d.label), d.tone, use_color)
}

#[must_use]
pub fn format_priority_badge(priority: Priority, use_color: bool) -> String {
    let d = priority_descriptor(priority);
    format!("[{}]", paint(d.label, d.tone, use_color))
}

/// Terminal width from the tty, then `COLUMNS`, then 80.
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok((cols, _)) = crossterm::terminal::size() {
        if cols > 0 {
            return usize::from(cols);
        }
    }
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

fn take_width(text: &str, max: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + cw > max {
            break;
        }
        used += cw;
        out.push(c);
    }
    out
}

/// Truncate a title to `max_len` visible columns, ending in `...` when cut.
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }
    if max_len <= ELLIPSIS.len() {
        return take_width(title, max_len);
    }
    let mut cut = take_width(title, max_len - ELLIPSIS.len());
    cut.push_str(ELLIPSIS);
    cut
}

/// Single-line issue summary.
#[must_use]
pub fn format_issue_line_with(issue: &Issue, options: TextFormatOptions) -> String {
    let number = format!("#{}", issue.number);
    let priority_plain = format!("[{}]", priority_descriptor(issue.priority).label);
    let prefix_len = UnicodeWidthStr::width(status_descriptor(issue.status).icon)
        + 1
        + number.len()
        + 1
        + UnicodeWidthStr::width(priority_plain.as_str())
        + 1;

    let title = options.max_width.map_or_else(
        || issue.title.clone(),
        |width| truncate_title(&issue.title, width.saturating_sub(prefix_len)),
    );

    format!(
        "{} {number} {} {title}",
        format_status_icon(issue.status, options.use_color),
        format_priority_badge(issue.priority, options.use_color),
    )
}

#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    format_issue_line_with(issue, TextFormatOptions::plain())
}

#[must_use]
pub fn format_project_line(project: &ProjectWithCount) -> String {
    let noun = if project.issue_count == 1 { "issue" } else { "issues" };
    format!(
        "{}  {} ({} {noun})",
        project.project.slug, project.project.name, project.issue_count
    )
}

/// Dashboard line for a recent issue: `slug#n  title  (Project)`.
#[must_use]
pub fn format_recent_issue_line(recent: &RecentIssue, options: TextFormatOptions) -> String {
    format!(
        "{} {}#{}  {}  ({})",
        format_status_icon(recent.issue.status, options.use_color),
        recent.project_slug,
        recent.issue.number,
        recent.issue.title,
        recent.project_name
    )
}

#[must_use]
pub fn format_activity_line(activity: &Activity) -> String {
    format!(
        "{} · {} · {}",
        format_activity_message(activity.activity_type, &activity.metadata),
        activity.user_id,
        format_date(activity.created_at)
    )
}

/// Multi-line issue view: header, fields, description and activity log.
#[must_use]
pub fn format_issue_details(
    details: &IssueDetails,
    slug: &str,
    options: TextFormatOptions,
) -> String {
    let issue = &details.issue;
    let mut lines = vec![
        format!("{slug}#{} {}", issue.number, issue.title),
        format!(
            "Status:   {}",
            format_status_label(issue.status, options.use_color)
        ),
        format!(
            "Priority: {}",
            format_priority_label(issue.priority, options.use_color)
        ),
        format!(
            "Assignee: {}",
            issue.assignee_id.as_deref().unwrap_or("Unassigned")
        ),
        format!("Creator:  {}", issue.creator_id),
        format!("Created:  {}", format_date(issue.created_at)),
    ];
    if let Some(closed_at) = issue.closed_at {
        lines.push(format!("Closed:   {}", format_date(closed_at)));
    }
    if let Some(description) = &issue.description {
        lines.push(String::new());
        lines.push(description.clone());
    }
    if !details.activities.is_empty() {
        lines.push(String::new());
        lines.push("Activity:".to_string());
        lines.extend(
            details
                .activities
                .iter()
                .map(|a| format!("  {}", format_activity_line(a))),
        );
    }
    lines.join("\n")
}
