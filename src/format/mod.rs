//! Output formatting.
//!
//! JSON output serializes the model types directly; this module covers the
//! human-readable side: status and priority descriptors, activity messages
//! and terminal lines.

mod activity;
mod display;
mod text;

pub use activity::format_activity_message;
pub use display::{Descriptor, Tone, paint, priority_descriptor, status_descriptor};
pub use text::{
    TextFormatOptions, format_activity_line, format_issue_details, format_issue_line,
    format_issue_line_with, format_priority_badge, format_priority_label, format_project_line,
    format_recent_issue_line, format_status_icon, format_status_label, terminal_width,
    truncate_title,
};
