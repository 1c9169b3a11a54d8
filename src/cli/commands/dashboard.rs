use super::{CommandContext, CommandResult};
use crate::format::{format_recent_issue_line, status_descriptor};
use crate::model::{DashboardStats, Status};

/// Print organization-wide counts and the most recent issues.
///
/// # Errors
///
/// Any action error, in structured form.
pub fn execute(ctx: &CommandContext) -> CommandResult {
    let (tracker, auth) = ctx.open()?;
    let stats = tracker.get_dashboard_stats(&auth)?;
    if ctx.output.json {
        ctx.output.print_json(&stats)?;
        return Ok(());
    }

    for line in summary_lines(&stats) {
        ctx.output.line(&line);
    }
    if !stats.recent_issues.is_empty() {
        ctx.output.line("");
        ctx.output.line("Recent issues:");
        let options = ctx.output.text_options();
        for recent in &stats.recent_issues {
            ctx.output
                .line(&format!("  {}", format_recent_issue_line(recent, options)));
        }
    }
    Ok(())
}

fn summary_lines(stats: &DashboardStats) -> Vec<String> {
    let by_status = [
        (Status::Open, stats.open_issues),
        (Status::InProgress, stats.in_progress_issues),
        (Status::Done, stats.done_issues),
        (Status::Closed, stats.closed_issues),
    ];
    let mut lines = vec![
        format!("Projects:     {}", stats.project_count),
        format!("Issues:       {}", stats.total_issues),
    ];
    lines.extend(by_status.iter().map(|(status, count)| {
        let label = format!("{}:", status_descriptor(*status).label);
        format!("  {label:<12}{count}")
    }));
    lines
}
