//! `ih issue ...`

use super::{CommandContext, CommandResult, resolve_issue, resolve_project};
use crate::actions::Tracker;
use crate::auth::AuthContext;
use crate::cli::{IssueActivityArgs, IssueCommands, IssueCreateArgs, IssueListArgs, IssueRef, IssueUpdateArgs};
use crate::error::Result;
use crate::format::{format_activity_line, format_issue_details, format_issue_line_with};
use crate::model::{CreateIssueInput, IssueFilters, Priority, Status, UpdateIssueInput};

/// # Errors
///
/// Any action error, in structured form.
pub fn execute(command: &IssueCommands, ctx: &CommandContext) -> CommandResult {
    let (mut tracker, auth) = ctx.open()?;
    match command {
        IssueCommands::Create(args) => create(&mut tracker, &auth, args, ctx),
        IssueCommands::List(args) => list(&tracker, &auth, args, ctx),
        IssueCommands::Show(issue) => show(&tracker, &auth, issue, ctx),
        IssueCommands::Update(args) => update(&mut tracker, &auth, args, ctx),
        IssueCommands::Delete(issue) => delete(&mut tracker, &auth, issue, ctx),
        IssueCommands::Activity(args) => activity(&tracker, &auth, args, ctx),
    }
}

fn parse_status(value: Option<&str>) -> Result<Option<Status>> {
    value.map(str::parse).transpose()
}

fn parse_priority(value: Option<&str>) -> Result<Option<Priority>> {
    value.map(str::parse).transpose()
}

fn create(
    tracker: &mut Tracker,
    auth: &AuthContext,
    args: &IssueCreateArgs,
    ctx: &CommandContext,
) -> CommandResult {
    let input = CreateIssueInput {
        title: args.title.clone(),
        description: args.description.clone(),
        status: parse_status(args.status.as_deref())?,
        priority: parse_priority(args.priority.as_deref())?,
        assignee_id: args.assignee.clone(),
    };
    let project = resolve_project(tracker, auth, &args.slug)?;
    let issue = tracker.create_issue(auth, &project.project.id, input)?;
    if ctx.output.json {
        ctx.output.print_json(&issue)?;
    } else {
        ctx.output.line(&format!(
            "Created {}#{}: {}",
            project.project.slug, issue.number, issue.title
        ));
    }
    Ok(())
}

fn list(
    tracker: &Tracker,
    auth: &AuthContext,
    args: &IssueListArgs,
    ctx: &CommandContext,
) -> CommandResult {
    let filters = IssueFilters::parse(args.status.as_deref(), args.priority.as_deref())?;
    let project = resolve_project(tracker, auth, &args.slug)?;
    let issues = tracker.get_issues(auth, &project.project.id, filters)?;
    if ctx.output.json {
        ctx.output.print_json(&issues)?;
        return Ok(());
    }
    if issues.is_empty() {
        ctx.output.line("No issues found.");
    }
    let options = ctx.output.text_options();
    for issue in &issues {
        ctx.output.line(&format_issue_line_with(issue, options));
    }
    Ok(())
}

fn show(tracker: &Tracker, auth: &AuthContext, issue: &IssueRef, ctx: &CommandContext) -> CommandResult {
    let details = resolve_issue(tracker, auth, &issue.slug, issue.number)?;
    if ctx.output.json {
        ctx.output.print_json(&details)?;
    } else {
        ctx.output.line(&format_issue_details(
            &details,
            &issue.slug,
            ctx.output.text_options(),
        ));
    }
    Ok(())
}

fn update(
    tracker: &mut Tracker,
    auth: &AuthContext,
    args: &IssueUpdateArgs,
    ctx: &CommandContext,
) -> CommandResult {
    let input = UpdateIssueInput {
        title: args.title.clone(),
        description: args.description.clone(),
        status: parse_status(args.status.as_deref())?,
        priority: parse_priority(args.priority.as_deref())?,
        assignee_id: args.assignee.clone(),
    };
    let details = resolve_issue(tracker, auth, &args.issue.slug, args.issue.number)?;
    let issue = tracker.update_issue(auth, &details.issue.id, input)?;
    if ctx.output.json {
        ctx.output.print_json(&issue)?;
    } else {
        ctx.output.line(&format!(
            "Updated {}#{}",
            args.issue.slug, issue.number
        ));
    }
    Ok(())
}

fn delete(
    tracker: &mut Tracker,
    auth: &AuthContext,
    issue: &IssueRef,
    ctx: &CommandContext,
) -> CommandResult {
    let details = resolve_issue(tracker, auth, &issue.slug, issue.number)?;
    let outcome = tracker.delete_issue(auth, &details.issue.id)?;
    if ctx.output.json {
        ctx.output.print_json(&outcome)?;
    } else {
        ctx.output
            .line(&format!("Deleted {}#{}", issue.slug, issue.number));
    }
    Ok(())
}

fn activity(
    tracker: &Tracker,
    auth: &AuthContext,
    args: &IssueActivityArgs,
    ctx: &CommandContext,
) -> CommandResult {
    let details = resolve_issue(tracker, auth, &args.issue.slug, args.issue.number)?;
    let activities = tracker.get_issue_activities(auth, &details.issue.id, args.limit)?;
    if ctx.output.json {
        ctx.output.print_json(&activities)?;
        return Ok(());
    }
    for entry in &activities {
        ctx.output.line(&format_activity_line(entry));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    #[test]
    fn status_flags_parse_leniently() {
        assert_eq!(parse_status(Some("in-progress")).unwrap(), Some(Status::InProgress));
        assert_eq!(parse_status(None).unwrap(), None);
        assert!(matches!(
            parse_status(Some("wip")),
            Err(TrackerError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn priority_flags_parse_leniently() {
        assert_eq!(parse_priority(Some("urgent")).unwrap(), Some(Priority::Urgent));
        assert!(matches!(
            parse_priority(Some("p0")),
            Err(TrackerError::InvalidPriority { .. })
        ));
    }
}
