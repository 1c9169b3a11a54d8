//! `ih project ...`

use chrono::Utc;

use super::{CommandContext, CommandResult, resolve_project};
use crate::actions::Tracker;
use crate::auth::AuthContext;
use crate::cli::{ProjectCommands, ProjectCreateArgs, ProjectUpdateArgs};
use crate::format::format_project_line;
use crate::model::{CreateProjectInput, ProjectWithCount, UpdateProjectInput};
use crate::util::id::PROJECT_PREFIX;
use crate::util::{format_date, format_relative};

/// # Errors
///
/// Any action error, in structured form.
pub fn execute(command: &ProjectCommands, ctx: &CommandContext) -> CommandResult {
    let (mut tracker, auth) = ctx.open()?;
    match command {
        ProjectCommands::Create(args) => create(&mut tracker, &auth, args, ctx),
        ProjectCommands::List => list(&tracker, &auth, ctx),
        ProjectCommands::Show { slug } => show(&tracker, &auth, slug, ctx),
        ProjectCommands::Update(args) => update(&mut tracker, &auth, args, ctx),
        ProjectCommands::Delete { project } => delete(&mut tracker, &auth, project, ctx),
    }
}

fn create(
    tracker: &mut Tracker,
    auth: &AuthContext,
    args: &ProjectCreateArgs,
    ctx: &CommandContext,
) -> CommandResult {
    let project = tracker.create_project(
        auth,
        CreateProjectInput {
            name: args.name.clone(),
            description: args.description.clone(),
        },
    )?;
    if ctx.output.json {
        ctx.output.print_json(&project)?;
    } else {
        ctx.output
            .line(&format!("Created project {} ({})", project.name, project.slug));
    }
    Ok(())
}

fn list(tracker: &Tracker, auth: &AuthContext, ctx: &CommandContext) -> CommandResult {
    let projects = tracker.get_projects(auth)?;
    if ctx.output.json {
        ctx.output.print_json(&projects)?;
        return Ok(());
    }
    if projects.is_empty() {
        ctx.output
            .line("No projects yet. Create one with: ih project create <name>");
    }
    for project in &projects {
        ctx.output.line(&format_project_line(project));
    }
    Ok(())
}

fn show(tracker: &Tracker, auth: &AuthContext, slug: &str, ctx: &CommandContext) -> CommandResult {
    let project = resolve_project(tracker, auth, slug)?;
    if ctx.output.json {
        ctx.output.print_json(&project)?;
    } else {
        ctx.output.line(&render_project(&project));
    }
    Ok(())
}

fn render_project(project: &ProjectWithCount) -> String {
    let p = &project.project;
    let mut lines = vec![
        format!("{} ({})", p.name, p.slug),
        format!("Id:       {}", p.id),
        format!("Issues:   {}", project.issue_count),
        format!("Created:  {}", format_date(p.created_at)),
        format!("Updated:  {}", format_relative(p.updated_at, Utc::now())),
    ];
    if let Some(description) = &p.description {
        lines.push(String::new());
        lines.push(description.clone());
    }
    lines.join("\n")
}

/// Accept either a project slug or a project id.
fn project_id(tracker: &Tracker, auth: &AuthContext, reference: &str) -> CommandResult<String> {
    if let Some(project) = tracker.get_project_by_slug(auth, reference)? {
        return Ok(project.project.id);
    }
    if reference.starts_with(&format!("{PROJECT_PREFIX}-")) {
        return Ok(reference.to_string());
    }
    Ok(resolve_project(tracker, auth, reference)?.project.id)
}

fn update(
    tracker: &mut Tracker,
    auth: &AuthContext,
    args: &ProjectUpdateArgs,
    ctx: &CommandContext,
) -> CommandResult {
    let id = project_id(tracker, auth, &args.project)?;
    let project = tracker.update_project(
        auth,
        &id,
        UpdateProjectInput {
            name: args.name.clone(),
            description: args.description.clone(),
        },
    )?;
    if ctx.output.json {
        ctx.output.print_json(&project)?;
    } else {
        ctx.output.line(&format!("Updated project {}", project.slug));
    }
    Ok(())
}

fn delete(
    tracker: &mut Tracker,
    auth: &AuthContext,
    reference: &str,
    ctx: &CommandContext,
) -> CommandResult {
    let id = project_id(tracker, auth, reference)?;
    let outcome = tracker.delete_project(auth, &id)?;
    if ctx.output.json {
        ctx.output.print_json(&outcome)?;
    } else {
        ctx.output.line(&format!("Deleted project {reference}"));
    }
    Ok(())
}
