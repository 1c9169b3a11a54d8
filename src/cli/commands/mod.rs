//! Command implementations.
//!
//! Each command resolves configuration, opens a [`Tracker`], calls one or
//! more actions and prints either text or JSON. Failures come back as
//! [`StructuredError`] so lookups can attach "did you mean" hints.

pub mod completions;
pub mod dashboard;
pub mod init;
pub mod issue;
pub mod project;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::actions::Tracker;
use crate::auth::AuthContext;
use crate::cli::{Cli, Commands};
use crate::config::{CliOverrides, ResolvedConfig};
use crate::error::{Result, StructuredError, TrackerError};
use crate::format::{TextFormatOptions, terminal_width};
use crate::model::{IssueDetails, ProjectWithCount};

pub type CommandResult<T = ()> = std::result::Result<T, StructuredError>;

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    pub json: bool,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputContext {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let tty = io::stdout().is_terminal();
        Self {
            json: cli.json,
            quiet: cli.quiet,
            use_color: tty && !cli.no_color,
        }
    }

    #[must_use]
    pub fn text_options(self) -> TextFormatOptions {
        TextFormatOptions {
            use_color: self.use_color,
            max_width: self.use_color.then(terminal_width),
        }
    }

    /// Print a serializable value as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn print_json<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        let mut out = io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
        Ok(())
    }

    /// Print a text line unless `--quiet`.
    pub fn line(self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
    }
}

/// Resolved configuration plus output settings, shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub overrides: CliOverrides,
    pub output: OutputContext,
    pub start_dir: Option<PathBuf>,
}

impl CommandContext {
    /// Resolve config, open the database and build the tracker.
    ///
    /// # Errors
    ///
    /// `NotInitialized`, `Config`, or a database error.
    pub fn open(&self) -> Result<(Tracker, AuthContext)> {
        let resolved = ResolvedConfig::resolve(&self.overrides, self.start_dir.as_deref())?;
        let storage = resolved.open_storage()?;
        Ok((Tracker::new(storage), resolved.auth))
    }
}

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Whatever the command fails with, already in structured form.
pub fn execute(cli: &Cli) -> CommandResult {
    let ctx = CommandContext {
        overrides: cli.overrides(),
        output: OutputContext::from_cli(cli),
        start_dir: None,
    };

    match &cli.command {
        Commands::Init { force } => init::execute(*force, None, ctx.output),
        Commands::Project { command } => project::execute(command, &ctx),
        Commands::Issue { command } => issue::execute(command, &ctx),
        Commands::Dashboard => dashboard::execute(&ctx),
        Commands::Completions(args) => Ok(completions::execute(args)?),
    }
}

/// Look up a project by slug, suggesting close matches when it is missing.
///
/// # Errors
///
/// `ProjectNotFound` with similar slugs in the hint, or any action error.
pub fn resolve_project(
    tracker: &Tracker,
    auth: &AuthContext,
    slug: &str,
) -> CommandResult<ProjectWithCount> {
    if let Some(project) = tracker.get_project_by_slug(auth, slug)? {
        return Ok(project);
    }
    let known = tracker.project_slugs(auth)?;
    Err(StructuredError::project_not_found(slug, &known))
}

/// Look up an issue by project slug and number.
///
/// # Errors
///
/// `ProjectNotFound`, `IssueNotFound`, or any action error.
pub fn resolve_issue(
    tracker: &Tracker,
    auth: &AuthContext,
    slug: &str,
    number: i64,
) -> CommandResult<IssueDetails> {
    if let Some(details) = tracker.get_issue_by_number(auth, slug, number)? {
        return Ok(details);
    }
    resolve_project(tracker, auth, slug)?;
    Err(TrackerError::issue_not_found(format!("{slug}#{number}")).into())
}
