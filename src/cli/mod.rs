//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CliOverrides;

pub mod commands;

/// Multi-tenant issue tracker
#[derive(Parser, Debug)]
#[command(name = "ih", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (defaults to .issuehub/issuehub.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Acting user id
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Organization (tenant) id
    #[arg(long, global = true)]
    pub org: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db: self.db.clone(),
            user: self.user.clone(),
            org: self.org.clone(),
            lock_timeout: self.lock_timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an issuehub workspace in the current directory
    Init {
        /// Replace an existing database
        #[arg(long)]
        force: bool,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Manage issues
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },

    /// Organization-wide issue counts and recent issues
    Dashboard,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Create(ProjectCreateArgs),
    /// List projects, newest first
    List,
    /// Show one project
    Show {
        /// Project slug
        slug: String,
    },
    /// Rename a project or change its description
    Update(ProjectUpdateArgs),
    /// Delete a project with all of its issues
    Delete {
        /// Project id or slug
        project: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectCreateArgs {
    /// Project name
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectUpdateArgs {
    /// Project id or slug
    pub project: String,

    #[arg(long)]
    pub name: Option<String>,

    /// New description (empty string clears it)
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Create an issue
    Create(IssueCreateArgs),
    /// List issues of a project
    List(IssueListArgs),
    /// Show an issue with its recent activity
    Show(IssueRef),
    /// Update an issue
    Update(IssueUpdateArgs),
    /// Delete an issue
    Delete(IssueRef),
    /// Show the activity log of an issue
    Activity(IssueActivityArgs),
}

/// `<project-slug> <number>`
#[derive(Args, Debug, Clone, Default)]
pub struct IssueRef {
    /// Project slug
    pub slug: String,
    /// Issue number within the project
    pub number: i64,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IssueCreateArgs {
    /// Project slug
    pub slug: String,

    /// Issue title
    pub title: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// OPEN, IN_PROGRESS, DONE or CLOSED
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// LOW, MEDIUM, HIGH or URGENT
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Assignee user id
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IssueListArgs {
    /// Project slug
    pub slug: String,

    /// Filter by status (or ALL)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Filter by priority (or ALL)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IssueUpdateArgs {
    #[command(flatten)]
    pub issue: IssueRef,

    #[arg(long)]
    pub title: Option<String>,

    /// New description (empty string clears it)
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub status: Option<String>,

    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Assignee user id (empty string unassigns)
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IssueActivityArgs {
    #[command(flatten)]
    pub issue: IssueRef,

    /// Maximum entries (0 = all)
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (defaults to stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}
