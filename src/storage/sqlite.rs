//! `SQLite` storage implementation.
//!
//! Every statement that touches projects or issues carries the organization
//! id, so rows of another tenant are never read or written. Writes go through
//! [`SqliteStorage::mutate`], which runs them in one `BEGIN IMMEDIATE`
//! transaction together with the activities they stage.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{
    Connection, ErrorCode as SqliteErrorCode, OptionalExtension, Transaction,
    TransactionBehavior, params, types::Type,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};
use crate::model::{
    Activity, ActivityType, DashboardStats, Issue, IssueDetails, IssueFilters, IssueUpdate, NewActivity,
    Priority, Project, ProjectUpdate, ProjectWithCount, RecentIssue, Status, closed_at_transition,
    derive_activities,
};
use crate::storage::activities::{get_activities, insert_activity};
use crate::storage::schema::apply_schema;
use crate::util::{IdGenerator, disambiguate, slugify, to_db_timestamp};

/// Busy timeout applied when the caller does not configure one.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// Dashboard "recent issues" length.
pub const RECENT_ISSUES_LIMIT: usize = 5;

const PROJECT_COLUMNS: &str =
    "p.id, p.org_id, p.name, p.slug, p.description, p.created_at, p.updated_at";

const ISSUE_COLUMNS: &str = "i.id, i.project_id, i.number, i.title, i.description, i.status, \
     i.priority, i.creator_id, i.assignee_id, i.created_at, i.updated_at, i.closed_at";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation, collecting the activities it stages.
#[derive(Debug)]
pub struct MutationContext {
    pub op_name: String,
    pub actor: String,
    /// One timestamp for every row written by the mutation.
    pub now: DateTime<Utc>,
    activities: Vec<(String, NewActivity)>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            now: now_micros(),
            activities: Vec::new(),
        }
    }

    pub fn record_activity(&mut self, issue_id: &str, activity: NewActivity) {
        self.activities.push((issue_id.to_string(), activity));
    }

    pub fn record_activities<I>(&mut self, issue_id: &str, activities: I)
    where
        I: IntoIterator<Item = NewActivity>,
    {
        for activity in activities {
            self.record_activity(issue_id, activity);
        }
    }

    #[must_use]
    pub fn staged(&self) -> usize {
        self.activities.len()
    }
}

/// Fields of a new issue. The store assigns id, number and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub assignee_id: Option<String>,
}

/// An issue together with its project's slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedIssue {
    pub issue: Issue,
    pub project_slug: String,
}

/// Current time truncated to what the stored text keeps.
#[must_use]
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl SqliteStorage {
    /// Open the database at `path` with the default busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open with an optional busy timeout in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(
            lock_timeout_ms.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS),
        ))?;
        apply_schema(&conn)?;
        debug!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction, then write the staged
    /// activities and commit. Any error rolls everything back. UNIQUE
    /// violations surface as `TrackerError::Conflict`.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, a database error, or `Conflict`.
    pub fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction<'_>, &mut MutationContext) -> Result<R>,
    {
        self.run_mutation(op, actor, f)
            .map_err(|err| unique_violation_to_conflict(err, op))
    }

    fn run_mutation<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction<'_>, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ctx = MutationContext::new(op, actor);

        let result = f(&tx, &mut ctx)?;

        for (issue_id, activity) in &ctx.activities {
            insert_activity(&tx, issue_id, &ctx.actor, activity, ctx.now)?;
        }

        tx.commit()?;
        debug!(op = %ctx.op_name, actor = %ctx.actor, activities = ctx.staged(), "mutation committed");
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Create a project, deriving a slug that is unique within `org_id`.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a concurrent writer took the slug, or a database error.
    pub fn create_project(
        &mut self,
        org_id: &str,
        name: &str,
        description: Option<&str>,
        actor: &str,
    ) -> Result<Project> {
        self.mutate("create_project", actor, |tx, ctx| {
            let base = slugify(name);
            let slug = if slug_taken(tx, org_id, &base)? {
                disambiguate(&base, ctx.now, |candidate| slug_taken(tx, org_id, candidate))?
            } else {
                base
            };

            let id = IdGenerator::projects().generate(&[org_id, name], ctx.now, |candidate| {
                id_exists(tx, "SELECT 1 FROM projects WHERE id = ?1", candidate)
            })?;

            let project = Project {
                id,
                org_id: org_id.to_string(),
                name: name.to_string(),
                slug,
                description: description.map(ToString::to_string),
                created_at: ctx.now,
                updated_at: ctx.now,
            };

            tx.execute(
                "INSERT INTO projects (id, org_id, name, slug, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    project.id,
                    project.org_id,
                    project.name,
                    project.slug,
                    project.description,
                    to_db_timestamp(project.created_at),
                    to_db_timestamp(project.updated_at),
                ],
            )?;

            Ok(project)
        })
    }

    /// Projects of `org_id` with issue counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_projects(&self, org_id: &str) -> Result<Vec<ProjectWithCount>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS},
                    (SELECT COUNT(*) FROM issues i WHERE i.project_id = p.id) AS issue_count
             FROM projects p
             WHERE p.org_id = ?1
             ORDER BY p.created_at DESC, p.rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let projects = stmt
            .query_map([org_id], project_with_count_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_project_by_slug(&self, org_id: &str, slug: &str) -> Result<Option<ProjectWithCount>> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS},
                    (SELECT COUNT(*) FROM issues i WHERE i.project_id = p.id) AS issue_count
             FROM projects p
             WHERE p.org_id = ?1 AND p.slug = ?2"
        );
        Ok(self
            .conn
            .query_row(&sql, [org_id, slug], project_with_count_from_row)
            .optional()?)
    }

    /// Slugs of every project in `org_id`, for suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn project_slugs(&self, org_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug FROM projects WHERE org_id = ?1 ORDER BY slug")?;
        let slugs = stmt
            .query_map([org_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(slugs)
    }

    /// Update name and/or description. The slug never changes.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if `id` is not a project of `org_id`.
    pub fn update_project(
        &mut self,
        org_id: &str,
        id: &str,
        update: &ProjectUpdate,
        actor: &str,
    ) -> Result<Project> {
        self.mutate("update_project", actor, |tx, ctx| {
            let mut project =
                load_project(tx, org_id, id)?.ok_or_else(|| TrackerError::project_not_found(id))?;

            if let Some(name) = &update.name {
                project.name.clone_from(name);
            }
            if let Some(description) = &update.description {
                project.description.clone_from(description);
            }
            project.updated_at = ctx.now;

            tx.execute(
                "UPDATE projects SET name = ?1, description = ?2, updated_at = ?3
                 WHERE id = ?4 AND org_id = ?5",
                params![
                    project.name,
                    project.description,
                    to_db_timestamp(project.updated_at),
                    id,
                    org_id,
                ],
            )?;

            Ok(project)
        })
    }

    /// Delete a project and, by cascade, its issues, activities and counter.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if `id` is not a project of `org_id`.
    pub fn delete_project(&mut self, org_id: &str, id: &str, actor: &str) -> Result<Project> {
        self.mutate("delete_project", actor, |tx, _ctx| {
            let project =
                load_project(tx, org_id, id)?.ok_or_else(|| TrackerError::project_not_found(id))?;
            tx.execute(
                "DELETE FROM projects WHERE id = ?1 AND org_id = ?2",
                [id, org_id],
            )?;
            Ok(project)
        })
    }

    // ------------------------------------------------------------------
    // Issues
    // ------------------------------------------------------------------

    /// Create an issue with the next number of its project and stage an
    /// `ISSUE_CREATED` activity.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project is not visible to `org_id`,
    /// `Conflict` if the number was taken concurrently, or a database error.
    pub fn create_issue(
        &mut self,
        org_id: &str,
        project_id: &str,
        new: &NewIssue,
        actor: &str,
    ) -> Result<ScopedIssue> {
        self.mutate("create_issue", actor, |tx, ctx| {
            let project = load_project(tx, org_id, project_id)?
                .ok_or_else(|| TrackerError::project_not_found(project_id))?;

            let number = next_issue_number(tx, project_id)?;
            let number_text = number.to_string();
            let id = IdGenerator::issues().generate(
                &[project_id, &number_text, &new.title],
                ctx.now,
                |candidate| id_exists(tx, "SELECT 1 FROM issues WHERE id = ?1", candidate),
            )?;

            let issue = Issue {
                id,
                project_id: project_id.to_string(),
                number,
                title: new.title.clone(),
                description: new.description.clone(),
                status: new.status,
                priority: new.priority,
                creator_id: ctx.actor.clone(),
                assignee_id: new.assignee_id.clone(),
                created_at: ctx.now,
                updated_at: ctx.now,
                closed_at: new.status.is_closed().then_some(ctx.now),
            };

            tx.execute(
                "INSERT INTO issues (id, project_id, number, title, description, status, priority,
                                     creator_id, assignee_id, created_at, updated_at, closed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    issue.id,
                    issue.project_id,
                    issue.number,
                    issue.title,
                    issue.description,
                    issue.status.as_str(),
                    issue.priority.as_str(),
                    issue.creator_id,
                    issue.assignee_id,
                    to_db_timestamp(issue.created_at),
                    to_db_timestamp(issue.updated_at),
                    issue.closed_at.map(to_db_timestamp),
                ],
            )?;

            tx.execute(
                "INSERT INTO issue_counters (project_id, last_number) VALUES (?1, ?2)
                 ON CONFLICT(project_id) DO UPDATE SET last_number = excluded.last_number",
                params![project_id, number],
            )?;

            ctx.record_activity(
                &issue.id,
                NewActivity::new(ActivityType::IssueCreated),
            );

            Ok(ScopedIssue {
                issue,
                project_slug: project.slug,
            })
        })
    }

    /// Issues of one project, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if the project is not visible to `org_id`.
    pub fn list_issues(
        &self,
        org_id: &str,
        project_id: &str,
        filters: &IssueFilters,
    ) -> Result<Vec<Issue>> {
        if load_project(&self.conn, org_id, project_id)?.is_none() {
            return Err(TrackerError::project_not_found(project_id));
        }

        let sql = format!(
            "SELECT {ISSUE_COLUMNS}
             FROM issues i
             JOIN projects p ON p.id = i.project_id
             WHERE p.org_id = ?1
               AND i.project_id = ?2
               AND (?3 IS NULL OR i.status = ?3)
               AND (?4 IS NULL OR i.priority = ?4)
             ORDER BY i.created_at DESC, i.number DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let issues = stmt
            .query_map(
                params![
                    org_id,
                    project_id,
                    filters.status.as_ref().map(Status::as_str),
                    filters.priority.as_ref().map(Priority::as_str),
                ],
                |row| issue_from_row(row, 0),
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(issues)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_issue(&self, org_id: &str, id: &str) -> Result<Option<ScopedIssue>> {
        load_issue(&self.conn, org_id, id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_issue_by_number(
        &self,
        org_id: &str,
        slug: &str,
        number: i64,
    ) -> Result<Option<ScopedIssue>> {
        let sql = format!(
            "SELECT {ISSUE_COLUMNS}, p.slug
             FROM issues i
             JOIN projects p ON p.id = i.project_id
             WHERE p.org_id = ?1 AND p.slug = ?2 AND i.number = ?3"
        );
        Ok(self
            .conn
            .query_row(&sql, params![org_id, slug, number], scoped_issue_from_row)
            .optional()?)
    }

    /// Issue plus its most recent `activity_limit` activities.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn get_issue_details(
        &self,
        org_id: &str,
        slug: &str,
        number: i64,
        activity_limit: usize,
    ) -> Result<Option<IssueDetails>> {
        let Some(scoped) = self.get_issue_by_number(org_id, slug, number)? else {
            return Ok(None);
        };
        let activities = get_activities(&self.conn, &scoped.issue.id, activity_limit)?;
        Ok(Some(IssueDetails {
            issue: scoped.issue,
            activities,
        }))
    }

    /// Activities of an issue visible to `org_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue is not visible to `org_id`.
    pub fn get_issue_activities(
        &self,
        org_id: &str,
        issue_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>> {
        if load_issue(&self.conn, org_id, issue_id)?.is_none() {
            return Err(TrackerError::issue_not_found(issue_id));
        }
        get_activities(&self.conn, issue_id, limit)
    }

    /// Apply a normalized update as one UPDATE statement, staging one
    /// activity per changed status, priority or assignee.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue is not visible to `org_id`.
    pub fn update_issue(
        &mut self,
        org_id: &str,
        id: &str,
        update: &IssueUpdate,
        actor: &str,
    ) -> Result<ScopedIssue> {
        self.mutate("update_issue", actor, |tx, ctx| {
            let ScopedIssue {
                issue: current,
                project_slug,
            } = load_issue(tx, org_id, id)?.ok_or_else(|| TrackerError::issue_not_found(id))?;

            let activities = derive_activities(&current, update);
            let closed_at = closed_at_transition(current.status, update.status, ctx.now);

            let mut issue = current.clone();
            if let Some(title) = &update.title {
                issue.title.clone_from(title);
            }
            if let Some(description) = &update.description {
                issue.description.clone_from(description);
            }
            if let Some(status) = update.status {
                issue.status = status;
            }
            if let Some(priority) = update.priority {
                issue.priority = priority;
            }
            if let Some(assignee) = &update.assignee_id {
                issue.assignee_id.clone_from(assignee);
            }
            issue.closed_at = closed_at.apply(current.closed_at);
            issue.updated_at = ctx.now;

            tx.execute(
                "UPDATE issues
                 SET title = ?1, description = ?2, status = ?3, priority = ?4,
                     assignee_id = ?5, updated_at = ?6, closed_at = ?7
                 WHERE id = ?8",
                params![
                    issue.title,
                    issue.description,
                    issue.status.as_str(),
                    issue.priority.as_str(),
                    issue.assignee_id,
                    to_db_timestamp(issue.updated_at),
                    issue.closed_at.map(to_db_timestamp),
                    id,
                ],
            )?;

            ctx.record_activities(id, activities);

            Ok(ScopedIssue {
                issue,
                project_slug,
            })
        })
    }

    /// Delete an issue and, by cascade, its activities. Its number is not reused.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the issue is not visible to `org_id`.
    pub fn delete_issue(&mut self, org_id: &str, id: &str, actor: &str) -> Result<ScopedIssue> {
        self.mutate("delete_issue", actor, |tx, _ctx| {
            let scoped = load_issue(tx, org_id, id)?.ok_or_else(|| TrackerError::issue_not_found(id))?;
            tx.execute("DELETE FROM issues WHERE id = ?1", [id])?;
            Ok(scoped)
        })
    }

    // ------------------------------------------------------------------
    // Dashboard
    // ------------------------------------------------------------------

    /// Tenant-wide counts plus the most recent issues.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn dashboard_stats(&self, org_id: &str) -> Result<DashboardStats> {
        let project_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE org_id = ?1",
            [org_id],
            |row| row.get(0),
        )?;
        if project_count == 0 {
            return Ok(DashboardStats::default());
        }

        let (total, open, in_progress, done, closed): (i64, i64, i64, i64, i64) =
            self.conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(i.status = 'OPEN'), 0),
                        COALESCE(SUM(i.status = 'IN_PROGRESS'), 0),
                        COALESCE(SUM(i.status = 'DONE'), 0),
                        COALESCE(SUM(i.status = 'CLOSED'), 0)
                 FROM issues i
                 JOIN projects p ON p.id = i.project_id
                 WHERE p.org_id = ?1",
                [org_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;

        let sql = format!(
            "SELECT {ISSUE_COLUMNS}, p.name, p.slug
             FROM issues i
             JOIN projects p ON p.id = i.project_id
             WHERE p.org_id = ?1
             ORDER BY i.created_at DESC, i.rowid DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let recent_issues = stmt
            .query_map(
                params![org_id, i64::try_from(RECENT_ISSUES_LIMIT).unwrap_or(5)],
                |row| {
                    Ok(RecentIssue {
                        issue: issue_from_row(row, 0)?,
                        project_name: row.get(12)?,
                        project_slug: row.get(13)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(DashboardStats {
            total_issues: count(total),
            open_issues: count(open),
            in_progress_issues: count(in_progress),
            done_issues: count(done),
            closed_issues: count(closed),
            project_count: count(project_count),
            recent_issues,
        })
    }
}

fn count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

fn unique_violation_to_conflict(err: TrackerError, op: &str) -> TrackerError {
    match err {
        TrackerError::Database(rusqlite::Error::SqliteFailure(failure, Some(message)))
            if failure.code == SqliteErrorCode::ConstraintViolation
                && message.starts_with("UNIQUE") =>
        {
            warn!(op, %message, "unique constraint conflict");
            TrackerError::Conflict { what: message }
        }
        other => other,
    }
}

fn id_exists(conn: &Connection, sql: &str, id: &str) -> Result<bool> {
    Ok(conn.query_row(sql, [id], |_| Ok(())).optional()?.is_some())
}

fn slug_taken(conn: &Connection, org_id: &str, slug: &str) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM projects WHERE org_id = ?1 AND slug = ?2",
            [org_id, slug],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

/// 1 + the larger of the last number handed out and the highest existing number.
fn next_issue_number(conn: &Connection, project_id: &str) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT MAX(
                COALESCE((SELECT last_number FROM issue_counters WHERE project_id = ?1), 0),
                COALESCE((SELECT MAX(number) FROM issues WHERE project_id = ?1), 0)
            ) + 1",
        [project_id],
        |row| row.get(0),
    )?)
}

fn load_project(conn: &Connection, org_id: &str, id: &str) -> Result<Option<Project>> {
    let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?1 AND p.org_id = ?2");
    Ok(conn.query_row(&sql, [id, org_id], project_from_row).optional()?)
}

fn load_issue(conn: &Connection, org_id: &str, id: &str) -> Result<Option<ScopedIssue>> {
    let sql = format!(
        "SELECT {ISSUE_COLUMNS}, p.slug
         FROM issues i
         JOIN projects p ON p.id = i.project_id
         WHERE i.id = ?1 AND p.org_id = ?2"
    );
    Ok(conn
        .query_row(&sql, [id, org_id], scoped_issue_from_row)
        .optional()?)
}

/// Read a stored RFC3339 timestamp column.
pub(crate) fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(idx, &text)
}

fn optional_timestamp_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| parse_timestamp(idx, &text))
        .transpose()
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        org_id: row.get(1)?,
        name: row.get(2)?,
        slug: row.get(3)?,
        description: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
        updated_at: timestamp_column(row, 6)?,
    })
}

fn project_with_count_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectWithCount> {
    Ok(ProjectWithCount {
        project: project_from_row(row)?,
        issue_count: count(row.get(7)?),
    })
}

fn issue_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Issue> {
    let status_text: String = row.get(offset + 5)?;
    let status = status_text.parse::<Status>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(offset + 5, Type::Text, Box::new(e))
    })?;
    let priority_text: String = row.get(offset + 6)?;
    let priority = priority_text.parse::<Priority>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(offset + 6, Type::Text, Box::new(e))
    })?;

    Ok(Issue {
        id: row.get(offset)?,
        project_id: row.get(offset + 1)?,
        number: row.get(offset + 2)?,
        title: row.get(offset + 3)?,
        description: row.get(offset + 4)?,
        status,
        priority,
        creator_id: row.get(offset + 7)?,
        assignee_id: row.get(offset + 8)?,
        created_at: timestamp_column(row, offset + 9)?,
        updated_at: timestamp_column(row, offset + 10)?,
        closed_at: optional_timestamp_column(row, offset + 11)?,
    })
}

fn scoped_issue_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScopedIssue> {
    Ok(ScopedIssue {
        issue: issue_from_row(row, 0)?,
        project_slug: row.get(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORG: &str = "org_a";
    const OTHER_ORG: &str = "org_b";
    const USER: &str = "user_1";

    fn storage() -> SqliteStorage {
        SqliteStorage::open_memory().unwrap()
    }

    fn new_issue(title: &str) -> NewIssue {
        NewIssue {
            title: title.to_string(),
            ..NewIssue::default()
        }
    }

    #[test]
    fn test_create_project_derives_slug() {
        let mut store = storage();
        let project = store.create_project(ORG, "My App", None, USER).unwrap();
        assert_eq!(project.slug, "my-app");
        assert!(project.id.starts_with("prj-"));
        assert_eq!(project.created_at, project.updated_at);
    }

    #[test]
    fn test_duplicate_name_gets_suffixed_slug() {
        let mut store = storage();
        let first = store.create_project(ORG, "My App", None, USER).unwrap();
        let second = store.create_project(ORG, "My App", None, USER).unwrap();
        assert_ne!(first.slug, second.slug);
        assert!(second.slug.starts_with("my-app-"));

        let other = store.create_project(OTHER_ORG, "My App", None, USER).unwrap();
        assert_eq!(other.slug, "my-app");
    }

    #[test]
    fn test_numbers_are_sequential_and_never_reused() {
        let mut store = storage();
        let project = store.create_project(ORG, "Numbers", None, USER).unwrap();
        let one = store
            .create_issue(ORG, &project.id, &new_issue("first"), USER)
            .unwrap();
        let two = store
            .create_issue(ORG, &project.id, &new_issue("second"), USER)
            .unwrap();
        assert_eq!(one.issue.number, 1);
        assert_eq!(two.issue.number, 2);

        store.delete_issue(ORG, &two.issue.id, USER).unwrap();
        let three = store
            .create_issue(ORG, &project.id, &new_issue("third"), USER)
            .unwrap();
        assert_eq!(three.issue.number, 3);
    }

    #[test]
    fn test_create_issue_stages_created_activity() {
        let mut store = storage();
        let project = store.create_project(ORG, "Acts", None, USER).unwrap();
        let scoped = store
            .create_issue(ORG, &project.id, &new_issue("track me"), USER)
            .unwrap();
        assert_eq!(scoped.project_slug, "acts");
        let activities = store
            .get_issue_activities(ORG, &scoped.issue.id, 20)
            .unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].activity_type, ActivityType::IssueCreated);
        assert_eq!(activities[0].user_id, USER);
        assert_eq!(activities[0].created_at, scoped.issue.created_at);
    }

    #[test]
    fn test_create_issue_in_other_org_project_is_not_found() {
        let mut store = storage();
        let project = store.create_project(ORG, "Private", None, USER).unwrap();
        let err = store
            .create_issue(OTHER_ORG, &project.id, &new_issue("sneaky"), USER)
            .unwrap_err();
        assert!(matches!(err, TrackerError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_roundtrip_matches_returned_issue() {
        let mut store = storage();
        let project = store.create_project(ORG, "Round", None, USER).unwrap();
        let created = store
            .create_issue(
                ORG,
                &project.id,
                &NewIssue {
                    title: "closed already".to_string(),
                    status: Status::Done,
                    priority: Priority::High,
                    assignee_id: Some("user_2".to_string()),
                    description: Some("body".to_string()),
                },
                USER,
            )
            .unwrap();
        assert_eq!(created.issue.closed_at, Some(created.issue.created_at));
        let loaded = store.get_issue(ORG, &created.issue.id).unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn test_update_issue_status_roundtrip() {
        let mut store = storage();
        let project = store.create_project(ORG, "Flow", None, USER).unwrap();
        let created = store
            .create_issue(ORG, &project.id, &new_issue("flow"), USER)
            .unwrap();

        let done = store
            .update_issue(
                ORG,
                &created.issue.id,
                &IssueUpdate {
                    status: Some(Status::Done),
                    ..IssueUpdate::default()
                },
                USER,
            )
            .unwrap();
        assert!(done.issue.closed_at.is_some());

        let reopened = store
            .update_issue(
                ORG,
                &created.issue.id,
                &IssueUpdate {
                    status: Some(Status::Open),
                    ..IssueUpdate::default()
                },
                USER,
            )
            .unwrap();
        assert!(reopened.issue.closed_at.is_none());

        let activities = store
            .get_issue_activities(ORG, &created.issue.id, 0)
            .unwrap();
        let status_changes = activities
            .iter()
            .filter(|a| a.activity_type == ActivityType::StatusChanged)
            .count();
        assert_eq!(status_changes, 2);
    }

    #[test]
    fn test_list_issues_filters_and_scope() {
        let mut store = storage();
        let project = store.create_project(ORG, "Filter", None, USER).unwrap();
        store
            .create_issue(ORG, &project.id, &new_issue("low one"), USER)
            .unwrap();
        store
            .create_issue(
                ORG,
                &project.id,
                &NewIssue {
                    title: "urgent one".to_string(),
                    priority: Priority::Urgent,
                    ..NewIssue::default()
                },
                USER,
            )
            .unwrap();

        let all = store
            .list_issues(ORG, &project.id, &IssueFilters::default())
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].number, 2);

        let urgent = store
            .list_issues(
                ORG,
                &project.id,
                &IssueFilters {
                    priority: Some(Priority::Urgent),
                    status: None,
                },
            )
            .unwrap();
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].title, "urgent one");

        let err = store
            .list_issues(OTHER_ORG, &project.id, &IssueFilters::default())
            .unwrap_err();
        assert!(matches!(err, TrackerError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let mut store = storage();
        let project = store.create_project(ORG, "Dup", None, USER).unwrap();
        let err = store
            .mutate("dup_insert", USER, |tx, _ctx| {
                tx.execute(
                    "INSERT INTO projects (id, org_id, name, slug, created_at, updated_at)
                     VALUES ('prj-other', ?1, 'Dup', ?2, 't', 't')",
                    [ORG, project.slug.as_str()],
                )?;
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_failed_mutation_rolls_back() {
        let mut store = storage();
        let result: Result<()> = store.mutate("boom", USER, |tx, _ctx| {
            tx.execute(
                "INSERT INTO projects (id, org_id, name, slug, created_at, updated_at)
                 VALUES ('prj-x', 'org', 'n', 's', 't', 't')",
                [],
            )?;
            Err(TrackerError::validation("x", "forced"))
        });
        assert!(result.is_err());
        assert!(store.list_projects("org").unwrap().is_empty());
    }

    #[test]
    fn test_dashboard_empty_tenant() {
        let store = storage();
        assert_eq!(store.dashboard_stats(ORG).unwrap(), DashboardStats::default());
    }
}
