use tracing::{debug, info};

use super::{Tracker, retry_on_conflict};
use crate::auth::AuthContext;
use crate::error::{Result, TrackerError};
use crate::model::input::non_empty;
use crate::model::{
    Activity, CreateIssueInput, DeleteOutcome, Issue, IssueDetails, IssueFilters, IssueUpdate,
    UpdateIssueInput,
};
use crate::revalidate::{Invalidation, Revalidate};
use crate::storage::{DEFAULT_ACTIVITY_LIMIT, NewIssue};
use crate::validation::IssueValidator;

impl<R: Revalidate> Tracker<R> {
    /// Create an issue with the next number of the project.
    ///
    /// Empty description or assignee strings are stored as absent.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation`, `ProjectNotFound`, `Conflict` after
    /// retries, or a database error.
    pub fn create_issue(
        &mut self,
        auth: &AuthContext,
        project_id: &str,
        input: CreateIssueInput,
    ) -> Result<Issue> {
        let caller = auth.require()?;
        IssueValidator::validate_create(&input).map_err(TrackerError::from_validation_errors)?;

        let new = NewIssue {
            description: non_empty(input.description.as_deref()),
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            assignee_id: non_empty(input.assignee_id.as_deref()),
            title: input.title,
        };

        let scoped = retry_on_conflict("create_issue", || {
            self.storage
                .create_issue(&caller.org_id, project_id, &new, &caller.user_id)
        })?;

        info!(
            issue_id = %scoped.issue.id,
            slug = %scoped.project_slug,
            number = scoped.issue.number,
            "issue created"
        );
        self.emit(&[Invalidation::IssueList {
            slug: scoped.project_slug,
        }]);
        Ok(scoped.issue)
    }

    /// Issues of one project, newest first, optionally filtered.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `ProjectNotFound` (also for another tenant's project),
    /// or a database error.
    pub fn get_issues(
        &self,
        auth: &AuthContext,
        project_id: &str,
        filters: IssueFilters,
    ) -> Result<Vec<Issue>> {
        let caller = auth.require()?;
        let issues = self
            .storage
            .list_issues(&caller.org_id, project_id, &filters)?;
        debug!(project_id, count = issues.len(), "issues listed");
        Ok(issues)
    }

    /// Issue by project slug and number, with its most recent activities.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or a database error.
    pub fn get_issue_by_number(
        &self,
        auth: &AuthContext,
        slug: &str,
        number: i64,
    ) -> Result<Option<IssueDetails>> {
        let caller = auth.require()?;
        self.storage
            .get_issue_details(&caller.org_id, slug, number, DEFAULT_ACTIVITY_LIMIT)
    }

    /// Activity log of an issue, newest first. `limit == 0` returns everything.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `IssueNotFound`, or a database error.
    pub fn get_issue_activities(
        &self,
        auth: &AuthContext,
        issue_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>> {
        let caller = auth.require()?;
        self.storage
            .get_issue_activities(&caller.org_id, issue_id, limit)
    }

    /// Apply a partial update, logging status, priority and assignee changes.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation`, `IssueNotFound`, or a database error.
    pub fn update_issue(
        &mut self,
        auth: &AuthContext,
        id: &str,
        input: UpdateIssueInput,
    ) -> Result<Issue> {
        let caller = auth.require()?;
        IssueValidator::validate_update(&input).map_err(TrackerError::from_validation_errors)?;

        let update = IssueUpdate::from(input);
        let scoped = self
            .storage
            .update_issue(&caller.org_id, id, &update, &caller.user_id)?;

        info!(
            issue_id = %scoped.issue.id,
            slug = %scoped.project_slug,
            number = scoped.issue.number,
            status = %scoped.issue.status,
            "issue updated"
        );
        self.emit(&[
            Invalidation::IssueList {
                slug: scoped.project_slug.clone(),
            },
            Invalidation::Issue {
                slug: scoped.project_slug,
                number: scoped.issue.number,
            },
        ]);
        Ok(scoped.issue)
    }

    /// Delete an issue and its activities. The number stays retired.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `IssueNotFound`, or a database error.
    pub fn delete_issue(&mut self, auth: &AuthContext, id: &str) -> Result<DeleteOutcome> {
        let caller = auth.require()?;
        let scoped = self
            .storage
            .delete_issue(&caller.org_id, id, &caller.user_id)?;

        info!(
            issue_id = %scoped.issue.id,
            slug = %scoped.project_slug,
            number = scoped.issue.number,
            "issue deleted"
        );
        self.emit(&[
            Invalidation::IssueList {
                slug: scoped.project_slug.clone(),
            },
            Invalidation::Issue {
                slug: scoped.project_slug,
                number: scoped.issue.number,
            },
        ]);
        Ok(DeleteOutcome { success: true })
    }
}
