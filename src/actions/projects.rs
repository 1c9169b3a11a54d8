use tracing::{debug, info};

use super::{Tracker, retry_on_conflict};
use crate::auth::AuthContext;
use crate::error::{Result, TrackerError};
use crate::model::{
    CreateProjectInput, DeleteOutcome, Project, ProjectUpdate, ProjectWithCount, UpdateProjectInput,
};
use crate::model::input::non_empty;
use crate::revalidate::{Invalidation, Revalidate};
use crate::validation::ProjectValidator;

impl<R: Revalidate> Tracker<R> {
    /// Create a project in the caller's organization.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation`, `Conflict` after retries, or a database error.
    pub fn create_project(
        &mut self,
        auth: &AuthContext,
        input: CreateProjectInput,
    ) -> Result<Project> {
        let caller = auth.require()?;
        ProjectValidator::validate_create(&input).map_err(TrackerError::from_validation_errors)?;

        let description = non_empty(input.description.as_deref());
        let project = retry_on_conflict("create_project", || {
            self.storage.create_project(
                &caller.org_id,
                &input.name,
                description.as_deref(),
                &caller.user_id,
            )
        })?;

        info!(project_id = %project.id, slug = %project.slug, org_id = %caller.org_id, "project created");
        self.emit(&[Invalidation::ProjectList]);
        Ok(project)
    }

    /// Projects of the caller's organization, newest first.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or a database error.
    pub fn get_projects(&self, auth: &AuthContext) -> Result<Vec<ProjectWithCount>> {
        let caller = auth.require()?;
        let projects = self.storage.list_projects(&caller.org_id)?;
        debug!(count = projects.len(), "projects listed");
        Ok(projects)
    }

    /// # Errors
    ///
    /// `Unauthorized` or a database error.
    pub fn get_project_by_slug(
        &self,
        auth: &AuthContext,
        slug: &str,
    ) -> Result<Option<ProjectWithCount>> {
        let caller = auth.require()?;
        self.storage.get_project_by_slug(&caller.org_id, slug)
    }

    /// Slugs of the caller's projects, for "did you mean" hints.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or a database error.
    pub fn project_slugs(&self, auth: &AuthContext) -> Result<Vec<String>> {
        let caller = auth.require()?;
        self.storage.project_slugs(&caller.org_id)
    }

    /// Rename a project or change its description. An empty description clears it.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `Validation`, `ProjectNotFound`, or a database error.
    pub fn update_project(
        &mut self,
        auth: &AuthContext,
        id: &str,
        input: UpdateProjectInput,
    ) -> Result<Project> {
        let caller = auth.require()?;
        ProjectValidator::validate_update(&input).map_err(TrackerError::from_validation_errors)?;

        let update = ProjectUpdate::from(input);
        let project = self
            .storage
            .update_project(&caller.org_id, id, &update, &caller.user_id)?;

        info!(project_id = %project.id, slug = %project.slug, "project updated");
        self.emit(&[
            Invalidation::ProjectList,
            Invalidation::Project {
                slug: project.slug.clone(),
            },
        ]);
        Ok(project)
    }

    /// Delete a project with all of its issues and their activities.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `ProjectNotFound`, or a database error.
    pub fn delete_project(&mut self, auth: &AuthContext, id: &str) -> Result<DeleteOutcome> {
        let caller = auth.require()?;
        let project = self
            .storage
            .delete_project(&caller.org_id, id, &caller.user_id)?;

        info!(project_id = %project.id, slug = %project.slug, "project deleted");
        self.emit(&[
            Invalidation::ProjectList,
            Invalidation::Project { slug: project.slug },
        ]);
        Ok(DeleteOutcome { success: true })
    }
}
