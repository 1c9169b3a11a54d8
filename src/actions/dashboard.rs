use tracing::debug;

use super::Tracker;
use crate::auth::AuthContext;
use crate::error::Result;
use crate::model::DashboardStats;
use crate::revalidate::Revalidate;

impl<R: Revalidate> Tracker<R> {
    /// Issue counts by status across the caller's organization, plus the
    /// five most recently created issues. A tenant without projects gets
    /// all zeros.
    ///
    /// # Errors
    ///
    /// `Unauthorized` or a database error.
    pub fn get_dashboard_stats(&self, auth: &AuthContext) -> Result<DashboardStats> {
        let caller = auth.require()?;
        let stats = self.storage.dashboard_stats(&caller.org_id)?;
        debug!(
            org_id = %caller.org_id,
            projects = stats.project_count,
            issues = stats.total_issues,
            "dashboard computed"
        );
        Ok(stats)
    }
}
