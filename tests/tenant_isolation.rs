mod common;

use common::{alice, bob, create_issue, create_project, test_log, tracker};
use issuehub::model::{
    CreateIssueInput, CreateProjectInput, IssueFilters, UpdateIssueInput, UpdateProjectInput,
};
use issuehub::{AuthContext, TrackerError};

#[test]
fn other_org_cannot_see_projects_or_issues() {
    let _log = test_log("other_org_cannot_see_projects_or_issues");
    let mut t = tracker();
    let project = create_project(&mut t, &alice(), "Secret");
    let issue = create_issue(&mut t, &alice(), &project.id, "Hidden bug");

    assert!(t.get_projects(&bob()).unwrap().is_empty());
    assert!(t.get_project_by_slug(&bob(), "secret").unwrap().is_none());
    assert!(t.get_issue_by_number(&bob(), "secret", 1).unwrap().is_none());

    let err = t
        .get_issues(&bob(), &project.id, IssueFilters::default())
        .unwrap_err();
    assert!(matches!(err, TrackerError::ProjectNotFound { .. }));

    let err = t.get_issue_activities(&bob(), &issue.id, 0).unwrap_err();
    assert!(matches!(err, TrackerError::IssueNotFound { .. }));

    let stats = t.get_dashboard_stats(&bob()).unwrap();
    assert_eq!(stats.total_issues, 0);
    assert_eq!(stats.project_count, 0);
}

#[test]
fn other_org_cannot_write() {
    let _log = test_log("other_org_cannot_write");
    let mut t = tracker();
    let project = create_project(&mut t, &alice(), "Secret");
    let issue = create_issue(&mut t, &alice(), &project.id, "Hidden bug");

    let err = t
        .create_issue(
            &bob(),
            &project.id,
            CreateIssueInput {
                title: "Injected".to_string(),
                ..CreateIssueInput::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::ProjectNotFound { .. }));

    let err = t
        .update_project(
            &bob(),
            &project.id,
            UpdateProjectInput {
                name: Some("Owned".to_string()),
                description: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::ProjectNotFound { .. }));

    let err = t
        .update_issue(
            &bob(),
            &issue.id,
            UpdateIssueInput {
                title: Some("Owned".to_string()),
                ..UpdateIssueInput::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TrackerError::IssueNotFound { .. }));

    assert!(matches!(
        t.delete_issue(&bob(), &issue.id),
        Err(TrackerError::IssueNotFound { .. })
    ));
    assert!(matches!(
        t.delete_project(&bob(), &project.id),
        Err(TrackerError::ProjectNotFound { .. })
    ));

    let details = t.get_issue_by_number(&alice(), "secret", 1).unwrap().unwrap();
    assert_eq!(details.issue.title, "Hidden bug");
    assert_eq!(details.activities.len(), 1);
    assert_eq!(t.get_projects(&alice()).unwrap()[0].project.name, "Secret");
}

#[test]
fn not_found_message_is_identical_for_absent_and_foreign() {
    let mut t = tracker();
    let project = create_project(&mut t, &alice(), "Secret");

    let foreign = t
        .get_issues(&bob(), &project.id, IssueFilters::default())
        .unwrap_err();
    let absent = t
        .get_issues(&bob(), "prj-doesnotexist", IssueFilters::default())
        .unwrap_err();
    assert_eq!(
        foreign.to_string().replace(&project.id, "<id>"),
        absent.to_string().replace("prj-doesnotexist", "<id>")
    );
}

#[test]
fn missing_identity_is_unauthorized_everywhere() {
    let _log = test_log("missing_identity_is_unauthorized_everywhere");
    let mut t = tracker();
    let project = create_project(&mut t, &alice(), "Alpha");
    let issue = create_issue(&mut t, &alice(), &project.id, "Exists");

    let identities = [
        AuthContext::anonymous(),
        AuthContext {
            user_id: Some("alice".to_string()),
            org_id: None,
        },
        AuthContext {
            user_id: None,
            org_id: Some("acme".to_string()),
        },
        AuthContext::new("  ", "acme"),
    ];

    for auth in &identities {
        let unauthorized = |r: Result<(), TrackerError>| {
            assert!(matches!(r, Err(TrackerError::Unauthorized)), "{auth:?}: {r:?}");
        };
        unauthorized(
            t.create_project(
                auth,
                CreateProjectInput {
                    name: "Nope".to_string(),
                    description: None,
                },
            )
            .map(drop),
        );
        unauthorized(t.get_projects(auth).map(drop));
        unauthorized(t.get_project_by_slug(auth, "alpha").map(drop));
        unauthorized(
            t.update_project(auth, &project.id, UpdateProjectInput::default())
                .map(drop),
        );
        unauthorized(
            t.create_issue(
                auth,
                &project.id,
                CreateIssueInput {
                    title: "Nope".to_string(),
                    ..CreateIssueInput::default()
                },
            )
            .map(drop),
        );
        unauthorized(t.get_issues(auth, &project.id, IssueFilters::default()).map(drop));
        unauthorized(t.get_issue_by_number(auth, "alpha", 1).map(drop));
        unauthorized(t.get_issue_activities(auth, &issue.id, 0).map(drop));
        unauthorized(
            t.update_issue(auth, &issue.id, UpdateIssueInput::default())
                .map(drop),
        );
        unauthorized(t.delete_issue(auth, &issue.id).map(drop));
        unauthorized(t.delete_project(auth, &project.id).map(drop));
        unauthorized(t.get_dashboard_stats(auth).map(drop));
    }

    assert_eq!(t.get_projects(&alice()).unwrap().len(), 1);
}
