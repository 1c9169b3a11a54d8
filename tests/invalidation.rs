mod common;

use common::{alice, bob, create_issue, create_project, recording_tracker, test_log};
use issuehub::model::{CreateProjectInput, UpdateIssueInput, UpdateProjectInput};
use issuehub::revalidate::Invalidation;

#[test]
fn writes_emit_their_paths() {
    let _log = test_log("writes_emit_their_paths");
    let mut t = recording_tracker();

    let project = create_project(&mut t, &alice(), "Web App");
    assert_eq!(t.revalidator().take(), vec![Invalidation::ProjectList]);

    let issue = create_issue(&mut t, &alice(), &project.id, "Broken link");
    assert_eq!(
        t.revalidator().take(),
        vec![Invalidation::IssueList {
            slug: "web-app".to_string()
        }]
    );

    t.update_issue(
        &alice(),
        &issue.id,
        UpdateIssueInput {
            title: Some("Broken footer link".to_string()),
            ..UpdateIssueInput::default()
        },
    )
    .unwrap();
    let paths: Vec<String> = t.revalidator().take().iter().map(Invalidation::path).collect();
    assert_eq!(
        paths,
        vec!["/projects/web-app/issues", "/projects/web-app/issues/1"]
    );

    t.delete_issue(&alice(), &issue.id).unwrap();
    assert_eq!(t.revalidator().take().len(), 2);

    t.update_project(&alice(), &project.id, UpdateProjectInput::default())
        .unwrap();
    let paths: Vec<String> = t.revalidator().take().iter().map(Invalidation::path).collect();
    assert_eq!(paths, vec!["/projects", "/projects/web-app"]);

    t.delete_project(&alice(), &project.id).unwrap();
    assert_eq!(
        t.revalidator().take(),
        vec![
            Invalidation::ProjectList,
            Invalidation::Project {
                slug: "web-app".to_string()
            }
        ]
    );
}

#[test]
fn failed_writes_and_reads_emit_nothing() {
    let _log = test_log("failed_writes_and_reads_emit_nothing");
    let mut t = recording_tracker();
    let project = create_project(&mut t, &alice(), "Web App");
    t.revalidator().take();

    assert!(
        t.create_project(
            &alice(),
            CreateProjectInput {
                name: "x".to_string(),
                description: None,
            },
        )
        .is_err()
    );
    assert!(t.delete_project(&bob(), &project.id).is_err());
    assert!(t.update_issue(&alice(), "iss-missing", UpdateIssueInput::default()).is_err());

    t.get_projects(&alice()).unwrap();
    t.get_dashboard_stats(&alice()).unwrap();

    assert!(t.revalidator().recorded().is_empty());
}
