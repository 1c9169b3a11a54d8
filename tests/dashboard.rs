mod common;

use common::{alice, bob, create_issue, create_project, test_log, tracker};
use issuehub::model::{DashboardStats, Status, UpdateIssueInput};

#[test]
fn empty_tenant_gets_zeros() {
    let _log = test_log("empty_tenant_gets_zeros");
    let t = tracker();
    let stats = t.get_dashboard_stats(&alice()).unwrap();
    assert_eq!(stats, DashboardStats::default());
    assert!(stats.recent_issues.is_empty());
}

#[test]
fn project_without_issues_counts_project_only() {
    let mut t = tracker();
    create_project(&mut t, &alice(), "Empty");
    let stats = t.get_dashboard_stats(&alice()).unwrap();
    assert_eq!(stats.project_count, 1);
    assert_eq!(stats.total_issues, 0);
    assert!(stats.recent_issues.is_empty());
}

#[test]
fn counts_by_status_across_projects() {
    let _log = test_log("counts_by_status_across_projects");
    let mut t = tracker();
    let a = create_project(&mut t, &alice(), "Alpha");
    let b = create_project(&mut t, &alice(), "Beta");

    let mut ids = Vec::new();
    for n in 0..4 {
        ids.push(create_issue(&mut t, &alice(), &a.id, &format!("Alpha {n}")).id);
    }
    for n in 0..3 {
        ids.push(create_issue(&mut t, &alice(), &b.id, &format!("Beta {n}")).id);
    }
    for (id, status) in ids
        .iter()
        .zip([Status::InProgress, Status::InProgress, Status::Done, Status::Closed])
    {
        t.update_issue(
            &alice(),
            id,
            UpdateIssueInput {
                status: Some(status),
                ..UpdateIssueInput::default()
            },
        )
        .unwrap();
    }

    let other = create_project(&mut t, &bob(), "Elsewhere");
    create_issue(&mut t, &bob(), &other.id, "Not counted");

    let stats = t.get_dashboard_stats(&alice()).unwrap();
    assert_eq!(stats.project_count, 2);
    assert_eq!(stats.total_issues, 7);
    assert_eq!(stats.open_issues, 3);
    assert_eq!(stats.in_progress_issues, 2);
    assert_eq!(stats.done_issues, 1);
    assert_eq!(stats.closed_issues, 1);
    assert_eq!(
        stats.open_issues + stats.in_progress_issues + stats.done_issues + stats.closed_issues,
        stats.total_issues
    );
}

#[test]
fn recent_issues_are_newest_five() {
    let mut t = tracker();
    let a = create_project(&mut t, &alice(), "Alpha");
    for n in 1..=7 {
        create_issue(&mut t, &alice(), &a.id, &format!("Issue {n}"));
    }

    let stats = t.get_dashboard_stats(&alice()).unwrap();
    let numbers: Vec<i64> = stats.recent_issues.iter().map(|r| r.issue.number).collect();
    assert_eq!(numbers, vec![7, 6, 5, 4, 3]);
    assert!(stats.recent_issues.iter().all(|r| r.project_slug == "alpha"));
    assert!(stats.recent_issues.iter().all(|r| r.project_name == "Alpha"));
}
