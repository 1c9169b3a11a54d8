mod common;

use common::{alice, create_project, init_test_logging};
use issuehub::Tracker;
use issuehub::model::CreateIssueInput;
use issuehub::storage::SqliteStorage;
use std::collections::BTreeSet;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 4;
const PER_THREAD: usize = 10;

#[test]
fn concurrent_creates_get_distinct_sequential_numbers() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("issuehub.db");

    let project = {
        let mut t = Tracker::new(SqliteStorage::open(&db_path).unwrap());
        create_project(&mut t, &alice(), "Shared")
    };

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let db_path = db_path.clone();
            let project_id = project.id.clone();
            thread::spawn(move || {
                let mut t = Tracker::new(SqliteStorage::open(&db_path).unwrap());
                (0..PER_THREAD)
                    .map(|n| {
                        t.create_issue(
                            &alice(),
                            &project_id,
                            CreateIssueInput {
                                title: format!("Worker {worker} issue {n}"),
                                ..CreateIssueInput::default()
                            },
                        )
                        .unwrap()
                        .number
                    })
                    .collect::<Vec<i64>>()
            })
        })
        .collect();

    let mut numbers = BTreeSet::new();
    for handle in handles {
        for number in handle.join().unwrap() {
            assert!(numbers.insert(number), "number {number} assigned twice");
        }
    }

    let total = i64::try_from(THREADS * PER_THREAD).unwrap();
    assert_eq!(numbers, (1..=total).collect::<BTreeSet<_>>());
}

#[test]
fn numbering_survives_reopen() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("issuehub.db");

    let (project, last_id) = {
        let mut t = Tracker::new(SqliteStorage::open(&db_path).unwrap());
        let p = create_project(&mut t, &alice(), "Durable");
        let issue = common::create_issue(&mut t, &alice(), &p.id, "First");
        common::create_issue(&mut t, &alice(), &p.id, "Second");
        let second = t.get_issue_by_number(&alice(), "durable", 2).unwrap().unwrap();
        assert_eq!(issue.number, 1);
        (p, second.issue.id)
    };

    let mut t = Tracker::new(SqliteStorage::open(&db_path).unwrap());
    t.delete_issue(&alice(), &last_id).unwrap();
    let next = common::create_issue(&mut t, &alice(), &project.id, "Third");
    assert_eq!(next.number, 3);
}
