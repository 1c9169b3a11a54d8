//! Activity log storage.
//!
//! Activities are inserted inside the transaction of the mutation that caused
//! them and read back newest first.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, params, types::Type};

use crate::error::Result;
use crate::model::{Activity, ActivityMetadata, ActivityType, NewActivity};
use crate::util::to_db_timestamp;

/// Detail views show this many activities.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 20;

/// Insert one activity. Returns the store-assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails or the metadata cannot be encoded.
pub fn insert_activity(
    tx: &Transaction<'_>,
    issue_id: &str,
    user_id: &str,
    activity: &NewActivity,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let metadata = if activity.metadata.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&activity.metadata)?)
    };

    tx.execute(
        r"
        INSERT INTO activities (issue_id, type, user_id, metadata, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
        params![
            issue_id,
            activity.activity_type.as_str(),
            user_id,
            metadata,
            to_db_timestamp(created_at),
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

/// Activities for one issue, newest first. `limit == 0` means no limit.
///
/// The caller is responsible for tenant scoping of `issue_id`.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_activities(conn: &Connection, issue_id: &str, limit: usize) -> Result<Vec<Activity>> {
    let limit = if limit == 0 {
        -1
    } else {
        i64::try_from(limit).unwrap_or(i64::MAX)
    };

    let mut stmt = conn.prepare(
        r"
        SELECT id, issue_id, type, user_id, metadata, created_at
        FROM activities
        WHERE issue_id = ?1
        ORDER BY created_at DESC, id DESC
        LIMIT ?2
        ",
    )?;

    let activities = stmt
        .query_map(params![issue_id, limit], activity_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(activities)
}

fn activity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Activity> {
    let type_text: String = row.get(2)?;
    let activity_type = ActivityType::from_db(&type_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown activity type '{type_text}'").into(),
        )
    })?;

    let metadata = match row.get::<_, Option<String>>(4)? {
        Some(text) if !text.is_empty() => serde_json::from_str::<ActivityMetadata>(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        _ => ActivityMetadata::new(),
    };

    Ok(Activity {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        activity_type,
        user_id: row.get(3)?,
        metadata,
        created_at: super::sqlite::timestamp_column(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO projects (id, org_id, name, slug, created_at, updated_at)
               VALUES ('p1', 'o', 'n', 's', 't', 't');
             INSERT INTO issues (id, project_id, number, title, creator_id, created_at, updated_at)
               VALUES ('i1', 'p1', 1, 'title', 'u', 't', 't');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn insert_and_read_back_newest_first() {
        let mut conn = setup();
        let t0 = Utc::now();
        let tx = conn.transaction().unwrap();
        insert_activity(&tx, "i1", "u", &NewActivity::new(ActivityType::IssueCreated), t0)
            .unwrap();
        insert_activity(
            &tx,
            "i1",
            "u",
            &NewActivity::change(ActivityType::StatusChanged, Some("OPEN"), Some("DONE")),
            t0,
        )
        .unwrap();
        tx.commit().unwrap();

        let activities = get_activities(&conn, "i1", 20).unwrap();
        assert_eq!(activities.len(), 2);
        // Same timestamp: id breaks the tie.
        assert_eq!(activities[0].activity_type, ActivityType::StatusChanged);
        assert_eq!(activities[0].metadata["to"], "DONE");
        assert_eq!(activities[1].activity_type, ActivityType::IssueCreated);
        assert!(activities[1].metadata.is_empty());
    }

    #[test]
    fn limit_is_applied() {
        let mut conn = setup();
        let tx = conn.transaction().unwrap();
        for _ in 0..5 {
            insert_activity(
                &tx,
                "i1",
                "u",
                &NewActivity::new(ActivityType::CommentAdded),
                Utc::now(),
            )
            .unwrap();
        }
        tx.commit().unwrap();

        assert_eq!(get_activities(&conn, "i1", 3).unwrap().len(), 3);
        assert_eq!(get_activities(&conn, "i1", 0).unwrap().len(), 5);
    }
}
