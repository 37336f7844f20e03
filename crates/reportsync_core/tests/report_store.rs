use reportsync_core::db::{open_report_db, open_report_db_in_memory};
use reportsync_core::{
    DecisionKey, MeetingKey, MeetingType, ReportDecision, ReportEntity, ReportEntityKey,
    ReportMeeting, ReportStore, ReportSubDecision, SqliteReportStore, StoreError, SubDecisionBody,
    SubDecisionKey,
};
use rusqlite::Connection;

fn report_store() -> SqliteReportStore {
    SqliteReportStore::try_new(open_report_db_in_memory().unwrap()).unwrap()
}

fn meeting(number: i32, date: &str) -> ReportMeeting {
    ReportMeeting {
        kind: MeetingType::Av,
        number,
        date: date.parse().unwrap(),
    }
}

fn decision_key(meeting_number: i32, point: i32, number: i32) -> DecisionKey {
    DecisionKey {
        meeting_type: MeetingType::Av,
        meeting_number,
        point,
        number,
    }
}

fn sub_key(decision: DecisionKey, number: i32) -> SubDecisionKey {
    SubDecisionKey {
        meeting_type: decision.meeting_type,
        meeting_number: decision.meeting_number,
        decision_point: decision.point,
        decision_number: decision.number,
        number,
    }
}

fn subdecision(key: SubDecisionKey, content: &str) -> ReportSubDecision {
    ReportSubDecision {
        key,
        content: content.to_string(),
        body: SubDecisionBody::Other,
        discharged_by: None,
    }
}

#[test]
fn staged_upsert_is_visible_before_commit() {
    let mut store = report_store();
    let projected = meeting(1, "2024-09-01");

    store
        .upsert(ReportEntity::Meeting(projected.clone()))
        .unwrap();

    assert_eq!(store.staged_len(), 1);
    let found = store.find_meeting(&projected.key()).unwrap().unwrap();
    assert_eq!(found, projected);

    // Nothing reached the database yet.
    let count: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM meetings;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);

    store.commit().unwrap();
    assert_eq!(store.staged_len(), 0);
    let count: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM meetings;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn latest_staged_upsert_wins() {
    let mut store = report_store();
    let key = MeetingKey {
        kind: MeetingType::Av,
        number: 1,
    };

    store
        .upsert(ReportEntity::Meeting(meeting(1, "2024-09-01")))
        .unwrap();
    store
        .upsert(ReportEntity::Meeting(meeting(1, "2024-09-08")))
        .unwrap();

    let found = store.find_meeting(&key).unwrap().unwrap();
    assert_eq!(found.date, "2024-09-08".parse().unwrap());

    store.commit().unwrap();
    let found = store.find_meeting(&key).unwrap().unwrap();
    assert_eq!(found.date, "2024-09-08".parse().unwrap());
}

#[test]
fn staged_removal_shadows_database_row() {
    let mut store = report_store();
    let projected = meeting(1, "2024-09-01");
    let key = projected.key();

    store.upsert(ReportEntity::Meeting(projected)).unwrap();
    store.commit().unwrap();
    assert!(store.find_meeting(&key).unwrap().is_some());

    store.remove(ReportEntityKey::Meeting(key)).unwrap();
    assert!(store.find_meeting(&key).unwrap().is_none());

    store.commit().unwrap();
    assert!(store.find_meeting(&key).unwrap().is_none());
}

#[test]
fn rollback_drops_changes_staged_after_checkpoint() {
    let mut store = report_store();
    store
        .upsert(ReportEntity::Meeting(meeting(1, "2024-09-01")))
        .unwrap();

    let checkpoint = store.staged_checkpoint();
    store
        .upsert(ReportEntity::Meeting(meeting(2, "2024-10-01")))
        .unwrap();
    store.rollback_staged(checkpoint);

    assert_eq!(store.staged_len(), 1);
    store.commit().unwrap();

    let kept = MeetingKey {
        kind: MeetingType::Av,
        number: 1,
    };
    let dropped = MeetingKey {
        kind: MeetingType::Av,
        number: 2,
    };
    assert!(store.find_meeting(&kept).unwrap().is_some());
    assert!(store.find_meeting(&dropped).unwrap().is_none());
}

#[test]
fn clear_unit_of_work_discards_staged_changes() {
    let mut store = report_store();
    store
        .upsert(ReportEntity::Meeting(meeting(1, "2024-09-01")))
        .unwrap();

    store.clear_unit_of_work();
    assert_eq!(store.staged_len(), 0);

    store.commit().unwrap();
    let count: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM meetings;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn commit_replays_parents_before_children() {
    let mut store = report_store();
    let d1 = decision_key(1, 1, 1);
    let s1 = sub_key(d1, 1);

    // Staged child-first; the commit replay must still satisfy the
    // containment foreign keys.
    store
        .upsert(ReportEntity::SubDecision(subdecision(s1, "noted")))
        .unwrap();
    store
        .upsert(ReportEntity::Decision(ReportDecision {
            key: d1,
            content: "noted".to_string(),
        }))
        .unwrap();
    store
        .upsert(ReportEntity::Meeting(meeting(1, "2024-09-01")))
        .unwrap();

    store.commit().unwrap();

    assert!(store.find_subdecision(&s1).unwrap().is_some());
    assert!(store.find_decision(&d1).unwrap().is_some());
}

#[test]
fn staged_subdecisions_merge_into_decision_listing() {
    let mut store = report_store();
    let d1 = decision_key(1, 1, 1);

    store
        .upsert(ReportEntity::Meeting(meeting(1, "2024-09-01")))
        .unwrap();
    store
        .upsert(ReportEntity::Decision(ReportDecision {
            key: d1,
            content: "two parts".to_string(),
        }))
        .unwrap();
    store
        .upsert(ReportEntity::SubDecision(subdecision(sub_key(d1, 1), "first")))
        .unwrap();
    store.commit().unwrap();

    // Second sub-decision staged only; the listing still sees both.
    store
        .upsert(ReportEntity::SubDecision(subdecision(sub_key(d1, 2), "second")))
        .unwrap();

    let listing = store.find_decision_subdecisions(&d1).unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].key.number, 1);
    assert_eq!(listing[1].key.number, 2);
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteReportStore::try_new(conn).unwrap_err();
    assert!(matches!(
        err,
        StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn committed_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.db");

    let mut store = SqliteReportStore::try_new(open_report_db(&path).unwrap()).unwrap();
    store
        .upsert(ReportEntity::Meeting(meeting(1, "2024-09-01")))
        .unwrap();
    store.commit().unwrap();
    drop(store);

    let store = SqliteReportStore::try_new(open_report_db(&path).unwrap()).unwrap();
    let key = MeetingKey {
        kind: MeetingType::Av,
        number: 1,
    };
    assert!(store.find_meeting(&key).unwrap().is_some());
}
