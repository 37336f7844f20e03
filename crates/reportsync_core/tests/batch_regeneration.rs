use reportsync_core::db::{open_report_db_in_memory, open_source_db_in_memory};
use reportsync_core::{
    DecisionKey, LogNotifier, MeetingType, ProgressReporter, ReportStore, SqliteReportStore,
    SqliteSourceRepository, SubDecisionKey, SyncService,
};
use rusqlite::{params, Connection};

struct CountingProgress {
    calls: Vec<(usize, usize)>,
}

impl ProgressReporter for CountingProgress {
    fn on_progress(&mut self, processed: usize, total: usize) {
        self.calls.push((processed, total));
    }
}

/// Seeds a two-meeting source corpus: AV 1 founds a committee, installs
/// member 1001 and approves a budget; AV 2 discharges that installation.
fn seeded_source() -> Connection {
    let conn = open_source_db_in_memory().unwrap();

    conn.execute_batch(
        "INSERT INTO meetings (type, number, date) VALUES ('AV', 1, '2024-09-01');
         INSERT INTO meetings (type, number, date) VALUES ('AV', 2, '2025-09-01');
         INSERT INTO decisions (meeting_type, meeting_number, point, number)
             VALUES ('AV', 1, 1, 1);
         INSERT INTO decisions (meeting_type, meeting_number, point, number)
             VALUES ('AV', 1, 2, 1);
         INSERT INTO decisions (meeting_type, meeting_number, point, number)
             VALUES ('AV', 2, 1, 1);",
    )
    .unwrap();

    conn.execute(
        "INSERT INTO subdecisions (meeting_type, meeting_number, decision_point, \
         decision_number, number, kind, content, name, abbreviation, organ_type)
         VALUES ('AV', 1, 1, 1, 1, 'foundation', ?1, 'Test Committee', 'TC', 'committee');",
        params!["The Test Committee is founded."],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO subdecisions (meeting_type, meeting_number, decision_point, \
         decision_number, number, kind, content, function, lidnr, \
         ref_meeting_type, ref_meeting_number, ref_decision_point, ref_decision_number, ref_number)
         VALUES ('AV', 1, 1, 1, 2, 'installation', ?1, 'Chair', 1001, 'AV', 1, 1, 1, 1);",
        params!["J. Tester is installed as Chair."],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO subdecisions (meeting_type, meeting_number, decision_point, \
         decision_number, number, kind, content, name, version, date, approval, changes)
         VALUES ('AV', 1, 2, 1, 1, 'budget', ?1, 'Budget 2025', '1.0', '2024-08-20', 1, 0);",
        params!["The budget is approved."],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO subdecisions (meeting_type, meeting_number, decision_point, \
         decision_number, number, kind, content, \
         ref_meeting_type, ref_meeting_number, ref_decision_point, ref_decision_number, ref_number)
         VALUES ('AV', 2, 1, 1, 1, 'discharge', ?1, 'AV', 1, 1, 1, 2);",
        params!["J. Tester is discharged."],
    )
    .unwrap();

    conn
}

fn report_store_with_member() -> SqliteReportStore {
    let store = SqliteReportStore::try_new(open_report_db_in_memory().unwrap()).unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO members (lidnr, full_name) VALUES (1001, 'J. Tester');",
            [],
        )
        .unwrap();
    store
}

/// Flattens the report store into comparable per-table row dumps.
fn snapshot(store: &SqliteReportStore) -> Vec<String> {
    let conn = store.connection();
    let mut rows = Vec::new();
    for table in ["meetings", "decisions", "subdecisions", "organs", "organ_members"] {
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {table};"))
            .unwrap();
        let column_count = stmt.column_count();
        let mut query = stmt.query([]).unwrap();
        while let Some(row) = query.next().unwrap() {
            let mut cells = Vec::with_capacity(column_count);
            for index in 0..column_count {
                cells.push(format!("{:?}", row.get_ref(index).unwrap()));
            }
            rows.push(format!("{table}: {}", cells.join(", ")));
        }
    }
    rows.sort();
    rows
}

#[test]
fn generate_projects_corpus_and_reports_progress() {
    let source_conn = seeded_source();
    let source = SqliteSourceRepository::try_new(&source_conn).unwrap();
    let mut service = SyncService::new(report_store_with_member(), LogNotifier);
    let mut progress = CountingProgress { calls: Vec::new() };

    service.generate(&source, &mut progress).unwrap();

    assert_eq!(progress.calls, vec![(1, 2), (2, 2)]);
    assert_eq!(service.store().staged_len(), 0);

    let store = service.store();
    let budget_decision = DecisionKey {
        meeting_type: MeetingType::Av,
        meeting_number: 1,
        point: 2,
        number: 1,
    };
    assert_eq!(
        store.find_decision(&budget_decision).unwrap().unwrap().content,
        "The budget is approved."
    );

    // The cross-meeting discharge resolved against the freshly
    // projected installation.
    let installation = SubDecisionKey {
        meeting_type: MeetingType::Av,
        meeting_number: 1,
        decision_point: 1,
        decision_number: 1,
        number: 2,
    };
    let discharge = SubDecisionKey {
        meeting_type: MeetingType::Av,
        meeting_number: 2,
        decision_point: 1,
        decision_number: 1,
        number: 1,
    };
    let installed = store.find_subdecision(&installation).unwrap().unwrap();
    assert_eq!(installed.discharged_by, Some(discharge));
    assert!(store.find_organ_member(&installation).unwrap().is_some());
}

#[test]
fn regeneration_is_idempotent() {
    let source_conn = seeded_source();
    let source = SqliteSourceRepository::try_new(&source_conn).unwrap();
    let mut service = SyncService::new(report_store_with_member(), LogNotifier);

    service
        .generate(&source, &mut CountingProgress { calls: Vec::new() })
        .unwrap();
    let first = snapshot(service.store());

    service
        .generate(&source, &mut CountingProgress { calls: Vec::new() })
        .unwrap();
    let second = snapshot(service.store());

    assert_eq!(first, second);

    // No duplicate rows for the four projected sub-decisions.
    let subdecision_count: i64 = service
        .store()
        .connection()
        .query_row("SELECT COUNT(*) FROM subdecisions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(subdecision_count, 4);
}
