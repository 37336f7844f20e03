use reportsync_core::db::open_report_db_in_memory;
use reportsync_core::{
    Decision, DecisionKey, LogNotifier, Meeting, MeetingType, OrganType, ReportDecision,
    ReportEntity, ReportEntityKey, ReportMeeting, ReportStore, ReportSubDecision,
    SqliteReportStore, StoreResult, SubDecision, SubDecisionBody, SubDecisionKey, SyncError,
    SyncService,
};
use rusqlite::params;

fn report_store() -> SqliteReportStore {
    SqliteReportStore::try_new(open_report_db_in_memory().unwrap()).unwrap()
}

fn seed_member(store: &SqliteReportStore, lidnr: u32, full_name: &str) {
    store
        .connection()
        .execute(
            "INSERT INTO members (lidnr, full_name) VALUES (?1, ?2);",
            params![lidnr, full_name],
        )
        .unwrap();
}

fn meeting(kind: MeetingType, number: i32, date: &str, decisions: Vec<Decision>) -> Meeting {
    Meeting {
        kind,
        number,
        date: date.parse().unwrap(),
        decisions,
    }
}

fn decision_key(kind: MeetingType, meeting_number: i32, point: i32, number: i32) -> DecisionKey {
    DecisionKey {
        meeting_type: kind,
        meeting_number,
        point,
        number,
    }
}

fn sub(decision: DecisionKey, number: i32, content: &str, body: SubDecisionBody) -> SubDecision {
    SubDecision {
        key: sub_key(decision, number),
        content: Some(content.to_string()),
        body,
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

/// Projects one meeting founding the Test Committee and installing
/// member 1001 as Chair, returning the (foundation, installation) keys.
fn project_founded_committee<S: ReportStore>(
    service: &mut SyncService<S, LogNotifier>,
    key: DecisionKey,
) -> (SubDecisionKey, SubDecisionKey) {
    let foundation = sub_key(key, 1);
    let installation = sub_key(key, 2);
    let source = meeting(
        key.meeting_type,
        key.meeting_number,
        "2024-09-01",
        vec![Decision {
            key,
            subdecisions: vec![
                sub(
                    key,
                    1,
                    "founded",
                    SubDecisionBody::Foundation {
                        name: "Test Committee".to_string(),
                        abbreviation: "TC".to_string(),
                        organ_type: OrganType::Committee,
                    },
                ),
                sub(
                    key,
                    2,
                    "installed",
                    SubDecisionBody::Installation {
                        foundation,
                        function: "Chair".to_string(),
                        member: 1001,
                    },
                ),
            ],
        }],
    );
    service.generate_meeting(&source).unwrap();
    service.store_mut().commit().unwrap();
    (foundation, installation)
}

/// Store wrapper that records the order of staged removals.
struct RecordingStore {
    inner: SqliteReportStore,
    removals: Vec<ReportEntityKey>,
}

impl ReportStore for RecordingStore {
    fn find_meeting(
        &self,
        key: &reportsync_core::MeetingKey,
    ) -> StoreResult<Option<ReportMeeting>> {
        self.inner.find_meeting(key)
    }

    fn find_decision(&self, key: &DecisionKey) -> StoreResult<Option<ReportDecision>> {
        self.inner.find_decision(key)
    }

    fn find_subdecision(&self, key: &SubDecisionKey) -> StoreResult<Option<ReportSubDecision>> {
        self.inner.find_subdecision(key)
    }

    fn find_decision_subdecisions(
        &self,
        key: &DecisionKey,
    ) -> StoreResult<Vec<ReportSubDecision>> {
        self.inner.find_decision_subdecisions(key)
    }

    fn find_member(&self, lidnr: u32) -> StoreResult<Option<reportsync_core::Member>> {
        self.inner.find_member(lidnr)
    }

    fn find_organ(&self, foundation: &SubDecisionKey) -> StoreResult<Option<reportsync_core::Organ>> {
        self.inner.find_organ(foundation)
    }

    fn find_organ_member(
        &self,
        installation: &SubDecisionKey,
    ) -> StoreResult<Option<reportsync_core::OrganMember>> {
        self.inner.find_organ_member(installation)
    }

    fn upsert(&mut self, entity: ReportEntity) -> StoreResult<()> {
        self.inner.upsert(entity)
    }

    fn remove(&mut self, key: ReportEntityKey) -> StoreResult<()> {
        self.removals.push(key);
        self.inner.remove(key)
    }

    fn staged_checkpoint(&self) -> usize {
        self.inner.staged_checkpoint()
    }

    fn rollback_staged(&mut self, checkpoint: usize) {
        self.inner.rollback_staged(checkpoint);
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.inner.commit()
    }

    fn clear_unit_of_work(&mut self) {
        self.inner.clear_unit_of_work();
    }
}

#[test]
fn cascade_removes_subdecisions_in_reverse_with_derived_records() {
    let store = RecordingStore {
        inner: report_store(),
        removals: Vec::new(),
    };
    let mut service = SyncService::new(store, LogNotifier);
    seed_member(&service.store().inner, 1001, "J. Tester");

    let d1 = decision_key(MeetingType::Av, 1, 1, 1);
    let (foundation, installation) = project_founded_committee(&mut service, d1);

    service.delete_decision(&d1).unwrap();
    service.store_mut().commit().unwrap();

    let store = service.store();
    assert!(store.find_decision(&d1).unwrap().is_none());
    assert!(store.find_subdecision(&foundation).unwrap().is_none());
    assert!(store.find_subdecision(&installation).unwrap().is_none());
    assert!(store.find_organ(&foundation).unwrap().is_none());
    assert!(store.find_organ_member(&installation).unwrap().is_none());

    // Installation (number 2) is dismantled before its foundation
    // (number 1), and each derived record before its sub-decision.
    assert_eq!(
        store.removals,
        vec![
            ReportEntityKey::OrganMember(installation),
            ReportEntityKey::SubDecision(installation),
            ReportEntityKey::Organ(foundation),
            ReportEntityKey::SubDecision(foundation),
            ReportEntityKey::Decision(d1),
        ]
    );
}

#[test]
fn discharge_cascade_restores_installation_state() {
    let mut service = SyncService::new(report_store(), LogNotifier);
    seed_member(service.store(), 1001, "J. Tester");

    let d1 = decision_key(MeetingType::Av, 1, 1, 1);
    let (_, installation) = project_founded_committee(&mut service, d1);

    let d2 = decision_key(MeetingType::Av, 2, 1, 1);
    let second = meeting(
        MeetingType::Av,
        2,
        "2025-09-01",
        vec![Decision {
            key: d2,
            subdecisions: vec![sub(
                d2,
                1,
                "discharged",
                SubDecisionBody::Discharge { installation },
            )],
        }],
    );
    service.generate_meeting(&second).unwrap();
    service.store_mut().commit().unwrap();

    // Simulate the discharge date an outer layer would have recorded.
    service
        .store()
        .connection()
        .execute(
            "UPDATE organ_members SET discharge_date = '2025-09-01';",
            [],
        )
        .unwrap();

    service.delete_decision(&d2).unwrap();
    service.store_mut().commit().unwrap();

    let store = service.store();
    assert!(store.find_decision(&d2).unwrap().is_none());
    assert!(store.find_subdecision(&sub_key(d2, 1)).unwrap().is_none());

    let installed = store.find_subdecision(&installation).unwrap().unwrap();
    assert!(installed.discharged_by.is_none());

    // The membership record survives with its discharge date cleared.
    let organ_member = store.find_organ_member(&installation).unwrap().unwrap();
    assert!(organ_member.discharge_date.is_none());
}

#[test]
fn destroy_decision_cannot_be_deleted() {
    let mut service = SyncService::new(report_store(), LogNotifier);

    let d1 = decision_key(MeetingType::Av, 1, 1, 1);
    let first = meeting(
        MeetingType::Av,
        1,
        "2024-09-01",
        vec![Decision {
            key: d1,
            subdecisions: vec![sub(d1, 1, "noted", SubDecisionBody::Other)],
        }],
    );
    service.generate_meeting(&first).unwrap();
    service.store_mut().commit().unwrap();

    let d2 = decision_key(MeetingType::Av, 2, 1, 1);
    let second = meeting(
        MeetingType::Av,
        2,
        "2025-09-01",
        vec![Decision {
            key: d2,
            subdecisions: vec![sub(
                d2,
                1,
                "annulled",
                SubDecisionBody::Destroy { target: d1 },
            )],
        }],
    );
    service.generate_meeting(&second).unwrap();
    service.store_mut().commit().unwrap();

    let err = service.delete_decision(&d2).unwrap_err();
    assert!(matches!(
        err,
        SyncError::UnsupportedDeletion(key) if key == sub_key(d2, 1)
    ));

    // Nothing was removed.
    service.store_mut().clear_unit_of_work();
    assert!(service.store().find_decision(&d2).unwrap().is_some());
    assert!(service
        .store()
        .find_subdecision(&sub_key(d2, 1))
        .unwrap()
        .is_some());
}

#[test]
fn deleting_unprojected_decision_errors() {
    let mut service = SyncService::new(report_store(), LogNotifier);

    let key = decision_key(MeetingType::Bv, 9, 1, 1);
    let err = service.delete_decision(&key).unwrap_err();
    assert!(matches!(err, SyncError::MissingDecision(found) if found == key));
}
