//! Report store: staged-changes accumulator over the report schema.
//!
//! # Responsibility
//! - Provide keyed lookups over report entities, including entities
//!   staged in the current unit of work.
//! - Stage upserts and removals, flushing them transactionally on
//!   `commit()`.
//!
//! # Invariants
//! - `upsert`/`remove` never touch the database; only `commit()` writes.
//! - Lookups see the staged overlay first: the latest staged upsert for a
//!   key wins, a staged removal shadows a database row.
//! - Commit replays upserts in containment order (meetings, decisions,
//!   sub-decisions, organs, organ members) and removals in reverse, in a
//!   single transaction; within one entity kind, staged order is kept.
//! - A key is never staged for removal and re-staged for upsert inside
//!   the same unit of work.

use crate::db::migrations::{latest_version, Store};
use crate::db::DbError;
use crate::model::decision::DecisionKey;
use crate::model::meeting::MeetingKey;
use crate::model::member::{Lidnr, Member};
use crate::model::organ::{Organ, OrganMember};
use crate::model::report::{
    ReportDecision, ReportEntity, ReportEntityKey, ReportMeeting, ReportSubDecision,
};
use crate::model::subdecision::SubDecisionKey;
use crate::repo::columns::{
    body_from_row, kind_tag, organ_type_to_db, parse_meeting_type, parse_organ_type, BodyColumns,
    RowDecodeError, SUBDECISION_BODY_COLUMNS,
};
use chrono::NaiveDate;
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by report store operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "report store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid report data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RowDecodeError> for StoreError {
    fn from(value: RowDecodeError) -> Self {
        match value {
            RowDecodeError::Sqlite(err) => Self::Db(DbError::Sqlite(err)),
            RowDecodeError::Invalid(message) => Self::InvalidData(message),
        }
    }
}

/// Target repository contract for the projection engine.
pub trait ReportStore {
    fn find_meeting(&self, key: &MeetingKey) -> StoreResult<Option<ReportMeeting>>;
    fn find_decision(&self, key: &DecisionKey) -> StoreResult<Option<ReportDecision>>;
    fn find_subdecision(&self, key: &SubDecisionKey) -> StoreResult<Option<ReportSubDecision>>;
    /// Sub-decisions of one decision, in `number` order.
    fn find_decision_subdecisions(
        &self,
        key: &DecisionKey,
    ) -> StoreResult<Vec<ReportSubDecision>>;
    fn find_member(&self, lidnr: Lidnr) -> StoreResult<Option<Member>>;
    /// Organ derived from the given founding sub-decision.
    fn find_organ(&self, foundation: &SubDecisionKey) -> StoreResult<Option<Organ>>;
    /// Organ membership derived from the given installing sub-decision.
    fn find_organ_member(&self, installation: &SubDecisionKey)
        -> StoreResult<Option<OrganMember>>;
    /// Stages an upsert; nothing is written until `commit()`.
    fn upsert(&mut self, entity: ReportEntity) -> StoreResult<()>;
    /// Stages a removal; nothing is written until `commit()`.
    fn remove(&mut self, key: ReportEntityKey) -> StoreResult<()>;
    /// Opaque marker for the current staged position, for `rollback_staged`.
    fn staged_checkpoint(&self) -> usize;
    /// Drops everything staged after the checkpoint, keeping what came
    /// before it.
    fn rollback_staged(&mut self, checkpoint: usize);
    /// Flushes all staged changes in one transaction and clears them.
    fn commit(&mut self) -> StoreResult<()>;
    /// Discards staged-but-uncommitted changes.
    fn clear_unit_of_work(&mut self);
}

#[derive(Debug, Clone)]
enum StagedChange {
    Upsert(ReportEntity),
    Remove(ReportEntityKey),
}

/// SQLite-backed report store.
#[derive(Debug)]
pub struct SqliteReportStore {
    conn: Connection,
    staged: Vec<StagedChange>,
}

impl SqliteReportStore {
    /// Wraps a migrated report connection, rejecting unmigrated ones.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        let expected_version = latest_version(Store::Report);
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        Ok(Self {
            conn,
            staged: Vec::new(),
        })
    }

    /// Read access to the underlying connection, for callers that need to
    /// maintain externally-owned tables such as `members`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of staged-but-uncommitted changes.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }
}

impl ReportStore for SqliteReportStore {
    fn find_meeting(&self, key: &MeetingKey) -> StoreResult<Option<ReportMeeting>> {
        for change in self.staged.iter().rev() {
            match change {
                StagedChange::Upsert(ReportEntity::Meeting(meeting)) if meeting.key() == *key => {
                    return Ok(Some(meeting.clone()));
                }
                StagedChange::Remove(ReportEntityKey::Meeting(staged)) if staged == key => {
                    return Ok(None);
                }
                _ => {}
            }
        }

        let date = self
            .conn
            .query_row(
                "SELECT date FROM meetings WHERE type = ?1 AND number = ?2;",
                params![key.kind.as_str(), key.number],
                |row| row.get::<_, NaiveDate>(0),
            )
            .optional()?;

        Ok(date.map(|date| ReportMeeting {
            kind: key.kind,
            number: key.number,
            date,
        }))
    }

    fn find_decision(&self, key: &DecisionKey) -> StoreResult<Option<ReportDecision>> {
        for change in self.staged.iter().rev() {
            match change {
                StagedChange::Upsert(ReportEntity::Decision(decision)) if decision.key == *key => {
                    return Ok(Some(decision.clone()));
                }
                StagedChange::Remove(ReportEntityKey::Decision(staged)) if staged == key => {
                    return Ok(None);
                }
                _ => {}
            }
        }

        let content = self
            .conn
            .query_row(
                "SELECT content FROM decisions
                 WHERE meeting_type = ?1 AND meeting_number = ?2 AND point = ?3 AND number = ?4;",
                params![
                    key.meeting_type.as_str(),
                    key.meeting_number,
                    key.point,
                    key.number
                ],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(content.map(|content| ReportDecision { key: *key, content }))
    }

    fn find_subdecision(&self, key: &SubDecisionKey) -> StoreResult<Option<ReportSubDecision>> {
        for change in self.staged.iter().rev() {
            match change {
                StagedChange::Upsert(ReportEntity::SubDecision(sub)) if sub.key == *key => {
                    return Ok(Some(sub.clone()));
                }
                StagedChange::Remove(ReportEntityKey::SubDecision(staged)) if staged == key => {
                    return Ok(None);
                }
                _ => {}
            }
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT meeting_type, meeting_number, decision_point, decision_number, number, \
                    {SUBDECISION_BODY_COLUMNS}, \
                    discharged_by_meeting_type, discharged_by_meeting_number, \
                    discharged_by_decision_point, discharged_by_decision_number, \
                    discharged_by_number
             FROM subdecisions
             WHERE meeting_type = ?1 AND meeting_number = ?2 AND decision_point = ?3
               AND decision_number = ?4 AND number = ?5;"
        ))?;
        let mut rows = stmt.query(params![
            key.meeting_type.as_str(),
            key.meeting_number,
            key.decision_point,
            key.decision_number,
            key.number
        ])?;

        if let Some(row) = rows.next()? {
            return Ok(Some(report_subdecision_from_row(row)?));
        }

        Ok(None)
    }

    fn find_decision_subdecisions(
        &self,
        key: &DecisionKey,
    ) -> StoreResult<Vec<ReportSubDecision>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT meeting_type, meeting_number, decision_point, decision_number, number, \
                    {SUBDECISION_BODY_COLUMNS}, \
                    discharged_by_meeting_type, discharged_by_meeting_number, \
                    discharged_by_decision_point, discharged_by_decision_number, \
                    discharged_by_number
             FROM subdecisions
             WHERE meeting_type = ?1 AND meeting_number = ?2 AND decision_point = ?3
               AND decision_number = ?4
             ORDER BY number;"
        ))?;
        let mut rows = stmt.query(params![
            key.meeting_type.as_str(),
            key.meeting_number,
            key.point,
            key.number
        ])?;

        let mut subdecisions = Vec::new();
        while let Some(row) = rows.next()? {
            subdecisions.push(report_subdecision_from_row(row)?);
        }

        // Overlay the staged changes in staged order.
        for change in &self.staged {
            match change {
                StagedChange::Upsert(ReportEntity::SubDecision(sub))
                    if sub.key.decision() == *key =>
                {
                    match subdecisions.iter_mut().find(|item| item.key == sub.key) {
                        Some(slot) => *slot = sub.clone(),
                        None => subdecisions.push(sub.clone()),
                    }
                }
                StagedChange::Remove(ReportEntityKey::SubDecision(staged))
                    if staged.decision() == *key =>
                {
                    subdecisions.retain(|item| item.key != *staged);
                }
                _ => {}
            }
        }
        subdecisions.sort_by_key(|item| item.key.number);

        Ok(subdecisions)
    }

    fn find_member(&self, lidnr: Lidnr) -> StoreResult<Option<Member>> {
        let member = self
            .conn
            .query_row(
                "SELECT full_name FROM members WHERE lidnr = ?1;",
                params![lidnr],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(member.map(|full_name| Member { lidnr, full_name }))
    }

    fn find_organ(&self, foundation: &SubDecisionKey) -> StoreResult<Option<Organ>> {
        for change in self.staged.iter().rev() {
            match change {
                StagedChange::Upsert(ReportEntity::Organ(organ))
                    if organ.foundation == *foundation =>
                {
                    return Ok(Some(organ.clone()));
                }
                StagedChange::Remove(ReportEntityKey::Organ(staged)) if staged == foundation => {
                    return Ok(None);
                }
                _ => {}
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT name, abbreviation, organ_type FROM organs
             WHERE meeting_type = ?1 AND meeting_number = ?2 AND decision_point = ?3
               AND decision_number = ?4 AND number = ?5;",
        )?;
        let mut rows = stmt.query(params![
            foundation.meeting_type.as_str(),
            foundation.meeting_number,
            foundation.decision_point,
            foundation.decision_number,
            foundation.number
        ])?;

        if let Some(row) = rows.next()? {
            let organ_type_text: String = row.get("organ_type")?;
            let organ_type = parse_organ_type(&organ_type_text).ok_or_else(|| {
                StoreError::InvalidData(format!("invalid organ type `{organ_type_text}`"))
            })?;
            return Ok(Some(Organ {
                foundation: *foundation,
                name: row.get("name")?,
                abbreviation: row.get("abbreviation")?,
                organ_type,
            }));
        }

        Ok(None)
    }

    fn find_organ_member(
        &self,
        installation: &SubDecisionKey,
    ) -> StoreResult<Option<OrganMember>> {
        for change in self.staged.iter().rev() {
            match change {
                StagedChange::Upsert(ReportEntity::OrganMember(member))
                    if member.installation == *installation =>
                {
                    return Ok(Some(member.clone()));
                }
                StagedChange::Remove(ReportEntityKey::OrganMember(staged))
                    if staged == installation =>
                {
                    return Ok(None);
                }
                _ => {}
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT organ_meeting_type, organ_meeting_number, organ_decision_point, \
                    organ_decision_number, organ_number, lidnr, function, discharge_date
             FROM organ_members
             WHERE meeting_type = ?1 AND meeting_number = ?2 AND decision_point = ?3
               AND decision_number = ?4 AND number = ?5;",
        )?;
        let mut rows = stmt.query(params![
            installation.meeting_type.as_str(),
            installation.meeting_number,
            installation.decision_point,
            installation.decision_number,
            installation.number
        ])?;

        if let Some(row) = rows.next()? {
            let organ_kind_text: String = row.get("organ_meeting_type")?;
            return Ok(Some(OrganMember {
                installation: *installation,
                foundation: SubDecisionKey {
                    meeting_type: parse_meeting_type(&organ_kind_text, "organ_meeting_type")?,
                    meeting_number: row.get("organ_meeting_number")?,
                    decision_point: row.get("organ_decision_point")?,
                    decision_number: row.get("organ_decision_number")?,
                    number: row.get("organ_number")?,
                },
                lidnr: row.get("lidnr")?,
                function: row.get("function")?,
                discharge_date: row.get("discharge_date")?,
            }));
        }

        Ok(None)
    }

    fn upsert(&mut self, entity: ReportEntity) -> StoreResult<()> {
        self.staged.push(StagedChange::Upsert(entity));
        Ok(())
    }

    fn remove(&mut self, key: ReportEntityKey) -> StoreResult<()> {
        self.staged.push(StagedChange::Remove(key));
        Ok(())
    }

    fn staged_checkpoint(&self) -> usize {
        self.staged.len()
    }

    fn rollback_staged(&mut self, checkpoint: usize) {
        self.staged.truncate(checkpoint);
    }

    fn commit(&mut self) -> StoreResult<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for rank in 0..ENTITY_RANKS {
            for change in &self.staged {
                if let StagedChange::Upsert(entity) = change {
                    if upsert_rank(entity) == rank {
                        exec_upsert(&tx, entity)?;
                    }
                }
            }
        }
        for rank in (0..ENTITY_RANKS).rev() {
            for change in &self.staged {
                if let StagedChange::Remove(key) = change {
                    if remove_rank(key) == rank {
                        exec_remove(&tx, key)?;
                    }
                }
            }
        }
        tx.commit()?;

        self.staged.clear();
        Ok(())
    }

    fn clear_unit_of_work(&mut self) {
        self.staged.clear();
    }
}

const ENTITY_RANKS: usize = 5;

fn upsert_rank(entity: &ReportEntity) -> usize {
    match entity {
        ReportEntity::Meeting(_) => 0,
        ReportEntity::Decision(_) => 1,
        ReportEntity::SubDecision(_) => 2,
        ReportEntity::Organ(_) => 3,
        ReportEntity::OrganMember(_) => 4,
    }
}

fn remove_rank(key: &ReportEntityKey) -> usize {
    match key {
        ReportEntityKey::Meeting(_) => 0,
        ReportEntityKey::Decision(_) => 1,
        ReportEntityKey::SubDecision(_) => 2,
        ReportEntityKey::Organ(_) => 3,
        ReportEntityKey::OrganMember(_) => 4,
    }
}

fn exec_upsert(conn: &Connection, entity: &ReportEntity) -> rusqlite::Result<()> {
    match entity {
        ReportEntity::Meeting(meeting) => {
            conn.execute(
                "INSERT INTO meetings (type, number, date) VALUES (?1, ?2, ?3)
                 ON CONFLICT (type, number) DO UPDATE SET date = excluded.date;",
                params![meeting.kind.as_str(), meeting.number, meeting.date],
            )?;
        }
        ReportEntity::Decision(decision) => {
            conn.execute(
                "INSERT INTO decisions (meeting_type, meeting_number, point, number, content)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (meeting_type, meeting_number, point, number)
                 DO UPDATE SET content = excluded.content;",
                params![
                    decision.key.meeting_type.as_str(),
                    decision.key.meeting_number,
                    decision.key.point,
                    decision.key.number,
                    decision.content
                ],
            )?;
        }
        ReportEntity::SubDecision(sub) => {
            let body = BodyColumns::encode(&sub.body);
            conn.execute(
                "INSERT INTO subdecisions (
                     meeting_type, meeting_number, decision_point, decision_number, number,
                     kind, content, name, abbreviation, organ_type, function, lidnr, date,
                     version, approval, changes, author_lidnr,
                     ref_meeting_type, ref_meeting_number, ref_decision_point,
                     ref_decision_number, ref_number,
                     discharged_by_meeting_type, discharged_by_meeting_number,
                     discharged_by_decision_point, discharged_by_decision_number,
                     discharged_by_number
                 ) VALUES (
                     :meeting_type, :meeting_number, :decision_point, :decision_number, :number,
                     :kind, :content, :name, :abbreviation, :organ_type, :function, :lidnr, :date,
                     :version, :approval, :changes, :author_lidnr,
                     :ref_meeting_type, :ref_meeting_number, :ref_decision_point,
                     :ref_decision_number, :ref_number,
                     :db_meeting_type, :db_meeting_number,
                     :db_decision_point, :db_decision_number,
                     :db_number
                 )
                 ON CONFLICT (meeting_type, meeting_number, decision_point, decision_number, number)
                 DO UPDATE SET
                     kind = excluded.kind,
                     content = excluded.content,
                     name = excluded.name,
                     abbreviation = excluded.abbreviation,
                     organ_type = excluded.organ_type,
                     function = excluded.function,
                     lidnr = excluded.lidnr,
                     date = excluded.date,
                     version = excluded.version,
                     approval = excluded.approval,
                     changes = excluded.changes,
                     author_lidnr = excluded.author_lidnr,
                     ref_meeting_type = excluded.ref_meeting_type,
                     ref_meeting_number = excluded.ref_meeting_number,
                     ref_decision_point = excluded.ref_decision_point,
                     ref_decision_number = excluded.ref_decision_number,
                     ref_number = excluded.ref_number,
                     discharged_by_meeting_type = excluded.discharged_by_meeting_type,
                     discharged_by_meeting_number = excluded.discharged_by_meeting_number,
                     discharged_by_decision_point = excluded.discharged_by_decision_point,
                     discharged_by_decision_number = excluded.discharged_by_decision_number,
                     discharged_by_number = excluded.discharged_by_number;",
                named_params! {
                    ":meeting_type": sub.key.meeting_type.as_str(),
                    ":meeting_number": sub.key.meeting_number,
                    ":decision_point": sub.key.decision_point,
                    ":decision_number": sub.key.decision_number,
                    ":number": sub.key.number,
                    ":kind": kind_tag(&sub.body),
                    ":content": sub.content,
                    ":name": body.name,
                    ":abbreviation": body.abbreviation,
                    ":organ_type": body.organ_type,
                    ":function": body.function,
                    ":lidnr": body.lidnr,
                    ":date": body.date,
                    ":version": body.version,
                    ":approval": body.approval,
                    ":changes": body.changes,
                    ":author_lidnr": body.author_lidnr,
                    ":ref_meeting_type": body.ref_meeting_type,
                    ":ref_meeting_number": body.ref_meeting_number,
                    ":ref_decision_point": body.ref_decision_point,
                    ":ref_decision_number": body.ref_decision_number,
                    ":ref_number": body.ref_number,
                    ":db_meeting_type": sub.discharged_by.map(|key| key.meeting_type.as_str()),
                    ":db_meeting_number": sub.discharged_by.map(|key| key.meeting_number),
                    ":db_decision_point": sub.discharged_by.map(|key| key.decision_point),
                    ":db_decision_number": sub.discharged_by.map(|key| key.decision_number),
                    ":db_number": sub.discharged_by.map(|key| key.number),
                },
            )?;
        }
        ReportEntity::Organ(organ) => {
            conn.execute(
                "INSERT INTO organs (
                     meeting_type, meeting_number, decision_point, decision_number, number,
                     name, abbreviation, organ_type
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (meeting_type, meeting_number, decision_point, decision_number, number)
                 DO UPDATE SET
                     name = excluded.name,
                     abbreviation = excluded.abbreviation,
                     organ_type = excluded.organ_type;",
                params![
                    organ.foundation.meeting_type.as_str(),
                    organ.foundation.meeting_number,
                    organ.foundation.decision_point,
                    organ.foundation.decision_number,
                    organ.foundation.number,
                    organ.name,
                    organ.abbreviation,
                    organ_type_to_db(organ.organ_type)
                ],
            )?;
        }
        ReportEntity::OrganMember(member) => {
            conn.execute(
                "INSERT INTO organ_members (
                     meeting_type, meeting_number, decision_point, decision_number, number,
                     organ_meeting_type, organ_meeting_number, organ_decision_point,
                     organ_decision_number, organ_number, lidnr, function, discharge_date
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT (meeting_type, meeting_number, decision_point, decision_number, number)
                 DO UPDATE SET
                     organ_meeting_type = excluded.organ_meeting_type,
                     organ_meeting_number = excluded.organ_meeting_number,
                     organ_decision_point = excluded.organ_decision_point,
                     organ_decision_number = excluded.organ_decision_number,
                     organ_number = excluded.organ_number,
                     lidnr = excluded.lidnr,
                     function = excluded.function,
                     discharge_date = excluded.discharge_date;",
                params![
                    member.installation.meeting_type.as_str(),
                    member.installation.meeting_number,
                    member.installation.decision_point,
                    member.installation.decision_number,
                    member.installation.number,
                    member.foundation.meeting_type.as_str(),
                    member.foundation.meeting_number,
                    member.foundation.decision_point,
                    member.foundation.decision_number,
                    member.foundation.number,
                    member.lidnr,
                    member.function,
                    member.discharge_date
                ],
            )?;
        }
    }

    Ok(())
}

fn exec_remove(conn: &Connection, key: &ReportEntityKey) -> rusqlite::Result<()> {
    match key {
        ReportEntityKey::Meeting(key) => {
            conn.execute(
                "DELETE FROM meetings WHERE type = ?1 AND number = ?2;",
                params![key.kind.as_str(), key.number],
            )?;
        }
        ReportEntityKey::Decision(key) => {
            conn.execute(
                "DELETE FROM decisions
                 WHERE meeting_type = ?1 AND meeting_number = ?2 AND point = ?3 AND number = ?4;",
                params![
                    key.meeting_type.as_str(),
                    key.meeting_number,
                    key.point,
                    key.number
                ],
            )?;
        }
        ReportEntityKey::SubDecision(key) => {
            conn.execute(
                "DELETE FROM subdecisions
                 WHERE meeting_type = ?1 AND meeting_number = ?2 AND decision_point = ?3
                   AND decision_number = ?4 AND number = ?5;",
                params![
                    key.meeting_type.as_str(),
                    key.meeting_number,
                    key.decision_point,
                    key.decision_number,
                    key.number
                ],
            )?;
        }
        ReportEntityKey::Organ(key) => {
            conn.execute(
                "DELETE FROM organs
                 WHERE meeting_type = ?1 AND meeting_number = ?2 AND decision_point = ?3
                   AND decision_number = ?4 AND number = ?5;",
                params![
                    key.meeting_type.as_str(),
                    key.meeting_number,
                    key.decision_point,
                    key.decision_number,
                    key.number
                ],
            )?;
        }
        ReportEntityKey::OrganMember(key) => {
            conn.execute(
                "DELETE FROM organ_members
                 WHERE meeting_type = ?1 AND meeting_number = ?2 AND decision_point = ?3
                   AND decision_number = ?4 AND number = ?5;",
                params![
                    key.meeting_type.as_str(),
                    key.meeting_number,
                    key.decision_point,
                    key.decision_number,
                    key.number
                ],
            )?;
        }
    }

    Ok(())
}

fn report_subdecision_from_row(row: &Row<'_>) -> Result<ReportSubDecision, RowDecodeError> {
    let kind_text: String = row.get("meeting_type")?;
    let key = SubDecisionKey {
        meeting_type: parse_meeting_type(&kind_text, "subdecisions.meeting_type")?,
        meeting_number: row.get("meeting_number")?,
        decision_point: row.get("decision_point")?,
        decision_number: row.get("decision_number")?,
        number: row.get("number")?,
    };

    let discharged_by = match row.get::<_, Option<String>>("discharged_by_meeting_type")? {
        Some(kind_text) => Some(SubDecisionKey {
            meeting_type: parse_meeting_type(&kind_text, "discharged_by_meeting_type")?,
            meeting_number: row
                .get::<_, Option<i32>>("discharged_by_meeting_number")?
                .ok_or_else(|| {
                    RowDecodeError::Invalid(
                        "column `discharged_by_meeting_number` is null".to_string(),
                    )
                })?,
            decision_point: row
                .get::<_, Option<i32>>("discharged_by_decision_point")?
                .ok_or_else(|| {
                    RowDecodeError::Invalid(
                        "column `discharged_by_decision_point` is null".to_string(),
                    )
                })?,
            decision_number: row
                .get::<_, Option<i32>>("discharged_by_decision_number")?
                .ok_or_else(|| {
                    RowDecodeError::Invalid(
                        "column `discharged_by_decision_number` is null".to_string(),
                    )
                })?,
            number: row
                .get::<_, Option<i32>>("discharged_by_number")?
                .ok_or_else(|| {
                    RowDecodeError::Invalid("column `discharged_by_number` is null".to_string())
                })?,
        }),
        None => None,
    };

    Ok(ReportSubDecision {
        key,
        content: row.get("content")?,
        body: body_from_row(row)?,
        discharged_by,
    })
}
