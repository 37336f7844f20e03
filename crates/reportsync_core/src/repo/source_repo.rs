//! Source repository: read-only view of the canonical decision graph.
//!
//! # Responsibility
//! - Load every meeting with its fully eager decision/sub-decision
//!   sub-graph in stable order, avoiding per-item query storms.
//!
//! # Invariants
//! - The source store is never written through this repository.
//! - Decisions and sub-decisions are returned in `(point, number)` /
//!   `number` order within their parents.

use crate::db::migrations::{latest_version, Store};
use crate::db::DbError;
use crate::model::decision::{Decision, DecisionKey};
use crate::model::meeting::{Meeting, MeetingKey};
use crate::model::subdecision::{SubDecision, SubDecisionKey};
use crate::repo::columns::{
    body_from_row, parse_meeting_type, RowDecodeError, SUBDECISION_BODY_COLUMNS,
};
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SourceResult<T> = Result<T, SourceRepoError>;

/// Errors raised while reading the canonical decision graph.
#[derive(Debug)]
pub enum SourceRepoError {
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted into a valid graph.
    InvalidData(String),
}

impl Display for SourceRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "source repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid source data: {message}"),
        }
    }
}

impl Error for SourceRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SourceRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SourceRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RowDecodeError> for SourceRepoError {
    fn from(value: RowDecodeError) -> Self {
        match value {
            RowDecodeError::Sqlite(err) => Self::Db(DbError::Sqlite(err)),
            RowDecodeError::Invalid(message) => Self::InvalidData(message),
        }
    }
}

/// Read interface over the canonical decision graph.
pub trait SourceRepository {
    /// Returns every meeting with its eager sub-graph, in stable order.
    fn find_all_meetings(&self) -> SourceResult<Vec<Meeting>>;
}

/// SQLite-backed source repository.
pub struct SqliteSourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSourceRepository<'conn> {
    /// Wraps a migrated source connection, rejecting unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> SourceResult<Self> {
        let expected_version = latest_version(Store::Source);
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if actual_version != expected_version {
            return Err(SourceRepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        Ok(Self { conn })
    }
}

impl SourceRepository for SqliteSourceRepository<'_> {
    fn find_all_meetings(&self) -> SourceResult<Vec<Meeting>> {
        let mut meetings = Vec::new();
        let mut meeting_index: HashMap<MeetingKey, usize> = HashMap::new();

        let mut stmt = self
            .conn
            .prepare("SELECT type, number, date FROM meetings ORDER BY type, number;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let kind_text: String = row.get("type")?;
            let meeting = Meeting {
                kind: parse_meeting_type(&kind_text, "meetings.type")?,
                number: row.get("number")?,
                date: row.get("date")?,
                decisions: Vec::new(),
            };
            meeting_index.insert(meeting.key(), meetings.len());
            meetings.push(meeting);
        }

        let mut decision_index: HashMap<DecisionKey, (usize, usize)> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT meeting_type, meeting_number, point, number
             FROM decisions
             ORDER BY meeting_type, meeting_number, point, number;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let kind_text: String = row.get("meeting_type")?;
            let key = DecisionKey {
                meeting_type: parse_meeting_type(&kind_text, "decisions.meeting_type")?,
                meeting_number: row.get("meeting_number")?,
                point: row.get("point")?,
                number: row.get("number")?,
            };

            let meeting_slot = *meeting_index.get(&key.meeting()).ok_or_else(|| {
                SourceRepoError::InvalidData(format!("decision {key} has no meeting row"))
            })?;
            let decision_slot = meetings[meeting_slot].decisions.len();
            decision_index.insert(key, (meeting_slot, decision_slot));
            meetings[meeting_slot].decisions.push(Decision {
                key,
                subdecisions: Vec::new(),
            });
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT meeting_type, meeting_number, decision_point, decision_number, number, \
                    {SUBDECISION_BODY_COLUMNS}
             FROM subdecisions
             ORDER BY meeting_type, meeting_number, decision_point, decision_number, number;"
        ))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let kind_text: String = row.get("meeting_type")?;
            let key = SubDecisionKey {
                meeting_type: parse_meeting_type(&kind_text, "subdecisions.meeting_type")?,
                meeting_number: row.get("meeting_number")?,
                decision_point: row.get("decision_point")?,
                decision_number: row.get("decision_number")?,
                number: row.get("number")?,
            };

            let (meeting_slot, decision_slot) =
                *decision_index.get(&key.decision()).ok_or_else(|| {
                    SourceRepoError::InvalidData(format!(
                        "sub-decision {key} has no decision row"
                    ))
                })?;

            meetings[meeting_slot].decisions[decision_slot]
                .subdecisions
                .push(SubDecision {
                    key,
                    content: row.get("content")?,
                    body: body_from_row(row)?,
                });
        }

        Ok(meetings)
    }
}
