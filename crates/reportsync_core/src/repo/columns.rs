//! Row codec for the single-table sub-decision layout.
//!
//! # Responsibility
//! - Translate `SubDecisionBody` variants to and from the shared variant
//!   columns used by both the source and report schemas.
//!
//! # Invariants
//! - `kind` tags are stable database text; renaming a variant must not
//!   change its tag.
//! - Decoding rejects rows whose variant columns do not match the tag.

use crate::model::decision::DecisionKey;
use crate::model::meeting::MeetingType;
use crate::model::subdecision::{OrganType, SubDecisionBody, SubDecisionKey};
use chrono::NaiveDate;
use rusqlite::Row;

/// Variant columns shared by the source and report `subdecisions` tables,
/// in binding order.
pub(crate) const SUBDECISION_BODY_COLUMNS: &str = "kind, content, name, abbreviation, \
     organ_type, function, lidnr, date, version, approval, changes, author_lidnr, \
     ref_meeting_type, ref_meeting_number, ref_decision_point, ref_decision_number, ref_number";

/// Decode failure for a persisted sub-decision row.
#[derive(Debug)]
pub(crate) enum RowDecodeError {
    Sqlite(rusqlite::Error),
    Invalid(String),
}

impl From<rusqlite::Error> for RowDecodeError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

pub(crate) fn organ_type_to_db(organ_type: OrganType) -> &'static str {
    match organ_type {
        OrganType::Committee => "committee",
        OrganType::AvCommittee => "av_committee",
        OrganType::Fraternity => "fraternity",
        OrganType::AdvisoryCouncil => "advisory_council",
    }
}

pub(crate) fn parse_organ_type(value: &str) -> Option<OrganType> {
    match value {
        "committee" => Some(OrganType::Committee),
        "av_committee" => Some(OrganType::AvCommittee),
        "fraternity" => Some(OrganType::Fraternity),
        "advisory_council" => Some(OrganType::AdvisoryCouncil),
        _ => None,
    }
}

pub(crate) fn kind_tag(body: &SubDecisionBody) -> &'static str {
    match body {
        SubDecisionBody::Foundation { .. } => "foundation",
        SubDecisionBody::Installation { .. } => "installation",
        SubDecisionBody::Discharge { .. } => "discharge",
        SubDecisionBody::BoardInstallation { .. } => "board_installation",
        SubDecisionBody::BoardRelease { .. } => "board_release",
        SubDecisionBody::BoardDischarge { .. } => "board_discharge",
        SubDecisionBody::Budget { .. } => "budget",
        SubDecisionBody::Reckoning { .. } => "reckoning",
        SubDecisionBody::Destroy { .. } => "destroy",
        SubDecisionBody::Abolish { .. } => "abolish",
        SubDecisionBody::Other => "other",
    }
}

/// Variant columns of one sub-decision row, ready for parameter binding.
#[derive(Debug, Default)]
pub(crate) struct BodyColumns {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub organ_type: Option<&'static str>,
    pub function: Option<String>,
    pub lidnr: Option<u32>,
    pub date: Option<NaiveDate>,
    pub version: Option<String>,
    pub approval: Option<bool>,
    pub changes: Option<bool>,
    pub author_lidnr: Option<u32>,
    pub ref_meeting_type: Option<&'static str>,
    pub ref_meeting_number: Option<i32>,
    pub ref_decision_point: Option<i32>,
    pub ref_decision_number: Option<i32>,
    pub ref_number: Option<i32>,
}

impl BodyColumns {
    pub(crate) fn encode(body: &SubDecisionBody) -> Self {
        let mut columns = Self::default();
        match body {
            SubDecisionBody::Foundation {
                name,
                abbreviation,
                organ_type,
            } => {
                columns.name = Some(name.clone());
                columns.abbreviation = Some(abbreviation.clone());
                columns.organ_type = Some(organ_type_to_db(*organ_type));
            }
            SubDecisionBody::Installation {
                foundation,
                function,
                member,
            } => {
                columns.set_subdecision_ref(foundation);
                columns.function = Some(function.clone());
                columns.lidnr = Some(*member);
            }
            SubDecisionBody::Discharge { installation }
            | SubDecisionBody::BoardDischarge { installation } => {
                columns.set_subdecision_ref(installation);
            }
            SubDecisionBody::BoardInstallation {
                function,
                member,
                date,
            } => {
                columns.function = Some(function.clone());
                columns.lidnr = Some(*member);
                columns.date = Some(*date);
            }
            SubDecisionBody::BoardRelease { installation, date } => {
                columns.set_subdecision_ref(installation);
                columns.date = Some(*date);
            }
            SubDecisionBody::Budget {
                author,
                name,
                version,
                date,
                approval,
                changes,
            }
            | SubDecisionBody::Reckoning {
                author,
                name,
                version,
                date,
                approval,
                changes,
            } => {
                columns.author_lidnr = *author;
                columns.name = Some(name.clone());
                columns.version = Some(version.clone());
                columns.date = Some(*date);
                columns.approval = Some(*approval);
                columns.changes = Some(*changes);
            }
            SubDecisionBody::Destroy { target } => {
                columns.ref_meeting_type = Some(target.meeting_type.as_str());
                columns.ref_meeting_number = Some(target.meeting_number);
                columns.ref_decision_point = Some(target.point);
                columns.ref_decision_number = Some(target.number);
            }
            SubDecisionBody::Abolish { foundation } => {
                columns.set_subdecision_ref(foundation);
            }
            SubDecisionBody::Other => {}
        }
        columns
    }

    fn set_subdecision_ref(&mut self, key: &SubDecisionKey) {
        self.ref_meeting_type = Some(key.meeting_type.as_str());
        self.ref_meeting_number = Some(key.meeting_number);
        self.ref_decision_point = Some(key.decision_point);
        self.ref_decision_number = Some(key.decision_number);
        self.ref_number = Some(key.number);
    }
}

/// Decodes the variant payload from a row containing the shared columns.
pub(crate) fn body_from_row(row: &Row<'_>) -> Result<SubDecisionBody, RowDecodeError> {
    let kind: String = row.get("kind")?;

    let body = match kind.as_str() {
        "foundation" => SubDecisionBody::Foundation {
            name: required_text(row, "name")?,
            abbreviation: required_text(row, "abbreviation")?,
            organ_type: required_organ_type(row)?,
        },
        "installation" => SubDecisionBody::Installation {
            foundation: subdecision_ref(row)?,
            function: required_text(row, "function")?,
            member: required_lidnr(row, "lidnr")?,
        },
        "discharge" => SubDecisionBody::Discharge {
            installation: subdecision_ref(row)?,
        },
        "board_installation" => SubDecisionBody::BoardInstallation {
            function: required_text(row, "function")?,
            member: required_lidnr(row, "lidnr")?,
            date: required_date(row)?,
        },
        "board_release" => SubDecisionBody::BoardRelease {
            installation: subdecision_ref(row)?,
            date: required_date(row)?,
        },
        "board_discharge" => SubDecisionBody::BoardDischarge {
            installation: subdecision_ref(row)?,
        },
        "budget" => SubDecisionBody::Budget {
            author: row.get("author_lidnr")?,
            name: required_text(row, "name")?,
            version: required_text(row, "version")?,
            date: required_date(row)?,
            approval: required_flag(row, "approval")?,
            changes: required_flag(row, "changes")?,
        },
        "reckoning" => SubDecisionBody::Reckoning {
            author: row.get("author_lidnr")?,
            name: required_text(row, "name")?,
            version: required_text(row, "version")?,
            date: required_date(row)?,
            approval: required_flag(row, "approval")?,
            changes: required_flag(row, "changes")?,
        },
        "destroy" => SubDecisionBody::Destroy {
            target: decision_ref(row)?,
        },
        "abolish" => SubDecisionBody::Abolish {
            foundation: subdecision_ref(row)?,
        },
        "other" => SubDecisionBody::Other,
        other => {
            return Err(RowDecodeError::Invalid(format!(
                "unknown sub-decision kind `{other}`"
            )));
        }
    };

    Ok(body)
}

pub(crate) fn parse_meeting_type(value: &str, column: &str) -> Result<MeetingType, RowDecodeError> {
    MeetingType::parse(value).ok_or_else(|| {
        RowDecodeError::Invalid(format!("invalid meeting type `{value}` in `{column}`"))
    })
}

fn required_text(row: &Row<'_>, column: &'static str) -> Result<String, RowDecodeError> {
    row.get::<_, Option<String>>(column)?
        .ok_or_else(|| missing(column))
}

fn required_lidnr(row: &Row<'_>, column: &'static str) -> Result<u32, RowDecodeError> {
    row.get::<_, Option<u32>>(column)?
        .ok_or_else(|| missing(column))
}

fn required_date(row: &Row<'_>) -> Result<NaiveDate, RowDecodeError> {
    row.get::<_, Option<NaiveDate>>("date")?
        .ok_or_else(|| missing("date"))
}

fn required_flag(row: &Row<'_>, column: &'static str) -> Result<bool, RowDecodeError> {
    row.get::<_, Option<bool>>(column)?
        .ok_or_else(|| missing(column))
}

fn required_organ_type(row: &Row<'_>) -> Result<OrganType, RowDecodeError> {
    let value = required_text(row, "organ_type")?;
    parse_organ_type(&value)
        .ok_or_else(|| RowDecodeError::Invalid(format!("invalid organ type `{value}`")))
}

fn subdecision_ref(row: &Row<'_>) -> Result<SubDecisionKey, RowDecodeError> {
    let kind_text = required_text(row, "ref_meeting_type")?;
    Ok(SubDecisionKey {
        meeting_type: parse_meeting_type(&kind_text, "ref_meeting_type")?,
        meeting_number: row
            .get::<_, Option<i32>>("ref_meeting_number")?
            .ok_or_else(|| missing("ref_meeting_number"))?,
        decision_point: row
            .get::<_, Option<i32>>("ref_decision_point")?
            .ok_or_else(|| missing("ref_decision_point"))?,
        decision_number: row
            .get::<_, Option<i32>>("ref_decision_number")?
            .ok_or_else(|| missing("ref_decision_number"))?,
        number: row
            .get::<_, Option<i32>>("ref_number")?
            .ok_or_else(|| missing("ref_number"))?,
    })
}

fn decision_ref(row: &Row<'_>) -> Result<DecisionKey, RowDecodeError> {
    let kind_text = required_text(row, "ref_meeting_type")?;
    Ok(DecisionKey {
        meeting_type: parse_meeting_type(&kind_text, "ref_meeting_type")?,
        meeting_number: row
            .get::<_, Option<i32>>("ref_meeting_number")?
            .ok_or_else(|| missing("ref_meeting_number"))?,
        point: row
            .get::<_, Option<i32>>("ref_decision_point")?
            .ok_or_else(|| missing("ref_decision_point"))?,
        number: row
            .get::<_, Option<i32>>("ref_decision_number")?
            .ok_or_else(|| missing("ref_decision_number"))?,
    })
}

fn missing(column: &str) -> RowDecodeError {
    RowDecodeError::Invalid(format!("column `{column}` is null for this sub-decision kind"))
}
