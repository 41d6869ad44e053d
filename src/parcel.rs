//! Parcel records and their lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Store-assigned parcel identifier.
pub type ParcelNumber = i64;

/// Identifier of the client a parcel is tracked for.
pub type ClientId = i64;

/// Lifecycle stage of a parcel.
///
/// Stages only move forward, one step at a time:
/// `registered -> sent -> delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParcelStatus {
    Registered,
    Sent,
    Delivered,
}

impl ParcelStatus {
    pub const ALL: [ParcelStatus; 3] = [Self::Registered, Self::Sent, Self::Delivered];

    /// Text stored in the `status` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// The single legal forward step from this status, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Whether moving from `self` to `target` is a legal transition.
    ///
    /// Same-status, backward and skipping requests are all rejected.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Address edits and deletion are only allowed before dispatch.
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Registered)
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parcel status: {0:?}")]
pub struct ParseStatusError(String);

impl FromStr for ParcelStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

impl ToSql for ParcelStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ParcelStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// One tracked shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Assigned by the store on insert; `0` until then.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Parcel {
    /// A fresh, not yet persisted parcel in the `registered` status.
    ///
    /// The creation time is truncated to whole seconds so the record reads
    /// back exactly as written.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: Utc::now().trunc_subsecs(0),
        }
    }
}

pub(crate) fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("timestamp {0} cannot be stored as RFC3339 (year must be within 0..=9999)")]
pub struct UnrepresentableTimestamp(String);

/// Text for the `created_at` column, refused if it would not parse back.
pub(crate) fn encode_timestamp(at: &DateTime<Utc>) -> rusqlite::Result<String> {
    let raw = format_timestamp(at);
    match parse_timestamp(&raw) {
        Ok(parsed) if parsed == *at => Ok(raw),
        _ => Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
            UnrepresentableTimestamp(raw),
        ))),
    }
}
