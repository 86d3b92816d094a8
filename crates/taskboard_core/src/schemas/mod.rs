//! crates/taskboard_core/src/schemas/mod.rs
//!
//! Per-entity schemas: they turn raw JSON payloads into validated inputs and
//! domain records into response DTOs.
//!
//! Every field rule carries its user-facing message/action pair from the moment
//! it is declared. A payload is checked field by field in declaration order and
//! all failures are reported together in a single `ValidationError`.

pub mod authentication;
pub mod session;
pub mod task;
pub mod user;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serializer;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{AppError, FieldIssue};

/// Action attached to failures that have no message of their own.
pub const GENERIC_FIELD_ACTION: &str = "Verifique se foi digitado corretamente.";

/// A message/action pair bound to a rule when the schema is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub message: &'static str,
    pub action: &'static str,
}

pub const fn bound(message: &'static str, action: &'static str) -> Bound {
    Bound { message, action }
}

/// Why a single rule rejected a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleFailure {
    Bound(Bound),
    Raw(String),
}

impl From<Bound> for RuleFailure {
    fn from(b: Bound) -> Self {
        RuleFailure::Bound(b)
    }
}

pub type RuleResult<T> = Result<T, RuleFailure>;

/// Accumulates field failures in the order fields are checked.
#[derive(Debug, Default)]
pub struct Issues {
    issues: Vec<FieldIssue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the failure, if any, and hands back the accepted value.
    pub fn check<T>(&mut self, field: &str, result: RuleResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(failure) => {
                self.push(field, failure);
                None
            }
        }
    }

    pub fn push(&mut self, field: &str, failure: RuleFailure) {
        let (message, action) = match failure {
            RuleFailure::Bound(b) => (b.message.to_string(), b.action.to_string()),
            RuleFailure::Raw(text) => (text, GENERIC_FIELD_ACTION.to_string()),
        };
        self.issues.push(FieldIssue {
            field: field.to_string(),
            message,
            action,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_error(self) -> AppError {
        AppError::validation().with_issues(self.issues)
    }
}

/// Views the payload as an object. Anything else is reported on the `body` field
/// and validated as if it were empty, so every missing field is still listed.
pub fn as_object<'a>(payload: &'a Value, issues: &mut Issues, empty: &'a Map<String, Value>) -> &'a Map<String, Value> {
    match payload {
        Value::Object(map) => map,
        Value::Null => empty,
        other => {
            issues.push("body", RuleFailure::Raw(expected("object", other)));
            empty
        }
    }
}

pub fn expected(kind: &str, received: &Value) -> String {
    format!("Invalid input: expected {kind}, received {}", type_name(received))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//=========================================================================================
// Field Rules
//=========================================================================================

/// Required string. A missing or non-string value reports `on_invalid`.
pub fn required_string(value: Option<&Value>, on_invalid: Bound) -> RuleResult<String> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(on_invalid.into()),
    }
}

/// Optional, nullable string. Outer `None` when absent, inner `None` for `null`.
pub fn nullable_string(value: Option<&Value>) -> RuleResult<Option<Option<String>>> {
    match value {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(other) => Err(RuleFailure::Raw(expected("string", other))),
    }
}

pub fn max_chars(value: String, max: usize, on_invalid: Bound) -> RuleResult<String> {
    if value.chars().count() > max {
        return Err(on_invalid.into());
    }
    Ok(value)
}

pub fn uuid(value: Option<&Value>, on_invalid: Bound) -> RuleResult<Uuid> {
    match value {
        Some(Value::String(s)) => Uuid::parse_str(s).map_err(|_| on_invalid.into()),
        _ => Err(on_invalid.into()),
    }
}

/// Required date, coerced from an RFC 3339 string, a `YYYY-MM-DD` date or epoch milliseconds.
pub fn required_date(value: Option<&Value>, on_invalid: Bound) -> RuleResult<DateTime<Utc>> {
    value.and_then(coerce_date).ok_or_else(|| on_invalid.into())
}

/// Optional, nullable date. Outer `None` when absent, inner `None` for `null`.
pub fn nullable_date(value: Option<&Value>, on_invalid: Bound) -> RuleResult<Option<Option<DateTime<Utc>>>> {
    match value {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(other) => coerce_date(other)
            .map(|date| Some(Some(date)))
            .ok_or_else(|| on_invalid.into()),
    }
}

pub fn coerce_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|date| date.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|date| date.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

//=========================================================================================
// Response Helpers
//=========================================================================================

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn to_iso_string(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize_iso<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_iso_string(date))
}

pub fn serialize_iso_opt<S: Serializer>(
    date: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.serialize_str(&to_iso_string(date)),
        None => serializer.serialize_none(),
    }
}
