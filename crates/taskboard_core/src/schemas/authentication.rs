use serde_json::{Map, Value};

use super::{as_object, expected, Issues, RuleFailure, RuleResult};
use crate::errors::AppError;

/// Login credentials. Absent fields default to empty strings so a lookup
/// still happens and fails the ordinary way.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_json(payload: &Value) -> Result<Self, AppError> {
        let mut issues = Issues::new();
        let empty = Map::new();
        let body = as_object(payload, &mut issues, &empty);

        let email = issues.check("email", string_or_empty(body.get("email")));
        let password = issues.check("password", string_or_empty(body.get("password")));

        match (email, password) {
            (Some(email), Some(password)) if issues.is_empty() => Ok(Self { email, password }),
            _ => Err(issues.into_error()),
        }
    }
}

fn string_or_empty(value: Option<&Value>) -> RuleResult<String> {
    match value {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(RuleFailure::Raw(expected("string", other))),
    }
}
