use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{as_object, bound, required_string, serialize_iso, Bound, Issues, RuleResult};
use crate::domain::User;
use crate::errors::AppError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_0-9.]{3,}$").expect("username pattern is valid"));

const INVALID_EMAIL: Bound = bound("E-mail inválido.", "Confira se digitou o e-mail corretamente.");
const INVALID_USERNAME: Bound = bound(
    "Username inválido.",
    "Use um username com no mínimo 3 letras e sem caracteres especiais.",
);
const WEAK_PASSWORD: Bound = bound(
    "Senha muito fraca.",
    "A senha no mínimo 10 caracteres e conter letras e números.",
);

/// A registration payload that passed validation. The password is still plaintext.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl CreateUser {
    pub fn from_json(payload: &Value) -> Result<Self, AppError> {
        let mut issues = Issues::new();
        let empty = Map::new();
        let body = as_object(payload, &mut issues, &empty);

        let email = issues.check("email", email(body.get("email")));
        let username = issues.check("username", username(body.get("username")));
        let password = issues.check("password", password(body.get("password")));

        match (email, username, password) {
            (Some(email), Some(username), Some(password)) if issues.is_empty() => Ok(Self {
                email,
                username,
                password,
            }),
            _ => Err(issues.into_error()),
        }
    }
}

fn email(value: Option<&Value>) -> RuleResult<String> {
    let email = required_string(value, INVALID_EMAIL)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(INVALID_EMAIL.into());
    }
    Ok(email)
}

fn username(value: Option<&Value>) -> RuleResult<String> {
    let username = required_string(value, INVALID_USERNAME)?;
    if !USERNAME_RE.is_match(&username) {
        return Err(INVALID_USERNAME.into());
    }
    Ok(username)
}

/// At least ten characters, with at least one ASCII letter and one digit.
/// Line terminators are not allowed anywhere.
fn password(value: Option<&Value>) -> RuleResult<String> {
    let password = required_string(value, WEAK_PASSWORD)?;
    if password.chars().any(is_line_terminator) {
        return Err(WEAK_PASSWORD.into());
    }
    let long_enough = password.chars().count() >= 10;
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(long_enough && has_letter && has_digit) {
        return Err(WEAK_PASSWORD.into());
    }
    Ok(password)
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Public projection of a user. Credentials are never part of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub features: Vec<String>,
    #[serde(serialize_with = "serialize_iso")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_iso")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            features: user.features,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
