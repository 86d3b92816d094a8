//! crates/taskboard_core/src/errors.rs
//!
//! The error taxonomy shared by every service. Each kind owns an HTTP status,
//! a machine-readable name and a default message/action pair shown to users.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::ports::PortError;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    NotImplemented,
    Internal,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Unauthorized => "UnauthorizedError",
            Self::Forbidden => "ForbiddenError",
            Self::NotFound => "NotFoundError",
            Self::NotImplemented => "NotImplementedError",
            Self::Internal => "InternalServerError",
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::NotImplemented => 501,
            Self::Internal => 500,
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Os dados enviados estão inválidos.",
            Self::Unauthorized => "Usuário não autenticado.",
            Self::Forbidden => "Usuário não possui permissões necessários para executar essa ação.",
            Self::NotFound => "Não foi possível encontrar este recurso no sistema.",
            Self::NotImplemented => "Essa função ainda não está devidamente implementada.",
            Self::Internal => "Ocorreu um erro inesperado.",
        }
    }

    fn default_action(self) -> &'static str {
        match self {
            Self::Validation => "Confira todos os dados enviados ou contate o time de suporte.",
            Self::Unauthorized => "Verifique se você está autenticado e tente novamente.",
            Self::Forbidden => "Verifique se o usuário possui permissão necessária.",
            Self::NotFound => "Verifique se os parâmetros enviados estão corretos.",
            Self::NotImplemented => "Aguarde por notícias ou contate o time de suporte.",
            Self::Internal => "Contate o time de suporte",
        }
    }
}

/// One failing field of a validated payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
    pub action: String,
}

/// The JSON body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
    pub status_code: u16,
    pub message: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

/// An expected or unexpected failure, ready to be mapped to a response.
#[derive(Debug, thiserror::Error)]
#[error("{}: {message}", .kind.name())]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    action: String,
    issues: Vec<FieldIssue>,
    #[source]
    cause: Option<BoxError>,
}

impl AppError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            action: kind.default_action().to_string(),
            issues: Vec::new(),
            cause: None,
        }
    }

    pub fn validation() -> Self {
        Self::new(ErrorKind::Validation)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn not_implemented() -> Self {
        Self::new(ErrorKind::NotImplemented)
    }

    /// Wraps an unexpected failure. The cause is kept for logs only.
    pub fn internal(cause: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::Internal).with_cause(cause)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_issues(mut self, issues: Vec<FieldIssue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// The kind of the direct cause, when that cause is itself an `AppError`.
    pub fn cause_kind(&self) -> Option<ErrorKind> {
        self.cause
            .as_deref()
            .and_then(|cause| cause.downcast_ref::<AppError>())
            .map(AppError::kind)
    }

    /// Renders the error and all of its causes on one line, for logs.
    pub fn cause_chain(&self) -> String {
        let mut chain = self.to_string();
        let mut current = self.source();
        while let Some(cause) = current {
            chain.push_str(" <- ");
            chain.push_str(&cause.to_string());
            current = cause.source();
        }
        chain
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind.name().to_string(),
            status_code: self.kind.status_code(),
            message: self.message.clone(),
            action: self.action.clone(),
            issues: self.issues.clone(),
        }
    }
}

impl From<PortError> for AppError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(_) => AppError::not_found().with_cause(err),
            PortError::Conflict { .. } => AppError::validation().with_cause(err),
            PortError::Unexpected(_) => AppError::internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_uses_kind_defaults_and_omits_empty_issues() {
        let body = AppError::forbidden().body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "ForbiddenError",
                "status_code": 403,
                "message": "Usuário não possui permissões necessários para executar essa ação.",
                "action": "Verifique se o usuário possui permissão necessária.",
            })
        );
    }

    #[test]
    fn body_lists_issues_when_present() {
        let err = AppError::validation().with_issues(vec![FieldIssue {
            field: "name".into(),
            message: "m".into(),
            action: "a".into(),
        }]);
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["status_code"], 400);
        assert_eq!(json["issues"][0]["field"], "name");
    }

    #[test]
    fn cause_kind_sees_wrapped_app_errors_only() {
        let wrapped = AppError::forbidden().with_cause(AppError::unauthorized());
        assert_eq!(wrapped.cause_kind(), Some(ErrorKind::Unauthorized));

        let plain = AppError::internal("boom".to_string());
        assert_eq!(plain.cause_kind(), None);
        assert!(plain.cause_chain().contains("boom"));
    }

    #[test]
    fn display_and_source_follow_the_cause() {
        let err = AppError::forbidden()
            .with_message("nope")
            .with_cause(AppError::unauthorized());
        assert_eq!(err.to_string(), "ForbiddenError: nope");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "UnauthorizedError: Usuário não autenticado.");
        assert!(AppError::validation().source().is_none());
        assert_eq!(
            err.cause_chain(),
            "ForbiddenError: nope <- UnauthorizedError: Usuário não autenticado."
        );
    }

    #[test]
    fn port_errors_map_to_kinds() {
        let not_found: AppError = PortError::NotFound("task".into()).into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let conflict: AppError = PortError::Conflict {
            constraint: "users_email_key".into(),
        }
        .into();
        assert_eq!(conflict.kind(), ErrorKind::Validation);

        let unexpected: AppError = PortError::Unexpected("db down".into()).into();
        assert_eq!(unexpected.kind(), ErrorKind::Internal);
        assert_eq!(unexpected.status_code(), 500);
    }
}
