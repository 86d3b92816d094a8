use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::NewSession;
use crate::errors::AppError;
use crate::ports::SessionRepository;
use crate::schemas::session::SessionResponse;

/// Lifetime of a freshly created session.
pub const SESSION_LIFETIME_DAYS: i64 = 7;

const TOKEN_BYTES: usize = 48;

pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// The fixed session lifetime. Cookie `Max-Age` is derived from it.
    pub fn expiration_duration(&self) -> Duration {
        Duration::days(SESSION_LIFETIME_DAYS)
    }

    #[instrument(skip(self))]
    pub async fn create(&self, user_id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self
            .sessions
            .create(NewSession {
                token: generate_token(),
                user_id,
                expires_at: Utc::now() + self.expiration_duration(),
            })
            .await?;
        debug!(session_id = %session.id, "Session created");
        Ok(session.into())
    }

    /// Resolves a token to a session that has not expired yet. Unknown,
    /// malformed and expired tokens all resolve to `None`.
    #[instrument(skip_all)]
    pub async fn find_valid_by_token(&self, token: &str) -> Result<Option<SessionResponse>, AppError> {
        if !is_well_formed(token) {
            return Ok(None);
        }
        let session = self.sessions.find_by_token(token).await?;
        Ok(session
            .filter(|s| s.is_valid_at(Utc::now()))
            .map(SessionResponse::from))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SessionResponse>, AppError> {
        Ok(self.sessions.find_by_id(id).await?.map(SessionResponse::from))
    }

    /// Brings `expires_at` to now at the latest. Expiring twice is harmless.
    #[instrument(skip(self))]
    pub async fn expire_by_id(&self, id: Uuid) -> Result<SessionResponse, AppError> {
        let session = self.sessions.expire(id, Utc::now()).await?;
        Ok(session.into())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn is_well_formed(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    fn service() -> (Arc<InMemoryStore>, SessionService) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), SessionService::new(store))
    }

    #[tokio::test]
    async fn create_issues_a_long_hex_token_valid_for_seven_days() {
        let (_, sessions) = service();
        let before = Utc::now();
        let session = sessions.create(Uuid::new_v4()).await.unwrap();

        assert_eq!(session.token.len(), TOKEN_BYTES * 2);
        assert!(is_well_formed(&session.token));
        assert!(session.expires_at >= before + Duration::days(7));
        assert!(session.expires_at <= Utc::now() + Duration::days(7));
        assert_eq!(sessions.expiration_duration().num_seconds(), 604_800);
    }

    #[tokio::test]
    async fn tokens_differ_between_sessions() {
        let (_, sessions) = service();
        let owner = Uuid::new_v4();
        let a = sessions.create(owner).await.unwrap();
        let b = sessions.create(owner).await.unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn malformed_tokens_resolve_to_none() {
        let (_, sessions) = service();
        assert!(sessions.find_valid_by_token("").await.unwrap().is_none());
        assert!(sessions.find_valid_by_token("not hex!").await.unwrap().is_none());
        assert!(sessions.find_valid_by_token("abcdef").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_not_valid_but_still_exist() {
        let (_, sessions) = service();
        let created = sessions.create(Uuid::new_v4()).await.unwrap();
        assert!(sessions.find_valid_by_token(&created.token).await.unwrap().is_some());

        let expired = sessions.expire_by_id(created.id).await.unwrap();
        assert!(expired.expires_at < created.expires_at);
        assert!(expired.updated_at > created.updated_at);

        assert!(sessions.find_valid_by_token(&created.token).await.unwrap().is_none());
        assert!(sessions.find_by_id(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expiring_twice_keeps_the_earlier_expiry() {
        let (_, sessions) = service();
        let created = sessions.create(Uuid::new_v4()).await.unwrap();
        let first = sessions.expire_by_id(created.id).await.unwrap();
        let second = sessions.expire_by_id(created.id).await.unwrap();
        assert_eq!(first.expires_at, second.expires_at);
    }
}
