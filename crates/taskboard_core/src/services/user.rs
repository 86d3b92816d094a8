use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{NewUser, DEFAULT_USER_FEATURES};
use crate::errors::AppError;
use crate::ports::{PasswordHasher, PortError, UserRepository};
use crate::schemas::user::{CreateUser, UserResponse};

fn duplicate_email() -> AppError {
    AppError::validation()
        .with_message("E-mail já cadastrado no sistema.")
        .with_action("Utilize outro email para realizar esta operação.")
}

fn duplicate_username() -> AppError {
    AppError::validation()
        .with_message("Username já cadastrado no sistema.")
        .with_action("Utilize outro username para realizar esta operação.")
}

/// Maps a unique-constraint violation raised by the store to the same error
/// the fast-path lookup would have produced.
fn registration_conflict(err: PortError) -> AppError {
    let duplicate = match &err {
        PortError::Conflict { constraint } if constraint.contains("email") => Some(duplicate_email()),
        PortError::Conflict { constraint } if constraint.contains("username") => Some(duplicate_username()),
        _ => None,
    };
    match duplicate {
        Some(duplicate) => duplicate.with_cause(err),
        None => err.into(),
    }
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Registers a user with the default feature set.
    ///
    /// Email and username are looked up concurrently first. The store's unique
    /// constraints still catch a concurrent registration that slips past them.
    #[instrument(skip_all)]
    pub async fn create(&self, payload: &Value) -> Result<UserResponse, AppError> {
        let input = CreateUser::from_json(payload)?;

        let (by_email, by_username) = futures::try_join!(
            self.users.find_by_email(&input.email),
            self.users.find_by_username(&input.username),
        )?;
        if by_email.is_some() {
            return Err(duplicate_email());
        }
        if by_username.is_some() {
            return Err(duplicate_username());
        }

        let password_hash = self.hasher.hash(&input.password).await?;
        let created = self
            .users
            .create(NewUser {
                email: input.email,
                username: input.username,
                password_hash,
                features: DEFAULT_USER_FEATURES.iter().map(|f| f.to_string()).collect(),
            })
            .await
            .map_err(registration_conflict)?;

        info!(user_id = %created.id, "User registered");
        Ok(created.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserResponse>, AppError> {
        Ok(self.users.find_by_id(id).await?.map(UserResponse::from))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserResponse>, AppError> {
        Ok(self.users.find_by_email(email).await?.map(UserResponse::from))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserResponse>, AppError> {
        Ok(self.users.find_by_username(username).await?.map(UserResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::memory::InMemoryStore;
    use crate::services::testing::CountingHasher;
    use serde_json::json;

    fn service() -> (Arc<InMemoryStore>, UserService) {
        let store = Arc::new(InMemoryStore::new());
        let hasher = Arc::new(CountingHasher::default());
        (store.clone(), UserService::new(store, hasher))
    }

    fn payload(email: &str, username: &str) -> Value {
        json!({ "email": email, "username": username, "password": "segredo12345" })
    }

    #[tokio::test]
    async fn create_grants_default_features_and_hashes_password() {
        let (store, users) = service();
        let created = users.create(&payload("ana@example.com", "ana")).await.unwrap();
        assert_eq!(created.features, DEFAULT_USER_FEATURES);

        let stored = UserRepository::find_by_id(store.as_ref(), created.id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "segredo12345");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_regardless_of_username() {
        let (_, users) = service();
        users.create(&payload("ana@example.com", "ana")).await.unwrap();
        let err = users.create(&payload("ana@example.com", "outra")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "E-mail já cadastrado no sistema.");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (_, users) = service();
        users.create(&payload("ana@example.com", "ana")).await.unwrap();
        let err = users.create(&payload("outra@example.com", "ana")).await.unwrap_err();
        assert_eq!(err.message(), "Username já cadastrado no sistema.");
    }

    #[test]
    fn store_conflicts_map_to_duplicate_messages() {
        let err = registration_conflict(PortError::Conflict {
            constraint: "users_username_key".into(),
        });
        assert_eq!(err.message(), "Username já cadastrado no sistema.");
        let err = registration_conflict(PortError::Unexpected("boom".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_the_store() {
        let (_, users) = service();
        let err = users.create(&json!({ "email": "x" })).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.issues().len(), 3);
        assert!(users.find_by_email("x").await.unwrap().is_none());
    }
}
