use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::ports::{PasswordHasher, UserRepository};
use crate::schemas::authentication::Credentials;
use crate::schemas::user::UserResponse;

pub struct AuthenticationService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthenticationService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Verifies an `{email, password}` payload. Unknown emails still pay for
    /// one hash comparison so both failure paths take about as long.
    #[instrument(skip_all)]
    pub async fn authenticated_user(&self, payload: &Value) -> Result<UserResponse, AppError> {
        let credentials = Credentials::from_json(payload)?;

        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            self.hasher
                .compare(&credentials.password, self.hasher.placeholder_hash())
                .await?;
            debug!("Login attempt for unknown email");
            return Err(AppError::unauthorized()
                .with_message("Não existe usuário cadastrado com esse e-mail")
                .with_action("Verifique se o e-mail foi digitado corretamente"));
        };

        if !self.hasher.compare(&credentials.password, &user.password_hash).await? {
            debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AppError::unauthorized()
                .with_message("Senha incorreta")
                .with_action("Verifique se a senha foi digitada corretamente"));
        }

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::memory::InMemoryStore;
    use crate::services::testing::CountingHasher;
    use crate::services::UserService;
    use serde_json::json;

    async fn setup() -> (Arc<CountingHasher>, AuthenticationService) {
        let store = Arc::new(InMemoryStore::new());
        let hasher = Arc::new(CountingHasher::default());
        UserService::new(store.clone(), hasher.clone())
            .create(&json!({
                "email": "ana@example.com",
                "username": "ana",
                "password": "segredo12345",
            }))
            .await
            .unwrap();
        (hasher.clone(), AuthenticationService::new(store, hasher))
    }

    #[tokio::test]
    async fn correct_credentials_return_the_user() {
        let (_, auth) = setup().await;
        let user = auth
            .authenticated_user(&json!({ "email": "ana@example.com", "password": "segredo12345" }))
            .await
            .unwrap();
        assert_eq!(user.username, "ana");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (_, auth) = setup().await;
        let err = auth
            .authenticated_user(&json!({ "email": "ana@example.com", "password": "outrasenha123" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), "Senha incorreta");
    }

    #[tokio::test]
    async fn unknown_email_still_compares_once() {
        let (hasher, auth) = setup().await;
        let before = hasher.comparisons();
        let err = auth
            .authenticated_user(&json!({ "email": "ninguem@example.com", "password": "x" }))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.message(), "Não existe usuário cadastrado com esse e-mail");
        assert_eq!(hasher.comparisons(), before + 1);
    }

    #[tokio::test]
    async fn missing_fields_fail_as_unknown_email() {
        let (_, auth) = setup().await;
        let err = auth.authenticated_user(&json!({})).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}
