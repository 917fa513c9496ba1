use std::sync::Arc;
use tokio::sync::RwLock;

use crate::app::navigation::Route;
use crate::domain::user::{Session, SignInRequest, SignUpRequest};
use crate::error::{AppError, AppResult};
use crate::http::{ApiClient, ApiError};
use crate::infra::session_store::{self, SessionStore};

/// Owner of the signed-in identity. The persisted store is read once at
/// startup; afterwards this is the single source of truth and the store only
/// mirrors it.
#[derive(Clone)]
pub struct SessionService {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionService {
    pub fn restore(api: ApiClient, store: Arc<dyn SessionStore>) -> AppResult<Self> {
        let current = session_store::load_session(store.as_ref())?;
        if let Some(session) = &current {
            tracing::debug!(user_id = session.user_id, "restored session");
        }
        Ok(Self {
            api,
            store,
            current: Arc::new(RwLock::new(current)),
        })
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// The current session, or [`AppError::NotSignedIn`] for gated views.
    pub async fn require(&self) -> AppResult<Session> {
        self.current().await.ok_or(AppError::NotSignedIn)
    }

    /// Registers an account. Registration does not sign the user in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<String> {
        let request = SignUpRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let message = self.api.sign_up(&request).await?;
        tracing::info!(email = %email, "registered account");
        Ok(message)
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session = Session::from(self.api.sign_in(&request).await?);

        let mut current = self.current.write().await;
        session_store::save_session(self.store.as_ref(), &session)?;
        *current = Some(session.clone());
        tracing::info!(user_id = session.user_id, "signed in");
        Ok(session)
    }

    /// Clears every persisted identity key and returns where to go next.
    pub async fn logout(&self) -> AppResult<Route> {
        let mut current = self.current.write().await;
        session_store::clear_session(self.store.as_ref())?;
        if let Some(session) = current.take() {
            tracing::info!(user_id = session.user_id, "signed out");
        }
        Ok(Route::Login)
    }

    /// Passes a backend result through [`SessionService::observe`].
    pub async fn checked<T>(&self, result: Result<T, ApiError>) -> AppResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self.observe(err).await),
        }
    }

    /// Drops the session when the backend rejected our identity, then hands
    /// the failure back as an [`AppError`].
    pub async fn observe(&self, err: ApiError) -> AppError {
        if err.is_auth_failure() {
            tracing::warn!(error = %err, "backend rejected session; signing out");
            if let Err(clear_err) = self.logout().await {
                tracing::error!(error = %clear_err, "failed to clear rejected session");
            }
        }
        AppError::Api(err)
    }
}
