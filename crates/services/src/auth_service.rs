//! The auth collaborator: an explicit async port with HTTP and in-memory
//! backends. Rejected credentials are `Ok(None)`, never an error, so a
//! failed login or signup leaves the caller's state exactly as it was.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use quiz_storage::StoreScope;

use crate::error::AuthError;

/// The identity the backend hands back on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Async port to whatever actually owns the user database.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Checks credentials. `Ok(None)` means rejected, `Err` means the
    /// backend itself failed.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, AuthError>;

    /// Registers a new account. `Ok(None)` means the email is taken.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, AuthError>;
}

//
// ─── HTTP BACKEND ──────────────────────────────────────────────────────────────
//

/// Thin wrapper over a hosted auth service speaking JSON.
#[derive(Clone)]
pub struct HttpAuthBackend {
    client: Client,
    base_url: String,
}

impl HttpAuthBackend {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, AuthError> {
        let response = self
            .client
            .post(self.endpoint("auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Ok(None),
            status => Err(AuthError::HttpStatus(status)),
        }
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, AuthError> {
        let response = self
            .client
            .post(self.endpoint("auth/signup"))
            .json(&SignupRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            reqwest::StatusCode::CONFLICT => Ok(None),
            status => Err(AuthError::HttpStatus(status)),
        }
    }
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredUser {
    profile: UserProfile,
    password: String,
}

/// Fixture backend for tests and offline use.
#[derive(Clone, Default)]
pub struct InMemoryAuthBackend {
    users: Arc<Mutex<Vec<StoredUser>>>,
}

impl InMemoryAuthBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one account.
    #[must_use]
    pub fn with_user(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        {
            let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            users.push(StoredUser {
                profile: UserProfile {
                    id: id.into(),
                    name: name.into(),
                    email: email.into(),
                },
                password: password.into(),
            });
        }
        self
    }
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, AuthError> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users
            .iter()
            .find(|u| u.profile.email == email && u.password == password)
            .map(|u| u.profile.clone()))
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, AuthError> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        if users.iter().any(|u| u.profile.email == email) {
            return Ok(None);
        }
        let profile = UserProfile {
            id: format!("u{}", users.len() + 1),
            name: name.to_string(),
            email: email.to_string(),
        };
        users.push(StoredUser {
            profile: profile.clone(),
            password: password.to_string(),
        });
        Ok(Some(profile))
    }
}

//
// ─── AUTH SERVICE ──────────────────────────────────────────────────────────────
//

/// Holds the current identity and drives the backend.
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    current: Option<UserProfile>,
}

impl AuthService {
    #[must_use]
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    /// Attempts a login. Returns whether it succeeded.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` only for backend failures; wrong credentials are
    /// `Ok(false)`. The current identity is untouched unless login succeeds.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<bool, AuthError> {
        match self.backend.authenticate(email, password).await? {
            Some(profile) => {
                tracing::debug!(user = %profile.id, "login succeeded");
                self.current = Some(profile);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Attempts a signup; on success the new identity becomes current.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` only for backend failures; a taken email is
    /// `Ok(false)`.
    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        match self.backend.register(name, email, password).await? {
            Some(profile) => {
                self.current = Some(profile);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn logout(&mut self) {
        self.current = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    /// Storage scope for the signed-in user, or the shared device scope.
    #[must_use]
    pub fn store_scope(&self) -> StoreScope {
        match &self.current {
            Some(profile) => StoreScope::User(profile.id.clone()),
            None => StoreScope::Device,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
