use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

use medley_core::random_string;

use crate::{NewUser, Storage, StorageError, UserData};

pub struct Auth<S> {
    storage: Arc<S>,
    argon: Argon2<'static>,
    /// Sessions are process-local. Restarting the server logs everyone
    /// out, which matches how the original app treated sessions.
    sessions: RwLock<HashMap<String, Session>>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// No session exists for the supplied token
    #[error("Session does not exist")]
    UnknownSession,
    /// Something else went wrong with storage
    #[error(transparent)]
    Storage(StorageError),
    #[error("HashError: {0}")]
    HashError(String),
}

/// A logged-in session
#[derive(Debug, Clone)]
pub struct Session {
    /// The session token, or key if you will
    pub token: String,
    /// The user that is logged in
    pub user: UserData,
    pub expires_at: DateTime<Utc>,
}

impl<S> Auth<S>
where
    S: Storage,
{
    const SESSION_DURATION_IN_DAYS: usize = 7;

    pub fn new(storage: &Arc<S>) -> Self {
        Self {
            storage: storage.clone(),
            argon: Argon2::default(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Logs in a user, returning a new session
    pub async fn login(&self, credentials: Credentials) -> Result<Session, AuthError> {
        self.clear_expired();

        let user = self
            .storage
            .user_by_username(&credentials.username)
            .await
            .map_err(|e| match e {
                StorageError::NotFound { .. } => AuthError::InvalidCredentials,
                err => AuthError::Storage(err),
            })?;

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let session = Session {
            token: random_string(32),
            expires_at: Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS as i64),
            user,
        };

        self.sessions
            .write()
            .insert(session.token.clone(), session.clone());

        Ok(session)
    }

    /// Deletes the associated session, if it exists
    pub fn logout(&self, token: &str) {
        self.sessions.write().remove(token);
    }

    /// Creates a user with a hashed password credential
    pub async fn register(&self, new_user: NewPlainUser) -> Result<UserData, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.storage
            .create_user(NewUser {
                username: new_user.username,
                password: hashed_password,
                display_name: new_user.display_name,
                avatar_url: new_user.avatar_url,
            })
            .await
            .map_err(AuthError::Storage)
    }

    /// Returns a live session if the token matches one
    pub fn session(&self, token: &str) -> Result<Session, AuthError> {
        self.sessions
            .read()
            .get(token)
            .filter(|session| session.expires_at > Utc::now())
            .cloned()
            .ok_or(AuthError::UnknownSession)
    }

    fn clear_expired(&self) {
        let now = Utc::now();
        self.sessions
            .write()
            .retain(|_, session| session.expires_at > now);
    }
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewPlainUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
