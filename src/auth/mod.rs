//! Session management.
//!
//! Credentials are compared in the clear against the static user list. The
//! comparison is constant-time, but there is no hashing or lockout.

use subtle::ConstantTimeEq;

use crate::db::{Slot, Store};
use crate::errors::AppError;
use crate::models::{Session, User};
use crate::seed;

/// Owns the single persisted session slot.
#[derive(Clone)]
pub struct SessionManager {
    store: Store,
    users: Vec<User>,
}

impl SessionManager {
    pub fn new(store: Store) -> Self {
        Self::with_users(store, seed::users())
    }

    pub fn with_users(store: Store, users: Vec<User>) -> Self {
        Self { store, users }
    }

    /// Authenticate and persist the session, replacing any previous one.
    ///
    /// On failure the stored session is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let user = self
            .users
            .iter()
            .find(|u| credentials_match(u, username, password))
            .ok_or_else(|| {
                tracing::info!(username, "Rejected login");
                AppError::InvalidCredentials
            })?;

        let session = Session::from(user);
        self.store.replace(Slot::Session, &session).await?;

        tracing::info!(user_id = %session.user_id, role = ?session.role, "Logged in");
        Ok(session)
    }

    /// Clear the session. Idempotent.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.store.remove(Slot::Session).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Current session, if any.
    pub async fn get_session(&self) -> Result<Option<Session>, AppError> {
        self.store.get(Slot::Session).await
    }
}

fn credentials_match(user: &User, username: &str, password: &str) -> bool {
    // Evaluate both so timing does not reveal which one failed
    let username_ok = constant_time_compare(&user.username, username);
    let password_ok = constant_time_compare(&user.password, password);
    username_ok & password_ok
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
