//! Authenticated User Convenience Layer
//!
//! [`UserSession`] wraps a [`Session`] and reserves one well-known key
//! for the authenticated principal. Logging in rotates the session id,
//! the standard fixation mitigation on privilege escalation.

use crate::error::SessionError;
use crate::session::Session;
use serde_json::Value;

/// Default value key the user id lives under.
pub const USER_ID_KEY: &str = "_user_id";

/// Session with a tracked authenticated user.
#[derive(Debug)]
pub struct UserSession {
    inner: Session,
    key: String,
}

impl UserSession {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self::with_key(session, USER_ID_KEY)
    }

    /// Uses a custom value key for the user id, for applications that
    /// already reserve `_user_id`.
    #[must_use]
    pub fn with_key(session: Session, key: impl Into<String>) -> Self {
        Self {
            inner: session,
            key: key.into(),
        }
    }

    /// Marks the user as logged in and rotates the session id so the
    /// pre-authentication id cannot be replayed with the new
    /// privileges.
    pub async fn login(&mut self, user_id: impl Into<Value>) -> Result<(), SessionError> {
        self.inner.set_value(&self.key, user_id.into());
        self.inner.regenerate_id().await?;
        Ok(())
    }

    /// Clears the logged-in user. The session itself stays open; call
    /// [`Session::destroy`] to drop everything.
    pub fn logout(&mut self) {
        self.inner.remove_value(&self.key);
    }

    /// The logged-in user's id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&Value> {
        self.inner.value(&self.key)
    }

    #[must_use]
    pub fn is_logged(&self) -> bool {
        self.inner.has_value(&self.key)
    }

    // Lifecycle passthroughs.

    pub fn create(&mut self) -> Result<(), SessionError> {
        self.inner.create()
    }

    pub async fn open(&mut self, create_if_absent: bool) -> Result<bool, SessionError> {
        self.inner.open(create_if_absent).await
    }

    pub async fn close(&mut self) -> Result<(), SessionError> {
        self.inner.close().await
    }

    pub async fn destroy(&mut self) -> Result<(), SessionError> {
        self.inner.destroy().await
    }

    /// Borrows the wrapped session for value access and introspection.
    #[must_use]
    pub fn inner(&self) -> &Session {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut Session {
        &mut self.inner
    }
}

impl From<Session> for UserSession {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
