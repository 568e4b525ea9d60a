//! Session-scoped credential holder
//!
//! Credentials are acquired by the caller (usually by prompting) and attached
//! to hosts at dispatch time. The holder only keeps them between dispatches
//! when the caller opted in with `retain_for_session`.

use secrecy::{ExposeSecret, SecretString};

/// Username and password used for every host of a dispatch
#[derive(Debug)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Password
    pub password: SecretString,
}

impl Credentials {
    /// Creates a credential pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Returns true if both username and password are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.expose_secret().is_empty()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

/// Holds credentials for the lifetime of an operator session
#[derive(Debug, Default)]
pub struct CredentialHolder {
    cached: Option<Credentials>,
    retain_for_session: bool,
}

impl CredentialHolder {
    /// Creates a holder; when `retain_for_session` is false nothing is cached
    #[must_use]
    pub const fn new(retain_for_session: bool) -> Self {
        Self {
            cached: None,
            retain_for_session,
        }
    }

    /// Returns whether credentials are kept between dispatches
    #[must_use]
    pub const fn retains(&self) -> bool {
        self.retain_for_session
    }

    /// Changes the retention flag; turning it off drops any cached value
    pub fn set_retain(&mut self, retain: bool) {
        self.retain_for_session = retain;
        if !retain {
            self.cached = None;
        }
    }

    /// Returns the cached credentials, if any
    #[must_use]
    pub fn cached(&self) -> Option<&Credentials> {
        self.cached.as_ref()
    }

    /// Returns cached credentials or obtains new ones from `acquire`
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `acquire`.
    pub fn resolve<F, E>(&mut self, acquire: F) -> Result<Credentials, E>
    where
        F: FnOnce() -> Result<Credentials, E>,
    {
        if let Some(cached) = &self.cached {
            tracing::debug!(username = %cached.username, "Reusing session credentials");
            return Ok(cached.clone());
        }

        let credentials = acquire()?;
        if self.retain_for_session {
            self.cached = Some(credentials.clone());
        }
        Ok(credentials)
    }

    /// Drops any cached credentials
    pub fn forget(&mut self) {
        self.cached = None;
    }
}
