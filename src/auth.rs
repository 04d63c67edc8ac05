use std::time::Duration;

use tracing::{debug, error};

use crate::config::Language;
use crate::vendor::{Backend, Credentials, SessionToken};
use crate::Result;

const DEFAULT_USER_AGENT: &str = concat!("mel-climate/", env!("CARGO_PKG_VERSION"));

pub struct SessionBuilder {
    timeout: Duration,
    user_agent: String,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<Session> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;
        Ok(Session { http })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared HTTP session lent to the vendor client library. Cloning shares
/// the connection pool and cookie store.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Login state against the vendor backend.
#[derive(Debug)]
pub struct Authentication {
    credentials: Credentials,
    token: Option<SessionToken>,
}

impl Authentication {
    pub fn new(email: impl Into<String>, password: impl Into<String>, language: Language) -> Self {
        Self {
            credentials: Credentials {
                email: email.into(),
                password: password.into(),
                language,
            },
            token: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Single login attempt. Failures are logged and reported as `false`.
    pub async fn login(&mut self, backend: &dyn Backend, session: Option<&Session>) -> bool {
        debug!(vendor = %backend.vendor(), "login");
        self.token = None;

        let Some(session) = session else {
            return false;
        };

        match backend.login(&self.credentials, session).await {
            Ok(token) => {
                self.token = Some(token);
                true
            }
            Err(e) => {
                error!(vendor = %backend.vendor(), error = %e, "login failed");
                false
            }
        }
    }
}
