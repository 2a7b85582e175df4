use std::sync::{Arc, RwLock};

use serde::Deserialize;
use thiserror::Error;

/// Login errors, in order of where they surface: before the request,
/// from the server's answer, or from the transport.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Please enter username and password.")]
    MissingFields,

    /// The server rejected the credentials; carries its message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Network error or server unreachable.")]
    Connectivity(#[from] reqwest::Error),
}

/// A username/password pair as entered, before trimming.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Trim both fields; either one empty is a local error and no request
    /// may be issued.
    pub fn validate(&self) -> Result<(&str, &str), LoginError> {
        let username = self.username.trim();
        let password = self.password.trim();

        if username.is_empty() || password.is_empty() {
            return Err(LoginError::MissingFields);
        }

        Ok((username, password))
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Authenticate against the login endpoint.
///
/// One POST per call, no retry. Returns the trimmed username that becomes
/// the session identity.
pub async fn login(login_url: &str, credentials: &Credentials) -> Result<String, LoginError> {
    let (username, password) = credentials.validate()?;

    let client = reqwest::Client::new();
    let response = client
        .post(login_url)
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;

    let body: LoginResponse = response.json().await?;

    if body.success {
        Ok(username.to_string())
    } else {
        Err(LoginError::Rejected(
            body.message.unwrap_or_else(|| "Login failed.".to_string()),
        ))
    }
}

/// Where a session is in its lifecycle.
///
/// There is no path back to `LoggedOut` short of dropping the session;
/// logout is not a thing this client does.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    /// Logged in, channel currently down.
    Disconnected { username: String },
    /// Logged in, channel live.
    Connected { username: String },
}

/// Shared session identity and lifecycle state.
///
/// Cloneable; the handle and receiver hold clones of the same session, so
/// the channel state they observe is the one the receiver maintains.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::LoggedOut)),
        }
    }

    /// Run the login flow, tracking state across the round-trip.
    ///
    /// Validation failures happen before any transition or network traffic.
    /// Repeated calls issue repeated requests; that is fine. A failure never
    /// demotes a session that is already logged in.
    pub async fn login(
        &self,
        login_url: &str,
        credentials: &Credentials,
    ) -> Result<String, LoginError> {
        credentials.validate()?;

        self.begin_login();

        match login(login_url, credentials).await {
            Ok(username) => {
                self.finish_login(username.clone());
                Ok(username)
            }
            Err(e) => {
                self.abort_login();
                Err(e)
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or(SessionState::LoggedOut)
    }

    /// The session identity, once logged in.
    pub fn username(&self) -> Option<String> {
        match self.state() {
            SessionState::Disconnected { username } | SessionState::Connected { username } => {
                Some(username)
            }
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state(), SessionState::Connected { .. })
    }

    fn begin_login(&self) {
        if let Ok(mut state) = self.state.write()
            && *state == SessionState::LoggedOut
        {
            *state = SessionState::Authenticating;
        }
    }

    pub(crate) fn finish_login(&self, username: String) {
        if let Ok(mut state) = self.state.write()
            && matches!(*state, SessionState::LoggedOut | SessionState::Authenticating)
        {
            *state = SessionState::Disconnected { username };
        }
    }

    fn abort_login(&self) {
        if let Ok(mut state) = self.state.write()
            && *state == SessionState::Authenticating
        {
            *state = SessionState::LoggedOut;
        }
    }

    pub(crate) fn channel_up(&self) {
        if let Ok(mut state) = self.state.write()
            && let SessionState::Disconnected { username } = &*state
        {
            *state = SessionState::Connected {
                username: username.clone(),
            };
        }
    }

    pub(crate) fn channel_down(&self) {
        if let Ok(mut state) = self.state.write()
            && let SessionState::Connected { username } = &*state
        {
            *state = SessionState::Disconnected {
                username: username.clone(),
            };
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_trimmed_credentials() {
        let credentials = Credentials::new("  ash  ", " pikachu ");
        let (username, password) = credentials.validate().unwrap();

        assert_eq!(username, "ash");
        assert_eq!(password, "pikachu");
    }

    #[test]
    fn test_validate_rejects_empty_username() {
        let credentials = Credentials::new("", "secret");

        assert!(matches!(
            credentials.validate(),
            Err(LoginError::MissingFields)
        ));
    }

    #[test]
    fn test_validate_rejects_whitespace_password() {
        let credentials = Credentials::new("ash", "   ");

        assert!(matches!(
            credentials.validate(),
            Err(LoginError::MissingFields)
        ));
    }

    #[tokio::test]
    async fn test_login_with_missing_fields_makes_no_request() {
        let session = Session::new();
        // An unresolvable URL: if validation did not short-circuit, this
        // would surface as Connectivity instead.
        let result = session
            .login("http://login.invalid", &Credentials::new("  ", ""))
            .await;

        assert!(matches!(result, Err(LoginError::MissingFields)));
        assert_eq!(session.state(), SessionState::LoggedOut);
    }

    #[test]
    fn test_channel_lifecycle_transitions() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert_eq!(session.username(), None);

        session.finish_login("ash".to_string());
        assert_eq!(session.username(), Some("ash".to_string()));
        assert!(!session.is_connected());

        session.channel_up();
        assert!(session.is_connected());

        session.channel_down();
        assert!(!session.is_connected());
        // Still logged in after a drop.
        assert_eq!(session.username(), Some("ash".to_string()));

        session.channel_up();
        assert!(session.is_connected());
    }

    #[test]
    fn test_channel_up_requires_login() {
        let session = Session::new();
        session.channel_up();

        assert_eq!(session.state(), SessionState::LoggedOut);
    }
}
