//! Authenticated session.
//!
//! A [`Session`] is built once at startup (from the session file or the
//! `MUNIFOR_TOKEN` variable) and handed to whatever needs it. Nothing reads
//! the token from global state.

use std::path::Path;

use munifor_issue_models::Role;
use serde::{Deserialize, Serialize};

/// Errors from loading or saving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No token was found anywhere.
    #[error("No session token: set MUNIFOR_TOKEN or sign in to create {path}")]
    Missing {
        /// Session file that was checked.
        path: String,
    },

    /// The stored token is blank.
    #[error("Session token is empty")]
    EmptyToken,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role, which decides the map endpoint.
    pub role: Role,
}

/// Bearer token plus the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    token: String,
    #[serde(default)]
    profile: Option<UserProfile>,
}

impl Session {
    /// Creates a session from a token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] if the token is blank.
    pub fn new(token: impl Into<String>, profile: Option<UserProfile>) -> Result<Self, SessionError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        Ok(Self { token, profile })
    }

    /// Reads a session previously written by [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the file is unreadable, malformed or
    /// holds an empty token.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path)?;
        let session: Self = serde_json::from_str(&text)?;
        Self::new(session.token, session.profile)
    }

    /// Resolves the session from `token_override` (typically
    /// `MUNIFOR_TOKEN`) and the session file.
    ///
    /// An override token replaces the stored one but keeps the stored
    /// profile, so the role still selects the right map endpoint. A blank
    /// override counts as unset.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Missing`] if neither source has a token.
    pub fn resolve(token_override: Option<String>, path: &Path) -> Result<Self, SessionError> {
        let token_override = token_override.filter(|t| !t.trim().is_empty());

        if let Some(token) = token_override {
            log::debug!("Using session token from environment");
            let profile = if path.exists() {
                match Self::load(path) {
                    Ok(stored) => stored.profile,
                    Err(e) => {
                        log::warn!("Ignoring unreadable session file {}: {e}", path.display());
                        None
                    }
                }
            } else {
                None
            };
            return Self::new(token, profile);
        }
        if !path.exists() {
            return Err(SessionError::Missing {
                path: path.display().to_string(),
            });
        }
        Self::load(path)
    }

    /// Writes the session as JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The raw bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The signed-in user, if known.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Role of the signed-in user; sessions without a profile are treated
    /// as citizens.
    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.as_ref().map_or(Role::Citizen, |p| p.role)
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
