//! Users that may hold an upload session.

use derive_getters::Getters;
use galleria_error::{ConfigError, GalleriaError, GalleriaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A user record keyed by its session state token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct User {
    /// Display name
    name: String,
    /// Numeric user id
    id: i64,
    /// Session token presented in the cookie
    state: String,
    /// Whether the user is whitelisted
    #[serde(default)]
    whitelisted: bool,
}

impl User {
    /// Create a user record.
    pub fn new(
        name: impl Into<String>,
        id: i64,
        state: impl Into<String>,
        whitelisted: bool,
    ) -> Self {
        Self {
            name: name.into(),
            id,
            state: state.into(),
            whitelisted,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<User>,
}

/// Lookup table from session state to user.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_state: HashMap<String, User>,
}

impl UserDirectory {
    /// Build a directory from user records. Later records win on duplicate states.
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        let by_state = users
            .into_iter()
            .filter(|u| !u.state.is_empty())
            .map(|u| (u.state.clone(), u))
            .collect();
        Self { by_state }
    }

    /// Load users from a TOML file with a `[[users]]` array.
    ///
    /// A missing file yields an empty directory, which refuses every session.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> GalleriaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Users file not found, no sessions will be accepted");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            GalleriaError::from(ConfigError::new(format!(
                "Failed to read users file: {}",
                e
            )))
        })?;

        let file: UsersFile = toml::from_str(&content).map_err(|e| {
            GalleriaError::from(ConfigError::new(format!(
                "Failed to parse users file: {}",
                e
            )))
        })?;

        let directory = Self::new(file.users);
        tracing::info!(users = directory.len(), "Loaded users");
        Ok(directory)
    }

    /// Find the user holding session `state`.
    pub fn find_by_state(&self, state: &str) -> Option<&User> {
        self.by_state.get(state)
    }

    /// Number of users with a session state.
    pub fn len(&self) -> usize {
        self.by_state.len()
    }

    /// Check if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.by_state.is_empty()
    }
}
