use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback identity when nothing is configured.
pub const DEFAULT_USERNAME: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Username {
    fn default() -> Self {
        Username(DEFAULT_USERNAME.to_string())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Username(s)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Username(s.to_string())
    }
}

/// The identity every gateway call and view is scoped to. Built once at
/// startup and handed to the services that need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: Username,
}

impl Session {
    pub fn new(username: impl Into<Username>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Picks the first non-blank candidate, falling back to `default`.
    pub fn resolve<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let username = candidates
            .into_iter()
            .flatten()
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty())
            .map(Username)
            .unwrap_or_default();

        Self { username }
    }
}
