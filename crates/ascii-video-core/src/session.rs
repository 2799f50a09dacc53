//! Session types for stream session tracking.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a stream session.
///
/// `Init -> Streaming -> {Closed, Error}`; both terminal states run the same cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Preamble not yet written
    Init,
    /// Emitting frames
    Streaming,
    /// Consumer went away or the session was cancelled
    Closed,
    /// An internal fault ended the session
    Error,
}
