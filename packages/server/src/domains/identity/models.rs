use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Opaque anonymous user id issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An established anonymous identity.
///
/// `id_token` is the bearer credential the document store needs when the
/// provider issues one; local identities have none.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub id_token: Option<String>,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            id_token: None,
        }
    }

    pub fn with_id_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where a session's sign-in stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    /// Sign-in has not completed yet
    Pending,
    /// Sign-in completed; the identity is fixed for the session
    Ready(Identity),
    /// Sign-in failed; the session can never submit
    Failed(String),
}

impl IdentityState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityState::Ready(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, IdentityState::Ready(_))
    }
}
