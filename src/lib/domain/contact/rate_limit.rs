//! Per-session send rate limiting

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg(test)]
use mockall::mock;

/// Opaque identity of a browser session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a new session id
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse a session id previously handed out by [`SessionId::generate`]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stores the time each session last sent a message
#[async_trait]
pub trait RateLimitStore: Clone + Send + Sync + 'static {
    /// Returns when `session` last sent a message, if it ever did.
    async fn get(&self, session: &SessionId) -> Result<Option<DateTime<Utc>>>;

    /// Records that `session` sent a message at `sent_at`.
    async fn set(&self, session: &SessionId, sent_at: DateTime<Utc>) -> Result<()>;
}

#[cfg(test)]
mock! {
    pub RateLimitStore {}

    impl Clone for RateLimitStore {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl RateLimitStore for RateLimitStore {
        async fn get(&self, session: &SessionId) -> Result<Option<DateTime<Utc>>>;
        async fn set(&self, session: &SessionId, sent_at: DateTime<Utc>) -> Result<()>;
    }
}
