//! In-memory rate limit store

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::contact::rate_limit::{RateLimitStore, SessionId};

/// Keeps the last send time of each session in process memory
///
/// Entries older than the retention period are dropped whenever a new send is
/// recorded.
#[derive(Debug, Clone)]
pub struct InMemoryRateLimitStore {
    retention: Duration,
    last_sent: Arc<Mutex<HashMap<SessionId, DateTime<Utc>>>>,
}

impl InMemoryRateLimitStore {
    /// Creates an empty store that forgets sends older than `retention`
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            last_sent: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of sessions currently tracked
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether no session is tracked
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, DateTime<Utc>>>> {
        self.last_sent
            .lock()
            .map_err(|_| anyhow!("rate limit store lock poisoned"))
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, session: &SessionId) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock()?.get(session).copied())
    }

    async fn set(&self, session: &SessionId, sent_at: DateTime<Utc>) -> Result<()> {
        let mut last_sent = self.lock()?;

        last_sent.retain(|_, at| sent_at.signed_duration_since(*at) < self.retention);
        last_sent.insert(*session, sent_at);

        Ok(())
    }
}
