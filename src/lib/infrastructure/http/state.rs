//! Application state module

use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use chrono::{DateTime, Utc};

use crate::domain::contact::ContactService;

/// Application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// The only origin granted CORS access to the API
    pub allowed_origin: HeaderValue,

    /// Mark session cookies `Secure`, for deployments served over HTTPS
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(allowed_origin: &str) -> Result<Self> {
        let allowed_origin = HeaderValue::from_str(allowed_origin)
            .with_context(|| format!("invalid allowed origin \"{allowed_origin}\""))?;

        Ok(Self {
            allowed_origin,
            secure_cookies: false,
        })
    }

    /// Set whether session cookies are marked `Secure`
    pub fn with_secure_cookies(self, secure_cookies: bool) -> Self {
        Self {
            secure_cookies,
            ..self
        }
    }
}

/// Global application state
#[derive(Clone)]
pub struct AppState<C: ContactService> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// The application configuration
    pub config: AppConfig,

    /// Contact service
    pub contact: Arc<C>,
}

/// Implementation of the application state
impl<C> AppState<C>
where
    C: ContactService,
{
    /// Create a new application state
    pub fn new(config: AppConfig, contact: C) -> Self {
        Self {
            start_time: Utc::now(),
            config,
            contact: Arc::new(contact),
        }
    }
}

impl<C> fmt::Debug for AppState<C>
where
    C: ContactService,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("config", &self.config)
            .field("contact", &"ContactService")
            .finish()
    }
}

#[cfg(test)]
use crate::domain::contact::service::MockContactService;

#[cfg(test)]
pub const TEST_ALLOWED_ORIGIN: &str = "https://www.example.com";

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig::new(TEST_ALLOWED_ORIGIN).expect("valid origin")
}

#[cfg(test)]
pub fn test_state(contact: Option<MockContactService>) -> AppState<MockContactService> {
    AppState::new(test_config(), contact.unwrap_or_default())
}
