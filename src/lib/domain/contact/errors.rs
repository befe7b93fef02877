//! Contact errors

use thiserror::Error;
use tracing::debug;

use crate::domain::{communication::mailer::MailerError, contact::submission::Field};

/// Errors that can occur when sending a contact message
#[derive(Debug, Error)]
pub enum ContactError {
    /// The session sent a message too recently
    #[error("a message was sent from this session too recently")]
    RateLimited,

    /// One or more fields failed validation
    #[error("invalid submission: {0:?}")]
    InvalidSubmission(Vec<Field>),

    /// The mail transport failed
    #[error("could not send email: {0}")]
    CouldNotSendEmail(#[source] MailerError),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

impl From<MailerError> for ContactError {
    fn from(err: MailerError) -> Self {
        debug!("MailerError -> ContactError");

        ContactError::CouldNotSendEmail(err)
    }
}

impl From<askama::Error> for ContactError {
    fn from(err: askama::Error) -> Self {
        debug!("askama::Error -> ContactError");

        ContactError::UnknownError(err.into())
    }
}

impl From<css_inline::InlineError> for ContactError {
    fn from(err: css_inline::InlineError) -> Self {
        debug!("InlineError -> ContactError");

        ContactError::UnknownError(err.into())
    }
}
