//! New contact message email

use askama::Template;
use chrono::{DateTime, Utc};

use crate::domain::{
    communication::mailer::{Message, ReplyTo},
    contact::{errors::ContactError, service::ContactSettings, submission::Submission},
};

/// The format used for the received-at timestamp
const RECEIVED_AT_FORMAT: &str = "%d/%m/%Y at %H:%M UTC";

/// New contact message template
#[derive(Debug, Template)]
#[template(path = "emails/contact/new_message.html")]
pub struct NewContactMessageTemplate<'a> {
    /// Name of the site the form lives on
    pub site_name: &'a str,

    /// Sender's name
    pub name: &'a str,

    /// Sender's email address
    pub email: &'a str,

    /// Human readable subject
    pub subject_label: &'a str,

    /// Message body
    pub message: &'a str,

    /// When the message was received
    pub received_at: String,
}

impl<'a> NewContactMessageTemplate<'a> {
    /// Creates a new `NewContactMessageTemplate`
    pub fn new(site_name: &'a str, submission: &'a Submission, received_at: DateTime<Utc>) -> Self {
        Self {
            site_name,
            name: &submission.name,
            email: submission.email.as_str(),
            subject_label: submission.subject.label(),
            message: &submission.message,
            received_at: received_at.format(RECEIVED_AT_FORMAT).to_string(),
        }
    }

    /// Renders the plain text version of the email
    pub fn render_plain(&self) -> String {
        format!(
            "New contact message - {site_name}\n\n\
             Name / Brand : {name}\n\
             Email        : {email}\n\
             Subject      : {subject}\n\
             Date         : {received_at}\n\n\
             Message:\n{message}\n",
            site_name = self.site_name,
            name = self.name,
            email = self.email,
            subject = self.subject_label,
            received_at = self.received_at,
            message = self.message,
        )
    }
}

/// Builds the email forwarded to the site owner for `submission`
pub fn compose(
    settings: &ContactSettings,
    submission: &Submission,
    received_at: DateTime<Utc>,
) -> Result<Message, ContactError> {
    let template = NewContactMessageTemplate::new(&settings.site_name, submission, received_at);

    Ok(Message {
        to: settings.recipient.clone(),
        reply_to: Some(ReplyTo {
            name: submission.name.clone(),
            address: submission.email.clone(),
        }),
        subject: format!(
            "{} - {}",
            settings.subject_prefix,
            submission.subject.label()
        ),
        html_body: css_inline::inline(&template.render()?)?,
        plain_body: template.render_plain(),
    })
}
