//! Email message

use crate::domain::communication::email_addresses::EmailAddress;

/// Where replies to a message should go
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyTo {
    /// Display name of the person replies go to
    pub name: String,

    /// Address replies go to
    pub address: EmailAddress,
}

/// Email message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The recipient of the email
    pub to: EmailAddress,

    /// The Reply-To mailbox, if replies should not go to the sender
    pub reply_to: Option<ReplyTo>,

    /// The subject of the email
    pub subject: String,

    /// The HTML body of the email
    pub html_body: String,

    /// The plain text body of the email
    pub plain_body: String,
}
