//! Emails sent by the contact module

pub mod new_message;
