//! Email addresses module.

mod email_address;

pub use email_address::{EmailAddress, EmailAddressError, MAX_EMAIL_ADDRESS_LENGTH};
