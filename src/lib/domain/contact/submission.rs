//! Contact form submissions

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    communication::email_addresses::EmailAddress, contact::subject::Subject,
};

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"<[^\s>][^>]*(?:>|$)").unwrap();
}

/// A validated form field
///
/// Variants are declared in validation order, which is also the order in which
/// violations are reported and the order used to pick the field to focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// First name or brand
    Name,

    /// Sender email address
    Email,

    /// Subject token
    Subject,

    /// Message body
    Message,
}

impl Field {
    /// Every validated field, in rule order
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    /// Whether `value` satisfies this field's rule
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();

        match self {
            Field::Name => (2..=100).contains(&value.chars().count()),
            Field::Email => EmailAddress::new(value).is_ok(),
            Field::Subject => value.parse::<Subject>().is_ok(),
            Field::Message => (10..=5000).contains(&value.chars().count()),
        }
    }

    /// The message the gateway reports when the rule fails
    pub fn violation(&self) -> &'static str {
        match self {
            Field::Name => "Invalid name.",
            Field::Email => "Invalid email.",
            Field::Subject => "Invalid subject.",
            Field::Message => "Message too short or too long.",
        }
    }

    /// The message shown next to the field in the browser
    pub fn hint(&self) -> &'static str {
        match self {
            Field::Name => "Please enter your first name (2 to 100 characters).",
            Field::Email => "Invalid email address.",
            Field::Subject => "Please choose a subject for your request.",
            Field::Message => "Your message must be between 10 and 5000 characters.",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.violation())
    }
}

/// Removes markup tags from `raw` and trims surrounding whitespace
pub fn sanitize(raw: &str) -> String {
    TAG_REGEX.replace_all(raw, "").trim().to_string()
}

/// The raw payload posted by the contact form
///
/// Missing fields deserialize as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ContactForm {
    /// First name or brand
    #[schema(example = "Jo")]
    pub name: String,

    /// Sender email address
    #[schema(example = "jo@example.com")]
    pub email: String,

    /// Subject token
    #[schema(example = "collab")]
    pub subject: String,

    /// Message body
    #[schema(example = "Hello there, interested in working together!")]
    pub message: String,

    /// Honeypot field, hidden from humans
    #[schema(example = "")]
    pub website: String,
}

impl ContactForm {
    /// Returns the form with markup stripped from every visible field
    ///
    /// The honeypot is left untouched so that any content at all flags a bot.
    pub fn sanitized(self) -> Self {
        Self {
            name: sanitize(&self.name),
            email: sanitize(&self.email),
            subject: sanitize(&self.subject),
            message: sanitize(&self.message),
            website: self.website,
        }
    }

    /// Whether the honeypot field was filled in
    pub fn is_bot(&self) -> bool {
        !self.website.is_empty()
    }

    /// The current value of `field`
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    /// Mutable access to the value of `field`
    pub fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        }
    }

    /// Every field whose rule fails, in rule order
    pub fn violations(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| !field.accepts(self.value(*field)))
            .collect()
    }

    /// Checks every rule, returning all failures rather than the first
    pub fn validate(&self) -> Result<Submission, Vec<Field>> {
        let violations = self.violations();

        if !violations.is_empty() {
            return Err(violations);
        }

        let email = EmailAddress::new(&self.email).map_err(|_| vec![Field::Email])?;
        let subject = self
            .subject
            .trim()
            .parse()
            .map_err(|_| vec![Field::Subject])?;

        Ok(Submission {
            name: self.name.trim().to_string(),
            email,
            subject,
            message: self.message.trim().to_string(),
        })
    }
}

/// A submission that passed every rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    /// First name or brand
    pub name: String,

    /// Sender email address
    pub email: EmailAddress,

    /// What the request is about
    pub subject: Subject,

    /// Message body
    pub message: String,
}
