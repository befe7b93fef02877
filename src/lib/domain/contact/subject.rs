//! Contact subject

use std::{fmt, str::FromStr};

use thiserror::Error;

/// The subject token was not one of the known subjects
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown subject \"{0}\"")]
pub struct UnknownSubject(pub String);

/// What a contact request is about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Collaboration or partnership
    Collab,

    /// Gifting or product test
    Gifting,

    /// Event or party
    Evenement,

    /// Press or interview
    Presse,

    /// Anything else
    Autre,
}

impl Subject {
    /// Every subject, in the order the form lists them
    pub const ALL: [Subject; 5] = [
        Subject::Collab,
        Subject::Gifting,
        Subject::Evenement,
        Subject::Presse,
        Subject::Autre,
    ];

    /// The token the form submits for this subject
    pub fn token(&self) -> &'static str {
        match self {
            Subject::Collab => "collab",
            Subject::Gifting => "gifting",
            Subject::Evenement => "evenement",
            Subject::Presse => "presse",
            Subject::Autre => "autre",
        }
    }

    /// Human readable label used in outgoing emails
    pub fn label(&self) -> &'static str {
        match self {
            Subject::Collab => "Collaboration / Partnership",
            Subject::Gifting => "Gifting / Product test",
            Subject::Evenement => "Event / Party",
            Subject::Presse => "Press / Interview",
            Subject::Autre => "Other request",
        }
    }
}

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.token() == token)
            .ok_or_else(|| UnknownSubject(token.to_string()))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
