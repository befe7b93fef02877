//! Contact form module
//!
//! The submission pipeline, from the browser-side form state to the
//! gateway-side gates and the email sent to the site owner.

pub mod emails;
pub mod errors;
pub mod form;
pub mod rate_limit;
pub mod service;
pub mod subject;
pub mod submission;

pub use errors::ContactError;
pub use rate_limit::{RateLimitStore, SessionId};
pub use service::{ContactService, ContactServiceImpl, ContactSettings, Delivery};
pub use subject::Subject;
pub use submission::{ContactForm, Field, Submission};
