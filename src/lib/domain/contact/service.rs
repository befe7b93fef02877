//! Contact service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{error, info, warn};

#[cfg(test)]
use mockall::mock;

use crate::domain::{
    communication::{email_addresses::EmailAddress, mailer::Mailer},
    contact::{
        emails::new_message::compose,
        errors::ContactError,
        rate_limit::{RateLimitStore, SessionId},
        submission::ContactForm,
    },
};

/// Settings for outgoing contact messages
#[derive(Clone, Debug)]
pub struct ContactSettings {
    /// Where contact messages are delivered
    pub recipient: EmailAddress,

    /// Prefix of every outgoing subject line
    pub subject_prefix: String,

    /// Site name shown in the email
    pub site_name: String,

    /// Minimum time between two messages from one session
    pub rate_limit_window: Duration,
}

/// What happened to an accepted submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The message was handed to the mail transport
    Sent,

    /// The honeypot was filled; nothing was sent
    Discarded,
}

/// Contact service
#[async_trait]
pub trait ContactService: Clone + Send + Sync + 'static {
    /// Gates, validates and forwards a contact form submission.
    ///
    /// # Arguments
    /// * `session` - The [`SessionId`] of the browser session submitting the form.
    /// * `form` - The raw [`ContactForm`] as posted.
    ///
    /// # Returns
    /// - [`Ok`] with the [`Delivery`] outcome. Bots get [`Delivery::Discarded`],
    ///   which callers must report exactly like [`Delivery::Sent`].
    /// - [`Err`] containing a [`ContactError`] if the session is rate limited,
    ///   the form is invalid or the message could not be sent.
    async fn send_message(
        &self,
        session: &SessionId,
        form: ContactForm,
    ) -> Result<Delivery, ContactError>;
}

#[cfg(test)]
mock! {
    pub ContactService {}

    impl Clone for ContactService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl ContactService for ContactService {
        async fn send_message(
            &self,
            session: &SessionId,
            form: ContactForm,
        ) -> Result<Delivery, ContactError>;
    }
}

/// Contact service implementation
#[derive(Debug, Clone)]
pub struct ContactServiceImpl<S, M>
where
    S: RateLimitStore,
    M: Mailer,
{
    settings: Arc<ContactSettings>,
    rate_limits: Arc<S>,
    mailer: Arc<M>,
}

impl<S, M> ContactServiceImpl<S, M>
where
    S: RateLimitStore,
    M: Mailer,
{
    /// Creates a new contact service
    pub fn new(settings: ContactSettings, rate_limits: Arc<S>, mailer: Arc<M>) -> Self {
        Self {
            settings: Arc::new(settings),
            rate_limits,
            mailer,
        }
    }
}

#[async_trait]
impl<S, M> ContactService for ContactServiceImpl<S, M>
where
    S: RateLimitStore,
    M: Mailer,
{
    async fn send_message(
        &self,
        session: &SessionId,
        form: ContactForm,
    ) -> Result<Delivery, ContactError> {
        let form = form.sanitized();

        if form.is_bot() {
            warn!(%session, "honeypot field filled, discarding contact message");
            return Ok(Delivery::Discarded);
        }

        let now = Utc::now();

        if let Some(last_sent_at) = self.rate_limits.get(session).await? {
            if now.signed_duration_since(last_sent_at) < self.settings.rate_limit_window {
                warn!(%session, %last_sent_at, "contact message rate limited");
                return Err(ContactError::RateLimited);
            }
        }

        let submission = form.validate().map_err(ContactError::InvalidSubmission)?;
        let message = compose(&self.settings, &submission, now)?;

        if let Err(err) = self.mailer.send(&message).await {
            error!(%session, error = %err, details = ?err, "could not send contact message");
            return Err(err.into());
        }

        // The mail is already out, so a failed write must not turn into an error response.
        if let Err(err) = self.rate_limits.set(session, now).await {
            error!(%session, error = ?err, "could not record contact message send time");
        }

        info!(
            %session,
            subject = submission.subject.token(),
            "contact message sent"
        );

        Ok(Delivery::Sent)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use testresult::TestResult;

    use crate::domain::{
        communication::mailer::{MailerError, MockMailer},
        contact::{rate_limit::MockRateLimitStore, submission::Field},
    };

    use super::*;

    fn settings() -> ContactSettings {
        ContactSettings {
            recipient: EmailAddress::new("owner@example.com").expect("valid email"),
            subject_prefix: "[Contact] New message".to_string(),
            site_name: "Example".to_string(),
            rate_limit_window: Duration::seconds(60),
        }
    }

    fn valid_form() -> ContactForm {
        ContactForm {
            name: "Jo".to_string(),
            email: "jo@x.com".to_string(),
            subject: "collab".to_string(),
            message: "Hello there, interested!".to_string(),
            website: String::new(),
        }
    }

    fn service(
        rate_limits: MockRateLimitStore,
        mailer: MockMailer,
    ) -> ContactServiceImpl<MockRateLimitStore, MockMailer> {
        ContactServiceImpl::new(settings(), Arc::new(rate_limits), Arc::new(mailer))
    }

    #[tokio::test]
    async fn test_send_message_success() -> TestResult {
        let session = SessionId::generate();

        let mut rate_limits = MockRateLimitStore::new();
        rate_limits
            .expect_get()
            .times(1)
            .withf(move |s| *s == session)
            .returning(|_| Ok(None));
        rate_limits
            .expect_set()
            .times(1)
            .withf(move |s, _| *s == session)
            .returning(|_, _| Ok(()));

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .withf(|message| {
                message.to.as_str() == "owner@example.com"
                    && message.subject == "[Contact] New message - Collaboration / Partnership"
                    && message
                        .reply_to
                        .as_ref()
                        .is_some_and(|r| r.address.as_str() == "jo@x.com" && r.name == "Jo")
                    && message.plain_body.contains("Hello there, interested!")
            })
            .returning(|_| Ok(()));

        let delivery = service(rate_limits, mailer)
            .send_message(&session, valid_form())
            .await?;

        assert_eq!(delivery, Delivery::Sent);

        Ok(())
    }

    #[tokio::test]
    async fn test_honeypot_discards_without_touching_anything() -> TestResult {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits.expect_get().never();
        rate_limits.expect_set().never();

        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let form = ContactForm {
            name: "J".to_string(),
            website: "https://spam.example".to_string(),
            ..valid_form()
        };

        let delivery = service(rate_limits, mailer)
            .send_message(&SessionId::generate(), form)
            .await?;

        assert_eq!(delivery, Delivery::Discarded);

        Ok(())
    }

    #[tokio::test]
    async fn test_recent_send_is_rate_limited() {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits
            .expect_get()
            .returning(|_| Ok(Some(Utc::now() - Duration::seconds(59))));
        rate_limits.expect_set().never();

        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let result = service(rate_limits, mailer)
            .send_message(&SessionId::generate(), valid_form())
            .await;

        assert!(matches!(result, Err(ContactError::RateLimited)));
    }

    #[tokio::test]
    async fn test_rate_limit_applies_before_validation() {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits
            .expect_get()
            .returning(|_| Ok(Some(Utc::now() - Duration::seconds(1))));

        let result = service(rate_limits, MockMailer::new())
            .send_message(&SessionId::generate(), ContactForm::default())
            .await;

        assert!(matches!(result, Err(ContactError::RateLimited)));
    }

    #[tokio::test]
    async fn test_send_after_window_is_allowed() -> TestResult {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits
            .expect_get()
            .returning(|_| Ok(Some(Utc::now() - Duration::seconds(61))));
        rate_limits.expect_set().times(1).returning(|_, _| Ok(()));

        let mut mailer = MockMailer::new();
        mailer.expect_send().times(1).returning(|_| Ok(()));

        let delivery = service(rate_limits, mailer)
            .send_message(&SessionId::generate(), valid_form())
            .await?;

        assert_eq!(delivery, Delivery::Sent);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_form_reports_every_violation() {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits.expect_get().returning(|_| Ok(None));
        rate_limits.expect_set().never();

        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let form = ContactForm {
            name: "J".to_string(),
            email: "bad".to_string(),
            subject: String::new(),
            message: "hi".to_string(),
            website: String::new(),
        };

        let result = service(rate_limits, mailer)
            .send_message(&SessionId::generate(), form)
            .await;

        match result {
            Err(ContactError::InvalidSubmission(fields)) => assert_eq!(
                fields,
                vec![Field::Name, Field::Email, Field::Subject, Field::Message]
            ),
            other => panic!("expected an invalid submission, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_markup_is_stripped_before_validation() {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits.expect_get().returning(|_| Ok(None));

        let form = ContactForm {
            name: "<b>J</b>".to_string(),
            ..valid_form()
        };

        let result = service(rate_limits, MockMailer::new())
            .send_message(&SessionId::generate(), form)
            .await;

        assert!(
            matches!(result, Err(ContactError::InvalidSubmission(fields)) if fields == vec![Field::Name])
        );
    }

    #[tokio::test]
    async fn test_mailer_failure_does_not_record_send() {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits.expect_get().returning(|_| Ok(None));
        rate_limits.expect_set().never();

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(MailerError::SendError("connection refused".to_string())));

        let result = service(rate_limits, mailer)
            .send_message(&SessionId::generate(), valid_form())
            .await;

        assert!(matches!(
            result,
            Err(ContactError::CouldNotSendEmail(MailerError::SendError(_)))
        ));
    }

    #[tokio::test]
    async fn test_store_write_failure_still_reports_sent() -> TestResult {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits.expect_get().returning(|_| Ok(None));
        rate_limits
            .expect_set()
            .times(1)
            .returning(|_, _| Err(anyhow!("store unavailable")));

        let mut mailer = MockMailer::new();
        mailer.expect_send().times(1).returning(|_| Ok(()));

        let delivery = service(rate_limits, mailer)
            .send_message(&SessionId::generate(), valid_form())
            .await?;

        assert_eq!(delivery, Delivery::Sent);

        Ok(())
    }

    #[tokio::test]
    async fn test_store_read_failure_is_unknown_error() {
        let mut rate_limits = MockRateLimitStore::new();
        rate_limits
            .expect_get()
            .returning(|_| Err(anyhow!("store unavailable")));

        let mut mailer = MockMailer::new();
        mailer.expect_send().never();

        let result = service(rate_limits, mailer)
            .send_message(&SessionId::generate(), valid_form())
            .await;

        assert!(matches!(result, Err(ContactError::UnknownError(_))));
    }
}
