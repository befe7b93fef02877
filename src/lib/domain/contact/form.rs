//! Browser-side contact form state

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::contact::submission::{ContactForm, Field};

/// How long the success notice stays visible
pub const SUCCESS_NOTICE_DURATION: Duration = Duration::from_secs(7);

/// Result of checking every field rule
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    /// Whether every rule passed
    pub valid: bool,

    /// Message for each failing field, ordered by rule
    pub errors: BTreeMap<Field, &'static str>,
}

impl Validation {
    /// Validates `form` against the field rules
    pub fn of(form: &ContactForm) -> Self {
        let errors: BTreeMap<_, _> = form
            .violations()
            .into_iter()
            .map(|field| (field, field.hint()))
            .collect();

        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// The field that should receive focus: the first failing one in rule order
    pub fn first_error(&self) -> Option<Field> {
        self.errors.keys().next().copied()
    }
}

/// How a submission attempt ended, as seen from the browser
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The gateway accepted the message
    Sent,

    /// The gateway asked the session to wait before sending again
    TooManyRequests,

    /// Anything else: network error, unexpected status or malformed response
    Failed {
        /// Detail provided by the gateway, if any
        detail: Option<String>,
    },
}

/// Posts a contact form to the gateway
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Sends `form`, reporting how the attempt ended. Never retries.
    async fn submit(&self, form: &ContactForm) -> SubmissionOutcome;
}

#[cfg(test)]
mock! {
    pub Submitter {}

    #[async_trait]
    impl Submitter for Submitter {
        async fn submit(&self, form: &ContactForm) -> SubmissionOutcome;
    }
}

/// Kind of notice shown under the form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// The message went out
    Success,

    /// The session must wait before sending again
    Wait,

    /// The message could not be sent
    Error,
}

/// A notice shown under the form after a submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// What kind of notice this is
    pub kind: NoticeKind,

    /// Text shown to the user
    pub text: String,

    /// Hide the notice after this long, if set
    pub dismiss_after: Option<Duration>,
}

impl Notice {
    fn from_outcome(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Sent => Self {
                kind: NoticeKind::Success,
                text: "Thank you! Your message has been sent.".to_string(),
                dismiss_after: Some(SUCCESS_NOTICE_DURATION),
            },
            SubmissionOutcome::TooManyRequests => Self {
                kind: NoticeKind::Wait,
                text: "Please wait a moment before sending another message.".to_string(),
                dismiss_after: None,
            },
            SubmissionOutcome::Failed { detail } => Self {
                kind: NoticeKind::Error,
                text: detail.unwrap_or_else(|| {
                    "Your message could not be sent. Please try again later.".to_string()
                }),
                dismiss_after: None,
            },
        }
    }
}

/// What pressing the submit button led to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitAction {
    /// A request is already in flight; the button is disabled
    Inert,

    /// Validation failed; errors are shown and `focus` should receive input focus
    Invalid {
        /// First failing field in rule order
        focus: Field,
    },

    /// Validation passed; the form should be sent
    Send(ContactForm),
}

/// State of the contact form in the browser
#[derive(Debug, Default)]
pub struct ContactFormController {
    form: ContactForm,
    errors: BTreeMap<Field, &'static str>,
    focus: Option<Field>,
    in_flight: bool,
    notice: Option<Notice>,
}

impl ContactFormController {
    /// Creates an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Current field values
    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    /// Updates the value of `field`
    pub fn set(&mut self, field: Field, value: &str) {
        *self.form.value_mut(field) = value.to_string();
    }

    /// Updates the hidden honeypot field
    pub fn set_honeypot(&mut self, value: &str) {
        self.form.website = value.to_string();
    }

    /// Checks the current values without changing any state
    pub fn validate(&self) -> Validation {
        Validation::of(&self.form)
    }

    /// Error currently displayed for `field`
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// The field holding input focus after a failed validation
    pub fn focus(&self) -> Option<Field> {
        self.focus
    }

    /// Whether the submit button can be pressed
    pub fn submit_enabled(&self) -> bool {
        !self.in_flight
    }

    /// The notice currently shown, if any
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Hides the current notice
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Handles a press of the submit button.
    ///
    /// On success the errors are cleared and the button is disabled until
    /// [`ContactFormController::complete`] is called.
    pub fn submit(&mut self) -> SubmitAction {
        if self.in_flight {
            return SubmitAction::Inert;
        }

        let validation = self.validate();
        self.errors = validation.errors;
        self.focus = self.errors.keys().next().copied();

        if let Some(focus) = self.focus {
            return SubmitAction::Invalid { focus };
        }

        self.in_flight = true;
        self.notice = None;

        SubmitAction::Send(self.form.clone())
    }

    /// Applies the outcome of the in-flight request and re-enables the button
    pub fn complete(&mut self, outcome: SubmissionOutcome) -> &Notice {
        self.in_flight = false;

        if outcome == SubmissionOutcome::Sent {
            self.form = ContactForm::default();
        }

        self.notice.insert(Notice::from_outcome(outcome))
    }

    /// Validates the form and, if it passes, sends it through `submitter`.
    ///
    /// Returns the resulting notice, or [`None`] if nothing was sent.
    pub async fn send(&mut self, submitter: &impl Submitter) -> Option<&Notice> {
        match self.submit() {
            SubmitAction::Send(form) => {
                let outcome = submitter.submit(&form).await;
                Some(self.complete(outcome))
            }
            SubmitAction::Inert | SubmitAction::Invalid { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactFormController {
        let mut controller = ContactFormController::new();
        controller.set(Field::Name, "Jo");
        controller.set(Field::Email, "jo@x.com");
        controller.set(Field::Subject, "collab");
        controller.set(Field::Message, "Hello there, interested!");
        controller
    }

    #[test]
    fn test_validation_errors_are_ordered_by_rule() {
        let mut controller = ContactFormController::new();
        controller.set(Field::Message, "hi");
        controller.set(Field::Email, "bad");

        let validation = controller.validate();

        assert!(!validation.valid);
        assert_eq!(
            validation.errors.keys().copied().collect::<Vec<_>>(),
            vec![Field::Name, Field::Email, Field::Subject, Field::Message]
        );
        assert_eq!(validation.first_error(), Some(Field::Name));
    }

    #[test]
    fn test_invalid_submit_marks_fields_and_focuses_first_error() {
        let mut controller = filled();
        controller.set(Field::Email, "bad");
        controller.set(Field::Message, "short");

        let action = controller.submit();

        assert_eq!(action, SubmitAction::Invalid { focus: Field::Email });
        assert_eq!(controller.focus(), Some(Field::Email));
        assert_eq!(controller.error(Field::Email), Some(Field::Email.hint()));
        assert_eq!(controller.error(Field::Message), Some(Field::Message.hint()));
        assert_eq!(controller.error(Field::Name), None);
        assert!(controller.submit_enabled());
    }

    #[test]
    fn test_valid_submit_clears_errors_and_disables_button() {
        let mut controller = filled();
        controller.set(Field::Name, "J");
        controller.submit();
        assert!(controller.error(Field::Name).is_some());

        controller.set(Field::Name, "Jo");
        let action = controller.submit();

        assert!(matches!(action, SubmitAction::Send(ref form) if form.name == "Jo"));
        assert_eq!(controller.error(Field::Name), None);
        assert_eq!(controller.focus(), None);
        assert!(!controller.submit_enabled());
    }

    #[test]
    fn test_submit_while_in_flight_is_inert() {
        let mut controller = filled();

        assert!(matches!(controller.submit(), SubmitAction::Send(_)));
        assert_eq!(controller.submit(), SubmitAction::Inert);
    }

    #[test]
    fn test_success_resets_form_and_auto_dismisses() {
        let mut controller = filled();
        controller.submit();

        let notice = controller.complete(SubmissionOutcome::Sent).clone();

        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.dismiss_after, Some(SUCCESS_NOTICE_DURATION));
        assert_eq!(controller.form(), &ContactForm::default());
        assert!(controller.submit_enabled());
    }

    #[test]
    fn test_rate_limited_keeps_form_and_asks_to_wait() {
        let mut controller = filled();
        controller.submit();

        let kind = controller.complete(SubmissionOutcome::TooManyRequests).kind;

        assert_eq!(kind, NoticeKind::Wait);
        assert_eq!(controller.form().name, "Jo");
        assert!(controller.submit_enabled());
    }

    #[test]
    fn test_failure_shows_server_detail_when_present() {
        let mut controller = filled();
        controller.submit();

        let notice = controller
            .complete(SubmissionOutcome::Failed {
                detail: Some("Invalid data.".to_string()),
            })
            .clone();

        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, "Invalid data.");
        assert_eq!(notice.dismiss_after, None);

        controller.submit();
        let notice = controller.complete(SubmissionOutcome::Failed { detail: None });

        assert_eq!(
            notice.text,
            "Your message could not be sent. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_send_issues_exactly_one_request() {
        let mut submitter = MockSubmitter::new();
        submitter
            .expect_submit()
            .times(1)
            .withf(|form| form.email == "jo@x.com" && form.website.is_empty())
            .returning(|_| SubmissionOutcome::Sent);

        let mut controller = filled();
        let notice = controller.send(&submitter).await.cloned();

        assert_eq!(notice.map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_send_invalid_form_issues_no_request() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().never();

        let mut controller = ContactFormController::new();

        assert!(controller.send(&submitter).await.is_none());
        assert_eq!(controller.focus(), Some(Field::Name));
    }

    #[tokio::test]
    async fn test_honeypot_is_forwarded() {
        let mut submitter = MockSubmitter::new();
        submitter
            .expect_submit()
            .times(1)
            .withf(|form| form.website == "bot")
            .returning(|_| SubmissionOutcome::Sent);

        let mut controller = filled();
        controller.set_honeypot("bot");

        assert!(controller.send(&submitter).await.is_some());
    }
}
