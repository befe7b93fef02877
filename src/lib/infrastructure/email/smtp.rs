//! SMTP email service implementation

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, ValueEnum};
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::debug;

use crate::domain::communication::mailer::{self, Mailer, MailerError};

/// How the SMTP connection is encrypted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SmtpEncryption {
    /// Plain connection upgraded with STARTTLS, usually port 587
    #[default]
    Starttls,

    /// Implicit TLS from the first byte, usually port 465
    Tls,

    /// No encryption, for local relays only
    #[value(name = "none")]
    Unencrypted,
}

/// SMTP configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct SMTPConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "587")]
    pub port: u16,

    /// The SMTP connection encryption
    #[clap(
        long = "smtp-encryption",
        env = "SMTP_ENCRYPTION",
        value_enum,
        default_value = "starttls"
    )]
    pub encryption: SmtpEncryption,

    /// The SMTP username
    #[clap(long = "smtp-user", env = "SMTP_USER")]
    pub username: String,

    /// The SMTP password
    #[clap(long = "smtp-password", env = "SMTP_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// The sender email address
    #[clap(long = "smtp-sender", env = "SMTP_SENDER")]
    pub sender: String,

    /// The sender display name
    #[clap(long = "smtp-sender-name", env = "SMTP_SENDER_NAME", default_value = "Contact form")]
    pub sender_name: String,

    /// Verify the TLS certificate
    #[clap(
        long = "smtp-verify-tls",
        env = "SMTP_VERIFY_TLS",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub verify_tls: bool,

    /// Give up on the SMTP server after this many seconds
    #[clap(long = "smtp-timeout-seconds", env = "SMTP_TIMEOUT_SECONDS", default_value = "10")]
    pub timeout_seconds: u64,
}

/// SMTP mailer
#[derive(Debug, Clone)]
pub struct SMTPMailer {
    config: SMTPConfig,
    sender: Mailbox,
}

impl SMTPMailer {
    /// Create a new SMTP mailer, checking the sender address up front
    pub fn new(config: SMTPConfig) -> Result<Self> {
        let address: Address = config.sender.parse()?;
        let sender = Mailbox::new(Some(config.sender_name.clone()), address);

        Ok(Self { config, sender })
    }

    /// Build the SMTP transport described by the configuration
    pub fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let tls_parameters = || {
            TlsParameters::builder(self.config.host.to_string())
                .dangerous_accept_invalid_certs(!self.config.verify_tls)
                .build()
        };

        let tls = match self.config.encryption {
            SmtpEncryption::Starttls => Tls::Required(tls_parameters()?),
            SmtpEncryption::Tls => Tls::Wrapper(tls_parameters()?),
            SmtpEncryption::Unencrypted => Tls::None,
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
            .port(self.config.port)
            .tls(tls);

        if !self.config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        Ok(builder.build())
    }

    /// Convert a domain message into a MIME message
    pub fn build_message(&self, message: &mailer::Message) -> Result<Message, MailerError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, message.to.as_str().parse()?))
            .subject(message.subject.clone());

        if let Some(reply_to) = &message.reply_to {
            builder = builder.reply_to(Mailbox::new(
                Some(reply_to.name.clone()),
                reply_to.address.as_str().parse()?,
            ));
        }

        Ok(builder.multipart(MultiPart::alternative_plain_html(
            message.plain_body.clone(),
            message.html_body.clone(),
        ))?)
    }
}

#[async_trait]
impl Mailer for SMTPMailer {
    async fn send(&self, message: &mailer::Message) -> Result<(), MailerError> {
        let email = self.build_message(message)?;

        debug!(host = %self.config.host, port = self.config.port, "sending email over SMTP");

        let deadline = Duration::from_secs(self.config.timeout_seconds);

        match tokio::time::timeout(deadline, self.transport()?.send(email)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) if e.is_timeout() => Err(MailerError::Timeout),
            Ok(Err(e)) => Err(MailerError::SendError(e.to_string())),
            Err(_) => Err(MailerError::Timeout),
        }
    }
}
