//! Outgoing mail for OTP codes.
//!
//! Uses SMTP via lettre when configured; without an SMTP block the portal
//! runs in demo mode and logs the code instead of sending it.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use ridgeline_core::Email;

use crate::config::EmailConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email delivery service backed by an SMTP relay.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay parameters are invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a one-time login code.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or handed to the relay.
    pub async fn send_otp(&self, to: &Email, code: &str, ttl_minutes: i64) -> Result<(), MailError> {
        let body = format!(
            "Your Ridgeline data room verification code is: {code}\n\n\
             The code expires in {ttl_minutes} minutes. If you did not request \
             access, you can ignore this message.\n"
        );

        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
            .subject("Your Ridgeline verification code")
            .header(ContentType::TEXT_PLAIN)
            .body(body)?;

        self.mailer.send(message).await?;
        Ok(())
    }
}

/// OTP delivery channel: a real SMTP relay, or demo-mode logging.
#[derive(Clone)]
pub enum Mailer {
    /// Deliver codes through SMTP.
    Smtp(EmailService),
    /// Demo mode: log the code at info level instead of sending it.
    Log,
}

impl Mailer {
    /// Deliver a one-time code to the given address.
    ///
    /// # Errors
    ///
    /// Returns error if SMTP delivery fails; the demo channel never fails.
    pub async fn send_otp(&self, to: &Email, code: &str, ttl_minutes: i64) -> Result<(), MailError> {
        match self {
            Self::Smtp(service) => service.send_otp(to, code, ttl_minutes).await,
            Self::Log => {
                tracing::info!(email = %to, code, "demo mode: OTP code not emailed");
                Ok(())
            }
        }
    }
}
