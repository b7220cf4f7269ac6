use crate::core::sweep::{MailError, MailTransport};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

/// Errors that can occur when sending mail
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

/// SMTP mailer for alert notifications
///
/// Wraps the `lettre` async transport; the relay connection is established
/// lazily on first send.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl Mailer {
    /// Build a STARTTLS relay mailer, with credentials when both a username
    /// and a password are configured.
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        username: Option<String>,
        password: Option<String>,
        from_address: String,
    ) -> Result<Self, MailerError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)?.port(smtp_port);

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: builder.build(),
            from_address,
        })
    }

    /// Send a plain-text email.
    pub async fn send_plain(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailerError::Build(e.to_string()))?;

        self.transport.send(email).await?;

        tracing::debug!("Notification email sent to {}", to);

        Ok(())
    }
}

#[async_trait]
impl MailTransport for Mailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        self.send_plain(to, subject, body)
            .await
            .map_err(|e| MailError(e.to_string()))
    }
}
