use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::account::errors::NotifierError;
use crate::account::models::EmailAddress;
use crate::account::ports::Notifier;
use crate::config::SmtpConfig;

/// SMTP-backed notifier.
///
/// Holds one pooled async transport for the process lifetime. Delivery
/// is best-effort from the domain's point of view; errors surface as
/// `NotifierError` and the service decides what to do with them.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier from SMTP configuration.
    ///
    /// # Errors
    /// Returns an error when the relay host or from-address is invalid.
    pub fn new(config: &SmtpConfig) -> Result<Self, anyhow::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from_address: Mailbox = config.from_address.parse()?;

        Ok(Self {
            transport,
            from_address,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifierError> {
        let message = Message::builder()
            .from(self.from_address.clone())
            .to(to
                .as_str()
                .parse()
                .map_err(|e: lettre::address::AddressError| NotifierError::Message(e.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifierError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifierError::Transport(e.to_string()))?;

        tracing::debug!(to = %to, subject = %subject, "Email accepted by SMTP relay");

        Ok(())
    }
}
