use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};

use crate::{ENV, api::error};

/// Email collaborator. Only used for account verification; delivery
/// failures are logged by the caller, never surfaced to the client.
#[async_trait::async_trait]
pub trait EmailSender {
    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), error::SystemError>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn from_env() -> Result<Self, error::SystemError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&ENV.smtp_host)?;

        if let (Some(username), Some(password)) = (&ENV.smtp_username, &ENV.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self { transport: builder.build(), from: ENV.smtp_from.clone() })
    }
}

#[async_trait::async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), error::SystemError> {
        let message = Message::builder()
            .from(self.from.parse().map_err(|_| {
                error::SystemError::bad_request("Invalid sender address configured")
            })?)
            .to(to
                .parse()
                .map_err(|_| error::SystemError::bad_request("Invalid recipient address"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| error::SystemError::InternalError(Box::new(e)))?;

        self.transport.send(message).await?;
        Ok(())
    }
}
