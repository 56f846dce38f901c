// SMTP delivery via lettre

use super::{AlertEmail, MailTransport};
use crate::config::AlertConfig;
use crate::error::DispatchError;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends alerts over SMTP. Built without connection pooling, so every send
/// opens, authenticates, delivers and closes its own session.
pub struct SmtpMailer {
    from: String,
    to: String,
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    starttls: bool,
}

impl SmtpMailer {
    pub fn new(config: &AlertConfig) -> Self {
        let credentials = match (&config.email_user, &config.email_password) {
            (Some(user), Some(password)) => Some(Credentials::new(user.clone(), password.clone())),
            _ => None,
        };
        Self {
            from: config.email_from.clone(),
            to: config.email_to.clone(),
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            credentials,
            starttls: config.starttls,
        }
    }

    pub(crate) fn build_message(&self, email: &AlertEmail) -> Result<Message, DispatchError> {
        Message::builder()
            .from(parse_mailbox(&self.from)?)
            .to(parse_mailbox(&self.to)?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| DispatchError::Message(e.to_string()))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DispatchError> {
        let builder = if self.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
                .map_err(|e| DispatchError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
        };
        let mut builder = builder.port(self.port);
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }
        Ok(builder.build())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DispatchError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &AlertEmail) -> Result<(), DispatchError> {
        let message = self.build_message(email)?;
        let transport = self.transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(())
    }
}
