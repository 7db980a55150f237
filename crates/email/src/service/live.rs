use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{error, info};

use crate::{abstract_trait::EmailDispatcher, config::SmtpConfig, errors::DispatchError};

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

pub const CONFIRMATION_SUBJECT: &str = "Your Confirmation Email";

#[derive(Clone)]
pub struct LiveDispatcher {
    mailer: SmtpTransport,
    from: Mailbox,
}

impl LiveDispatcher {
    pub fn new(config: &SmtpConfig) -> Result<Self, DispatchError> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| DispatchError::Config(format!("{name} is not set")))
        };

        let host = require(&config.host, "SMTP_HOST")?;
        let username = require(&config.username, "SMTP_USERNAME")?;
        let password = require(&config.password, "SMTP_PASSWORD")?;

        let from: Mailbox = config.from.parse().map_err(|e| {
            DispatchError::Config(format!("invalid sender address '{}': {e}", config.from))
        })?;

        let mailer = SmtpTransport::starttls_relay(&host)
            .map_err(|e| DispatchError::Config(format!("failed to create SMTP relay: {e}")))?
            .credentials(Credentials::new(username, password))
            .port(config.port)
            .build();

        info!("Live email backend ready, relaying through {host}:{}", config.port);

        Ok(Self { mailer, from })
    }
}

#[async_trait]
impl EmailDispatcher for LiveDispatcher {
    async fn send(&self, email_address: &str, content: &str) -> Result<(), DispatchError> {
        let to: Mailbox = email_address
            .parse()
            .map_err(|e: lettre::address::AddressError| DispatchError::InvalidRecipient {
                address: email_address.to_string(),
                reason: e.to_string(),
            })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(CONFIRMATION_SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(content.to_string())
            .map_err(|e| DispatchError::Transport(format!("failed to build email: {e}")))?;

        match self.mailer.send(email).await {
            Ok(response) => {
                info!(
                    "✅ Message sent to {email_address}: {}",
                    response.code()
                );
                Ok(())
            }
            Err(e) => {
                error!("❌ Failed to send email to {email_address}: {e}");
                Err(DispatchError::Transport(e.to_string()))
            }
        }
    }
}
