use async_trait::async_trait;
use tracing::info;

use crate::{abstract_trait::EmailDispatcher, errors::DispatchError};

/// Accepts every message and only logs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyDispatcher;

impl DummyDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailDispatcher for DummyDispatcher {
    async fn send(&self, email_address: &str, content: &str) -> Result<(), DispatchError> {
        info!(
            recipient = email_address,
            content_bytes = content.len(),
            "A request to send order confirmation email to {email_address} has been received."
        );
        Ok(())
    }
}
