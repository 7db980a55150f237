use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::DispatchError;

pub type DynEmailDispatcher = Arc<dyn EmailDispatcher>;

#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send(&self, email_address: &str, content: &str) -> Result<(), DispatchError>;
}
