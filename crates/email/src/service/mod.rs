mod dummy;
mod live;

pub use self::dummy::DummyDispatcher;
pub use self::live::LiveDispatcher;

use std::sync::Arc;
use tracing::info;

use crate::{
    abstract_trait::DynEmailDispatcher,
    config::{EmailMode, SmtpConfig},
    errors::DispatchError,
};

/// Builds the backend for `mode`. Live mode fails here, at startup, when the
/// mail backend is not fully configured.
pub fn dispatcher_for(mode: EmailMode, smtp: &SmtpConfig) -> Result<DynEmailDispatcher, DispatchError> {
    info!("Selecting {mode} email backend");

    match mode {
        EmailMode::Dummy => Ok(Arc::new(DummyDispatcher::new())),
        EmailMode::Live => Ok(Arc::new(LiveDispatcher::new(smtp)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_mode_needs_no_smtp() {
        assert!(dispatcher_for(EmailMode::Dummy, &SmtpConfig::default()).is_ok());
    }

    #[test]
    fn test_live_mode_fails_fast_without_smtp() {
        let result = dispatcher_for(EmailMode::Live, &SmtpConfig::default());
        assert!(matches!(result, Err(DispatchError::Config(_))));
    }
}
