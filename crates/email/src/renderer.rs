use askama::Template;
use genproto::hipstershop::OrderResult;
use tracing::{debug, error};

use crate::{domain::OrderView, errors::RenderError};

#[derive(Template, Debug)]
#[template(path = "confirmation.html")]
pub struct ConfirmationTemplate<'a> {
    pub order: &'a OrderView,
}

/// Renders order confirmations. The template is compiled into the binary, so
/// it is parsed exactly once and shared read-only by every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailRenderer;

impl EmailRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, order: &OrderResult) -> Result<String, RenderError> {
        let view = OrderView::try_from(order).inspect_err(|e| {
            error!("❌ Order {} cannot be rendered: {e}", order.order_id);
        })?;

        let html = ConfirmationTemplate { order: &view }.render().map_err(|e| {
            error!("❌ Failed to render email template: {e}");
            RenderError::from(e)
        })?;

        debug!(
            "Rendered confirmation for order {} ({} bytes)",
            view.order_id,
            html.len()
        );
        Ok(html)
    }
}
