use genproto::hipstershop::{Address, Money, OrderItem, OrderResult};

use crate::errors::RenderError;

const NANOS_PER_CENT: i32 = 10_000_000;
const MAX_NANOS: i32 = 999_999_999;

/// Order data as the confirmation template sees it: validated and with money
/// already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order_id: String,
    pub shipping_tracking_id: String,
    pub shipping_cost: String,
    pub shipping_address: AddressView,
    pub items: Vec<OrderItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressView {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemView {
    pub product_id: String,
    pub quantity: i32,
    pub cost: String,
}

impl TryFrom<&OrderResult> for OrderView {
    type Error = RenderError;

    fn try_from(order: &OrderResult) -> Result<Self, Self::Error> {
        if order.order_id.trim().is_empty() {
            return Err(RenderError::MissingField("order_id"));
        }

        let shipping_cost = order
            .shipping_cost
            .as_ref()
            .ok_or(RenderError::MissingField("shipping_cost"))
            .and_then(|m| format_money("shipping_cost", m))?;

        let shipping_address = order
            .shipping_address
            .as_ref()
            .map(AddressView::from)
            .ok_or(RenderError::MissingField("shipping_address"))?;

        let items = order
            .items
            .iter()
            .map(OrderItemView::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            order_id: order.order_id.clone(),
            shipping_tracking_id: order.shipping_tracking_id.clone(),
            shipping_cost,
            shipping_address,
            items,
        })
    }
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            country: address.country.clone(),
            zip_code: address.zip_code,
        }
    }
}

impl TryFrom<&OrderItem> for OrderItemView {
    type Error = RenderError;

    fn try_from(item: &OrderItem) -> Result<Self, Self::Error> {
        let cart_item = item.item.as_ref().ok_or(RenderError::MissingField("items.item"))?;
        let cost = item
            .cost
            .as_ref()
            .ok_or(RenderError::MissingField("items.cost"))
            .and_then(|m| format_money("items.cost", m))?;

        Ok(Self {
            product_id: cart_item.product_id.clone(),
            quantity: cart_item.quantity,
            cost,
        })
    }
}

/// Formats as `"<units>.<cents> <currency>"`, e.g. `"19.99 USD"`.
pub fn format_money(field: &'static str, money: &Money) -> Result<String, RenderError> {
    let malformed = |reason: String| RenderError::MalformedField { field, reason };

    if money.currency_code.trim().is_empty() {
        return Err(malformed("currency code is empty".into()));
    }
    if !(-MAX_NANOS..=MAX_NANOS).contains(&money.nanos) {
        return Err(malformed(format!("nanos {} out of range", money.nanos)));
    }
    if (money.units > 0 && money.nanos < 0) || (money.units < 0 && money.nanos > 0) {
        return Err(malformed(format!(
            "units {} and nanos {} disagree in sign",
            money.units, money.nanos
        )));
    }

    let sign = if money.units < 0 || money.nanos < 0 { "-" } else { "" };
    let cents = money.nanos.unsigned_abs() / NANOS_PER_CENT as u32;

    Ok(format!(
        "{sign}{}.{cents:02} {}",
        money.units.unsigned_abs(),
        money.currency_code
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use genproto::hipstershop::CartItem;

    fn usd(units: i64, nanos: i32) -> Money {
        Money {
            currency_code: "USD".to_string(),
            units,
            nanos,
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("cost", &usd(19, 990_000_000)).unwrap(), "19.99 USD");
        assert_eq!(format_money("cost", &usd(0, 50_000_000)).unwrap(), "0.05 USD");
        assert_eq!(format_money("cost", &usd(-3, -250_000_000)).unwrap(), "-3.25 USD");
        assert_eq!(format_money("cost", &usd(7, 0)).unwrap(), "7.00 USD");
    }

    #[test]
    fn test_format_money_rejects_malformed_values() {
        assert!(matches!(
            format_money("cost", &usd(1, 1_000_000_000)),
            Err(RenderError::MalformedField { field: "cost", .. })
        ));
        assert!(matches!(
            format_money("cost", &usd(1, -5)),
            Err(RenderError::MalformedField { .. })
        ));

        let no_currency = Money {
            currency_code: String::new(),
            units: 1,
            nanos: 0,
        };
        assert!(format_money("cost", &no_currency).is_err());
    }

    #[test]
    fn test_item_without_cart_item_is_missing_field() {
        let item = OrderItem {
            item: None,
            cost: Some(usd(1, 0)),
        };
        assert!(matches!(
            OrderItemView::try_from(&item),
            Err(RenderError::MissingField("items.item"))
        ));

        let item = OrderItem {
            item: Some(CartItem {
                product_id: "OLJCESPC7Z".to_string(),
                quantity: 2,
            }),
            cost: None,
        };
        assert!(matches!(
            OrderItemView::try_from(&item),
            Err(RenderError::MissingField("items.cost"))
        ));
    }
}
