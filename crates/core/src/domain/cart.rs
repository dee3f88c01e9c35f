use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// One line of the shopper's cart as reported by the storefront.
///
/// Price and quantity default to zero when the storefront omits them; a
/// zero-value line simply fails cart-value conditions instead of failing the
/// whole evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Point-in-time view of the cart. Never persisted; rebuilt per evaluation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    pub fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cart_total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn contains_product(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    pub fn contains_any(&self, product_ids: &[ProductId]) -> bool {
        product_ids.iter().any(|id| self.contains_product(id))
    }

    /// Sum of `price * quantity` over cart lines whose product appears in
    /// `product_ids`. Products not in the cart contribute zero.
    pub fn revenue_for(&self, product_ids: &[ProductId]) -> Decimal {
        self.items
            .iter()
            .filter(|item| product_ids.contains(&item.product_id))
            .map(CartItem::line_total)
            .sum()
    }
}

/// Session timing supplied by the caller. The engine never tracks time itself;
/// a caller that omits the context gets the zeroed default, so only vacuous
/// time conditions pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeContext {
    #[serde(default)]
    pub time_on_site: u64,
    #[serde(default)]
    pub active_time_on_site: u64,
    #[serde(default)]
    pub current_page: Option<String>,
}
