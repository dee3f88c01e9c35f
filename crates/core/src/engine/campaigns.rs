use chrono::{DateTime, Utc};

use crate::domain::campaign::Campaign;
use crate::domain::cart::CartSnapshot;

/// Filter campaigns to those currently runnable against this cart: active
/// status, date window containing `now`, and at least one trigger product in
/// the cart. Audience segmentation is deliberately absent from the model, so
/// there is no segmentation clause here.
pub fn match_campaigns(
    campaigns: &[Campaign],
    cart: &CartSnapshot,
    now: DateTime<Utc>,
) -> Vec<Campaign> {
    campaigns
        .iter()
        .filter(|campaign| campaign.is_active())
        .filter(|campaign| campaign.window_contains(now))
        .filter(|campaign| cart.contains_any(&campaign.trigger_products))
        .cloned()
        .collect()
}
