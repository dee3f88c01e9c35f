use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartItem;
use crate::domain::offer::{Offer, OfferSource};
use crate::domain::rule::OwnerId;

/// Append-only record of one evaluation outcome, written after the offer has
/// already been decided. Consumed by downstream attribution, never read back
/// by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub session_id: String,
    pub owner_id: OwnerId,
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub offer_source: Option<OfferSource>,
    pub created_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn new(
        id: String,
        session_id: String,
        owner_id: OwnerId,
        cart_items: Vec<CartItem>,
        offer: Option<&Offer>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            owner_id,
            cart_items,
            offer_id: offer.map(|offer| offer.id.clone()),
            offer_source: offer.map(|offer| offer.source),
            created_at,
        }
    }
}
