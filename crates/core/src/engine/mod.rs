//! Real-time offer selection.
//!
//! One synchronous pass per call: match rules and campaigns independently,
//! fold campaign overrides into the matched rules, then pick a single winner.
//! Everything here is pure; `now` and the category taxonomy are injected so
//! repeated calls over identical state return the identical offer.

pub mod campaigns;
pub mod conditions;
pub mod overrides;
pub mod rules;
pub mod selector;
pub mod taxonomy;

use chrono::{DateTime, Utc};

use crate::domain::campaign::Campaign;
use crate::domain::cart::{CartSnapshot, TimeContext};
use crate::domain::offer::Offer;
use crate::domain::rule::Rule;
use crate::engine::taxonomy::CategoryTaxonomy;

pub use overrides::ResolvedRule;

/// Evaluate one cart against the merchant's rule and campaign snapshot.
pub fn evaluate(
    rules: &[Rule],
    campaigns: &[Campaign],
    cart: &CartSnapshot,
    time: &TimeContext,
    now: DateTime<Utc>,
    taxonomy: &CategoryTaxonomy,
) -> Option<Offer> {
    let matched_rules = rules::match_rules(rules, cart, time, taxonomy);
    let matched_campaigns = campaigns::match_campaigns(campaigns, cart, now);
    let resolved_rules = overrides::apply_overrides(matched_rules, &matched_campaigns);
    selector::select_offer(&resolved_rules, &matched_campaigns, cart)
}
