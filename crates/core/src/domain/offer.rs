use serde::{Deserialize, Serialize};

use crate::domain::campaign::Campaign;
use crate::domain::product::ProductId;
use crate::domain::rule::{DisplayType, Rule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferSource {
    Rule,
    Campaign,
}

/// The single upsell returned to the storefront for one evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    #[serde(rename = "type")]
    pub source: OfferSource,
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_products: Vec<ProductId>,
    pub display_type: DisplayType,
    #[serde(default)]
    pub display_settings: Option<serde_json::Value>,
    #[serde(default)]
    pub pricing_rules: Option<serde_json::Value>,
}

impl Offer {
    pub fn from_rule(rule: &Rule) -> Self {
        Self {
            source: OfferSource::Rule,
            id: rule.id.0.clone(),
            title: rule.name.clone(),
            description: rule.description.clone(),
            target_products: rule.target_products.clone(),
            display_type: rule.display_type,
            display_settings: None,
            pricing_rules: None,
        }
    }

    pub fn from_campaign(campaign: &Campaign) -> Self {
        Self {
            source: OfferSource::Campaign,
            id: campaign.id.0.clone(),
            title: campaign.name.clone(),
            description: campaign.description.clone(),
            target_products: campaign.upsell_products.clone(),
            display_type: campaign.display_type,
            display_settings: campaign.display_settings.clone(),
            pricing_rules: campaign.pricing_rules.clone(),
        }
    }

    /// A replace-overridden rule wins on the rule's priority but surfaces the
    /// campaign's content; only the placement slot stays the rule's.
    pub fn from_replaced_rule(rule: &Rule, campaign: &Campaign) -> Self {
        Self { display_type: rule.display_type, ..Self::from_campaign(campaign) }
    }
}
