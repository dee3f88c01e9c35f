use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::rule::{DisplayType, OwnerId, RuleId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
    Scheduled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideType {
    Enhance,
    Replace,
    Suppress,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedSettings {
    #[serde(default)]
    pub priority_boost: i32,
}

/// A campaign-declared modification of one rule, applied per evaluation only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleOverride {
    pub rule_id: RuleId,
    pub override_type: OverrideType,
    #[serde(default)]
    pub enhanced_settings: Option<EnhancedSettings>,
}

impl RuleOverride {
    pub fn priority_boost(&self) -> i32 {
        self.enhanced_settings.map(|settings| settings.priority_boost).unwrap_or(0)
    }
}

/// Time-bound initiative that recommends its own products and may enhance,
/// replace, or suppress rules while it runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: CampaignStatus,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub trigger_products: Vec<ProductId>,
    pub upsell_products: Vec<ProductId>,
    #[serde(default)]
    pub rule_overrides: Vec<RuleOverride>,
    pub campaign_priority: i32,
    #[serde(default)]
    pub priority_level: PriorityLevel,
    #[serde(default)]
    pub override_existing_rules: bool,
    #[serde(default)]
    pub display_type: DisplayType,
    #[serde(default)]
    pub display_settings: Option<serde_json::Value>,
    #[serde(default)]
    pub pricing_rules: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }

    /// True when `now` falls inside `[start_date, end_date]`; an absent end
    /// date leaves the window open.
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        if now < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => now <= end,
            None => true,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvariantViolation(
                "campaign name must not be empty".to_owned(),
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(DomainError::InvariantViolation(format!(
                    "campaign `{}` ends before it starts",
                    self.id.0
                )));
            }
        }
        if self.trigger_products.is_empty() {
            return Err(DomainError::InvariantViolation(
                "campaign needs at least one trigger product".to_owned(),
            ));
        }
        Ok(())
    }
}
