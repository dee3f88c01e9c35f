use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Active,
    Inactive,
    Draft,
}

/// Where the storefront renders a winning offer. Cosmetic pass-through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    #[default]
    Popup,
    Cart,
    Checkout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOperator {
    Contains,
    Equals,
    NotContains,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartValueOperator {
    GreaterThan,
    LessThan,
    Equals,
    Between,
}

/// The trigger predicate attached to a rule, one case per trigger type.
///
/// Serialized adjacently tagged so the wire shape stays
/// `{ "trigger_type": ..., "trigger_conditions": {...} }`. Trigger types this
/// engine does not know deserialize to `Unknown` and never match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger_type", content = "trigger_conditions", rename_all = "snake_case")]
pub enum TriggerCondition {
    Category {
        #[serde(default)]
        category: Option<String>,
        category_operator: CategoryOperator,
    },
    CartValue {
        cart_value_operator: CartValueOperator,
        #[serde(default)]
        cart_value: Option<Decimal>,
        #[serde(default)]
        cart_value_min: Option<Decimal>,
        #[serde(default)]
        cart_value_max: Option<Decimal>,
    },
    TimeBased {
        #[serde(default)]
        time_on_site_min: Option<u64>,
        #[serde(default)]
        time_on_site_max: Option<u64>,
        #[serde(default)]
        active_time_on_site_min: Option<u64>,
    },
    #[serde(other)]
    Unknown,
}

/// Persistent trigger-to-recommendation mapping owned by one merchant.
///
/// Priority boosts applied by campaign overrides live only in the
/// per-evaluation resolved copy; the stored rule never changes during
/// evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub trigger: TriggerCondition,
    pub target_products: Vec<ProductId>,
    #[serde(default)]
    pub display_type: DisplayType,
    pub priority: i32,
    pub status: RuleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }

    /// Creation-time checks applied at the CRUD boundary. The evaluation
    /// engine itself tolerates anything that got past this.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvariantViolation("rule name must not be empty".to_owned()));
        }
        if !(1..=100).contains(&self.priority) {
            return Err(DomainError::InvariantViolation(format!(
                "rule priority {} outside nominal range 1..=100",
                self.priority
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{
        CartValueOperator, DisplayType, OwnerId, Rule, RuleId, RuleStatus, TriggerCondition,
    };
    use crate::domain::product::ProductId;

    fn rule(priority: i32) -> Rule {
        Rule {
            id: RuleId("rule-1".to_string()),
            owner_id: OwnerId("merchant-1".to_string()),
            name: "Free shipping nudge".to_string(),
            description: None,
            trigger: TriggerCondition::CartValue {
                cart_value_operator: CartValueOperator::GreaterThan,
                cart_value: None,
                cart_value_min: Some(Decimal::new(50, 0)),
                cart_value_max: None,
            },
            target_products: vec![ProductId::from("P9")],
            display_type: DisplayType::Cart,
            priority,
            status: RuleStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn trigger_serializes_with_adjacent_tagging() {
        let value = serde_json::to_value(rule(40)).expect("serialize rule");
        assert_eq!(value["trigger_type"], "cart_value");
        assert_eq!(value["trigger_conditions"]["cart_value_operator"], "greater_than");
        assert_eq!(value["trigger_conditions"]["cart_value_min"], "50");
    }

    #[test]
    fn unknown_trigger_type_deserializes_to_unknown() {
        let raw = r#"{
            "id": "rule-x",
            "owner_id": "merchant-1",
            "name": "Mystery",
            "trigger_type": "geo_fence",
            "trigger_conditions": {"radius_km": 5},
            "target_products": [],
            "priority": 10,
            "status": "active",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let parsed: Rule = serde_json::from_str(raw).expect("deserialize rule");
        assert_eq!(parsed.trigger, TriggerCondition::Unknown);
    }

    #[test]
    fn validate_rejects_out_of_range_priority() {
        assert!(rule(40).validate().is_ok());
        assert!(rule(0).validate().is_err());
        assert!(rule(101).validate().is_err());
    }
}
