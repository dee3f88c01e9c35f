//! Deterministic demo dataset for one merchant.
//!
//! Loaded by the CLI `seed` command and the smoke path. This is also the
//! ingestion surface an insight-mining producer would use: candidate rules
//! and campaigns arrive through the same repository `save` calls.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use cartlift_core::domain::campaign::{
    Campaign, CampaignId, CampaignStatus, EnhancedSettings, OverrideType, PriorityLevel,
    RuleOverride,
};
use cartlift_core::domain::product::ProductId;
use cartlift_core::domain::rule::{
    CartValueOperator, CategoryOperator, DisplayType, OwnerId, Rule, RuleId, RuleStatus,
    TriggerCondition,
};

use crate::repositories::{
    CampaignRepository, RepositoryError, RuleRepository, SqlCampaignRepository, SqlRuleRepository,
};
use crate::DbPool;

pub const SEED_OWNER_ID: &str = "demo-merchant";

const SEED_RULE_IDS: &[&str] =
    &["rule-free-shipping", "rule-coffee-pairing", "rule-lingering-visitor"];

const SEED_CAMPAIGN_IDS: &[&str] = &["camp-espresso-launch", "camp-coffee-week"];

#[derive(Debug, Clone)]
pub struct SeedResult {
    pub rules_seeded: usize,
    pub campaigns_seeded: usize,
}

#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub checks: Vec<(&'static str, bool)>,
}

impl VerificationResult {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|(_, passed)| *passed)
    }
}

pub struct DemoSeedDataset;

impl DemoSeedDataset {
    pub fn owner() -> OwnerId {
        OwnerId(SEED_OWNER_ID.to_string())
    }

    pub fn rules() -> Vec<Rule> {
        let now = Utc::now();
        vec![
            Rule {
                id: RuleId("rule-free-shipping".to_string()),
                owner_id: Self::owner(),
                name: "Free shipping nudge".to_string(),
                description: Some("Suggest a small add-on once the cart clears $50".to_string()),
                trigger: TriggerCondition::CartValue {
                    cart_value_operator: CartValueOperator::GreaterThan,
                    cart_value: None,
                    cart_value_min: Some(Decimal::new(50, 0)),
                    cart_value_max: None,
                },
                target_products: vec![ProductId::from("prod-tote")],
                display_type: DisplayType::Cart,
                priority: 40,
                status: RuleStatus::Active,
                created_at: now,
                updated_at: now,
            },
            Rule {
                id: RuleId("rule-coffee-pairing".to_string()),
                owner_id: Self::owner(),
                name: "Coffee pairing".to_string(),
                description: Some("Coffee shoppers get the grinder pitch".to_string()),
                trigger: TriggerCondition::Category {
                    category: Some("coffee".to_string()),
                    category_operator: CategoryOperator::Contains,
                },
                target_products: vec![ProductId::from("prod-grinder"), ProductId::from("prod-filter")],
                display_type: DisplayType::Popup,
                priority: 60,
                status: RuleStatus::Active,
                created_at: now,
                updated_at: now,
            },
            Rule {
                id: RuleId("rule-lingering-visitor".to_string()),
                owner_id: Self::owner(),
                name: "Lingering visitor".to_string(),
                description: None,
                trigger: TriggerCondition::TimeBased {
                    time_on_site_min: Some(120),
                    time_on_site_max: None,
                    active_time_on_site_min: Some(60),
                },
                target_products: vec![ProductId::from("prod-sampler")],
                display_type: DisplayType::Checkout,
                priority: 20,
                status: RuleStatus::Active,
                created_at: now,
                updated_at: now,
            },
        ]
    }

    pub fn campaigns() -> Vec<Campaign> {
        let now = Utc::now();
        vec![
            Campaign {
                id: CampaignId("camp-espresso-launch".to_string()),
                owner_id: Self::owner(),
                name: "Espresso machine launch".to_string(),
                description: Some("Launch-window push for the new machine".to_string()),
                status: CampaignStatus::Active,
                start_date: now - Duration::days(3),
                end_date: Some(now + Duration::days(30)),
                trigger_products: vec![ProductId::from("prod-espresso-beans")],
                upsell_products: vec![ProductId::from("prod-espresso-machine")],
                rule_overrides: Vec::new(),
                campaign_priority: 10,
                priority_level: PriorityLevel::High,
                override_existing_rules: true,
                display_type: DisplayType::Popup,
                display_settings: Some(serde_json::json!({"badge": "new"})),
                pricing_rules: Some(serde_json::json!({"discount_pct": 10})),
                created_at: now,
                updated_at: now,
            },
            Campaign {
                id: CampaignId("camp-coffee-week".to_string()),
                owner_id: Self::owner(),
                name: "Coffee week".to_string(),
                description: None,
                status: CampaignStatus::Active,
                start_date: now - Duration::days(1),
                end_date: Some(now + Duration::days(6)),
                trigger_products: vec![
                    ProductId::from("prod-espresso-beans"),
                    ProductId::from("prod-drip-beans"),
                ],
                upsell_products: vec![ProductId::from("prod-mug-set")],
                rule_overrides: vec![RuleOverride {
                    rule_id: RuleId("rule-coffee-pairing".to_string()),
                    override_type: OverrideType::Enhance,
                    enhanced_settings: Some(EnhancedSettings { priority_boost: 20 }),
                }],
                campaign_priority: 30,
                priority_level: PriorityLevel::Medium,
                override_existing_rules: false,
                display_type: DisplayType::Cart,
                display_settings: None,
                pricing_rules: None,
                created_at: now,
                updated_at: now,
            },
        ]
    }

    /// Load the dataset. Idempotent: reseeding overwrites the same ids.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let rule_repo = SqlRuleRepository::new(pool.clone());
        let campaign_repo = SqlCampaignRepository::new(pool.clone());

        let rules = Self::rules();
        let campaigns = Self::campaigns();

        for rule in &rules {
            rule_repo.save(rule.clone()).await?;
        }
        for campaign in &campaigns {
            campaign_repo.save(campaign.clone()).await?;
        }

        Ok(SeedResult { rules_seeded: rules.len(), campaigns_seeded: campaigns.len() })
    }

    /// Verify the seeded rows exist with the expected statuses.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for rule_id in SEED_RULE_IDS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM upsell_rules WHERE id = ?1 AND status = 'active')",
            )
            .bind(rule_id)
            .fetch_one(pool)
            .await?;
            checks.push((*rule_id, exists == 1));
        }

        for campaign_id in SEED_CAMPAIGN_IDS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM campaigns WHERE id = ?1 AND status = 'active')",
            )
            .bind(campaign_id)
            .fetch_one(pool)
            .await?;
            checks.push((*campaign_id, exists == 1));
        }

        Ok(VerificationResult { checks })
    }
}
