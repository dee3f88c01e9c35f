pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;

pub use domain::campaign::{
    Campaign, CampaignId, CampaignStatus, EnhancedSettings, OverrideType, PriorityLevel,
    RuleOverride,
};
pub use domain::cart::{CartItem, CartSnapshot, TimeContext};
pub use domain::evaluation::EvaluationRecord;
pub use domain::offer::{Offer, OfferSource};
pub use domain::product::ProductId;
pub use domain::rule::{
    CartValueOperator, CategoryOperator, DisplayType, OwnerId, Rule, RuleId, RuleStatus,
    TriggerCondition,
};
pub use engine::taxonomy::CategoryTaxonomy;
pub use errors::{ApplicationError, DomainError};
