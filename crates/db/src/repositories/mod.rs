use async_trait::async_trait;
use thiserror::Error;

use cartlift_core::domain::campaign::{Campaign, CampaignId};
use cartlift_core::domain::evaluation::EvaluationRecord;
use cartlift_core::domain::rule::{OwnerId, Rule, RuleId};

pub mod campaign;
pub mod evaluation;
pub mod memory;
pub mod rule;

pub use campaign::SqlCampaignRepository;
pub use evaluation::SqlEvaluationRepository;
pub use memory::{InMemoryCampaignRepository, InMemoryEvaluationRepository, InMemoryRuleRepository};
pub use rule::SqlRuleRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Rules with `status == active`, scoped to one owner, in creation order.
    async fn list_active(&self, owner_id: &OwnerId) -> Result<Vec<Rule>, RepositoryError>;
    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<Rule>, RepositoryError>;
    async fn find_by_id(&self, id: &RuleId) -> Result<Option<Rule>, RepositoryError>;
    async fn save(&self, rule: Rule) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Campaigns with `status == active`, scoped to one owner, in creation
    /// order. Date windows are re-checked by the engine.
    async fn list_active(&self, owner_id: &OwnerId) -> Result<Vec<Campaign>, RepositoryError>;
    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<Campaign>, RepositoryError>;
    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError>;
    async fn save(&self, campaign: Campaign) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    /// Append one evaluation outcome. Records are write-once; there is no
    /// update path.
    async fn append(&self, record: EvaluationRecord) -> Result<(), RepositoryError>;
    async fn list_recent(
        &self,
        owner_id: &OwnerId,
        limit: u32,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

/// Serialize a field-less enum to its bare string token for a TEXT column.
pub(crate) fn encode_token<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(token)) => Ok(token),
        Ok(other) => Err(RepositoryError::Decode(format!("expected string token, got `{other}`"))),
        Err(error) => Err(RepositoryError::Decode(error.to_string())),
    }
}

pub(crate) fn decode_token<T: serde::de::DeserializeOwned>(
    token: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_value(serde_json::Value::String(token.to_owned()))
        .map_err(|error| RepositoryError::Decode(error.to_string()))
}

pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|error| RepositoryError::Decode(error.to_string()))
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    raw: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_str(raw).map_err(|error| RepositoryError::Decode(error.to_string()))
}
