use std::collections::HashMap;

use tokio::sync::RwLock;

use cartlift_core::domain::campaign::{Campaign, CampaignId};
use cartlift_core::domain::evaluation::EvaluationRecord;
use cartlift_core::domain::rule::{OwnerId, Rule, RuleId};

use super::{CampaignRepository, EvaluationRepository, RepositoryError, RuleRepository};

/// In-memory doubles for tests and the CLI smoke path. Listing preserves
/// insertion order, matching the SQL repositories' creation-order contract.
#[derive(Default)]
pub struct InMemoryRuleRepository {
    rules: RwLock<Vec<Rule>>,
}

#[async_trait::async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn list_active(&self, owner_id: &OwnerId) -> Result<Vec<Rule>, RepositoryError> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .filter(|rule| &rule.owner_id == owner_id && rule.is_active())
            .cloned()
            .collect())
    }

    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<Rule>, RepositoryError> {
        let rules = self.rules.read().await;
        Ok(rules.iter().filter(|rule| &rule.owner_id == owner_id).cloned().collect())
    }

    async fn find_by_id(&self, id: &RuleId) -> Result<Option<Rule>, RepositoryError> {
        let rules = self.rules.read().await;
        Ok(rules.iter().find(|rule| &rule.id == id).cloned())
    }

    async fn save(&self, rule: Rule) -> Result<(), RepositoryError> {
        let mut rules = self.rules.write().await;
        match rules.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCampaignRepository {
    campaigns: RwLock<Vec<Campaign>>,
}

#[async_trait::async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn list_active(&self, owner_id: &OwnerId) -> Result<Vec<Campaign>, RepositoryError> {
        let campaigns = self.campaigns.read().await;
        Ok(campaigns
            .iter()
            .filter(|campaign| &campaign.owner_id == owner_id && campaign.is_active())
            .cloned()
            .collect())
    }

    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<Campaign>, RepositoryError> {
        let campaigns = self.campaigns.read().await;
        Ok(campaigns.iter().filter(|campaign| &campaign.owner_id == owner_id).cloned().collect())
    }

    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let campaigns = self.campaigns.read().await;
        Ok(campaigns.iter().find(|campaign| &campaign.id == id).cloned())
    }

    async fn save(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let mut campaigns = self.campaigns.write().await;
        match campaigns.iter_mut().find(|existing| existing.id == campaign.id) {
            Some(existing) => *existing = campaign,
            None => campaigns.push(campaign),
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEvaluationRepository {
    records: RwLock<HashMap<String, EvaluationRecord>>,
}

impl InMemoryEvaluationRepository {
    pub async fn all(&self) -> Vec<EvaluationRecord> {
        let records = self.records.read().await;
        records.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl EvaluationRepository for InMemoryEvaluationRepository {
    async fn append(&self, record: EvaluationRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.entry(record.id.clone()).or_insert(record);
        Ok(())
    }

    async fn list_recent(
        &self,
        owner_id: &OwnerId,
        limit: u32,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let records = self.records.read().await;
        let mut matching: Vec<EvaluationRecord> =
            records.values().filter(|record| &record.owner_id == owner_id).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        matching.truncate(limit as usize);
        Ok(matching)
    }
}
