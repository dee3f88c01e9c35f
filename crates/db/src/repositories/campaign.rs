use chrono::{DateTime, Utc};
use sqlx::Row;

use cartlift_core::domain::campaign::{Campaign, CampaignId, RuleOverride};
use cartlift_core::domain::product::ProductId;
use cartlift_core::domain::rule::OwnerId;

use super::{
    decode_json, decode_token, encode_json, encode_token, CampaignRepository, RepositoryError,
};
use crate::DbPool;

pub struct SqlCampaignRepository {
    pool: DbPool,
}

impl SqlCampaignRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, owner_id, name, description, status, start_date, end_date, \
                              trigger_products, upsell_products, rule_overrides, \
                              campaign_priority, priority_level, override_existing_rules, \
                              display_type, display_settings, pricing_rules, created_at, updated_at";

fn row_to_campaign(row: &sqlx::sqlite::SqliteRow) -> Result<Campaign, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let owner_id: String =
        row.try_get("owner_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: Option<String> =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_raw: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let start_date_raw: String =
        row.try_get("start_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let end_date_raw: Option<String> =
        row.try_get("end_date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let trigger_products_raw: String =
        row.try_get("trigger_products").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let upsell_products_raw: String =
        row.try_get("upsell_products").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rule_overrides_raw: String =
        row.try_get("rule_overrides").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let campaign_priority: i32 =
        row.try_get("campaign_priority").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let priority_level_raw: String =
        row.try_get("priority_level").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let override_existing_rules: bool = row
        .try_get("override_existing_rules")
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let display_type_raw: String =
        row.try_get("display_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let display_settings_raw: Option<String> =
        row.try_get("display_settings").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let pricing_rules_raw: Option<String> =
        row.try_get("pricing_rules").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_raw: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_raw: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let trigger_products: Vec<ProductId> = decode_json(&trigger_products_raw)?;
    let upsell_products: Vec<ProductId> = decode_json(&upsell_products_raw)?;
    let rule_overrides: Vec<RuleOverride> = decode_json(&rule_overrides_raw)?;

    let end_date = match end_date_raw {
        Some(raw) => Some(parse_timestamp(&raw)?),
        None => None,
    };

    Ok(Campaign {
        id: CampaignId(id),
        owner_id: OwnerId(owner_id),
        name,
        description,
        status: decode_token(&status_raw)?,
        start_date: parse_timestamp(&start_date_raw)?,
        end_date,
        trigger_products,
        upsell_products,
        rule_overrides,
        campaign_priority,
        priority_level: decode_token(&priority_level_raw)?,
        override_existing_rules,
        display_type: decode_token(&display_type_raw)?,
        display_settings: display_settings_raw.and_then(|raw| serde_json::from_str(&raw).ok()),
        pricing_rules: pricing_rules_raw.and_then(|raw| serde_json::from_str(&raw).ok()),
        created_at: parse_timestamp(&created_at_raw)?,
        updated_at: parse_timestamp(&updated_at_raw)?,
    })
}

/// Campaign windows gate matching, so a bad timestamp is a decode error here
/// rather than silently defaulting to "now".
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid timestamp `{raw}`: {error}")))
}

#[async_trait::async_trait]
impl CampaignRepository for SqlCampaignRepository {
    async fn list_active(&self, owner_id: &OwnerId) -> Result<Vec<Campaign>, RepositoryError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM campaigns \
             WHERE owner_id = ? AND status = 'active' \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query(&query).bind(&owner_id.0).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_campaign).collect()
    }

    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<Campaign>, RepositoryError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM campaigns WHERE owner_id = ? ORDER BY created_at, id"
        );
        let rows = sqlx::query(&query).bind(&owner_id.0).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_campaign).collect()
    }

    async fn find_by_id(&self, id: &CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM campaigns WHERE id = ?");
        let row = sqlx::query(&query).bind(&id.0).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_campaign).transpose()
    }

    async fn save(&self, campaign: Campaign) -> Result<(), RepositoryError> {
        let status = encode_token(&campaign.status)?;
        let trigger_products = encode_json(&campaign.trigger_products)?;
        let upsell_products = encode_json(&campaign.upsell_products)?;
        let rule_overrides = encode_json(&campaign.rule_overrides)?;
        let priority_level = encode_token(&campaign.priority_level)?;
        let display_type = encode_token(&campaign.display_type)?;
        let display_settings = campaign.display_settings.as_ref().map(|v| v.to_string());
        let pricing_rules = campaign.pricing_rules.as_ref().map(|v| v.to_string());

        sqlx::query(
            "INSERT INTO campaigns
                (id, owner_id, name, description, status, start_date, end_date,
                 trigger_products, upsell_products, rule_overrides,
                 campaign_priority, priority_level, override_existing_rules,
                 display_type, display_settings, pricing_rules, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 status = excluded.status,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date,
                 trigger_products = excluded.trigger_products,
                 upsell_products = excluded.upsell_products,
                 rule_overrides = excluded.rule_overrides,
                 campaign_priority = excluded.campaign_priority,
                 priority_level = excluded.priority_level,
                 override_existing_rules = excluded.override_existing_rules,
                 display_type = excluded.display_type,
                 display_settings = excluded.display_settings,
                 pricing_rules = excluded.pricing_rules,
                 updated_at = excluded.updated_at",
        )
        .bind(&campaign.id.0)
        .bind(&campaign.owner_id.0)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(&status)
        .bind(campaign.start_date.to_rfc3339())
        .bind(campaign.end_date.map(|dt| dt.to_rfc3339()))
        .bind(&trigger_products)
        .bind(&upsell_products)
        .bind(&rule_overrides)
        .bind(campaign.campaign_priority)
        .bind(&priority_level)
        .bind(campaign.override_existing_rules)
        .bind(&display_type)
        .bind(&display_settings)
        .bind(&pricing_rules)
        .bind(campaign.created_at.to_rfc3339())
        .bind(campaign.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
