use chrono::{DateTime, Utc};
use sqlx::Row;

use cartlift_core::domain::product::ProductId;
use cartlift_core::domain::rule::{OwnerId, Rule, RuleId, TriggerCondition};

use super::{decode_json, decode_token, encode_json, encode_token, RepositoryError, RuleRepository};
use crate::DbPool;

pub struct SqlRuleRepository {
    pool: DbPool,
}

impl SqlRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, owner_id, name, description, trigger, target_products, \
                              display_type, priority, status, created_at, updated_at";

fn row_to_rule(row: &sqlx::sqlite::SqliteRow) -> Result<Rule, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let owner_id: String =
        row.try_get("owner_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: Option<String> =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let trigger_raw: String =
        row.try_get("trigger").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let target_products_raw: String =
        row.try_get("target_products").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let display_type_raw: String =
        row.try_get("display_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let priority: i32 =
        row.try_get("priority").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let status_raw: String =
        row.try_get("status").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_raw: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at_raw: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let trigger: TriggerCondition = decode_json(&trigger_raw)?;
    let target_products: Vec<ProductId> = decode_json(&target_products_raw)?;

    Ok(Rule {
        id: RuleId(id),
        owner_id: OwnerId(owner_id),
        name,
        description,
        trigger,
        target_products,
        display_type: decode_token(&display_type_raw)?,
        priority,
        status: decode_token(&status_raw)?,
        created_at: parse_timestamp(&created_at_raw),
        updated_at: parse_timestamp(&updated_at_raw),
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait::async_trait]
impl RuleRepository for SqlRuleRepository {
    async fn list_active(&self, owner_id: &OwnerId) -> Result<Vec<Rule>, RepositoryError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM upsell_rules \
             WHERE owner_id = ? AND status = 'active' \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query(&query).bind(&owner_id.0).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_rule).collect()
    }

    async fn list_for_owner(&self, owner_id: &OwnerId) -> Result<Vec<Rule>, RepositoryError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM upsell_rules WHERE owner_id = ? ORDER BY created_at, id"
        );
        let rows = sqlx::query(&query).bind(&owner_id.0).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_rule).collect()
    }

    async fn find_by_id(&self, id: &RuleId) -> Result<Option<Rule>, RepositoryError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM upsell_rules WHERE id = ?");
        let row = sqlx::query(&query).bind(&id.0).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_rule).transpose()
    }

    async fn save(&self, rule: Rule) -> Result<(), RepositoryError> {
        let trigger = encode_json(&rule.trigger)?;
        let target_products = encode_json(&rule.target_products)?;
        let display_type = encode_token(&rule.display_type)?;
        let status = encode_token(&rule.status)?;

        sqlx::query(
            "INSERT INTO upsell_rules
                (id, owner_id, name, description, trigger, target_products,
                 display_type, priority, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 trigger = excluded.trigger,
                 target_products = excluded.target_products,
                 display_type = excluded.display_type,
                 priority = excluded.priority,
                 status = excluded.status,
                 updated_at = excluded.updated_at",
        )
        .bind(&rule.id.0)
        .bind(&rule.owner_id.0)
        .bind(&rule.name)
        .bind(&rule.description)
        .bind(&trigger)
        .bind(&target_products)
        .bind(&display_type)
        .bind(rule.priority)
        .bind(&status)
        .bind(rule.created_at.to_rfc3339())
        .bind(rule.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
