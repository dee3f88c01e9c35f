use chrono::{DateTime, Utc};
use sqlx::Row;

use cartlift_core::domain::cart::CartItem;
use cartlift_core::domain::evaluation::EvaluationRecord;
use cartlift_core::domain::rule::OwnerId;

use super::{decode_json, decode_token, encode_json, encode_token, EvaluationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlEvaluationRepository {
    pool: DbPool,
}

impl SqlEvaluationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<EvaluationRecord, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let session_id: String =
        row.try_get("session_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let owner_id: String =
        row.try_get("owner_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let cart_items_raw: String =
        row.try_get("cart_items").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let offer_id: Option<String> =
        row.try_get("offer_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let offer_source_raw: Option<String> =
        row.try_get("offer_source").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_raw: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let cart_items: Vec<CartItem> = decode_json(&cart_items_raw)?;
    let offer_source = match offer_source_raw {
        Some(raw) => Some(decode_token(&raw)?),
        None => None,
    };

    let created_at = DateTime::parse_from_rfc3339(&created_at_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(EvaluationRecord {
        id,
        session_id,
        owner_id: OwnerId(owner_id),
        cart_items,
        offer_id,
        offer_source,
        created_at,
    })
}

#[async_trait::async_trait]
impl EvaluationRepository for SqlEvaluationRepository {
    async fn append(&self, record: EvaluationRecord) -> Result<(), RepositoryError> {
        let cart_items = encode_json(&record.cart_items)?;
        let offer_source = match &record.offer_source {
            Some(source) => Some(encode_token(source)?),
            None => None,
        };

        sqlx::query(
            "INSERT INTO evaluations
                (id, session_id, owner_id, cart_items, offer_id, offer_source, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&record.id)
        .bind(&record.session_id)
        .bind(&record.owner_id.0)
        .bind(&cart_items)
        .bind(&record.offer_id)
        .bind(&offer_source)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(
        &self,
        owner_id: &OwnerId,
        limit: u32,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, session_id, owner_id, cart_items, offer_id, offer_source, created_at
             FROM evaluations
             WHERE owner_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(&owner_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use cartlift_core::domain::cart::CartItem;
    use cartlift_core::domain::evaluation::EvaluationRecord;
    use cartlift_core::domain::offer::OfferSource;
    use cartlift_core::domain::product::ProductId;
    use cartlift_core::domain::rule::OwnerId;

    use super::SqlEvaluationRepository;
    use crate::repositories::EvaluationRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn record(id: &str, offer_id: Option<&str>) -> EvaluationRecord {
        EvaluationRecord {
            id: id.to_string(),
            session_id: "sess-1".to_string(),
            owner_id: OwnerId("merchant-1".to_string()),
            cart_items: vec![CartItem {
                product_id: ProductId::from("P1"),
                title: "Coffee Mug".to_string(),
                price: Decimal::new(1500, 2),
                quantity: 2,
            }],
            offer_id: offer_id.map(str::to_owned),
            offer_source: offer_id.map(|_| OfferSource::Rule),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_and_list_round_trips_cart_items() {
        let pool = setup().await;
        let repo = SqlEvaluationRepository::new(pool);

        repo.append(record("ev-1", Some("rule-1"))).await.expect("append");

        let recent =
            repo.list_recent(&OwnerId("merchant-1".to_string()), 10).await.expect("list");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].offer_id.as_deref(), Some("rule-1"));
        assert_eq!(recent[0].offer_source, Some(OfferSource::Rule));
        assert_eq!(recent[0].cart_items[0].price, Decimal::new(1500, 2));
    }

    #[tokio::test]
    async fn no_offer_evaluations_are_recorded_with_null_offer() {
        let pool = setup().await;
        let repo = SqlEvaluationRepository::new(pool);

        repo.append(record("ev-1", None)).await.expect("append");

        let recent =
            repo.list_recent(&OwnerId("merchant-1".to_string()), 10).await.expect("list");
        assert_eq!(recent.len(), 1);
        assert!(recent[0].offer_id.is_none());
        assert!(recent[0].offer_source.is_none());
    }

    #[tokio::test]
    async fn duplicate_ids_do_not_overwrite_the_first_write() {
        let pool = setup().await;
        let repo = SqlEvaluationRepository::new(pool);

        repo.append(record("ev-1", Some("rule-1"))).await.expect("append");
        repo.append(record("ev-1", Some("rule-2"))).await.expect("append duplicate");

        let recent =
            repo.list_recent(&OwnerId("merchant-1".to_string()), 10).await.expect("list");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].offer_id.as_deref(), Some("rule-1"));
    }

    #[tokio::test]
    async fn list_recent_respects_the_limit() {
        let pool = setup().await;
        let repo = SqlEvaluationRepository::new(pool);

        for index in 0..5 {
            repo.append(record(&format!("ev-{index}"), None)).await.expect("append");
        }

        let recent = repo.list_recent(&OwnerId("merchant-1".to_string()), 3).await.expect("list");
        assert_eq!(recent.len(), 3);
    }
}
