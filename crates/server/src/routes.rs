use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use cartlift_core::domain::campaign::Campaign;
use cartlift_core::domain::rule::{OwnerId, Rule};
use cartlift_core::engine::taxonomy::CategoryTaxonomy;
use cartlift_core::errors::{ApplicationError, DomainError};
use cartlift_db::repositories::{
    CampaignRepository, RepositoryError, RuleRepository, SqlCampaignRepository,
    SqlEvaluationRepository, SqlRuleRepository,
};
use cartlift_db::DbPool;

use crate::evaluation::{EvaluateRequest, EvaluateResponse, EvaluationPipeline};

type SqlPipeline =
    EvaluationPipeline<SqlRuleRepository, SqlCampaignRepository, SqlEvaluationRepository>;

#[derive(Clone)]
pub struct AppState {
    pool: DbPool,
    pipeline: Arc<SqlPipeline>,
}

impl AppState {
    pub fn new(pool: DbPool, taxonomy: CategoryTaxonomy) -> Self {
        let pipeline = EvaluationPipeline::new(
            SqlRuleRepository::new(pool.clone()),
            SqlCampaignRepository::new(pool.clone()),
            SqlEvaluationRepository::new(pool.clone()),
            taxonomy,
        );
        Self { pool, pipeline: Arc::new(pipeline) }
    }
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/evaluate", post(evaluate))
        .route("/rules", get(list_rules).post(create_rule))
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (status, Json(ErrorBody { error: message.into() }))
}

fn persistence_error(error: RepositoryError) -> (StatusCode, Json<ErrorBody>) {
    error!(event_name = "upsell.store.read_failed", error = %error, "repository call failed");
    error_response(StatusCode::SERVICE_UNAVAILABLE, "rule/campaign store unavailable")
}

pub async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.pipeline.evaluate_upsells(request).await {
        Ok(offer) => Ok(Json(EvaluateResponse { offer })),
        Err(ApplicationError::Persistence(message)) => {
            error!(event_name = "upsell.evaluate.failed", error = %message, "evaluation failed");
            Err(error_response(StatusCode::SERVICE_UNAVAILABLE, message))
        }
        Err(ApplicationError::Domain(DomainError::InvariantViolation(message))) => {
            Err(error_response(StatusCode::BAD_REQUEST, message))
        }
        Err(other) => Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())),
    }
}

pub async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Rule>>, (StatusCode, Json<ErrorBody>)> {
    let repo = SqlRuleRepository::new(state.pool.clone());
    repo.list_for_owner(&OwnerId(query.owner_id))
        .await
        .map(Json)
        .map_err(persistence_error)
}

pub async fn create_rule(
    State(state): State<AppState>,
    Json(rule): Json<Rule>,
) -> Result<(StatusCode, Json<Rule>), (StatusCode, Json<ErrorBody>)> {
    if let Err(error) = rule.validate() {
        return Err(error_response(StatusCode::BAD_REQUEST, error.to_string()));
    }

    let repo = SqlRuleRepository::new(state.pool.clone());
    repo.save(rule.clone()).await.map_err(persistence_error)?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Campaign>>, (StatusCode, Json<ErrorBody>)> {
    let repo = SqlCampaignRepository::new(state.pool.clone());
    repo.list_for_owner(&OwnerId(query.owner_id))
        .await
        .map(Json)
        .map_err(persistence_error)
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Json(campaign): Json<Campaign>,
) -> Result<(StatusCode, Json<Campaign>), (StatusCode, Json<ErrorBody>)> {
    if let Err(error) = campaign.validate() {
        return Err(error_response(StatusCode::BAD_REQUEST, error.to_string()));
    }

    let repo = SqlCampaignRepository::new(state.pool.clone());
    repo.save(campaign.clone()).await.map_err(persistence_error)?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::Json;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use cartlift_core::domain::cart::CartItem;
    use cartlift_core::domain::product::ProductId;
    use cartlift_core::domain::rule::{
        CartValueOperator, DisplayType, OwnerId, Rule, RuleId, RuleStatus, TriggerCondition,
    };
    use cartlift_core::engine::taxonomy::CategoryTaxonomy;
    use cartlift_db::{connect_with_settings, migrations};

    use super::{create_rule, evaluate, list_rules, AppState, OwnerQuery};
    use crate::evaluation::EvaluateRequest;

    async fn state() -> AppState {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        AppState::new(pool, CategoryTaxonomy::default())
    }

    fn sample_rule(priority: i32) -> Rule {
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
            target_products: vec![ProductId::from("prod-tote")],
            display_type: DisplayType::Cart,
            priority,
            status: RuleStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_then_list_round_trips_a_rule() {
        let state = state().await;

        let (status, Json(created)) =
            create_rule(State(state.clone()), Json(sample_rule(40))).await.expect("create");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id.0, "rule-1");

        let Json(rules) = list_rules(
            State(state),
            Query(OwnerQuery { owner_id: "merchant-1".to_string() }),
        )
        .await
        .expect("list");
        assert_eq!(rules.len(), 1);
    }

    #[tokio::test]
    async fn create_rule_rejects_invalid_priority() {
        let state = state().await;

        let result = create_rule(State(state), Json(sample_rule(0))).await;
        let (status, _) = result.expect_err("invalid rule should be rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn evaluate_returns_offer_for_matching_rule() {
        let state = state().await;
        create_rule(State(state.clone()), Json(sample_rule(40))).await.expect("create");

        let Json(response) = evaluate(
            State(state),
            Json(EvaluateRequest {
                session_id: "sess-1".to_string(),
                owner_id: "merchant-1".to_string(),
                cart_items: vec![CartItem {
                    product_id: ProductId::from("P1"),
                    title: "Widget".to_string(),
                    price: Decimal::new(30, 0),
                    quantity: 2,
                }],
                time_context: None,
            }),
        )
        .await
        .expect("evaluate");

        assert_eq!(response.offer.expect("offer").id, "rule-1");
    }

    #[tokio::test]
    async fn evaluate_with_no_candidates_returns_null_offer() {
        let state = state().await;

        let Json(response) = evaluate(
            State(state),
            Json(EvaluateRequest {
                session_id: "sess-1".to_string(),
                owner_id: "merchant-1".to_string(),
                cart_items: Vec::new(),
                time_context: None,
            }),
        )
        .await
        .expect("evaluate");

        assert!(response.offer.is_none());
    }

    #[tokio::test]
    async fn evaluate_propagates_store_read_failure_as_503() {
        let state = state().await;
        // Drop the schema out from under the pipeline to force a read error.
        let pool = state.pool.clone();
        sqlx::query("DROP TABLE upsell_rules").execute(&pool).await.expect("drop table");

        let result = evaluate(
            State(state),
            Json(EvaluateRequest {
                session_id: "sess-1".to_string(),
                owner_id: "merchant-1".to_string(),
                cart_items: Vec::new(),
                time_context: None,
            }),
        )
        .await;

        let (status, _) = result.expect_err("read failure must propagate");
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
