//! The `evaluate_upsells` orchestration: read the merchant's active rules and
//! campaigns, run the selection engine, then record the outcome best-effort.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use cartlift_core::domain::cart::{CartItem, CartSnapshot, TimeContext};
use cartlift_core::domain::evaluation::EvaluationRecord;
use cartlift_core::domain::offer::Offer;
use cartlift_core::domain::rule::OwnerId;
use cartlift_core::engine;
use cartlift_core::engine::taxonomy::CategoryTaxonomy;
use cartlift_core::errors::ApplicationError;
use cartlift_db::repositories::{CampaignRepository, EvaluationRepository, RuleRepository};

#[derive(Clone, Debug, Deserialize)]
pub struct EvaluateRequest {
    pub session_id: String,
    pub owner_id: String,
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub time_context: Option<TimeContext>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EvaluateResponse {
    pub offer: Option<Offer>,
}

pub struct EvaluationPipeline<R, C, E> {
    rules: R,
    campaigns: C,
    evaluations: E,
    taxonomy: CategoryTaxonomy,
}

impl<R, C, E> EvaluationPipeline<R, C, E>
where
    R: RuleRepository,
    C: CampaignRepository,
    E: EvaluationRepository,
{
    pub fn new(rules: R, campaigns: C, evaluations: E, taxonomy: CategoryTaxonomy) -> Self {
        Self { rules, campaigns, evaluations, taxonomy }
    }

    /// Select at most one offer for this cart.
    ///
    /// Store reads must succeed; a partial candidate set is not a safe basis
    /// for a decision. The attribution write afterwards is the opposite: it
    /// is logged and swallowed so an unavailable log can never cost the
    /// storefront its already-made decision.
    pub async fn evaluate_upsells(
        &self,
        request: EvaluateRequest,
    ) -> Result<Option<Offer>, ApplicationError> {
        let owner = OwnerId(request.owner_id.clone());

        let rules = self
            .rules
            .list_active(&owner)
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        let campaigns = self
            .campaigns
            .list_active(&owner)
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        let cart = CartSnapshot::new(request.cart_items.clone());
        let time = request.time_context.clone().unwrap_or_default();
        let now = Utc::now();

        let offer = engine::evaluate(&rules, &campaigns, &cart, &time, now, &self.taxonomy);

        info!(
            event_name = "upsell.evaluate.completed",
            session_id = %request.session_id,
            owner_id = %owner.0,
            rules_matched_from = rules.len(),
            campaigns_matched_from = campaigns.len(),
            offer_id = offer.as_ref().map(|o| o.id.as_str()).unwrap_or("none"),
            "evaluation completed"
        );

        let record = EvaluationRecord::new(
            Uuid::new_v4().to_string(),
            request.session_id.clone(),
            owner,
            request.cart_items,
            offer.as_ref(),
            now,
        );
        if let Err(error) = self.evaluations.append(record).await {
            warn!(
                event_name = "upsell.evaluate.record_failed",
                session_id = %request.session_id,
                error = %error,
                "evaluation record write failed; offer still returned"
            );
        }

        Ok(offer)
    }
}
