use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::CommandResult;
use cartlift_core::domain::cart::{CartItem, CartSnapshot, TimeContext};
use cartlift_core::domain::product::ProductId;
use cartlift_core::engine;
use cartlift_core::engine::taxonomy::CategoryTaxonomy;
use cartlift_db::repositories::{
    CampaignRepository, RuleRepository, SqlCampaignRepository, SqlRuleRepository,
};
use cartlift_db::{connect_with_settings, migrations, DemoSeedDataset};

#[derive(Debug, Serialize)]
struct SmokeStep {
    name: &'static str,
    status: &'static str,
    elapsed_ms: u128,
    detail: String,
}

/// End-to-end readiness: migrate and seed an in-memory database, then run one
/// evaluation over a cart that should win the seeded launch campaign.
pub fn run() -> CommandResult {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "smoke",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let mut steps: Vec<SmokeStep> = Vec::new();

        let started = Instant::now();
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        steps.push(SmokeStep {
            name: "migrate",
            status: "ok",
            elapsed_ms: started.elapsed().as_millis(),
            detail: "schema applied to in-memory database".to_string(),
        });

        let started = Instant::now();
        let seeded = DemoSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_load", error.to_string(), 6u8))?;
        steps.push(SmokeStep {
            name: "seed",
            status: "ok",
            elapsed_ms: started.elapsed().as_millis(),
            detail: format!(
                "{} rules, {} campaigns",
                seeded.rules_seeded, seeded.campaigns_seeded
            ),
        });

        let started = Instant::now();
        let owner = DemoSeedDataset::owner();
        let rules = SqlRuleRepository::new(pool.clone())
            .list_active(&owner)
            .await
            .map_err(|error| ("rule_read", error.to_string(), 7u8))?;
        let campaigns = SqlCampaignRepository::new(pool.clone())
            .list_active(&owner)
            .await
            .map_err(|error| ("campaign_read", error.to_string(), 7u8))?;

        // Espresso beans trigger the seeded launch campaign and categorize as
        // coffee, so both matchers have work to do.
        let cart = CartSnapshot::new(vec![CartItem {
            product_id: ProductId::from("prod-espresso-beans"),
            title: "Espresso Beans".to_string(),
            price: Decimal::new(18, 0),
            quantity: 4,
        }]);
        let time = TimeContext { time_on_site: 180, active_time_on_site: 90, current_page: None };

        let offer = engine::evaluate(
            &rules,
            &campaigns,
            &cart,
            &time,
            chrono::Utc::now(),
            &CategoryTaxonomy::default(),
        );
        pool.close().await;

        match offer {
            Some(offer) if offer.id == "camp-espresso-launch" => {
                steps.push(SmokeStep {
                    name: "evaluate",
                    status: "ok",
                    elapsed_ms: started.elapsed().as_millis(),
                    detail: format!("offer `{}` selected", offer.id),
                });
                Ok(steps)
            }
            Some(offer) => Err((
                "evaluation",
                format!("expected camp-espresso-launch to win, got `{}`", offer.id),
                8u8,
            )),
            None => Err(("evaluation", "expected an offer, got none".to_string(), 8u8)),
        }
    });

    match result {
        Ok(steps) => {
            let payload = serde_json::json!({
                "command": "smoke",
                "status": "ok",
                "steps": steps,
            });
            CommandResult { exit_code: 0, output: payload.to_string() }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("smoke", error_class, message, exit_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn smoke_passes_end_to_end() {
        let result = run();
        assert_eq!(result.exit_code, 0, "smoke output: {}", result.output);
        let parsed: serde_json::Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["steps"].as_array().expect("steps").len(), 3);
    }
}
