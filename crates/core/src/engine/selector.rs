//! Single-winner selection over the resolved rule and matched campaign lists.

use rust_decimal::Decimal;

use crate::domain::campaign::{Campaign, CampaignId};
use crate::domain::cart::CartSnapshot;
use crate::domain::offer::Offer;
use crate::engine::overrides::ResolvedRule;

enum CandidateKind<'a> {
    Rule(&'a ResolvedRule),
    Campaign(&'a Campaign),
}

struct Candidate<'a> {
    kind: CandidateKind<'a>,
    /// Campaigns flagged `override_existing_rules` outrank every other
    /// candidate regardless of numeric priority.
    promoted: bool,
    priority: i32,
    /// Deterministic revenue proxy used only to break priority ties: cart
    /// revenue of the candidate's recommended products.
    expected_revenue: Decimal,
}

/// Pick at most one offer from the merged candidate set.
///
/// Rules enter the list before campaigns, so with a stable sort the original
/// insertion order is the final tie-break after priority and the revenue
/// proxy. An empty candidate set is a normal outcome, not an error.
pub fn select_offer(
    resolved_rules: &[ResolvedRule],
    campaigns: &[Campaign],
    cart: &CartSnapshot,
) -> Option<Offer> {
    let mut candidates: Vec<Candidate<'_>> = Vec::with_capacity(resolved_rules.len() + campaigns.len());

    for resolved in resolved_rules {
        candidates.push(Candidate {
            kind: CandidateKind::Rule(resolved),
            promoted: false,
            priority: resolved.effective_priority,
            expected_revenue: cart.revenue_for(&resolved.rule.target_products),
        });
    }
    for campaign in campaigns {
        // A campaign with nothing to upsell is override-only: it can still
        // enhance or suppress rules but never becomes an offer itself.
        if campaign.upsell_products.is_empty() {
            continue;
        }
        candidates.push(Candidate {
            kind: CandidateKind::Campaign(campaign),
            promoted: campaign.override_existing_rules,
            priority: campaign.campaign_priority,
            expected_revenue: cart.revenue_for(&campaign.upsell_products),
        });
    }

    candidates.sort_by(|a, b| {
        b.promoted
            .cmp(&a.promoted)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| b.expected_revenue.cmp(&a.expected_revenue))
    });

    candidates.first().map(|winner| materialize(winner, campaigns))
}

fn materialize(candidate: &Candidate<'_>, campaigns: &[Campaign]) -> Offer {
    match &candidate.kind {
        CandidateKind::Rule(resolved) => match &resolved.replaced_by {
            Some(campaign_id) => match find_campaign(campaigns, campaign_id) {
                Some(campaign) => Offer::from_replaced_rule(&resolved.rule, campaign),
                // The replacing campaign vanished between resolution and
                // materialization; fall back to the rule's own content.
                None => Offer::from_rule(&resolved.rule),
            },
            None => Offer::from_rule(&resolved.rule),
        },
        CandidateKind::Campaign(campaign) => Offer::from_campaign(campaign),
    }
}

fn find_campaign<'a>(campaigns: &'a [Campaign], id: &CampaignId) -> Option<&'a Campaign> {
    campaigns.iter().find(|campaign| &campaign.id == id)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use super::select_offer;
    use crate::domain::campaign::{Campaign, CampaignId, CampaignStatus, PriorityLevel};
    use crate::domain::cart::{CartItem, CartSnapshot};
    use crate::domain::offer::OfferSource;
    use crate::domain::product::ProductId;
    use crate::domain::rule::{
        CartValueOperator, DisplayType, OwnerId, Rule, RuleId, RuleStatus, TriggerCondition,
    };
    use crate::engine::overrides::ResolvedRule;

    fn rule(id: &str, priority: i32, targets: &[&str]) -> Rule {
        Rule {
            id: RuleId(id.to_string()),
            owner_id: OwnerId("merchant-1".to_string()),
            name: format!("Rule {id}"),
            description: None,
            trigger: TriggerCondition::CartValue {
                cart_value_operator: CartValueOperator::GreaterThan,
                cart_value: None,
                cart_value_min: Some(Decimal::ZERO),
                cart_value_max: None,
            },
            target_products: targets.iter().map(|p| ProductId::from(*p)).collect(),
            display_type: DisplayType::Cart,
            priority,
            status: RuleStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn resolved(rule: Rule) -> ResolvedRule {
        let effective_priority = rule.priority;
        ResolvedRule { rule, effective_priority, replaced_by: None }
    }

    fn campaign(id: &str, priority: i32, promoted: bool) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: CampaignId(id.to_string()),
            owner_id: OwnerId("merchant-1".to_string()),
            name: format!("Campaign {id}"),
            description: Some("Limited time".to_string()),
            status: CampaignStatus::Active,
            start_date: now - Duration::days(1),
            end_date: None,
            trigger_products: vec![ProductId::from("P1")],
            upsell_products: vec![ProductId::from("U1")],
            rule_overrides: Vec::new(),
            campaign_priority: priority,
            priority_level: PriorityLevel::High,
            override_existing_rules: promoted,
            display_type: DisplayType::Popup,
            display_settings: None,
            pricing_rules: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn cart() -> CartSnapshot {
        CartSnapshot::new(vec![CartItem {
            product_id: ProductId::from("P1"),
            title: "Widget".to_string(),
            price: Decimal::new(30, 0),
            quantity: 2,
        }])
    }

    #[test]
    fn highest_priority_candidate_wins() {
        let rules = vec![resolved(rule("r-low", 20, &["X"])), resolved(rule("r-high", 60, &["X"]))];
        let offer = select_offer(&rules, &[], &cart()).expect("offer");
        assert_eq!(offer.id, "r-high");
        assert_eq!(offer.source, OfferSource::Rule);
    }

    #[test]
    fn promoted_campaign_outranks_priority_100_rule() {
        let rules = vec![resolved(rule("r-max", 100, &["X"]))];
        let campaigns = vec![campaign("c-promo", 10, true)];

        let offer = select_offer(&rules, &campaigns, &cart()).expect("offer");
        assert_eq!(offer.id, "c-promo");
        assert_eq!(offer.source, OfferSource::Campaign);
        assert_eq!(offer.target_products, vec![ProductId::from("U1")]);
    }

    #[test]
    fn promoted_campaigns_rank_among_themselves_by_priority() {
        let campaigns = vec![campaign("c-a", 5, true), campaign("c-b", 50, true)];
        let offer = select_offer(&[], &campaigns, &cart()).expect("offer");
        assert_eq!(offer.id, "c-b");
    }

    #[test]
    fn unpromoted_campaign_competes_on_numeric_priority() {
        let rules = vec![resolved(rule("r-1", 60, &["X"]))];
        let campaigns = vec![campaign("c-1", 40, false)];
        let offer = select_offer(&rules, &campaigns, &cart()).expect("offer");
        assert_eq!(offer.id, "r-1");
    }

    #[test]
    fn tie_breaks_on_cart_revenue_of_recommended_products() {
        // Same priority; r-in-cart recommends the product already in the cart
        // (revenue 60), r-outside recommends something absent (revenue 0).
        let rules = vec![
            resolved(rule("r-outside", 50, &["absent"])),
            resolved(rule("r-in-cart", 50, &["P1"])),
        ];
        let offer = select_offer(&rules, &[], &cart()).expect("offer");
        assert_eq!(offer.id, "r-in-cart");
    }

    #[test]
    fn exact_ties_fall_back_to_insertion_order_deterministically() {
        let rules = vec![resolved(rule("r-first", 50, &["X"])), resolved(rule("r-second", 50, &["X"]))];
        for _ in 0..10 {
            let offer = select_offer(&rules, &[], &cart()).expect("offer");
            assert_eq!(offer.id, "r-first");
        }
    }

    #[test]
    fn rules_precede_campaigns_on_exact_tie() {
        let rules = vec![resolved(rule("r-1", 50, &["absent"]))];
        let campaigns = vec![campaign("c-1", 50, false)];
        // Campaign's upsell U1 is not in the cart either, so both sides tie at
        // zero revenue; the rule was inserted first.
        let offer = select_offer(&rules, &campaigns, &cart()).expect("offer");
        assert_eq!(offer.id, "r-1");
    }

    #[test]
    fn replaced_rule_winner_surfaces_campaign_content_in_rule_slot() {
        let replacing = campaign("c-replace", 1, false);
        let mut winner = resolved(rule("r-1", 80, &["X"]));
        winner.replaced_by = Some(CampaignId("c-replace".to_string()));

        let offer = select_offer(&[winner], &[replacing], &cart()).expect("offer");
        assert_eq!(offer.source, OfferSource::Campaign);
        assert_eq!(offer.id, "c-replace");
        assert_eq!(offer.target_products, vec![ProductId::from("U1")]);
        // Placement stays where the rule would have rendered.
        assert_eq!(offer.display_type, DisplayType::Cart);
    }

    #[test]
    fn override_only_campaign_is_not_a_candidate() {
        let mut suppressor = campaign("c-suppress-only", 90, true);
        suppressor.upsell_products = Vec::new();
        assert!(select_offer(&[], &[suppressor], &cart()).is_none());
    }

    #[test]
    fn empty_candidate_set_yields_no_offer() {
        assert!(select_offer(&[], &[], &cart()).is_none());
    }
}
