use crate::domain::cart::{CartSnapshot, TimeContext};
use crate::domain::rule::Rule;
use crate::engine::conditions::trigger_holds;
use crate::engine::taxonomy::CategoryTaxonomy;

/// Filter the rule set down to active rules whose trigger currently holds.
///
/// The status filter is re-applied even when the caller already scoped the
/// query; an inactive rule slipping through a stale read must not match.
/// Ordering is left untouched; ranking belongs to the selector.
pub fn match_rules(
    rules: &[Rule],
    cart: &CartSnapshot,
    time: &TimeContext,
    taxonomy: &CategoryTaxonomy,
) -> Vec<Rule> {
    rules
        .iter()
        .filter(|rule| rule.is_active())
        .filter(|rule| trigger_holds(&rule.trigger, cart, time, taxonomy))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::match_rules;
    use crate::domain::cart::{CartItem, CartSnapshot, TimeContext};
    use crate::domain::product::ProductId;
    use crate::domain::rule::{
        CartValueOperator, DisplayType, OwnerId, Rule, RuleId, RuleStatus, TriggerCondition,
    };
    use crate::engine::taxonomy::CategoryTaxonomy;

    fn rule(id: &str, status: RuleStatus, trigger: TriggerCondition) -> Rule {
        Rule {
            id: RuleId(id.to_string()),
            owner_id: OwnerId("merchant-1".to_string()),
            name: format!("Rule {id}"),
            description: None,
            trigger,
            target_products: vec![ProductId::from("P9")],
            display_type: DisplayType::Popup,
            priority: 40,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn over_fifty() -> TriggerCondition {
        TriggerCondition::CartValue {
            cart_value_operator: CartValueOperator::GreaterThan,
            cart_value: None,
            cart_value_min: Some(Decimal::new(50, 0)),
            cart_value_max: None,
        }
    }

    fn sixty_dollar_cart() -> CartSnapshot {
        CartSnapshot::new(vec![CartItem {
            product_id: ProductId::from("P1"),
            title: "Widget".to_string(),
            price: Decimal::new(30, 0),
            quantity: 2,
        }])
    }

    #[test]
    fn keeps_only_active_rules_whose_trigger_holds() {
        let rules = vec![
            rule("r-active", RuleStatus::Active, over_fifty()),
            rule("r-draft", RuleStatus::Draft, over_fifty()),
            rule("r-inactive", RuleStatus::Inactive, over_fifty()),
            rule("r-unknown", RuleStatus::Active, TriggerCondition::Unknown),
        ];

        let matched = match_rules(
            &rules,
            &sixty_dollar_cart(),
            &TimeContext::default(),
            &CategoryTaxonomy::default(),
        );

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id.0, "r-active");
    }

    #[test]
    fn preserves_input_order_of_matching_rules() {
        let rules = vec![
            rule("r-1", RuleStatus::Active, over_fifty()),
            rule("r-2", RuleStatus::Active, over_fifty()),
        ];

        let matched = match_rules(
            &rules,
            &sixty_dollar_cart(),
            &TimeContext::default(),
            &CategoryTaxonomy::default(),
        );

        let ids: Vec<&str> = matched.iter().map(|r| r.id.0.as_str()).collect();
        assert_eq!(ids, ["r-1", "r-2"]);
    }

    #[test]
    fn matching_does_not_mutate_the_source_rules() {
        let rules = vec![rule("r-1", RuleStatus::Active, over_fifty())];
        let before = rules.clone();

        let _ = match_rules(
            &rules,
            &sixty_dollar_cart(),
            &TimeContext::default(),
            &CategoryTaxonomy::default(),
        );

        assert_eq!(rules, before);
    }
}
