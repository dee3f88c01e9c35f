//! Trigger predicates. Pure, total over well-formed input, and defensive:
//! anything missing or unknown evaluates to "no match", never an error, so a
//! misconfigured rule can only ever suppress itself.

use rust_decimal::Decimal;

use crate::domain::cart::{CartSnapshot, TimeContext};
use crate::domain::rule::{CartValueOperator, CategoryOperator, TriggerCondition};
use crate::engine::taxonomy::CategoryTaxonomy;

/// Dispatch a rule trigger against the current cart and session timing.
pub fn trigger_holds(
    trigger: &TriggerCondition,
    cart: &CartSnapshot,
    time: &TimeContext,
    taxonomy: &CategoryTaxonomy,
) -> bool {
    match trigger {
        TriggerCondition::Category { category, category_operator } => {
            category_holds(category.as_deref(), *category_operator, cart, taxonomy)
        }
        TriggerCondition::CartValue {
            cart_value_operator,
            cart_value,
            cart_value_min,
            cart_value_max,
        } => cart_value_holds(
            *cart_value_operator,
            *cart_value,
            *cart_value_min,
            *cart_value_max,
            cart.cart_total(),
        ),
        TriggerCondition::TimeBased {
            time_on_site_min,
            time_on_site_max,
            active_time_on_site_min,
        } => time_holds(*time_on_site_min, *time_on_site_max, *active_time_on_site_min, time),
        TriggerCondition::Unknown => false,
    }
}

fn category_holds(
    category: Option<&str>,
    operator: CategoryOperator,
    cart: &CartSnapshot,
    taxonomy: &CategoryTaxonomy,
) -> bool {
    let Some(category) = category else {
        return false;
    };

    let mut item_categories = cart.items.iter().map(|item| taxonomy.categorize(&item.title));
    match operator {
        CategoryOperator::Contains => item_categories.any(|c| c == category),
        CategoryOperator::Equals => item_categories.all(|c| c == category),
        CategoryOperator::NotContains => item_categories.all(|c| c != category),
    }
}

fn cart_value_holds(
    operator: CartValueOperator,
    value: Option<Decimal>,
    min: Option<Decimal>,
    max: Option<Decimal>,
    cart_total: Decimal,
) -> bool {
    match operator {
        CartValueOperator::GreaterThan => match value.or(min) {
            Some(threshold) => cart_total > threshold,
            None => false,
        },
        CartValueOperator::LessThan => match value.or(max) {
            Some(threshold) => cart_total < threshold,
            None => false,
        },
        CartValueOperator::Equals => match value {
            Some(expected) => cart_total == expected,
            None => false,
        },
        CartValueOperator::Between => match (min, max) {
            (Some(min), Some(max)) => min <= cart_total && cart_total <= max,
            _ => false,
        },
    }
}

fn time_holds(
    time_on_site_min: Option<u64>,
    time_on_site_max: Option<u64>,
    active_time_on_site_min: Option<u64>,
    time: &TimeContext,
) -> bool {
    // Absent thresholds are satisfied; present ones are AND-combined.
    if let Some(min) = time_on_site_min {
        if time.time_on_site < min {
            return false;
        }
    }
    if let Some(max) = time_on_site_max {
        if time.time_on_site > max {
            return false;
        }
    }
    if let Some(min) = active_time_on_site_min {
        if time.active_time_on_site < min {
            return false;
        }
    }
    true
}
