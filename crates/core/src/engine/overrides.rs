//! Campaign-declared rule overrides, applied to a fresh per-evaluation
//! candidate list. The stored rules are never touched; a boost lives exactly
//! as long as one evaluation.

use crate::domain::campaign::{Campaign, CampaignId, OverrideType};
use crate::domain::rule::Rule;

/// A matched rule plus the evaluation-scoped state overrides gave it.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRule {
    pub rule: Rule,
    pub effective_priority: i32,
    /// Set by a `replace` override: the campaign whose content supersedes this
    /// rule's own if the rule wins selection.
    pub replaced_by: Option<CampaignId>,
}

impl ResolvedRule {
    fn new(rule: Rule) -> Self {
        let effective_priority = rule.priority;
        Self { rule, effective_priority, replaced_by: None }
    }
}

/// Apply every matched campaign's overrides to the matched rules.
///
/// Overrides run in campaign match order, then declaration order within each
/// campaign. Sequential enhances accumulate. Suppression is terminal: once a
/// rule is removed, later overrides naming it find nothing and do nothing.
pub fn apply_overrides(matched_rules: Vec<Rule>, campaigns: &[Campaign]) -> Vec<ResolvedRule> {
    let mut resolved: Vec<ResolvedRule> = matched_rules.into_iter().map(ResolvedRule::new).collect();

    for campaign in campaigns {
        for rule_override in &campaign.rule_overrides {
            match rule_override.override_type {
                OverrideType::Enhance => {
                    if let Some(candidate) =
                        resolved.iter_mut().find(|candidate| candidate.rule.id == rule_override.rule_id)
                    {
                        candidate.effective_priority = candidate
                            .effective_priority
                            .saturating_add(rule_override.priority_boost());
                    }
                }
                OverrideType::Replace => {
                    if let Some(candidate) =
                        resolved.iter_mut().find(|candidate| candidate.rule.id == rule_override.rule_id)
                    {
                        candidate.replaced_by = Some(campaign.id.clone());
                    }
                }
                OverrideType::Suppress => {
                    resolved.retain(|candidate| candidate.rule.id != rule_override.rule_id);
                }
            }
        }
    }

    resolved
}
