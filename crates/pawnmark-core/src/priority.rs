//! Rule priority spaces
//!
//! Override rules and normal rules each keep their own ordering. Orders
//! within a space are distinct but need not be contiguous. Reordering only
//! ever swaps the orders of two rules in the same space. Malformed rules
//! sit outside both spaces.

use crate::MarkerRule;

fn same_space(rule: &MarkerRule, is_override: bool) -> bool {
    !rule.is_malformed() && rule.is_override() == is_override
}

/// Order for a new rule appended to the space `is_override` selects
pub fn next_order(rules: &[MarkerRule], is_override: bool) -> i32 {
    rules
        .iter()
        .filter(|r| same_space(r, is_override))
        .map(MarkerRule::order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Index of the nearest neighbour in the same space, below (`earlier`) or
/// above the rule at `index`
fn neighbour(rules: &[MarkerRule], index: usize, earlier: bool) -> Option<usize> {
    let rule = rules.get(index)?;
    if rule.is_malformed() {
        return None;
    }
    let space = rule.is_override();
    let order = rule.order();
    let candidates = rules
        .iter()
        .enumerate()
        .filter(|(i, r)| *i != index && same_space(r, space));
    if earlier {
        candidates
            .filter(|(_, r)| r.order() < order)
            .max_by_key(|(_, r)| r.order())
            .map(|(i, _)| i)
    } else {
        candidates
            .filter(|(_, r)| r.order() > order)
            .min_by_key(|(_, r)| r.order())
            .map(|(i, _)| i)
    }
}

fn swap_orders(rules: &mut [MarkerRule], a: usize, b: usize) {
    let order_a = rules[a].order();
    let order_b = rules[b].order();
    rules[a].set_order(order_b);
    rules[b].set_order(order_a);
}

/// Move the rule at `index` one step earlier in its space
///
/// Returns false if it is already first.
pub fn increase_priority(rules: &mut [MarkerRule], index: usize) -> bool {
    match neighbour(rules, index, true) {
        Some(other) => {
            swap_orders(rules, index, other);
            true
        }
        None => false,
    }
}

/// Move the rule at `index` one step later in its space
///
/// Returns false if it is already last.
pub fn decrease_priority(rules: &mut [MarkerRule], index: usize) -> bool {
    match neighbour(rules, index, false) {
        Some(other) => {
            swap_orders(rules, index, other);
            true
        }
        None => false,
    }
}

/// Indices of the active rules in one space, in evaluation order
///
/// Ties on `order` fall back to list position.
pub fn evaluation_order(rules: &[MarkerRule], is_override: bool) -> Vec<usize> {
    let mut indices: Vec<usize> = rules
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_active() && same_space(r, is_override))
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| rules[i].order());
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleCondition, RuleKind};

    fn rules() -> Vec<MarkerRule> {
        vec![
            MarkerRule::new(RuleCondition::zero(RuleKind::Trait), 0),
            MarkerRule::new(RuleCondition::Drafted, 0),
            MarkerRule::new(RuleCondition::zero(RuleKind::Weapon), 5),
            MarkerRule::new(RuleCondition::Downed, 1),
            MarkerRule::new(RuleCondition::zero(RuleKind::Skill), 2),
        ]
    }

    fn orders(rules: &[MarkerRule]) -> Vec<i32> {
        rules.iter().map(MarkerRule::order).collect()
    }

    #[test]
    fn test_next_order_per_space() {
        let rules = rules();
        assert_eq!(next_order(&rules, false), 6);
        assert_eq!(next_order(&rules, true), 2);
        assert_eq!(next_order(&[], true), 0);
    }

    #[test]
    fn test_swaps_stay_in_space() {
        let mut rules = rules();

        // Skill (2) swaps with the nearest smaller order, Trait (0)
        assert!(increase_priority(&mut rules, 4));
        assert_eq!(orders(&rules), vec![2, 0, 5, 1, 0]);

        assert!(!increase_priority(&mut rules, 4));

        // Downed (1) swaps with Drafted (0), never with a normal rule
        assert!(increase_priority(&mut rules, 3));
        assert_eq!(orders(&rules), vec![2, 1, 5, 0, 0]);

        assert!(decrease_priority(&mut rules, 0));
        assert_eq!(orders(&rules), vec![5, 1, 2, 0, 0]);
        assert!(!decrease_priority(&mut rules, 0));
    }

    #[test]
    fn test_malformed_rules_are_outside_spaces() {
        let mut rules = rules();
        rules.push(MarkerRule::malformed(
            RuleCondition::zero(RuleKind::Weapon),
            100,
            "Weapon;;x",
            "bad",
        ));
        assert_eq!(next_order(&rules, false), 6);
        assert!(!increase_priority(&mut rules, 5));
        assert!(!decrease_priority(&mut rules, 2));
    }

    #[test]
    fn test_evaluation_order_ties_use_position() {
        let catalog = crate::Catalog::with_all_expansions();
        let mut rules = vec![
            MarkerRule::new(RuleCondition::FactionIcon, 3),
            MarkerRule::new(RuleCondition::IdeologyIcon, 1),
            MarkerRule::new(RuleCondition::FactionLeader, 1),
            MarkerRule::new(RuleCondition::Drafted, 0),
        ];
        for rule in rules.iter_mut().take(2) {
            rule.set_enabled(true, &catalog).unwrap();
        }
        rules[2] = rules[2].clone().with_enabled(true);
        rules[3] = rules[3].clone().with_enabled(true);

        assert_eq!(evaluation_order(&rules, false), vec![1, 2, 0]);
        assert_eq!(evaluation_order(&rules, true), vec![3]);
    }
}
