//! Property tests for the codec, the priority model and the queue

mod common;

use common::catalog;
use pawnmark_core::{
    decode_rule, encode_rule, AgeRange, DefId, EvaluationQueue, Gender, MarkerRule,
    MarkerSettings, Passion, PawnType, QueryCondition, Requirements, RuleCondition,
    SkillRequirement, ThingId, TraitRequirement, WeaponClass,
};
use proptest::prelude::*;

fn def() -> impl Strategy<Value = DefId> {
    "[A-Z][A-Za-z0-9_]{0,10}".prop_map(DefId::new)
}

/// Free-text query names, including every field and list separator
fn query_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ,;|§]{0,12}"
}

fn defs() -> impl Strategy<Value = Vec<DefId>> {
    prop::collection::vec(def(), 0..4)
}

fn requirements<T: std::fmt::Debug + Clone>(
    entry: impl Strategy<Value = T>,
) -> impl Strategy<Value = Requirements<T>> {
    (prop::collection::vec(entry, 0..4), any::<bool>()).prop_map(|(entries, require_all)| {
        Requirements {
            entries,
            require_all,
        }
    })
}

fn passion() -> impl Strategy<Value = Passion> {
    prop_oneof![
        Just(Passion::None),
        Just(Passion::Minor),
        Just(Passion::Major)
    ]
}

fn condition() -> impl Strategy<Value = RuleCondition> {
    prop_oneof![
        defs().prop_map(RuleCondition::Weapon),
        prop_oneof![
            Just(WeaponClass::Ranged),
            Just(WeaponClass::Melee),
            Just(WeaponClass::Unarmed)
        ]
        .prop_map(RuleCondition::WeaponType),
        requirements(
            (def(), prop::option::of(-2i32..=2))
                .prop_map(|(def, degree)| TraitRequirement { def, degree })
        )
        .prop_map(RuleCondition::Trait),
        requirements((def(), 0u32..=20, passion()).prop_map(|(skill, level, passion)| {
            SkillRequirement::new(skill, level, passion)
        }))
        .prop_map(RuleCondition::Skill),
        requirements(def()).prop_map(RuleCondition::HediffStatic),
        Just(RuleCondition::HediffAny),
        defs().prop_map(RuleCondition::Relative),
        Just(RuleCondition::Drafted),
        Just(RuleCondition::Downed),
        defs().prop_map(RuleCondition::MentalState),
        prop_oneof![Just(Gender::Male), Just(Gender::Female)].prop_map(RuleCondition::Gender),
        (0u32..100, 0u32..100)
            .prop_map(|(min, max)| RuleCondition::Age(AgeRange { min, max })),
        defs().prop_map(RuleCondition::Xenotype),
        requirements(def()).prop_map(RuleCondition::ApparelType),
        Just(RuleCondition::FactionIcon),
        Just(RuleCondition::IdeologyIcon),
        defs().prop_map(RuleCondition::Title),
        query_name().prop_map(|name| RuleCondition::Query(QueryCondition::new(name.as_str()))),
    ]
}

fn pawn_type() -> impl Strategy<Value = PawnType> {
    prop::sample::select(PawnType::ALL.to_vec())
}

prop_compose! {
    fn rule()(
        condition in condition(),
        order in -5i32..50,
        set in prop::sample::select(vec!["A", "B"]),
        index in 0usize..2,
        limitation in pawn_type(),
        enabled in any::<bool>(),
    ) -> MarkerRule {
        let catalog = catalog();
        let mut rule = MarkerRule::new(condition, order);
        rule.set_marker(DefId::new(set), index, &catalog).unwrap();
        // Limitations the kind does not accept leave the rule unrestricted
        let _ = rule.set_limitation(limitation, &catalog);
        let _ = rule.set_enabled(enabled, &catalog);
        rule
    }
}

#[derive(Debug, Clone, Copy)]
enum Move {
    Up(usize),
    Down(usize),
}

fn moves() -> impl Strategy<Value = Vec<Move>> {
    prop::collection::vec(
        prop_oneof![(0usize..8).prop_map(Move::Up), (0usize..8).prop_map(Move::Down)],
        0..40,
    )
}

proptest! {
    #[test]
    fn prop_rule_round_trip(rule in rule()) {
        let catalog = catalog();
        let blob = encode_rule(&rule);
        let decoded = decode_rule(&blob, &catalog);
        prop_assert!(!decoded.is_malformed(), "{blob} failed to decode");
        prop_assert_eq!(&decoded, &rule);
        prop_assert_eq!(encode_rule(&decoded), blob);
    }

    #[test]
    fn prop_malformed_blobs_are_preserved(blob in "[A-Za-z;|§,0-9]{0,40}") {
        let rule = decode_rule(&blob, &catalog());
        if rule.is_malformed() {
            prop_assert!(!rule.is_active());
            prop_assert_eq!(encode_rule(&rule), blob);
        }
    }

    /// Swaps keep orders distinct per space and follow a simple list model
    #[test]
    fn prop_priority_swaps(kinds in prop::collection::vec(any::<bool>(), 1..8), moves in moves()) {
        let mut settings = MarkerSettings::default();
        let mut model: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for is_override in &kinds {
            let condition = if *is_override {
                RuleCondition::Downed
            } else {
                RuleCondition::HediffAny
            };
            let index = settings.add_rule(condition);
            model[usize::from(*is_override)].push(index);
        }

        for mv in moves {
            let (index, up) = match mv {
                Move::Up(i) => (i % kinds.len(), true),
                Move::Down(i) => (i % kinds.len(), false),
            };
            let space = &mut model[usize::from(kinds[index])];
            let Some(pos) = space.iter().position(|&i| i == index) else {
                unreachable!("every rule is in its space");
            };
            let moved = if up {
                settings.increase_priority(index)
            } else {
                settings.decrease_priority(index)
            };
            let expected = if up { pos > 0 } else { pos + 1 < space.len() };
            prop_assert_eq!(moved, expected);
            if moved {
                let other = if up { pos - 1 } else { pos + 1 };
                space.swap(pos, other);
            }
        }

        for (flag, space) in [(false, &model[0]), (true, &model[1])] {
            let mut by_order: Vec<usize> = (0..kinds.len())
                .filter(|&i| kinds[i] == flag)
                .collect();
            by_order.sort_by_key(|&i| settings.rules()[i].order());
            prop_assert_eq!(&by_order, space);

            let mut orders: Vec<i32> =
                by_order.iter().map(|&i| settings.rules()[i].order()).collect();
            orders.dedup();
            prop_assert_eq!(orders.len(), by_order.len());
        }
    }

    #[test]
    fn prop_enqueue_keeps_first_occurrence(ids in prop::collection::vec(0u64..10, 0..50)) {
        let mut queue = EvaluationQueue::new();
        let mut expected: Vec<ThingId> = Vec::new();
        for id in ids {
            let id = ThingId::new(id);
            let fresh = !expected.contains(&id);
            prop_assert_eq!(queue.enqueue(id), fresh);
            if fresh {
                expected.push(id);
            }
        }
        prop_assert_eq!(queue.iter().collect::<Vec<_>>(), expected);
    }
}
