//! Rule blob codec
//!
//! A rule persists as one `;`-delimited record:
//!
//! ```text
//! kind;params;markerSet;markerIndex;enabled;order;limitation
//! ```
//!
//! The kind is the first field and the last five fields are fixed, so the
//! parameter payload spans everything in between and may itself contain
//! `;`. Blobs that fail to decode become malformed rules that keep the
//! original text.

use crate::rule::params::{self, ITEM_SEPARATOR};
use crate::{
    Catalog, DefId, Error, Expansion, MarkerRule, PawnType, Result, RuleCondition, RuleKind,
};
use tracing::warn;

/// Number of top-level fields in a rule blob
pub const FIELD_COUNT: usize = 7;

/// Fields after the parameter payload
const TAIL_FIELDS: usize = 5;

/// Encode a rule into its blob
///
/// Malformed rules return the blob they were loaded from, unchanged.
pub fn encode_rule(rule: &MarkerRule) -> String {
    if let Some(error) = rule.config_error() {
        return error.raw.clone();
    }
    let set = rule.marker_set().map(DefId::as_str).unwrap_or_default();
    format!(
        "{kind}{s}{params}{s}{set}{s}{index}{s}{enabled}{s}{order}{s}{limitation}",
        kind = rule.kind_name(),
        params = rule.condition().encode(),
        index = rule.marker_index(),
        enabled = rule.is_enabled(),
        order = rule.order(),
        limitation = rule.limitation(),
        s = ITEM_SEPARATOR,
    )
}

/// Decode a rule blob
///
/// Never fails: a blob that cannot be decoded yields a malformed rule.
pub fn decode_rule(blob: &str, catalog: &Catalog) -> MarkerRule {
    match try_decode_rule(blob, catalog) {
        Ok(rule) => rule,
        Err(e) => {
            warn!("Malformed marker rule {:?}: {}", blob, e);
            let fields: Vec<&str> = blob.split(ITEM_SEPARATOR).collect();
            let condition = match RuleKind::from_name(fields[0]) {
                Some(kind) => RuleCondition::zero(kind),
                None => RuleCondition::Unrecognized(fields[0].to_string()),
            };
            let order = fields
                .len()
                .checked_sub(2)
                .filter(|_| fields.len() >= FIELD_COUNT)
                .and_then(|i| fields[i].parse().ok())
                .unwrap_or_default();
            MarkerRule::malformed(condition, order, blob, e.to_string())
        }
    }
}

/// Decode a rule blob, reporting the first problem found
pub fn try_decode_rule(blob: &str, catalog: &Catalog) -> Result<MarkerRule> {
    let fields: Vec<&str> = blob.split(ITEM_SEPARATOR).collect();
    if fields.len() < FIELD_COUNT {
        return Err(Error::InvalidParameters(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let kind = params::parse_named(fields[0], "rule kind", RuleKind::from_name)?;
    let tail = &fields[fields.len() - TAIL_FIELDS..];
    let payload = fields[1..fields.len() - TAIL_FIELDS].join(&ITEM_SEPARATOR.to_string());
    let condition = RuleCondition::decode(kind, &payload)?;

    let marker_set = match tail[0] {
        "" => None,
        id => {
            let id = DefId::new(id);
            if !catalog.marker_sets.contains(&id) {
                return Err(Error::MarkerSetNotFound(id.to_string()));
            }
            Some(id)
        }
    };
    let marker_index: usize = params::parse(tail[1], "marker index")?;
    let enabled: bool = params::parse(tail[2], "enabled")?;
    let order: i32 = params::parse(tail[3], "order")?;
    let limitation = params::parse_named(tail[4], "pawn type", PawnType::from_name)?;

    if let Some(expansion) = kind.required_expansion() {
        if !catalog.has_expansion(expansion) {
            return Err(Error::MissingExpansion(expansion));
        }
    }
    if limitation == PawnType::Vehicle && !catalog.has_expansion(Expansion::Vehicles) {
        return Err(Error::MissingExpansion(Expansion::Vehicles));
    }
    if !kind.is_applicable(limitation, catalog) {
        return Err(Error::InapplicablePawnType {
            kind: kind.to_string(),
            pawn_type: limitation,
        });
    }

    let rule = MarkerRule::new(condition, order).with_fields(marker_set, marker_index, limitation);
    let enabled = enabled
        && match rule.can_stay_enabled(catalog) {
            Ok(()) => true,
            Err(e) => {
                warn!("Disabling marker rule {:?}: {}", blob, e);
                false
            }
        };
    if enabled && rule.can_enable(catalog).is_err() {
        warn!("Marker rule {:?} points past the end of its marker set", blob);
    }
    Ok(rule.with_enabled(enabled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MarkerSet, Passion, QueryCondition, Requirements, SkillRequirement};

    fn catalog() -> Catalog {
        Catalog::new()
            .with_marker_set(MarkerSet::new("A", &["a1", "a2"]))
            .with_marker_set(MarkerSet::new("B", &["b1", "b2", "b3"]))
    }

    #[test]
    fn test_malformed_blob_is_preserved() {
        let blob = "Weapon;;INVALID;X;true;0";
        let rule = decode_rule(blob, &catalog());

        assert!(rule.is_malformed());
        assert!(!rule.is_active());
        assert_eq!(rule.kind(), Some(RuleKind::Weapon));
        assert_eq!(encode_rule(&rule), blob);
    }

    #[test]
    fn test_unknown_marker_set_is_malformed() {
        let blob = "Weapon;Gun_Revolver;INVALID;0;true;0;Default";
        let rule = decode_rule(blob, &catalog());
        assert!(rule.is_malformed());
        assert_eq!(rule.order(), 0);
        assert!(rule.config_error().unwrap().message.contains("INVALID"));
        assert_eq!(encode_rule(&rule), blob);
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        let rule = decode_rule("Teleport;x;A;0;false;4;Default", &catalog());
        assert!(rule.is_malformed());
        assert_eq!(rule.kind(), None);
        assert_eq!(rule.kind_name(), "Teleport");
        assert_eq!(rule.order(), 4);
    }

    #[test]
    fn test_skill_rule_round_trip() {
        let blob = "Skill;Shooting§8§0|Melee§8§0;false;B;2;true;3;Colonist";
        let rule = decode_rule(blob, &catalog());

        assert!(!rule.is_malformed());
        assert!(rule.is_enabled());
        assert_eq!(rule.order(), 3);
        assert_eq!(rule.limitation(), PawnType::Colonist);
        assert_eq!(rule.marker_blob(), "B;3");
        assert_eq!(
            rule.condition(),
            &RuleCondition::Skill(Requirements::any(vec![
                SkillRequirement::new("Shooting", 8, Passion::None),
                SkillRequirement::new("Melee", 8, Passion::None),
            ]))
        );
        assert_eq!(encode_rule(&rule), blob);
    }

    #[test]
    fn test_legacy_payload_is_upgraded() {
        let rule = decode_rule("Weapon;Gun_Revolver,Gun_Autopistol;A;0;true;1;Default", &catalog());
        assert!(!rule.is_malformed());
        assert_eq!(
            encode_rule(&rule),
            "Weapon;Gun_Revolver|Gun_Autopistol;A;0;true;1;Default"
        );
    }

    #[test]
    fn test_missing_expansion_is_malformed() {
        let blob = "Gene;Robust;false;A;0;false;0;Default";
        assert!(decode_rule(blob, &catalog()).is_malformed());

        let biotech = catalog().with_expansion(Expansion::Biotech);
        let rule = decode_rule(blob, &biotech);
        assert!(!rule.is_malformed());
        assert_eq!(encode_rule(&rule), blob);
    }

    #[test]
    fn test_inapplicable_limitation_is_malformed() {
        let rule = decode_rule("Drafted;;A;0;true;0;Enemy", &catalog());
        assert!(matches!(
            try_decode_rule("Drafted;;A;0;true;0;Enemy", &catalog()),
            Err(Error::InapplicablePawnType { .. })
        ));
        assert!(rule.is_malformed());
    }

    #[test]
    fn test_enabled_but_incomplete_rule_is_disabled() {
        let rule = decode_rule("Weapon;;A;0;true;0;Default", &catalog());
        assert!(!rule.is_malformed());
        assert!(!rule.is_enabled());
        assert_eq!(encode_rule(&rule), "Weapon;;A;0;false;0;Default");
    }

    #[test]
    fn test_stale_marker_index_stays_enabled() {
        let blob = "Downed;;A;5;true;0;Default";
        let stale = decode_rule(blob, &catalog());
        assert!(!stale.is_malformed());
        assert!(stale.is_enabled());
        assert_eq!(stale.marker_index(), 5);
        assert!(stale.can_enable(&catalog()).is_err());
        assert_eq!(encode_rule(&stale), blob);

        let grown = Catalog::new().with_marker_set(MarkerSet::new(
            "A",
            &["a1", "a2", "a3", "a4", "a5", "a6"],
        ));
        assert!(decode_rule(blob, &grown).can_enable(&grown).is_ok());
    }

    #[test]
    fn test_query_names_are_kept_verbatim() {
        let catalog = catalog().with_expansion(Expansion::QueryPlugin);
        for name in ["Wounded, bleeding", "a;b", "x|y§z", "trailing;"] {
            let mut rule = MarkerRule::new(RuleCondition::Query(QueryCondition::new(name)), 2)
                .with_fields(Some(DefId::new("B")), 1, PawnType::Default);
            rule.set_enabled(true, &catalog).unwrap();

            let blob = encode_rule(&rule);
            let decoded = decode_rule(&blob, &catalog);
            assert!(!decoded.is_malformed(), "{blob}");
            assert!(decoded.is_enabled());
            assert_eq!(decoded.query_name(), Some(name));
            assert_eq!(decoded, rule);
            assert_eq!(encode_rule(&decoded), blob);
        }
    }

    #[test]
    fn test_field_count_errors() {
        assert!(matches!(
            try_decode_rule("Drafted;;A;0;true", &catalog()),
            Err(Error::InvalidParameters(_))
        ));
        assert!(try_decode_rule("Drafted;;A;0;yes;0;Default", &catalog()).is_err());
        assert!(try_decode_rule("Drafted;;A;-1;true;0;Default", &catalog()).is_err());
    }
}
