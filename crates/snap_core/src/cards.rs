use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::coerce::{Coerced, coerce_int_u32, coerce_int_u64, coerce_u64};
use crate::core_api::{
    CardRecord, DEFAULT_BOOSTERS, DEFAULT_MASTERY_LEVEL, DEFAULT_MASTERY_XP, DefaultedFields,
};
use crate::document::{Document, is_metadata_key};

pub const BOOSTER_STATS_PATH: [&str; 3] = ["ServerState", "CardDefStats", "Stats"];
pub const MASTERY_PROGRESS_PATH: [&str; 3] = [
    "ServerState",
    "CharacterMasteryProgress",
    "CharacterProgressData",
];

const BOOSTERS_FIELD: &str = "Boosters";
const LEVEL_FIELD: &str = "LastClaimedLevel";
const EXPERIENCE_FIELD: &str = "Experience";

/// CardId to raw `Boosters` value. A `null` stays `null` here; coercion
/// happens during the merge.
pub type BoosterMap = BTreeMap<String, JsonValue>;

/// Readable mastery values per card. A card whose fields were all
/// unreadable appears in neither map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasteryMaps {
    pub levels: BTreeMap<String, u32>,
    pub experience: BTreeMap<String, u64>,
}

pub fn extract_boosters(collection: &Document) -> BoosterMap {
    let Some(stats) = collection.lookup_object(&BOOSTER_STATS_PATH) else {
        debug!("collection has no ServerState.CardDefStats.Stats mapping");
        return BoosterMap::new();
    };

    let boosters: BoosterMap = card_entries(stats)
        .filter_map(|(card_id, entry)| {
            entry
                .get(BOOSTERS_FIELD)
                .map(|raw| (card_id.clone(), raw.clone()))
        })
        .collect();

    debug!(cards = boosters.len(), "extracted booster entries");
    boosters
}

pub fn extract_mastery(mastery: &Document) -> MasteryMaps {
    let Some(progress) = mastery.lookup_object(&MASTERY_PROGRESS_PATH) else {
        debug!("mastery document has no CharacterProgressData mapping");
        return MasteryMaps::default();
    };

    let mut out = MasteryMaps::default();
    for (card_id, entry) in card_entries(progress) {
        if let Some(raw) = entry.get(LEVEL_FIELD) {
            match coerce_int_u32(raw) {
                Ok(level) => {
                    out.levels.insert(card_id.clone(), level);
                }
                Err(e) => debug!(card_id = %card_id, "skipping mastery level: {e}"),
            }
        }
        if let Some(raw) = entry.get(EXPERIENCE_FIELD) {
            match coerce_int_u64(raw) {
                Ok(xp) => {
                    out.experience.insert(card_id.clone(), xp);
                }
                Err(e) => debug!(card_id = %card_id, "skipping mastery experience: {e}"),
            }
        }
    }

    debug!(
        levels = out.levels.len(),
        experience = out.experience.len(),
        "extracted mastery entries"
    );
    out
}

/// Unions the booster and mastery ids into one record per card, in CardId
/// order, filling whatever is missing or unreadable with the defaults.
pub fn merge_card_records(boosters: &BoosterMap, mastery: &MasteryMaps) -> Vec<CardRecord> {
    let ids: BTreeSet<&String> = boosters
        .keys()
        .chain(mastery.levels.keys())
        .chain(mastery.experience.keys())
        .collect();

    ids.into_iter()
        .map(|card_id| {
            let booster_count = Coerced::resolve(
                boosters.get(card_id).map(coerce_u64),
                DEFAULT_BOOSTERS,
            );
            let level = Coerced::resolve(
                mastery.levels.get(card_id).copied().map(Ok),
                DEFAULT_MASTERY_LEVEL,
            );
            let xp = Coerced::resolve(
                mastery.experience.get(card_id).copied().map(Ok),
                DEFAULT_MASTERY_XP,
            );

            CardRecord {
                card_id: card_id.clone(),
                boosters: booster_count.get(),
                mastery_level: level.get(),
                mastery_xp: xp.get(),
                defaulted: DefaultedFields {
                    boosters: booster_count.is_defaulted(),
                    mastery_level: level.is_defaulted(),
                    mastery_xp: xp.is_defaulted(),
                },
            }
        })
        .collect()
}

fn card_entries(
    map: &JsonMap<String, JsonValue>,
) -> impl Iterator<Item = (&String, &JsonMap<String, JsonValue>)> {
    map.iter().filter_map(|(key, value)| {
        if is_metadata_key(key) {
            return None;
        }
        value.as_object().map(|entry| (key, entry))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{extract_boosters, extract_mastery, merge_card_records};
    use crate::document::Document;

    #[test]
    fn boosters_skip_metadata_and_entries_without_boosters() {
        let doc = Document::from_value(json!({
            "ServerState": {"CardDefStats": {"Stats": {
                "$type": "StatsDictionary",
                "Hulk": {"Boosters": 12},
                "Thor": {"Splits": 3},
                "Loki": "not-a-mapping",
                "Groot": {"Boosters": null}
            }}}
        }));

        let boosters = extract_boosters(&doc);
        assert_eq!(boosters.len(), 2);
        assert_eq!(boosters["Hulk"], json!(12));
        assert_eq!(boosters["Groot"], json!(null));
    }

    #[test]
    fn missing_paths_yield_empty_maps() {
        let doc = Document::from_value(json!({"ServerState": {}}));
        assert!(extract_boosters(&doc).is_empty());
        let mastery = extract_mastery(&doc);
        assert_eq!(mastery, super::MasteryMaps::default());
    }

    #[test]
    fn mastery_coercion_failures_only_drop_the_bad_field() {
        let doc = Document::from_value(json!({
            "ServerState": {"CharacterMasteryProgress": {"CharacterProgressData": {
                "$type": "ProgressDictionary",
                "Hulk": {"LastClaimedLevel": "7", "Experience": "not-a-number"},
                "Thor": {"LastClaimedLevel": {"bad": true}, "Experience": 140},
                "Loki": {"LastClaimedLevel": null}
            }}}
        }));

        let mastery = extract_mastery(&doc);
        assert_eq!(mastery.levels.get("Hulk"), Some(&7));
        assert_eq!(mastery.experience.get("Hulk"), None);
        assert_eq!(mastery.levels.get("Thor"), None);
        assert_eq!(mastery.experience.get("Thor"), Some(&140));
        assert!(!mastery.levels.contains_key("Loki"));
        assert!(!mastery.experience.contains_key("Loki"));
    }

    #[test]
    fn fully_unreadable_mastery_entry_yields_no_card() {
        let mastery_doc = Document::from_value(json!({
            "ServerState": {"CharacterMasteryProgress": {"CharacterProgressData": {
                "Ghost": {"LastClaimedLevel": null, "Experience": "?"}
            }}}
        }));

        let records = merge_card_records(&Default::default(), &extract_mastery(&mastery_doc));
        assert!(records.is_empty());
    }

    #[test]
    fn mastery_strings_must_be_whole_numbers() {
        let mastery_doc = Document::from_value(json!({
            "ServerState": {"CharacterMasteryProgress": {"CharacterProgressData": {
                "Hulk": {"LastClaimedLevel": "29.9", "Experience": "1e3"},
                "Thor": {"LastClaimedLevel": "30.0", "Experience": 512.7},
                "Wasp": {"LastClaimedLevel": " 12 ", "Experience": "400"}
            }}}
        }));
        let collection = Document::from_value(json!({
            "ServerState": {"CardDefStats": {"Stats": {"Hulk": {"Boosters": "4.0"}}}}
        }));

        let records = merge_card_records(
            &extract_boosters(&collection),
            &extract_mastery(&mastery_doc),
        );
        let ids: Vec<&str> = records.iter().map(|r| r.card_id.as_str()).collect();
        assert_eq!(ids, vec!["Hulk", "Thor", "Wasp"]);

        let hulk = &records[0];
        assert_eq!((hulk.boosters, hulk.mastery_level, hulk.mastery_xp), (4, 1, 0));
        assert!(hulk.defaulted.mastery_level);
        assert!(hulk.defaulted.mastery_xp);

        let thor = &records[1];
        assert_eq!((thor.mastery_level, thor.mastery_xp), (1, 512));
        assert!(!thor.is_max_mastery());

        let wasp = &records[2];
        assert_eq!((wasp.mastery_level, wasp.mastery_xp), (12, 400));
    }

    #[test]
    fn merge_fills_defaults_and_flags_them() {
        let collection = Document::from_value(json!({
            "ServerState": {"CardDefStats": {"Stats": {
                "Hulk": {"Boosters": 9},
                "Groot": {"Boosters": null}
            }}}
        }));
        let mastery_doc = Document::from_value(json!({
            "ServerState": {"CharacterMasteryProgress": {"CharacterProgressData": {
                "Hulk": {"LastClaimedLevel": 12, "Experience": 300},
                "Wasp": {"LastClaimedLevel": 4, "Experience": "oops"}
            }}}
        }));

        let records = merge_card_records(
            &extract_boosters(&collection),
            &extract_mastery(&mastery_doc),
        );
        let ids: Vec<&str> = records.iter().map(|r| r.card_id.as_str()).collect();
        assert_eq!(ids, vec!["Groot", "Hulk", "Wasp"]);

        let groot = &records[0];
        assert_eq!(
            (groot.boosters, groot.mastery_level, groot.mastery_xp),
            (0, 1, 0)
        );
        assert!(groot.defaulted.boosters);
        assert!(groot.defaulted.mastery_level);

        let hulk = &records[1];
        assert_eq!((hulk.boosters, hulk.mastery_level, hulk.mastery_xp), (9, 12, 300));
        assert!(!hulk.defaulted.any());

        let wasp = &records[2];
        assert_eq!((wasp.boosters, wasp.mastery_level, wasp.mastery_xp), (0, 4, 0));
        assert!(wasp.defaulted.boosters);
        assert!(!wasp.defaulted.mastery_level);
        assert!(wasp.defaulted.mastery_xp);
    }
}
