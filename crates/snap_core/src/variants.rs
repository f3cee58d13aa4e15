use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::core_api::VariantRecord;
use crate::document::{Document, scalar_id};

pub const CARDS_PATH: [&str; 2] = ["ServerState", "Cards"];

const CARD_ID_FIELD: &str = "CardDefId";
const ART_VARIANT_FIELD: &str = "ArtVariantDefId";

/// The owned card-instance list, or an empty slice when the collection has
/// none.
fn card_instances(collection: &Document) -> &[JsonValue] {
    match collection.lookup(&CARDS_PATH) {
        Some(JsonValue::Array(items)) => items.as_slice(),
        Some(other) => {
            warn!(
                kind = json_kind(other),
                "ServerState.Cards is not a list; treating as empty"
            );
            &[]
        }
        None => &[],
    }
}

/// Groups owned instances by card. Instances lacking either id are skipped.
pub fn aggregate_variants(collection: &Document) -> Vec<VariantRecord> {
    let mut by_card: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut skipped = 0usize;

    for instance in card_instances(collection) {
        let Some(fields) = instance.as_object() else {
            skipped += 1;
            continue;
        };
        let card_id = fields.get(CARD_ID_FIELD).and_then(scalar_id);
        let variant_id = fields.get(ART_VARIANT_FIELD).and_then(scalar_id);
        match (card_id, variant_id) {
            (Some(card_id), Some(variant_id)) => {
                by_card.entry(card_id).or_default().insert(variant_id);
            }
            _ => skipped += 1,
        }
    }

    debug!(
        cards = by_card.len(),
        skipped, "aggregated owned variants per card"
    );

    by_card
        .into_iter()
        .map(|(card_id, owned_variant_ids)| VariantRecord {
            card_id,
            owned_variant_ids,
        })
        .collect()
}

/// Every distinct art variant id across all owned instances, whether or not
/// the instance names its card.
pub fn owned_variant_ids(collection: &Document) -> BTreeSet<String> {
    card_instances(collection)
        .iter()
        .filter_map(|instance| instance.as_object()?.get(ART_VARIANT_FIELD))
        .filter_map(scalar_id)
        .collect()
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
