use std::collections::BTreeSet;

use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::core_api::AlbumRecord;
use crate::document::{Document, scalar_id};

pub const ALBUMS_PATH: [&str; 2] = ["ServerState", "AllAlbumData"];

const ALBUM_DEF_FIELD: &str = "AlbumDef";
const ALBUM_ID_FIELD: &str = "AlbumDefId";
const ALBUM_NAME_FIELD: &str = "Name";
const ALBUM_VARIANTS_FIELD: &str = "AlbumVariants";

/// Keys a mapping-encoded variant reference may carry its id under, highest
/// priority first.
pub const VARIANT_REF_KEYS: [&str; 4] = ["Id", "ArtVariantDefId", "AlbumVariantDefId", "Value"];

/// One entry of an album's variant list after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantRef {
    Direct(String),
    Keyed { key: &'static str, id: String },
}

impl VariantRef {
    pub fn resolve(raw: &JsonValue) -> Option<Self> {
        match raw {
            JsonValue::String(id) => Some(Self::Direct(id.clone())),
            JsonValue::Object(fields) => VARIANT_REF_KEYS.iter().find_map(|&key| {
                let id = fields.get(key)?.as_str()?;
                Some(Self::Keyed {
                    key,
                    id: id.to_string(),
                })
            }),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Direct(id) | Self::Keyed { id, .. } => id,
        }
    }
}

pub fn album_completion(collection: &Document, owned: &BTreeSet<String>) -> Vec<AlbumRecord> {
    let Some(albums) = collection.lookup_array(&ALBUMS_PATH) else {
        debug!("collection has no ServerState.AllAlbumData list");
        return Vec::new();
    };

    let mut records = Vec::new();
    for album in albums {
        let Some(album) = album.as_object() else {
            continue;
        };
        let def = album
            .get(ALBUM_DEF_FIELD)
            .and_then(JsonValue::as_object);
        match album_record(def, owned) {
            Some(record) => records.push(record),
            None => debug!(
                album_id = ?def.and_then(|d| d.get(ALBUM_ID_FIELD)),
                "dropping album with no resolvable variants"
            ),
        }
    }

    debug!(albums = records.len(), "computed album completion");
    records
}

fn album_record(
    def: Option<&JsonMap<String, JsonValue>>,
    owned: &BTreeSet<String>,
) -> Option<AlbumRecord> {
    let field = |name: &str| def.and_then(|d| d.get(name));

    let refs: Vec<VariantRef> = field(ALBUM_VARIANTS_FIELD)
        .and_then(JsonValue::as_array)
        .map(|items| items.iter().filter_map(VariantRef::resolve).collect())
        .unwrap_or_default();
    if refs.is_empty() {
        return None;
    }

    let album_id = field(ALBUM_ID_FIELD).and_then(scalar_id);
    let album_name = field(ALBUM_NAME_FIELD)
        .and_then(scalar_id)
        .or_else(|| album_id.clone());

    let total_variants = refs.len();
    let owned_variants = refs.iter().filter(|r| owned.contains(r.id())).count();

    Some(AlbumRecord {
        album_id,
        album_name,
        total_variants,
        owned_variants,
        completion_pct: completion_pct(owned_variants, total_variants),
    })
}

/// Owned share as a percentage rounded to two decimals; zero for an empty
/// album.
pub fn completion_pct(owned: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = owned as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}
