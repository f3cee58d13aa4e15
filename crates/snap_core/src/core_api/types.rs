use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Highest mastery level a card can reach.
pub const MAX_MASTERY_LEVEL: u32 = 30;

pub const DEFAULT_BOOSTERS: u64 = 0;
pub const DEFAULT_MASTERY_LEVEL: u32 = 1;
pub const DEFAULT_MASTERY_XP: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultedFields {
    pub boosters: bool,
    pub mastery_level: bool,
    pub mastery_xp: bool,
}

impl DefaultedFields {
    pub fn any(&self) -> bool {
        self.boosters || self.mastery_level || self.mastery_xp
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardRecord {
    pub card_id: String,
    pub boosters: u64,
    pub mastery_level: u32,
    pub mastery_xp: u64,
    pub defaulted: DefaultedFields,
}

impl CardRecord {
    pub fn is_max_mastery(&self) -> bool {
        self.mastery_level == MAX_MASTERY_LEVEL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantRecord {
    pub card_id: String,
    pub owned_variant_ids: BTreeSet<String>,
}

impl VariantRecord {
    pub fn variant_count(&self) -> usize {
        self.owned_variant_ids.len()
    }

    /// Pipe-delimited, lexically sorted form used in tables.
    pub fn joined_variant_ids(&self) -> String {
        self.owned_variant_ids
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlbumRecord {
    pub album_id: Option<String>,
    pub album_name: Option<String>,
    pub total_variants: usize,
    pub owned_variants: usize,
    pub completion_pct: f64,
}

impl AlbumRecord {
    pub fn needed_for_completion(&self) -> usize {
        self.total_variants.saturating_sub(self.owned_variants)
    }
}

/// Record counts for a loaded pair of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub card_count: usize,
    pub defaulted_card_count: usize,
    pub variant_card_count: usize,
    pub owned_variant_count: usize,
    pub album_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordFamily {
    Cards,
    Variants,
    Albums,
}

impl RecordFamily {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Cards => &["CardId", "Boosters", "MasteryLevel", "MasteryXP"],
            Self::Variants => &["CardId", "VariantCount", "OwnedVariantIds"],
            Self::Albums => &[
                "AlbumId",
                "AlbumName",
                "TotalVariants",
                "OwnedVariants",
                "NeededForCompletion",
                "CompletionPct",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Int(u64),
    Percent(f64),
    Empty,
}

impl Cell {
    fn text(value: Option<&String>) -> Self {
        match value {
            Some(s) => Self::Text(s.clone()),
            None => Self::Empty,
        }
    }
}

/// An ordered report, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub report: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

pub(crate) fn card_row(record: &CardRecord) -> Vec<Cell> {
    vec![
        Cell::Text(record.card_id.clone()),
        Cell::Int(record.boosters),
        Cell::Int(u64::from(record.mastery_level)),
        Cell::Int(record.mastery_xp),
    ]
}

pub(crate) fn variant_row(record: &VariantRecord) -> Vec<Cell> {
    vec![
        Cell::Text(record.card_id.clone()),
        Cell::Int(record.variant_count() as u64),
        Cell::Text(record.joined_variant_ids()),
    ]
}

pub(crate) fn album_row(record: &AlbumRecord) -> Vec<Cell> {
    vec![
        Cell::text(record.album_id.as_ref()),
        Cell::text(record.album_name.as_ref()),
        Cell::Int(record.total_variants as u64),
        Cell::Int(record.owned_variants as u64),
        Cell::Int(record.needed_for_completion() as u64),
        Cell::Percent(record.completion_pct),
    ]
}
