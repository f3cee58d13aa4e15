use std::collections::BTreeSet;

use tracing::debug;

use crate::albums::album_completion;
use crate::cards::{extract_boosters, extract_mastery, merge_card_records};
use crate::document::Document;
use crate::variants::{aggregate_variants, owned_variant_ids};

use super::error::{CoreError, CoreErrorCode};
use super::report_catalog::{ReportCatalog, ReportDef, sort_records};
use super::types::{
    AlbumRecord, CardRecord, Cell, RecordFamily, ReportTable, Snapshot, VariantRecord, album_row,
    card_row, variant_row,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// A loaded pair of save documents. Records are re-extracted on every call,
/// so repeated reports over the same session are identical.
#[derive(Debug, Clone)]
pub struct Session {
    collection: Document,
    mastery: Document,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<C: AsRef<[u8]>, M: AsRef<[u8]>>(
        &self,
        collection: C,
        mastery: M,
    ) -> Result<Session, CoreError> {
        let collection = Document::parse(collection.as_ref()).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse collection state: {}", e.message),
            )
        })?;
        let mastery = Document::parse(mastery.as_ref()).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse mastery state: {}", e.message),
            )
        })?;

        Ok(Session::new(collection, mastery))
    }
}

impl Session {
    pub fn new(collection: Document, mastery: Document) -> Self {
        Self {
            collection,
            mastery,
        }
    }

    pub fn card_records(&self) -> Vec<CardRecord> {
        let boosters = extract_boosters(&self.collection);
        let mastery = extract_mastery(&self.mastery);
        merge_card_records(&boosters, &mastery)
    }

    pub fn variant_records(&self) -> Vec<VariantRecord> {
        aggregate_variants(&self.collection)
    }

    pub fn owned_variant_ids(&self) -> BTreeSet<String> {
        owned_variant_ids(&self.collection)
    }

    pub fn album_records(&self) -> Vec<AlbumRecord> {
        album_completion(&self.collection, &self.owned_variant_ids())
    }

    pub fn snapshot(&self) -> Snapshot {
        let cards = self.card_records();
        Snapshot {
            card_count: cards.len(),
            defaulted_card_count: cards.iter().filter(|c| c.defaulted.any()).count(),
            variant_card_count: self.variant_records().len(),
            owned_variant_count: self.owned_variant_ids().len(),
            album_count: self.album_records().len(),
        }
    }

    pub fn report_by_name(&self, name: &str) -> Result<ReportTable, CoreError> {
        let def = ReportCatalog::find(name)?;
        Ok(self.report(def))
    }

    pub fn report(&self, def: &ReportDef) -> ReportTable {
        let rows: Vec<Vec<Cell>> = match def.family {
            RecordFamily::Cards => {
                let mut records = self.card_records();
                sort_records(&mut records, def);
                records.iter().map(card_row).collect()
            }
            RecordFamily::Variants => {
                let mut records = self.variant_records();
                sort_records(&mut records, def);
                records.iter().map(variant_row).collect()
            }
            RecordFamily::Albums => {
                let mut records = self.album_records();
                sort_records(&mut records, def);
                records.iter().map(album_row).collect()
            }
        };

        debug!(report = def.slug, rows = rows.len(), "built report");
        ReportTable {
            report: def.slug.to_string(),
            columns: def
                .family
                .columns()
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            rows,
        }
    }
}
