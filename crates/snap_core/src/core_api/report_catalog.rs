use std::cmp::Ordering;

use super::error::{CoreError, CoreErrorCode};
use super::types::{AlbumRecord, CardRecord, RecordFamily, VariantRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CardId,
    Boosters,
    MasteryLevel,
    MasteryXp,
    VariantCount,
    AlbumName,
    TotalVariants,
    OwnedVariants,
    CompletionPct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

const fn desc(field: SortField) -> SortKey {
    SortKey {
        field,
        direction: Direction::Desc,
    }
}

const fn asc(field: SortField) -> SortKey {
    SortKey {
        field,
        direction: Direction::Asc,
    }
}

/// Moves matching records below every non-matching one, as an extra leading
/// ascending boolean key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    MaxMasteryLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDef {
    pub slug: &'static str,
    pub title: &'static str,
    pub family: RecordFamily,
    pub keys: &'static [SortKey],
    pub partition: Option<Partition>,
    pub export_file_name: &'static str,
}

use SortField::{
    AlbumName, Boosters, CardId, CompletionPct, MasteryLevel, OwnedVariants, TotalVariants,
    VariantCount,
};

const BOOSTERS_THEN_MASTERY: &[SortKey] = &[desc(Boosters), desc(MasteryLevel), asc(CardId)];
const MASTERY_THEN_BOOSTERS: &[SortKey] = &[desc(MasteryLevel), desc(Boosters), asc(CardId)];

// Reports 3 and 4 share an ordering; both names are kept.
pub const REPORTS: &[ReportDef] = &[
    ReportDef {
        slug: "cards-by-boosters",
        title: "Cards: Boosters (DESC) then Mastery (DESC)",
        family: RecordFamily::Cards,
        keys: BOOSTERS_THEN_MASTERY,
        partition: None,
        export_file_name: "cards_by_boosters_then_mastery.csv",
    },
    ReportDef {
        slug: "cards-by-boosters-max-last",
        title: "Cards: Boosters (DESC), Max Mastery (30) at Bottom",
        family: RecordFamily::Cards,
        keys: BOOSTERS_THEN_MASTERY,
        partition: Some(Partition::MaxMasteryLast),
        export_file_name: "cards_by_boosters_max_mastery_bottom.csv",
    },
    ReportDef {
        slug: "cards-by-mastery",
        title: "Cards: Mastery (DESC) then Boosters (DESC)",
        family: RecordFamily::Cards,
        keys: MASTERY_THEN_BOOSTERS,
        partition: None,
        export_file_name: "cards_by_mastery_then_boosters.csv",
    },
    ReportDef {
        slug: "cards-by-mastery-plus-boosters",
        title: "Cards: Mastery + Boosters (DESC/DESC)",
        family: RecordFamily::Cards,
        keys: MASTERY_THEN_BOOSTERS,
        partition: None,
        export_file_name: "cards_by_mastery_plus_boosters.csv",
    },
    ReportDef {
        slug: "cards-by-mastery-plus-boosters-max-last",
        title: "Cards: Mastery + Boosters (DESC/DESC), Max Mastery (30) at Bottom",
        family: RecordFamily::Cards,
        keys: MASTERY_THEN_BOOSTERS,
        partition: Some(Partition::MaxMasteryLast),
        export_file_name: "cards_by_mastery_plus_boosters_max_mastery_bottom.csv",
    },
    ReportDef {
        slug: "variants-per-card",
        title: "Variants: Per Card (Most → Least)",
        family: RecordFamily::Variants,
        keys: &[desc(VariantCount), asc(CardId)],
        partition: None,
        export_file_name: "variants_by_card_most_to_least.csv",
    },
    ReportDef {
        slug: "albums-by-completion",
        title: "Albums: Completion (Most → Least)",
        family: RecordFamily::Albums,
        keys: &[
            desc(CompletionPct),
            desc(OwnedVariants),
            desc(TotalVariants),
            asc(AlbumName),
        ],
        partition: None,
        export_file_name: "albums_by_completion_most_to_least.csv",
    },
];

pub const DEFAULT_REPORT_SLUG: &str = "cards-by-boosters";

#[derive(Debug, Default, Clone, Copy)]
pub struct ReportCatalog;

impl ReportCatalog {
    pub fn all() -> &'static [ReportDef] {
        REPORTS
    }

    /// Looks a report up by slug (case-insensitive) or exact title.
    pub fn find(name: &str) -> Result<&'static ReportDef, CoreError> {
        let trimmed = name.trim();
        REPORTS
            .iter()
            .find(|def| def.slug.eq_ignore_ascii_case(trimmed) || def.title == trimmed)
            .ok_or_else(|| {
                let known: Vec<&str> = REPORTS.iter().map(|def| def.slug).collect();
                CoreError::new(
                    CoreErrorCode::Config,
                    format!(
                        "unknown report '{name}', expected one of: {}",
                        known.join(", ")
                    ),
                )
            })
    }
}

/// A record family that the catalog knows how to order.
pub trait Sortable {
    fn compare_field(&self, other: &Self, field: SortField) -> Ordering;

    fn in_partition(&self, partition: Partition) -> bool;
}

impl Sortable for CardRecord {
    fn compare_field(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::CardId => self.card_id.cmp(&other.card_id),
            SortField::Boosters => self.boosters.cmp(&other.boosters),
            SortField::MasteryLevel => self.mastery_level.cmp(&other.mastery_level),
            SortField::MasteryXp => self.mastery_xp.cmp(&other.mastery_xp),
            _ => Ordering::Equal,
        }
    }

    fn in_partition(&self, partition: Partition) -> bool {
        match partition {
            Partition::MaxMasteryLast => self.is_max_mastery(),
        }
    }
}

impl Sortable for VariantRecord {
    fn compare_field(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::CardId => self.card_id.cmp(&other.card_id),
            SortField::VariantCount => self.variant_count().cmp(&other.variant_count()),
            _ => Ordering::Equal,
        }
    }

    fn in_partition(&self, _partition: Partition) -> bool {
        false
    }
}

impl Sortable for AlbumRecord {
    fn compare_field(&self, other: &Self, field: SortField) -> Ordering {
        match field {
            SortField::AlbumName => compare_missing_last(&self.album_name, &other.album_name),
            SortField::TotalVariants => self.total_variants.cmp(&other.total_variants),
            SortField::OwnedVariants => self.owned_variants.cmp(&other.owned_variants),
            SortField::CompletionPct => self.completion_pct.total_cmp(&other.completion_pct),
            _ => Ordering::Equal,
        }
    }

    fn in_partition(&self, _partition: Partition) -> bool {
        false
    }
}

/// Stable multi-key sort following `def`. Fields that do not apply to the
/// record family compare equal.
pub fn sort_records<R: Sortable>(records: &mut [R], def: &ReportDef) {
    records.sort_by(|a, b| {
        let partition = def.partition.map_or(Ordering::Equal, |p| {
            a.in_partition(p).cmp(&b.in_partition(p))
        });
        def.keys.iter().fold(partition, |acc, key| {
            acc.then_with(|| {
                let ord = a.compare_field(b, key.field);
                match key.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            })
        })
    })
}

fn compare_missing_last(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
