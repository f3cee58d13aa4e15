mod engine;
mod error;
mod report_catalog;
mod types;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use report_catalog::{
    DEFAULT_REPORT_SLUG, Direction, Partition, REPORTS, ReportCatalog, ReportDef, SortField,
    SortKey, Sortable, sort_records,
};
pub use types::{
    AlbumRecord, CardRecord, Cell, DEFAULT_BOOSTERS, DEFAULT_MASTERY_LEVEL, DEFAULT_MASTERY_XP,
    DefaultedFields, MAX_MASTERY_LEVEL, RecordFamily, ReportTable, Snapshot, VariantRecord,
};
