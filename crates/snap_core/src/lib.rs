pub mod albums;
pub mod cards;
pub mod coerce;
pub mod core_api;
pub mod document;
pub mod variants;
