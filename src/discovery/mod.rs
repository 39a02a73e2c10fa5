//! Event discovery module
//!
//! The pieces behind "what events are near me, that I haven't already seen":
//! the opaque cursor, the distance ranker, filter validation, folding of the
//! fan-out rows and keyset page assembly. Everything here is free of I/O; the
//! event repository drives it around a single ranked query.

pub mod aggregate;
pub mod cursor;
pub mod filter;
pub mod geo;
pub mod pagination;

pub use aggregate::{fold_rows, EventAggregator};
pub use cursor::Cursor;
pub use filter::{Filter, ValidatedFilter};
pub use geo::{distance_meters, sql_distance, EARTH_RADIUS_METERS};
pub use pagination::build_page;
