//! Trip data: raw records, CSV ingestion, and the joined feature table.

pub mod record;
pub mod source;
pub mod table;

pub use record::{Coordinate, TripId, TripRecord, TripTable, parse_timestamp};
pub use source::{load_trip_data, read_trips, save_features, write_features};
pub use table::{Column, FeatureRow, FeatureTable, KEY_COLUMNS};
