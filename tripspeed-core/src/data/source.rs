//! CSV ingestion of raw trips and CSV output of feature tables.
//!
//! The trip file is indexed by its `id` column. Columns other than the six
//! raw trip fields (vendor, passenger count, the unnamed positional index
//! column some exports carry) are ignored.

use crate::data::record::{TIMESTAMP_OUTPUT_FORMAT, TripRecord, TripTable};
use crate::data::table::{Column, FeatureTable};
use crate::error::{CoreError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Read a trip CSV from any reader.
pub fn read_trips<R: Read>(reader: R) -> Result<TripTable> {
    TripTable::new(deserialize_trips(reader)?)
}

/// Load the trip CSV at `path`.
pub fn load_trip_data(path: &Path) -> Result<TripTable> {
    let file = File::open(path)?;
    let records = deserialize_trips(file).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = TripTable::new(records)?;
    tracing::info!(path = %path.display(), rows = table.len(), "Loaded trip data");
    Ok(table)
}

fn deserialize_trips<R: Read>(reader: R) -> csv::Result<Vec<TripRecord>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect()
}

/// Write `table` as CSV: key columns, then every numeric column.
pub fn write_features<W: Write>(table: &FeatureTable, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(table.column_names())?;
    for row in table {
        let mut record = Vec::with_capacity(Column::ALL.len() + 2);
        record.push(row.trip.id.to_string());
        record.push(row.trip.pickup_datetime.format(TIMESTAMP_OUTPUT_FORMAT).to_string());
        record.extend(Column::ALL.iter().map(|c| c.value(row).to_string()));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `table` to a CSV file at `path`.
pub fn save_features(table: &FeatureTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_features(table, file)?;
    tracing::info!(path = %path.display(), rows = table.len(), "Wrote feature table");
    Ok(())
}
