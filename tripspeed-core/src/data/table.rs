//! The model-ready feature table: raw trip columns joined with derived
//! features, one row per surviving trip.

use crate::data::record::{TripId, TripRecord, TripTable};
use crate::error::{CoreError, Result};
use crate::features::DerivedFeatures;
use crate::features::temporal::DatetimePeriod;

/// Non-numeric columns that lead every table.
pub const KEY_COLUMNS: [&str; 2] = ["id", "pickup_datetime"];

/// A numeric column of a [`FeatureTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    PickupLongitude,
    PickupLatitude,
    DropoffLongitude,
    DropoffLatitude,
    TripDuration,
    Distance,
    Speed,
    Hour,
    BinnedHour,
    SineT,
    CosineT,
    WeekdaySineT,
    WeekdayCosineT,
    WeekendSineT,
    WeekendCosineT,
}

impl Column {
    /// Every numeric column, in output order.
    pub const ALL: [Column; 15] = [
        Column::PickupLongitude,
        Column::PickupLatitude,
        Column::DropoffLongitude,
        Column::DropoffLatitude,
        Column::TripDuration,
        Column::Distance,
        Column::Speed,
        Column::Hour,
        Column::BinnedHour,
        Column::SineT,
        Column::CosineT,
        Column::WeekdaySineT,
        Column::WeekdayCosineT,
        Column::WeekendSineT,
        Column::WeekendCosineT,
    ];

    /// Column name. The hour columns are named after the binning period.
    pub fn name(self, period: DatetimePeriod) -> &'static str {
        match self {
            Self::PickupLongitude => "pickup_longitude",
            Self::PickupLatitude => "pickup_latitude",
            Self::DropoffLongitude => "dropoff_longitude",
            Self::DropoffLatitude => "dropoff_latitude",
            Self::TripDuration => "trip_duration",
            Self::Distance => "distance",
            Self::Speed => "speed",
            Self::Hour => period.column_name(),
            Self::BinnedHour => period.binned_column_name(),
            Self::SineT => "sine_t",
            Self::CosineT => "cosine_t",
            Self::WeekdaySineT => "weekday_sine_t",
            Self::WeekdayCosineT => "weekday_cosine_t",
            Self::WeekendSineT => "weekend_sine_t",
            Self::WeekendCosineT => "weekend_cosine_t",
        }
    }

    /// True for columns taken verbatim from the raw trip record.
    pub fn is_raw(self) -> bool {
        matches!(
            self,
            Self::PickupLongitude
                | Self::PickupLatitude
                | Self::DropoffLongitude
                | Self::DropoffLatitude
                | Self::TripDuration
        )
    }

    pub fn value(self, row: &FeatureRow) -> f64 {
        let trip = &row.trip;
        let kin = &row.features.kinematics;
        let time = &row.features.time;
        match self {
            Self::PickupLongitude => trip.pickup_longitude,
            Self::PickupLatitude => trip.pickup_latitude,
            Self::DropoffLongitude => trip.dropoff_longitude,
            Self::DropoffLatitude => trip.dropoff_latitude,
            Self::TripDuration => trip.trip_duration,
            Self::Distance => kin.distance,
            Self::Speed => kin.speed,
            Self::Hour => time.hour,
            Self::BinnedHour => time.binned_hour,
            Self::SineT => time.cyclical.sine_t,
            Self::CosineT => time.cyclical.cosine_t,
            Self::WeekdaySineT => time.cyclical.weekday_sine_t,
            Self::WeekdayCosineT => time.cyclical.weekday_cosine_t,
            Self::WeekendSineT => time.cyclical.weekend_sine_t,
            Self::WeekendCosineT => time.cyclical.weekend_cosine_t,
        }
    }
}

/// One trip with its derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub trip: TripRecord,
    pub features: DerivedFeatures,
}

impl FeatureRow {
    pub fn id(&self) -> &TripId {
        &self.trip.id
    }
}

/// Row-aligned concatenation of raw trips and their derived features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    period: DatetimePeriod,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(period: DatetimePeriod, rows: Vec<FeatureRow>) -> Self {
        Self { period, rows }
    }

    /// Period the hour columns were computed for.
    pub fn period(&self) -> DatetimePeriod {
        self.period
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<FeatureRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRow> {
        self.rows.iter()
    }

    pub fn ids(&self) -> Vec<&TripId> {
        self.rows.iter().map(FeatureRow::id).collect()
    }

    /// All column names in output order.
    pub fn column_names(&self) -> Vec<&'static str> {
        KEY_COLUMNS
            .into_iter()
            .chain(Column::ALL.iter().map(|c| c.name(self.period)))
            .collect()
    }

    /// Look up a numeric column by name.
    pub fn resolve(&self, name: &str) -> Result<Column> {
        Column::ALL
            .into_iter()
            .find(|c| c.name(self.period) == name)
            .ok_or_else(|| CoreError::unknown_column(name))
    }

    /// Values of one numeric column in row order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self.resolve(name)?;
        Ok(self.rows.iter().map(|row| column.value(row)).collect())
    }

    /// Row-major matrix of the named columns.
    pub fn select(&self, names: &[&str]) -> Result<Vec<Vec<f64>>> {
        let columns = names
            .iter()
            .map(|name| self.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(self
            .rows
            .iter()
            .map(|row| columns.iter().map(|c| c.value(row)).collect())
            .collect())
    }

    /// New table holding the rows at `indices`, in the given order.
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let rows = indices
            .iter()
            .map(|&i| {
                self.rows.get(i).cloned().ok_or_else(|| {
                    CoreError::invalid_argument(format!(
                        "Row index {i} out of bounds for table of {} rows",
                        self.rows.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(self.period, rows))
    }

    /// The raw trip columns of the surviving rows.
    pub fn raw_trips(&self) -> Result<TripTable> {
        TripTable::new(self.rows.iter().map(|r| r.trip.clone()).collect())
    }
}

impl<'a> IntoIterator for &'a FeatureTable {
    type Item = &'a FeatureRow;
    type IntoIter = std::slice::Iter<'a, FeatureRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
