//! Time-of-day features derived from the pickup timestamp.
//!
//! All functions are pure over the timestamp column:
//! - fractional hour of day / hour of week (`dayOfWeek` 0 = Monday),
//! - fixed-width bucketing of either quantity,
//! - a sine/cosine encoding of the hour of day, split into mutually exclusive
//!   weekday and weekend channels.

use crate::data::record::TripTable;
use crate::error::{CoreError, Result};
use crate::features::Derived;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

pub const HOURS_PER_DAY: f64 = 24.0;
pub const HOURS_PER_WEEK: f64 = 168.0;

/// Upper limit on the number of buckets a binning may produce.
pub const MAX_BUCKETS: usize = 100_000;

/// Fractional hour of day in `[0, 24)`. Sub-second precision is ignored.
pub fn hour_of_day(ts: &NaiveDateTime) -> f64 {
    f64::from(ts.hour()) + f64::from(ts.minute()) / 60.0 + f64::from(ts.second()) / 3600.0
}

/// Day of week with Monday = 0.
pub fn day_of_week(ts: &NaiveDateTime) -> u32 {
    ts.weekday().num_days_from_monday()
}

/// Fractional hour of week in `[0, 168)`.
pub fn hour_of_week(ts: &NaiveDateTime) -> f64 {
    HOURS_PER_DAY * f64::from(day_of_week(ts)) + hour_of_day(ts)
}

/// Saturday or Sunday.
pub fn is_weekend(ts: &NaiveDateTime) -> bool {
    day_of_week(ts) >= 5
}

/// The period a timestamp is resampled into before binning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatetimePeriod {
    #[default]
    Day,
    Week,
}

impl DatetimePeriod {
    /// Position of `ts` within the period, in fractional hours.
    pub fn sample(self, ts: &NaiveDateTime) -> f64 {
        match self {
            Self::Day => hour_of_day(ts),
            Self::Week => hour_of_week(ts),
        }
    }

    pub fn length_hours(self) -> f64 {
        match self {
            Self::Day => HOURS_PER_DAY,
            Self::Week => HOURS_PER_WEEK,
        }
    }

    /// Name of the continuous hour column.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Day => "hour_of_day",
            Self::Week => "hour_of_week",
        }
    }

    /// Name of the bucketed hour column.
    pub fn binned_column_name(self) -> &'static str {
        match self {
            Self::Day => "binned_hour_of_day",
            Self::Week => "binned_hour_of_week",
        }
    }
}

impl fmt::Display for DatetimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => f.write_str("day"),
            Self::Week => f.write_str("week"),
        }
    }
}

impl FromStr for DatetimePeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(CoreError::invalid_argument(format!(
                "Unknown period: {other} (expected 'day' or 'week')"
            ))),
        }
    }
}

/// Fixed-width, right-open buckets `[k*w, (k+1)*w)` starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct HourBins {
    pub width: f64,
    /// Lower edge of every bucket; never empty.
    pub edges: Vec<f64>,
    /// Lower edge of the bucket each input value fell into, in input order.
    pub labels: Vec<f64>,
}

impl HourBins {
    /// Bucket `values` with width `width`. Edges extend to cover the maximum
    /// observed value; at least one bucket is always produced.
    pub fn from_values(values: &[f64], width: f64) -> Result<Self> {
        validate_bin_width(width)?;

        let max = values.iter().copied().fold(0.0_f64, f64::max);
        if max / width >= MAX_BUCKETS as f64 {
            return Err(CoreError::invalid_argument(format!(
                "Bin width {width} splits values up to {max} into more than {MAX_BUCKETS} buckets"
            )));
        }
        let count = bucket_index(max, width) + 1;
        let edges: Vec<f64> = (0..count).map(|k| k as f64 * width).collect();
        let labels = values
            .iter()
            .map(|&v| edges[bucket_index(v, width).min(count - 1)])
            .collect();

        Ok(Self {
            width,
            edges,
            labels,
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.edges.len()
    }
}

fn validate_bin_width(width: f64) -> Result<()> {
    if !(width.is_finite() && width > 0.0) {
        return Err(CoreError::invalid_argument(format!(
            "Bin width must be a positive number of hours, got {width}"
        )));
    }
    if (HOURS_PER_WEEK / width).ceil() > MAX_BUCKETS as f64 {
        return Err(CoreError::invalid_argument(format!(
            "Bin width {width} is too fine: a week would need more than {MAX_BUCKETS} buckets"
        )));
    }
    Ok(())
}

/// Index of the bucket containing `value`, consistent with edges computed as
/// `k as f64 * width`.
fn bucket_index(value: f64, width: f64) -> usize {
    if value <= 0.0 {
        return 0;
    }
    let mut k = (value / width).floor() as usize;
    match k.checked_add(1) {
        Some(next) if next as f64 * width <= value => k = next,
        _ if k > 0 && k as f64 * width > value => k -= 1,
        _ => {}
    }
    k
}

/// Bucket timestamps after resampling them into `period`.
///
/// ```
/// use tripspeed_core::data::record::parse_timestamp;
/// use tripspeed_core::features::temporal::{bin_datetime, DatetimePeriod};
///
/// let ts = [parse_timestamp("2020-12-30 14:45:00").unwrap()];
/// assert_eq!(bin_datetime(&ts, 1.0, DatetimePeriod::Day).unwrap().labels, vec![14.0]);
/// assert_eq!(bin_datetime(&ts, 0.5, DatetimePeriod::Day).unwrap().labels, vec![14.5]);
/// // Wednesday is day 2 when Monday = 0.
/// assert_eq!(bin_datetime(&ts, 1.0, DatetimePeriod::Week).unwrap().labels, vec![62.0]);
/// ```
pub fn bin_datetime(
    datetimes: &[NaiveDateTime],
    hour_sample: f64,
    period: DatetimePeriod,
) -> Result<HourBins> {
    let sampled: Vec<f64> = datetimes.iter().map(|ts| period.sample(ts)).collect();
    HourBins::from_values(&sampled, hour_sample)
}

/// Sine/cosine of the hour of day, plus the same pair routed to exactly one
/// of the weekday or weekend channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CyclicalTime {
    pub sine_t: f64,
    pub cosine_t: f64,
    pub weekday_sine_t: f64,
    pub weekday_cosine_t: f64,
    pub weekend_sine_t: f64,
    pub weekend_cosine_t: f64,
}

/// Cyclical encoding of a single timestamp.
pub fn cyclical_encode(ts: &NaiveDateTime) -> CyclicalTime {
    let angle = TAU * hour_of_day(ts) / HOURS_PER_DAY;
    let (sine_t, cosine_t) = angle.sin_cos();
    let weekend = is_weekend(ts);
    let (weekday_sine_t, weekday_cosine_t, weekend_sine_t, weekend_cosine_t) = if weekend {
        (0.0, 0.0, sine_t, cosine_t)
    } else {
        (sine_t, cosine_t, 0.0, 0.0)
    };
    CyclicalTime {
        sine_t,
        cosine_t,
        weekday_sine_t,
        weekday_cosine_t,
        weekend_sine_t,
        weekend_cosine_t,
    }
}

/// Time features of one trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeFeatures {
    /// Hour of day or hour of week, depending on the encoder's period.
    pub hour: f64,
    /// Lower edge of the bucket `hour` fell into.
    pub binned_hour: f64,
    pub cyclical: CyclicalTime,
}

/// Encodes the `pickup_datetime` column of a trip table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalEncoder {
    period: DatetimePeriod,
    bin_width: f64,
}

impl TemporalEncoder {
    pub fn new(period: DatetimePeriod, bin_width: f64) -> Result<Self> {
        validate_bin_width(bin_width)?;
        Ok(Self { period, bin_width })
    }

    pub fn period(&self) -> DatetimePeriod {
        self.period
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn encode(&self, trips: &TripTable) -> Result<Vec<Derived<TimeFeatures>>> {
        let datetimes = trips.pickup_datetimes();
        let bins = bin_datetime(&datetimes, self.bin_width, self.period)?;
        tracing::debug!(
            rows = datetimes.len(),
            period = %self.period,
            buckets = bins.bucket_count(),
            "Encoded pickup times"
        );

        Ok(trips
            .iter()
            .zip(datetimes.iter().zip(bins.labels))
            .map(|(trip, (ts, binned_hour))| {
                Derived::new(
                    trip.id.clone(),
                    TimeFeatures {
                        hour: self.period.sample(ts),
                        binned_hour,
                        cyclical: cyclical_encode(ts),
                    },
                )
            })
            .collect())
    }
}

impl Default for TemporalEncoder {
    fn default() -> Self {
        Self {
            period: DatetimePeriod::Day,
            bin_width: 1.0,
        }
    }
}
