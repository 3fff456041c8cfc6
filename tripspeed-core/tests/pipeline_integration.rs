//! Integration tests for the preprocessing pipeline.
//!
//! These tests run CSV ingestion, feature derivation, filtering and CSV
//! output end-to-end on a small NYC taxi sample.

use pretty_assertions::assert_eq;
use std::io::Write;
use tripspeed_core::config::{PipelineConfig, load_config};
use tripspeed_core::data::{load_trip_data, read_trips, save_features, write_features};
use tripspeed_core::features::{DatetimePeriod, DistanceMetricKind, describe};
use tripspeed_core::pipeline::{PreprocessPipeline, preprocess_trip_data};

const TRIPS: &str = "\
id,vendor_id,pickup_datetime,dropoff_datetime,passenger_count,pickup_longitude,pickup_latitude,dropoff_longitude,dropoff_latitude,store_and_fwd_flag,trip_duration
id2875421,2,2016-03-14 17:24:55,2016-03-14 17:32:30,1,-73.982154846191406,40.767936706542969,-73.964630126953125,40.765602111816406,N,455
id2377394,1,2016-06-12 00:43:35,2016-06-12 00:54:38,1,-73.980415344238281,40.738563537597656,-73.999481201171875,40.731151580810547,N,663
id3858529,2,2016-01-19 11:35:24,2016-01-19 12:10:48,1,-73.979026794433594,40.763938903808594,-74.005332946777344,40.710086822509766,N,2124
id3504673,2,2016-04-06 19:32:31,2016-04-06 19:39:40,1,-74.010040283203125,40.719970703125,-74.012268066406250,40.706718444824219,N,429
id0000001,1,2016-04-07 08:00:00,2016-04-07 08:00:00,1,-73.980000000000000,40.750000000000000,-73.970000000000000,40.760000000000000,N,0
id0000002,1,2016-04-07 09:00:00,2016-04-07 09:00:30,1,-73.778100000000000,40.641300000000000,-73.985500000000000,40.758000000000000,N,30
id0000003,1,2016-04-08 09:00:00,2016-04-08 14:00:00,1,-73.980000000000000,40.750000000000000,-73.970000000000000,40.760000000000000,N,18000
";

#[test]
fn test_end_to_end_default_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    std::fs::write(&input, TRIPS).unwrap();

    let trips = load_trip_data(&input).unwrap();
    assert_eq!(trips.len(), 7);

    let features = preprocess_trip_data(&trips).unwrap();
    // Zero duration, 30-second airport run and five-hour trip are implausible.
    let ids: Vec<_> = features.ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["id2875421", "id2377394", "id3858529", "id3504673"]);

    for row in &features {
        let k = row.features.kinematics;
        assert!(k.distance > 0.0 && k.distance < 10.0);
        assert!(k.speed > 0.0 && k.speed < 40.0);
    }

    let output = dir.path().join("features.csv");
    save_features(&features, &output).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("id,pickup_datetime,pickup_longitude"));
    assert!(header.contains(",distance,speed,hour_of_day,binned_hour_of_day,"));
    assert!(header.ends_with("weekend_sine_t,weekend_cosine_t"));
    assert_eq!(lines.count(), 4);
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let trips = read_trips(TRIPS.as_bytes()).unwrap();
    let pipeline = PreprocessPipeline::new();

    let mut first = Vec::new();
    write_features(&pipeline.preprocess(&trips).unwrap(), &mut first).unwrap();
    let mut second = Vec::new();
    write_features(&pipeline.preprocess(&trips).unwrap(), &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_feature_csv_reloads_as_trips() {
    let trips = read_trips(TRIPS.as_bytes()).unwrap();
    let features = preprocess_trip_data(&trips).unwrap();

    let mut out = Vec::new();
    write_features(&features, &mut out).unwrap();
    // The output keeps every raw column, so it is itself a valid trip file.
    let reloaded = read_trips(out.as_slice()).unwrap();
    assert_eq!(reloaded, features.raw_trips().unwrap());
}

#[test]
fn test_weekly_config_from_file() {
    #[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
    struct Settings {
        #[serde(default)]
        pipeline: PipelineConfig,
    }

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[pipeline]
period = "week"
bin_width = 24.0
distance_metric = "haversine"

[pipeline.bounds]
speed = [0.0, 10000.0]
trip_duration = [1.0, 100000.0]
"#
    )
    .unwrap();

    let settings: Settings = load_config(Some(file.path())).unwrap();
    assert_eq!(settings.pipeline.period, DatetimePeriod::Week);
    assert_eq!(settings.pipeline.distance_metric, DistanceMetricKind::Haversine);

    let pipeline = PreprocessPipeline::with_config(&settings.pipeline).unwrap();
    assert_eq!(pipeline.distance_metric().name(), "haversine");

    let trips = read_trips(TRIPS.as_bytes()).unwrap();
    let features = pipeline.preprocess(&trips).unwrap();
    // Only the zero-duration trip is dropped now.
    assert_eq!(features.len(), 6);

    // 2016-03-14 is a Monday, 2016-06-12 a Sunday.
    let binned = features.column("binned_hour_of_week").unwrap();
    assert_eq!(binned[0], 0.0);
    assert_eq!(binned[1], 144.0);
}

#[test]
fn test_describe_reports_every_column() {
    let trips = read_trips(TRIPS.as_bytes()).unwrap();
    let features = preprocess_trip_data(&trips).unwrap();
    let stats = describe(&features);
    let names: Vec<_> = stats.iter().map(|(name, _)| *name).collect();
    assert!(names.contains(&"speed"));
    assert!(names.contains(&"hour_of_day"));

    let (_, speed) = stats.iter().find(|(name, _)| *name == "speed").unwrap();
    assert_eq!(speed.count, 4);
    assert_eq!(speed.non_finite, 0);
    assert!(speed.min <= speed.median && speed.median <= speed.max);
}
