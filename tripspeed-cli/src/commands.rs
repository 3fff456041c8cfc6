//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tripspeed_core::data::{load_trip_data, save_features, write_features};
use tripspeed_core::features::describe;
use tripspeed_core::{FeatureTable, PipelineConfig, PreprocessPipeline, load_config};
use tripspeed_ml::{ModelConfig, fit_and_evaluate, train_test_split};

/// Everything the binary reads from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl Settings {
    pub fn load(config: Option<&Path>) -> anyhow::Result<Self> {
        load_config(config).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

/// Handle a CLI subcommand.
pub fn handle_command(command: Commands, config: Option<&Path>) -> anyhow::Result<()> {
    match command {
        Commands::Preprocess {
            input,
            output,
            period,
            bin_width,
        } => {
            let mut settings = Settings::load(config)?;
            if let Some(period) = period {
                settings.pipeline.period = period;
            }
            if let Some(width) = bin_width {
                settings.pipeline.bin_width = width;
            }
            handle_preprocess(&settings, &input, output.as_deref())
        }
        Commands::Train {
            input,
            separate_weekend,
            target,
            test_fraction,
            seed,
            predictions,
        } => {
            let mut settings = Settings::load(config)?;
            if separate_weekend {
                settings.model.separate_weekend = true;
            }
            if let Some(target) = target {
                settings.model.target = target;
            }
            if let Some(fraction) = test_fraction {
                settings.model.test_fraction = fraction;
            }
            if let Some(seed) = seed {
                settings.model.seed = seed;
            }
            handle_train(&settings, &input, predictions.as_deref())
        }
        Commands::Describe { input } => {
            let settings = Settings::load(config)?;
            handle_describe(&settings, &input, &mut std::io::stdout().lock())
        }
        Commands::Config { action } => handle_config(action, config),
    }
}

fn preprocess(settings: &Settings, input: &Path) -> anyhow::Result<FeatureTable> {
    let trips = load_trip_data(input)?;
    let pipeline = PreprocessPipeline::with_config(&settings.pipeline)?;
    Ok(pipeline.preprocess(&trips)?)
}

fn handle_preprocess(settings: &Settings, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let features = preprocess(settings, input)?;
    match output {
        Some(path) => {
            save_features(&features, path)?;
            println!("Wrote {} rows to {}", features.len(), path.display());
        }
        None => write_features(&features, std::io::stdout().lock())?,
    }
    Ok(())
}

fn handle_train(settings: &Settings, input: &Path, predictions: Option<&Path>) -> anyhow::Result<()> {
    let features = preprocess(settings, input)?;
    let model = &settings.model;
    let (train, test) = train_test_split(&features, model.test_fraction, model.seed)?;
    let report = fit_and_evaluate(&train, &test, model)?;

    let m = &report.metrics;
    println!("Prediction R^2: {:.3}", m.r_squared);
    println!(
        "  features: {}  train rows: {}  test rows: {}  epochs: {}",
        report.pipeline.feature_set(),
        train.len(),
        test.len(),
        report.pipeline.regressor().n_iter()
    );
    println!("  rmse: {:.3}  mae: {:.3}", m.rmse, m.mae);

    if let Some(path) = predictions {
        write_predictions(&test, &model.target, &report.predictions, path)?;
        println!("Wrote {} predictions to {}", report.predictions.len(), path.display());
    }
    Ok(())
}

fn write_predictions(
    test: &FeatureTable,
    target: &str,
    predictions: &[f64],
    path: &Path,
) -> anyhow::Result<()> {
    let actual = test.column(target)?;
    let mut csv = csv::Writer::from_path(path)?;
    csv.write_record(["id", target, "prediction"])?;
    for ((id, actual), predicted) in test.ids().iter().zip(&actual).zip(predictions) {
        csv.write_record([id.to_string(), actual.to_string(), predicted.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

fn handle_describe(settings: &Settings, input: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let features = preprocess(settings, input)?;
    writeln!(out, "{} rows after filtering", features.len())?;
    writeln!(
        out,
        "{:<36} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "feature", "mean", "std", "min", "median", "max"
    )?;
    for (name, stats) in describe(&features) {
        writeln!(
            out,
            "{:<36} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            settings.pipeline.label(name),
            stats.mean,
            stats.std_dev,
            stats.min,
            stats.median,
            stats.max
        )?;
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "tripspeed", "tripspeed")
        .map(|d| d.config_dir().join("config.toml"))
}

fn handle_config(action: ConfigAction, config: Option<&Path>) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init { path } => {
            let config_path = path
                .or_else(default_config_path)
                .ok_or_else(|| anyhow::anyhow!("Could not determine a config directory"))?;
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml_str = toml::to_string_pretty(&Settings::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let settings = Settings::load(config)?;
            let toml_str = toml::to_string_pretty(&settings)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const TRIPS: &str = "\
id,vendor_id,pickup_datetime,dropoff_datetime,passenger_count,pickup_longitude,pickup_latitude,dropoff_longitude,dropoff_latitude,store_and_fwd_flag,trip_duration
id2875421,2,2016-03-14 17:24:55,2016-03-14 17:32:30,1,-73.982154846191406,40.767936706542969,-73.964630126953125,40.765602111816406,N,455
id2377394,1,2016-06-12 00:43:35,2016-06-12 00:54:38,1,-73.980415344238281,40.738563537597656,-73.999481201171875,40.731151580810547,N,663
id3858529,2,2016-01-19 11:35:24,2016-01-19 12:10:48,1,-73.979026794433594,40.763938903808594,-74.005332946777344,40.710086822509766,N,2124
id3504673,2,2016-04-06 19:32:31,2016-04-06 19:39:40,1,-74.010040283203125,40.719970703125,-74.012268066406250,40.706718444824219,N,429
id2181028,2,2016-03-26 13:30:55,2016-03-26 13:38:10,1,-73.973052978515625,40.793209075927734,-73.972923278808594,40.782520294189453,N,435
id0801584,2,2016-01-30 22:01:40,2016-01-30 22:09:03,6,-73.982856750488281,40.742195129394531,-73.992080688476562,40.749183654785156,N,443
id1813257,1,2016-06-17 22:34:59,2016-06-17 22:40:40,4,-73.969017028808594,40.757839202880859,-73.957405090332031,40.765895843505859,N,341
id1324603,2,2016-05-21 07:54:58,2016-05-21 08:20:49,1,-73.969276428222656,40.797779083251953,-73.922470092773438,40.760559082031250,N,1551
id1301050,1,2016-05-27 23:12:23,2016-05-27 23:16:38,1,-73.999481201171875,40.738399505615234,-73.985786437988281,40.732814788818359,N,255
id0012891,2,2016-03-10 21:45:01,2016-03-10 22:05:26,1,-73.981048583984375,40.744338989257812,-73.973000000000000,40.789989471435547,N,1225
id0000000,1,2016-03-10 21:45:01,2016-03-10 21:45:01,1,-73.981048583984375,40.744338989257812,-73.973000000000000,40.789989471435547,N,0
";

    fn write_trips(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("train.csv");
        std::fs::write(&path, TRIPS).unwrap();
        path
    }

    /// Run `test` with no environment variables and a home directory that
    /// holds no user config.
    fn isolated(test: impl FnOnce(&mut figment::Jail)) {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let home = jail.directory().to_path_buf();
            jail.set_env("HOME", home.display());
            jail.set_env("XDG_CONFIG_HOME", home.join(".config").display());
            test(jail);
            Ok(())
        });
    }

    #[test]
    fn test_preprocess_writes_output() {
        isolated(|_| {
            let dir = TempDir::new().unwrap();
            let input = write_trips(&dir);
            let output = dir.path().join("features.csv");

            let command = Commands::Preprocess {
                input,
                output: Some(output.clone()),
                period: None,
                bin_width: None,
            };
            handle_command(command, None).unwrap();

            let text = std::fs::read_to_string(&output).unwrap();
            assert!(text.starts_with("id,pickup_datetime,"));
            assert_eq!(text.lines().count(), 11);
            assert!(!text.contains("id0000000"));
        });
    }

    #[test]
    fn test_preprocess_week_override() {
        isolated(|_| {
            let dir = TempDir::new().unwrap();
            let input = write_trips(&dir);
            let output = dir.path().join("features.csv");

            let command = Commands::Preprocess {
                input,
                output: Some(output.clone()),
                period: Some(tripspeed_core::DatetimePeriod::Week),
                bin_width: Some(6.0),
            };
            handle_command(command, None).unwrap();

            let text = std::fs::read_to_string(&output).unwrap();
            assert!(text.lines().next().unwrap().contains("binned_hour_of_week"));
        });
    }

    #[test]
    fn test_preprocess_rejects_too_fine_bin_width() {
        isolated(|_| {
            let dir = TempDir::new().unwrap();
            let command = Commands::Preprocess {
                input: write_trips(&dir),
                output: Some(dir.path().join("features.csv")),
                period: None,
                bin_width: Some(1e-300),
            };
            let err = handle_command(command, None).unwrap_err();
            assert!(err.to_string().contains("Bin width"), "got {err}");
        });
    }

    #[test]
    fn test_train_writes_predictions() {
        isolated(|_| {
            let dir = TempDir::new().unwrap();
            let input = write_trips(&dir);
            let predictions = dir.path().join("predictions.csv");

            let command = Commands::Train {
                input,
                separate_weekend: true,
                target: None,
                test_fraction: Some(0.3),
                seed: Some(1),
                predictions: Some(predictions.clone()),
            };
            handle_command(command, None).unwrap();

            let text = std::fs::read_to_string(&predictions).unwrap();
            let mut lines = text.lines();
            assert_eq!(lines.next().unwrap(), "id,speed,prediction");
            // ceil(0.3 * 10) test rows.
            assert_eq!(lines.count(), 3);
        });
    }

    #[test]
    fn test_train_missing_input() {
        isolated(|_| {
            let dir = TempDir::new().unwrap();
            let command = Commands::Train {
                input: dir.path().join("missing.csv"),
                separate_weekend: false,
                target: None,
                test_fraction: None,
                seed: None,
                predictions: None,
            };
            assert!(handle_command(command, None).is_err());
        });
    }

    #[test]
    fn test_describe_uses_labels() {
        let dir = TempDir::new().unwrap();
        let input = write_trips(&dir);
        let mut out = Vec::new();
        handle_describe(&Settings::default(), &input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("10 rows after filtering"));
        assert!(text.contains("Trip Average Speed [mph]"));
        assert!(text.contains("weekend_cosine_t"));
    }

    #[test]
    fn test_config_init_does_not_overwrite() {
        isolated(|_| {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("nested").join("config.toml");

            let command = Commands::Config {
                action: ConfigAction::Init {
                    path: Some(path.clone()),
                },
            };
            handle_command(command, None).unwrap();
            let content_first = std::fs::read_to_string(&path).unwrap();

            // Second init should not overwrite
            let command = Commands::Config {
                action: ConfigAction::Init {
                    path: Some(path.clone()),
                },
            };
            handle_command(command, None).unwrap();
            let content_second = std::fs::read_to_string(&path).unwrap();
            assert_eq!(content_first, content_second);

            // The written file loads back to the defaults.
            let settings = Settings::load(Some(path.as_path())).unwrap();
            assert_eq!(settings, Settings::default());
        });
    }

    #[test]
    fn test_user_config_and_env_are_layered() {
        isolated(|jail| {
            let user_config = default_config_path().unwrap();
            std::fs::create_dir_all(user_config.parent().unwrap()).unwrap();
            std::fs::write(&user_config, "[pipeline]\nbin_width = 6.0\n\n[model]\nseed = 7\n").unwrap();

            let settings = Settings::load(None).unwrap();
            assert_eq!(settings.pipeline.bin_width, 6.0);
            assert_eq!(settings.model.seed, 7);

            jail.set_env("TRIPSPEED_MODEL__SEED", 9);
            let settings = Settings::load(None).unwrap();
            assert_eq!(settings.pipeline.bin_width, 6.0);
            assert_eq!(settings.model.seed, 9);
        });
    }

    #[test]
    fn test_config_show_defaults() {
        isolated(|_| {
            let command = Commands::Config {
                action: ConfigAction::Show,
            };
            assert!(handle_command(command, None).is_ok());
            assert_eq!(Settings::load(None).unwrap(), Settings::default());
        });
    }

    #[test]
    fn test_missing_config_file_fails() {
        isolated(|jail| {
            let missing = jail.directory().join("typo.toml");
            let command = Commands::Config {
                action: ConfigAction::Show,
            };
            let err = handle_command(command, Some(missing.as_path())).unwrap_err();
            assert!(err.to_string().contains("typo.toml"), "got {err}");
        });
    }
}
