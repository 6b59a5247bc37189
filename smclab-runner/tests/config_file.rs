//! Config and candle files on disk.

use std::io::Write;

use smclab_runner::config::{AnalysisConfig, ConfigError};
use smclab_runner::data_loader::{load_candles, LoadError};

#[test]
fn load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[params]
risk_reward_ratio = 1.5

[ranking]
strategies = ["fair_value_gap"]

[scanner]
rsi_period = 21
"#
    )
    .unwrap();

    let config = AnalysisConfig::load(file.path()).unwrap();
    assert_eq!(config.params.risk_reward_ratio, 1.5);
    assert_eq!(config.scanner.rsi_period, 21);
    assert_eq!(config.ranking_config().strategies.len(), 1);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AnalysisConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[params\nrisk_reward_ratio = ").unwrap();
    assert!(matches!(AnalysisConfig::load(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn candle_files_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("btc.csv");
    std::fs::write(&csv_path, "time,open,high,low,close,volume\n0,1,2,0.5,1.5,3\n").unwrap();
    let candles = load_candles(&csv_path).unwrap();
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].close, 1.5);

    let json_path = dir.path().join("btc.json");
    std::fs::write(&json_path, r#"[{"time":0,"open":"1","high":"2","low":"0.5","close":"1.5","volume":"3"}]"#)
        .unwrap();
    assert_eq!(load_candles(&json_path).unwrap(), candles);

    let err = load_candles(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}
