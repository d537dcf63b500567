//! Configuration system tests

use framepipe::config::loader::*;
use framepipe::config::validation::*;
use framepipe::config::*;
use framepipe::ml::Pipeline;
use framepipe::ml::Transformer;
use framepipe::{DataFrame, Error, Frame};
use std::env;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = FramepipeConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
    assert!(config.diagnostics.root.is_none());
    assert!(!config.execution.parallel_folds);
    assert_eq!(config.execution.default_seed, 42);

    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_config_validation() {
    let mut config = FramepipeConfig::default();

    config.execution.degenerate_tolerance = 0.0;
    assert!(matches!(
        validate_config(&config),
        Err(Error::ConfigurationError(_))
    ));

    config.execution.degenerate_tolerance = 1e-12;
    config.logging.level = "verbose".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_file_then_env_precedence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("framepipe.json");
    std::fs::write(
        &path,
        r#"{"logging": {"level": "debug"}, "execution": {"default_seed": 7}}"#,
    )
    .unwrap();

    env::set_var("FRAMEPIPE_SEED", "99");
    let config = load_with_precedence(Some(&path));
    env::remove_var("FRAMEPIPE_SEED");
    let config = config.unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "text");
    assert_eq!(config.execution.default_seed, 99);
}

#[test]
fn test_missing_file_is_configuration_error() {
    let dir = tempdir().unwrap();
    let result = load_from_file(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(Error::ConfigurationError(_))));
}

#[test]
fn test_diagnostics_root_drives_pipeline() {
    let dir = tempdir().unwrap();
    let config = load_from_json(&format!(
        r#"{{"diagnostics": {{"root": {}}}}}"#,
        serde_json::to_string(dir.path()).unwrap()
    ))
    .unwrap();
    assert_eq!(config.diagnostics.root.as_deref(), Some(dir.path()));

    let mut df = DataFrame::new();
    df.add_float_column("a", vec![1.0, 2.0]).unwrap();
    let mut pipeline = Pipeline::from_config(&config).select(vec!["a"]);
    pipeline.fit(&Frame::from(df), None).unwrap();

    let run = pipeline.last_run_scope().unwrap();
    assert!(run.path().starts_with(dir.path()));
}
