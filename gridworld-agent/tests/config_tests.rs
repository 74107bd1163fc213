use std::fs;

use gridworld_agent::{AgentConfig, AgentError};

#[test]
fn test_defaults_are_valid() {
    let config = AgentConfig::default();
    config.validate().unwrap();
    assert_eq!(config.time_scale, 1.0);
    assert_eq!(config.vision.tolerance_px, 5);
    assert_eq!(config.learning.base_run_ms, 2000.0);
    assert_eq!(config.learning.run_increment_ms, 3000.0);
    assert_eq!(config.learning.step_budget_ms, 10000.0);
    assert_eq!(config.random.run_ms, 13000.0);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.json");
    fs::write(
        &path,
        r#"{ "time_scale": 0.5, "learning": { "steps": 7 }, "game": { "jump_height": 4 } }"#,
    )
    .unwrap();

    let config = AgentConfig::load(&path).unwrap();
    assert_eq!(config.time_scale, 0.5);
    assert_eq!(config.learning.steps, 7);
    assert_eq!(config.learning.base_run_ms, 2000.0);
    assert_eq!(config.game.jump_height, 4);
    assert_eq!(config.game.cell_size, 16);
    assert_eq!(config.timing.decode_window_ms, 1000.0);
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.json");
    let mut config = AgentConfig::default();
    config.learning.seed = Some(42);
    config.vision.max_captures = 3;

    config.save(&path).unwrap();
    assert_eq!(AgentConfig::load(&path).unwrap(), config);
}

#[test]
fn test_rejects_bad_values() {
    let mut config = AgentConfig::default();
    config.time_scale = 0.0;
    assert!(matches!(config.validate(), Err(AgentError::Config(_))));

    let mut config = AgentConfig::default();
    config.learning.steps = 0;
    assert!(matches!(config.validate(), Err(AgentError::Config(_))));

    let mut config = AgentConfig::default();
    config.timing.punish_lead_ms = config.timing.punish_interval_ms;
    assert!(matches!(config.validate(), Err(AgentError::Config(_))));
}

#[test]
fn test_load_reports_json_and_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(AgentConfig::load(&path), Err(AgentError::Json(_))));

    let missing = dir.path().join("missing.json");
    assert!(matches!(AgentConfig::load(&missing), Err(AgentError::Io(_))));
}

#[test]
fn test_load_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.json");
    fs::write(&path, r#"{ "time_scale": -1.0 }"#).unwrap();
    assert!(matches!(AgentConfig::load(&path), Err(AgentError::Config(_))));
}
