use analyst_desk::storage::{AppDefinition, ModelDefinition, SqliteStorage};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SqliteStorage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("desk.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// The Winter Games application used throughout the tests
#[allow(dead_code)]
pub fn winter_games() -> AppDefinition {
    AppDefinition {
        app_id: 3,
        name: "Winter Games".to_string(),
        database: "CORTEX_ANALYST_DEMO".to_string(),
        schema: "WINTER_GAME".to_string(),
        stage: "RAW_DATA".to_string(),
        logo: None,
        models: vec![ModelDefinition {
            name: "WinterGameModel".to_string(),
            file: "winter_game.yaml".to_string(),
            active: true,
        }],
    }
}

#[allow(dead_code)]
pub const WINTER_GAMES_CATALOG: &str = r#"
apps:
  - app_id: 3
    name: Winter Games
    database: CORTEX_ANALYST_DEMO
    schema: WINTER_GAME
    stage: RAW_DATA
    models:
      - name: WinterGameModel
        file: winter_game.yaml
"#;

/// Analyst response body holding `blocks`
#[allow(dead_code)]
pub fn analyst_body(blocks: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "message": { "role": "analyst", "content": blocks },
        "request_id": "req-123"
    })
}
