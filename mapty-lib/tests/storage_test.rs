use anyhow::Result;
use chrono::{Local, TimeZone, Utc};
use std::fs;

use mapty_lib::logging::{format_log_file_name, prune_old_logs};
use mapty_lib::storage::{RecordDetails, WorkoutRecord, WORKOUTS_KEY};
use mapty_lib::{
    load_config_util, parse_color, save_config_util, Config, ConfigError, ConfiguredLocation,
    Coords, GeolocationError, Geolocator, KeyValueStore, LocationConfig, MemoryStore,
    SqliteStore, StandardColor, StorageError, Workout, WorkoutStorage, WorkoutType,
};

fn sample_workouts() -> Vec<Workout> {
    let date = Utc.with_ymd_and_hms(2024, 4, 3, 7, 30, 0).unwrap();
    vec![
        Workout::running(Coords::new(39.0, -12.0), 5.2, 24.0, 178.0, date),
        Workout::cycling(
            Coords::new(39.1, -12.1),
            27.0,
            95.0,
            523.0,
            date + chrono::Duration::minutes(1),
        ),
    ]
}

#[test]
fn test_load_absent_key_is_empty() -> Result<()> {
    let storage = WorkoutStorage::new(MemoryStore::new());
    assert!(storage.load()?.is_empty());
    Ok(())
}

#[test]
fn test_save_and_load_memory_store() -> Result<()> {
    let workouts = sample_workouts();
    let mut storage = WorkoutStorage::new(MemoryStore::new());
    storage.save(&workouts)?;

    let loaded = storage.load()?;
    assert_eq!(loaded, workouts);
    Ok(())
}

#[test]
fn test_record_json_shape() -> Result<()> {
    let workouts = sample_workouts();
    let mut storage = WorkoutStorage::new(MemoryStore::new());
    storage.save(&workouts)?;

    let json = storage.store().get(WORKOUTS_KEY)?.unwrap_or_default();
    let values: Vec<serde_json::Value> = serde_json::from_str(&json)?;
    assert_eq!(values[0]["type"], "running");
    assert_eq!(values[0]["cadence"], 178.0);
    assert_eq!(values[1]["type"], "cycling");
    assert_eq!(values[1]["elevationGain"], 523.0);
    assert_eq!(values[1]["coords"], serde_json::json!([39.1, -12.1]));
    // Derived values are never stored
    assert!(values[0].get("pace").is_none());
    assert!(values[1].get("speed").is_none());
    assert!(values[0].get("description").is_none());
    Ok(())
}

#[test]
fn test_record_conversion() {
    let workout = &sample_workouts()[1];
    let record = WorkoutRecord::from(workout);
    assert_eq!(record.id, workout.id().to_string());
    assert_eq!(record.distance, 27.0);
    assert_eq!(
        record.details,
        RecordDetails::Cycling {
            elevation_gain: 523.0
        }
    );
    assert_eq!(&Workout::from(record), workout);
}

#[test]
fn test_load_skips_unreadable_records() -> Result<()> {
    let mut store = MemoryStore::new();
    store.set(
        WORKOUTS_KEY,
        r#"[
            {"id":"1","date":"2024-04-01T08:00:00Z","coords":[1,2],"distance":5,"duration":30,"type":"running","cadence":170},
            {"id":"2","type":"swimming"},
            42,
            {"id":"3","date":"2024-04-01T09:00:00Z","coords":[1,2],"distance":20,"duration":60,"type":"cycling","elevationGain":10}
        ]"#,
    )?;
    let storage = WorkoutStorage::new(store);

    let loaded = storage.load()?;
    let ids: Vec<_> = loaded.iter().map(|w| w.id().as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
    assert_eq!(loaded[1].workout_type(), WorkoutType::Cycling);
    assert_eq!(loaded[1].speed(), Some(20.0));
    Ok(())
}

#[test]
fn test_load_rejects_non_array() -> Result<()> {
    let mut store = MemoryStore::new();
    store.set(WORKOUTS_KEY, r#"{"id":"1"}"#)?;
    let storage = WorkoutStorage::new(store);

    assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));
    Ok(())
}

#[test]
fn test_clear_removes_key() -> Result<()> {
    let mut storage = WorkoutStorage::new(MemoryStore::new());
    storage.save(&sample_workouts())?;
    storage.clear()?;
    assert!(!storage.store().contains_key(WORKOUTS_KEY));
    // Clearing twice is fine
    storage.clear()?;
    Ok(())
}

#[test]
fn test_memory_store_quota() -> Result<()> {
    let mut store = MemoryStore::with_quota(8);
    store.set("a", "1234")?;
    // Replacing a value only counts the new size
    store.set("a", "12345678")?;
    let result = store.set("b", "x");
    assert!(matches!(
        result,
        Err(StorageError::QuotaExceeded {
            needed: 9,
            quota: 8
        })
    ));

    store.set_quota(None);
    store.set("b", "x")?;
    Ok(())
}

#[test]
fn test_sqlite_store_persists_across_connections() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("mapty.sqlite");
    let workouts = sample_workouts();

    {
        let mut storage = WorkoutStorage::new(SqliteStore::open(&db_path)?);
        storage.save(&workouts)?;
        storage.save(&workouts[..1])?;
    }

    let storage = WorkoutStorage::new(SqliteStore::open(&db_path)?);
    let loaded = storage.load()?;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], workouts[0]);
    Ok(())
}

#[test]
fn test_sqlite_store_remove() -> Result<()> {
    let mut store = SqliteStore::open_in_memory()?;
    assert_eq!(store.get("k")?, None);
    store.set("k", "v")?;
    assert_eq!(store.get("k")?.as_deref(), Some("v"));
    store.remove("k")?;
    store.remove("k")?;
    assert_eq!(store.get("k")?, None);
    Ok(())
}

#[test]
fn test_custom_storage_key() -> Result<()> {
    let mut storage = WorkoutStorage::with_key(MemoryStore::new(), "other");
    storage.save(&sample_workouts())?;
    assert!(storage.store().contains_key("other"));
    assert!(!storage.store().contains_key(WORKOUTS_KEY));
    Ok(())
}

#[test]
fn test_config_load_writes_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("config.toml");

    let config = load_config_util(&path)?;
    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(config.map.zoom, 13);
    assert_eq!(config.form.restore_delay_ms, 1000);
    assert!(config.location.is_none());
    Ok(())
}

#[test]
fn test_config_round_trip_with_location() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");
    let mut config = Config::default();
    config.location = Some(LocationConfig::from(Coords::new(38.72, -9.14)));
    config.map.zoom = 15;
    save_config_util(&path, &config)?;

    let loaded = load_config_util(&path)?;
    assert_eq!(loaded, config);
    let locator = ConfiguredLocation::from_config(&loaded);
    assert_eq!(locator.current_position()?, Coords::new(38.72, -9.14));
    Ok(())
}

#[test]
fn test_config_partial_file_uses_defaults() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");
    fs::write(&path, "[map]\nzoom = 10\n")?;

    let config = load_config_util(&path)?;
    assert_eq!(config.map.zoom, 10);
    assert_eq!(config.map.fit_padding, 0.1);
    assert_eq!(config.theme.cycling_color, "Yellow");
    Ok(())
}

#[test]
fn test_config_validation_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");

    fs::write(&path, "[map]\nzoom = 25\n")?;
    assert!(matches!(
        load_config_util(&path),
        Err(ConfigError::InvalidZoom(25))
    ));

    fs::write(&path, "[location]\nlatitude = 100.0\nlongitude = 0.0\n")?;
    assert!(matches!(
        load_config_util(&path),
        Err(ConfigError::InvalidLocation(_))
    ));

    fs::write(&path, "[theme]\nrunning_color = \"Chartreuse\"\n")?;
    assert!(matches!(
        load_config_util(&path),
        Err(ConfigError::InvalidColor(_))
    ));

    fs::write(&path, "map = [")?;
    assert!(matches!(
        load_config_util(&path),
        Err(ConfigError::TomlParse(_))
    ));
    Ok(())
}

#[test]
fn test_theme_colors() -> Result<()> {
    assert_eq!(parse_color("darkblue")?, StandardColor::DarkBlue);
    assert!(parse_color("nope").is_err());

    let mut config = Config::default();
    assert_eq!(
        config.theme.color_for(WorkoutType::Running),
        StandardColor::Green
    );
    config.theme.cycling_color = "bogus".to_string();
    assert_eq!(
        config.theme.color_for(WorkoutType::Cycling),
        StandardColor::Yellow
    );
    Ok(())
}

#[test]
fn test_geolocation_without_location() {
    let locator = ConfiguredLocation::from_config(&Config::default());
    assert_eq!(
        locator.current_position(),
        Err(GeolocationError::Unavailable)
    );
}

#[test]
fn test_log_file_name() {
    let now = Local.with_ymd_and_hms(2024, 4, 3, 7, 5, 9).unwrap();
    assert_eq!(
        format_log_file_name("mapty-tui", now),
        "mapty-tui_2024-04-03_07-05-09.log"
    );
}

#[test]
fn test_prune_old_logs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    for i in 0..5 {
        fs::write(dir.path().join(format!("run_{i}.log")), "x")?;
    }
    fs::write(dir.path().join("notes.txt"), "keep")?;

    prune_old_logs(dir.path(), 3)?;

    let logs = fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("log"))
        .count();
    assert_eq!(logs, 3);
    assert!(dir.path().join("notes.txt").exists());
    Ok(())
}
