// src/storage.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::workout::{Coords, Workout, WorkoutId, WorkoutInput, WorkoutType};

/// Key holding the JSON array of workouts.
pub const WORKOUTS_KEY: &str = "workouts";

const DB_FILE_NAME: &str = "mapty.sqlite";
const APP_DATA_DIR: &str = "mapty";
const DATA_ENV_VAR: &str = "MAPTY_DATA_DIR";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing storage file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage read failed: {0}")]
    ReadFailed(rusqlite::Error),
    #[error("Storage write failed: {0}")]
    WriteFailed(rusqlite::Error),
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} available")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("Stored workouts are not a valid JSON array: {0}")]
    Corrupt(serde_json::Error),
    #[error("Failed to serialize workouts: {0}")]
    Serialize(serde_json::Error),
}

/// Synchronous string key-value store, the equivalent of browser local storage.
pub trait KeyValueStore {
    /// # Errors
    /// Returns `StorageError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns `StorageError` if the value cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    /// # Errors
    /// Returns `StorageError` if the backing store rejects the removal.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Gets the application data directory, creating it when needed.
/// `MAPTY_DATA_DIR` overrides the platform default.
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    let app_dir = match std::env::var(DATA_ENV_VAR) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::data_dir()
            .ok_or(StorageError::DataDir)?
            .join(APP_DATA_DIR),
    };
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir)
}

/// Gets the path to the SQLite database file within the app's data directory.
pub fn get_db_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join(DB_FILE_NAME))
}

/// Key-value store backed by a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (and initializes) the store at `path`.
    /// # Errors
    /// Returns `StorageError::Connection` if the database cannot be opened or initialized.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(StorageError::Connection)?;
        Self::from_connection(conn)
    }

    /// # Errors
    /// Returns `StorageError::Connection` if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::Connection)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        init_db(&conn)?;
        Ok(Self { conn })
    }
}

/// Initializes the key-value table if it doesn't exist.
pub fn init_db(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL -- RFC3339
        )",
        [],
    )
    .map_err(StorageError::Connection)?;
    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(StorageError::ReadFailed)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(StorageError::WriteFailed)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(StorageError::WriteFailed)?;
        Ok(())
    }
}

/// In-memory store with an optional byte quota over all stored values.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let others: usize = self
                .entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Persisted shape of a workout. Derived fields (pace, speed, description)
/// are never stored; they are recomputed on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub coords: [f64; 2],
    pub distance: f64,
    pub duration: f64,
    #[serde(flatten)]
    pub details: RecordDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordDetails {
    Running {
        cadence: f64,
    },
    Cycling {
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
    },
}

impl From<&Workout> for WorkoutRecord {
    fn from(workout: &Workout) -> Self {
        let details = match workout.workout_type() {
            WorkoutType::Running => RecordDetails::Running {
                cadence: workout.type_specific(),
            },
            WorkoutType::Cycling => RecordDetails::Cycling {
                elevation_gain: workout.type_specific(),
            },
        };
        Self {
            id: workout.id().to_string(),
            date: workout.created_at(),
            coords: workout.coords().into(),
            distance: workout.distance_km(),
            duration: workout.duration_min(),
            details,
        }
    }
}

impl From<WorkoutRecord> for Workout {
    fn from(record: WorkoutRecord) -> Self {
        let (workout_type, type_specific) = match record.details {
            RecordDetails::Running { cadence } => (WorkoutType::Running, cadence),
            RecordDetails::Cycling { elevation_gain } => (WorkoutType::Cycling, elevation_gain),
        };
        let input = WorkoutInput {
            workout_type,
            distance_km: record.distance,
            duration_min: record.duration,
            type_specific,
        };
        Self::with_id(
            WorkoutId::from(record.id),
            Coords::from(record.coords),
            input,
            record.date,
        )
    }
}

/// Saves and loads the workout collection under a single key.
pub struct WorkoutStorage<K: KeyValueStore> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> WorkoutStorage<K> {
    pub fn new(store: K) -> Self {
        Self::with_key(store, WORKOUTS_KEY)
    }

    pub fn with_key(store: K, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    /// Serializes every workout as a `WorkoutRecord` and overwrites the key.
    /// # Errors
    /// Returns `StorageError` if serialization fails or the store rejects the write.
    pub fn save<'a, I>(&mut self, workouts: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = &'a Workout>,
    {
        let records: Vec<WorkoutRecord> = workouts.into_iter().map(WorkoutRecord::from).collect();
        let json = serde_json::to_string(&records).map_err(StorageError::Serialize)?;
        self.store.set(&self.key, &json)?;
        debug!(count = records.len(), key = %self.key, "Saved workouts");
        Ok(())
    }

    /// Loads the persisted workouts; an absent key yields an empty list.
    /// Elements that do not decode as a workout are skipped.
    /// # Errors
    /// Returns `StorageError::Corrupt` if the value is not a JSON array, or a
    /// store error if the key cannot be read.
    pub fn load(&self) -> Result<Vec<Workout>, StorageError> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        let values: Vec<serde_json::Value> =
            serde_json::from_str(&json).map_err(StorageError::Corrupt)?;

        let mut workouts = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<WorkoutRecord>(value) {
                Ok(record) => workouts.push(Workout::from(record)),
                Err(e) => warn!(index, error = %e, "Skipping unreadable workout record"),
            }
        }
        debug!(count = workouts.len(), key = %self.key, "Loaded workouts");
        Ok(workouts)
    }

    /// Removes the key entirely.
    /// # Errors
    /// Returns `StorageError` if the store rejects the removal.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(&self.key)
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }
}
