// src/lib.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

// --- Declare modules ---
pub mod app;
mod config;
pub mod form;
pub mod geolocation;
pub mod list;
pub mod logging;
pub mod map;
pub mod notify;
pub mod render;
pub mod storage;
pub mod workout;

// --- Expose public types ---
pub use app::{App, AppSettings, Mode};
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, ConfigError, FormConfig, LocationConfig, MapConfig,
    StandardColor, Theme,
};
pub use form::{FormField, FormLayout, ValidationError, WorkoutForm};
pub use geolocation::{ConfiguredLocation, DeniedLocation, GeolocationError, Geolocator};
pub use list::{EntryList, WorkoutListView};
pub use map::{Bounds, MapView, MarkerId, MarkerMap, Popup};
pub use notify::{Notice, NoticeLevel, Notices, Notifier};
pub use render::{render_entry, WorkoutEntry};
pub use storage::{
    get_db_path as get_db_path_util, KeyValueStore, MemoryStore, SqliteStore, StorageError,
    WorkoutStorage,
};
pub use workout::{Coords, Workout, WorkoutId, WorkoutInput, WorkoutKind, WorkoutType};

/// The controller as the front ends run it: SQLite persistence, the
/// headless marker map, an in-memory entry list and a notice queue.
pub type TrackerApp = App<SqliteStore, MarkerMap, EntryList, Notices>;

pub struct AppService {
    pub config: Config,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub app: TrackerApp,
}

impl AppService {
    /// Initializes the application service from the default locations.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize() -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let db_path = storage::get_db_path().context("Failed to determine database path")?;
        Self::open(config_path, db_path)
    }

    /// Initializes the service against explicit config and database files.
    /// # Errors
    /// Returns `anyhow::Error` if the config cannot be loaded or the database cannot be opened.
    pub fn open(config_path: PathBuf, db_path: PathBuf) -> Result<Self> {
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;

        let app = App::new(
            WorkoutStorage::new(store),
            EntryList::new(),
            Notices::new(),
            AppSettings::from(&config),
        );
        info!(config = ?config_path, db = ?db_path, "Service initialized");

        Ok(Self {
            config,
            config_path,
            db_path,
            app,
        })
    }

    /// Resolves the position from the config and loads the map. Without a
    /// configured location the app stays in degraded mode.
    pub fn start_map(&mut self) {
        let locator = ConfiguredLocation::from_config(&self.config);
        self.app.start(&locator, MarkerMap::new());
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    /// Sets or clears the position reported to geolocation.
    /// # Errors
    /// - `ConfigError::InvalidLocation` if the coordinates are out of range.
    /// - `ConfigError` variants if saving fails.
    pub fn set_home_location(&mut self, location: Option<Coords>) -> Result<(), ConfigError> {
        if let Some(coords) = location {
            if !coords.is_valid() {
                return Err(ConfigError::InvalidLocation(coords.to_string()));
            }
        }
        self.config.location = location.map(LocationConfig::from);
        self.save_config()
    }
}
