// src/geolocation.rs
use thiserror::Error;

use crate::config::Config;
use crate::workout::Coords;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeolocationError {
    #[error("No position source is configured")]
    Unavailable,
    #[error("Permission to read the position was denied")]
    PermissionDenied,
    #[error("Reported position is out of range: {0}")]
    InvalidPosition(Coords),
}

/// One-shot position source. There is no retry: a failure puts the
/// application into degraded mode for the session.
pub trait Geolocator {
    /// # Errors
    /// Returns `GeolocationError` when no usable position can be produced.
    fn current_position(&self) -> Result<Coords, GeolocationError>;
}

/// Position taken from the `[location]` table of the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfiguredLocation {
    position: Option<Coords>,
}

impl ConfiguredLocation {
    #[must_use]
    pub const fn new(position: Option<Coords>) -> Self {
        Self { position }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.location.as_ref().map(|l| l.coords()))
    }
}

impl Geolocator for ConfiguredLocation {
    fn current_position(&self) -> Result<Coords, GeolocationError> {
        let position = self.position.ok_or(GeolocationError::Unavailable)?;
        if position.is_valid() {
            Ok(position)
        } else {
            Err(GeolocationError::InvalidPosition(position))
        }
    }
}

/// A source that always refuses, as when the user denies the permission prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedLocation;

impl Geolocator for DeniedLocation {
    fn current_position(&self) -> Result<Coords, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}
