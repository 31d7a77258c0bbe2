//! Driver configuration and process-wide properties.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{GyroError, GyroResult};
use crate::sensor::SensorDescriptor;

/// Property that swaps control-file I/O for in-memory state changes.
pub const LOOPBACK_PROPERTY: &str = "sensors.gyro.loopback";

/// Environment variable seeding [`LOOPBACK_PROPERTY`] in [`Properties::from_env`].
pub const LOOPBACK_ENV: &str = "SENSORS_GYRO_LOOPBACK";

/// Static configuration of one gyroscope instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GyroConfig {
    /// Input device name reported by the kernel driver
    pub input_name: String,
    /// Directory holding the `enable` and `poll_delay` files.
    /// Derived from the event node when unset.
    pub control_path: Option<PathBuf>,
    /// How long after enabling samples are untrusted
    pub enable_settle_ns: i64,
    /// Minimum elapsed time since the first record before records are emitted
    pub sample_drop_ns: i64,
    /// Events buffered per fill
    pub reader_capacity: usize,
    /// JSON calibration parameters
    pub calibration_file: Option<PathBuf>,
    /// Identity handed to the calibration store and stamped on records
    pub sensor: SensorDescriptor,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            input_name: "gyroscope".to_string(),
            control_path: None,
            enable_settle_ns: 350_000_000,
            sample_drop_ns: 30_000_000,
            reader_capacity: 4,
            calibration_file: None,
            sensor: SensorDescriptor::default(),
        }
    }
}

impl GyroConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> GyroResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| GyroError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GyroResult<()> {
        if self.reader_capacity == 0 {
            return Err(GyroError::Config(
                "reader_capacity must be at least 1".to_string(),
            ));
        }
        if self.enable_settle_ns < 0 || self.sample_drop_ns < 0 {
            return Err(GyroError::Config(
                "settle intervals must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shared key/value property store, read by the driver at call time.
///
/// Cloning yields another handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from the process environment.
    pub fn from_env() -> Self {
        let props = Self::new();
        if let Ok(value) = std::env::var(LOOPBACK_ENV) {
            props.set(LOOPBACK_PROPERTY, value);
        }
        props
    }

    // Every update is a single map call, so a poisoned map is still consistent.
    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Value of `key`, or `default` when unset.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Whether loopback (simulation) mode is on. Only the exact value `"1"` enables it.
    pub fn loopback(&self) -> bool {
        self.get_or(LOOPBACK_PROPERTY, "0") == "1"
    }

    pub fn set_loopback(&self, on: bool) {
        self.set(LOOPBACK_PROPERTY, if on { "1" } else { "0" });
    }
}
