//! Persisted calibration parameters.
//!
//! Parameters live in a single JSON file holding one record per sensor,
//! keyed by the sensor name:
//!
//! ```json
//! [
//!   { "name": "gyroscope", "offset": [0.0012, -0.0004, 0.0009] }
//! ]
//! ```
//!
//! This store is read-only; whatever produces calibration results writes the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CalibrationBias, CalibrationError};
use crate::sensor::SensorDescriptor;

/// One sensor's stored calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub name: String,
    /// Per-axis bias in rad/s
    pub offset: [f32; 3],
}

/// Reader for the calibration parameter file.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in the file.
    pub fn load_records(&self) -> Result<Vec<CalibrationRecord>, CalibrationError> {
        let json = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&json).map_err(|e| CalibrationError::Malformed(e.to_string()))
    }

    /// Bias stored for `sensor`.
    pub fn read_bias(
        &self,
        sensor: &SensorDescriptor,
    ) -> Result<CalibrationBias, CalibrationError> {
        let record = self
            .load_records()?
            .into_iter()
            .find(|r| r.name == sensor.name)
            .ok_or_else(|| CalibrationError::NotFound(sensor.name.clone()))?;

        if record.offset.iter().any(|v| !v.is_finite()) {
            return Err(CalibrationError::Malformed(format!(
                "non-finite offset for '{}'",
                record.name
            )));
        }

        debug!(
            "Loaded gyroscope bias for {}: {:?}",
            sensor.name, record.offset
        );
        Ok(CalibrationBias {
            offset: record.offset,
        })
    }
}
