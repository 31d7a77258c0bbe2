//! Sensor identity as seen by the owning sensor service.

use serde::{Deserialize, Serialize};

/// Handle assigned to the gyroscope when the service does not provide one.
pub const DEFAULT_GYROSCOPE_HANDLE: i32 = 4;

/// Sensor type tags carried in every composed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorType {
    /// Framework metadata (flush completion and similar)
    MetaData,
    /// Calibrated angular rate
    #[default]
    Gyroscope,
}

impl SensorType {
    /// Numeric type code used by the sensor service.
    pub fn code(self) -> i32 {
        match self {
            SensorType::MetaData => 0,
            SensorType::Gyroscope => 4,
        }
    }
}

/// Accuracy reported alongside each sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorStatus {
    NoContact,
    Unreliable,
    AccuracyLow,
    AccuracyMedium,
    #[default]
    AccuracyHigh,
}

impl SensorStatus {
    /// Numeric status as understood by the sensor service.
    pub fn code(self) -> i8 {
        match self {
            SensorStatus::NoContact => -1,
            SensorStatus::Unreliable => 0,
            SensorStatus::AccuracyLow => 1,
            SensorStatus::AccuracyMedium => 2,
            SensorStatus::AccuracyHigh => 3,
        }
    }
}

/// Static description of one sensor instance.
///
/// This is what the calibration store is keyed on and what the calibration
/// algorithm receives at configuration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    /// Human readable name, also used as the calibration store key
    pub name: String,
    /// Vendor string
    pub vendor: String,
    /// Handle assigned by the sensor registry
    pub handle: i32,
    /// Sensor type
    pub sensor_type: SensorType,
    /// Full-scale range in rad/s
    pub max_range: f32,
    /// Smallest distinguishable change in rad/s
    pub resolution: f32,
    /// Minimum sampling interval in microseconds
    pub min_delay_us: i32,
}

impl Default for SensorDescriptor {
    fn default() -> Self {
        Self {
            name: "gyroscope".to_string(),
            vendor: "generic".to_string(),
            handle: DEFAULT_GYROSCOPE_HANDLE,
            sensor_type: SensorType::Gyroscope,
            max_range: 34.906_586,
            resolution: crate::input::GYRO_RAD_PER_LSB as f32,
            min_delay_us: 5000,
        }
    }
}
