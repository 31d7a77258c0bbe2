//! Composed records handed to the sensor service.
//!
//! A gyroscope record carries the calibrated rate and, in a trailing set of
//! fields, the uncalibrated rate of the same instant. A downstream virtual
//! "uncalibrated gyroscope" rebuilds its output from those trailing fields.

use crate::sensor::{SensorStatus, SensorType};

/// Version tag stamped on every record.
pub const EVENT_VERSION: i32 = std::mem::size_of::<SensorEvent>() as i32;

/// Three-axis angular rate in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Gyroscope payload.
///
/// `calibrated` and `status` come from the calibration transform (or the raw
/// reading when no transform ran). `uncalibrated` is always the raw reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GyroSample {
    pub calibrated: Vector3,
    pub status: SensorStatus,
    pub uncalibrated: Vector3,
}

/// Kinds of framework metadata records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaDataKind {
    FlushComplete,
}

/// Metadata payload, addressed to the sensor it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaData {
    pub what: MetaDataKind,
    pub sensor: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventPayload {
    Gyro(GyroSample),
    Meta(MetaData),
}

impl Default for EventPayload {
    fn default() -> Self {
        EventPayload::Gyro(GyroSample::default())
    }
}

/// One output slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub version: i32,
    /// Handle of the emitting sensor
    pub sensor: i32,
    pub sensor_type: SensorType,
    /// Nanoseconds in the caller's reference clock
    pub timestamp: i64,
    pub payload: EventPayload,
}

impl Default for SensorEvent {
    fn default() -> Self {
        Self {
            version: EVENT_VERSION,
            sensor: 0,
            sensor_type: SensorType::Gyroscope,
            timestamp: 0,
            payload: EventPayload::default(),
        }
    }
}

impl SensorEvent {
    /// Build a gyroscope record.
    pub fn gyro(sensor: i32, timestamp: i64, sample: GyroSample) -> Self {
        Self {
            version: EVENT_VERSION,
            sensor,
            sensor_type: SensorType::Gyroscope,
            timestamp,
            payload: EventPayload::Gyro(sample),
        }
    }

    /// Build a flush-complete metadata record for `sensor`.
    pub fn flush_complete(sensor: i32, timestamp: i64) -> Self {
        Self {
            version: EVENT_VERSION,
            sensor: 0,
            sensor_type: SensorType::MetaData,
            timestamp,
            payload: EventPayload::Meta(MetaData {
                what: MetaDataKind::FlushComplete,
                sensor,
            }),
        }
    }

    pub fn gyro_sample(&self) -> Option<&GyroSample> {
        match &self.payload {
            EventPayload::Gyro(sample) => Some(sample),
            EventPayload::Meta(_) => None,
        }
    }

    pub fn meta_data(&self) -> Option<&MetaData> {
        match &self.payload {
            EventPayload::Meta(meta) => Some(meta),
            EventPayload::Gyro(_) => None,
        }
    }
}
