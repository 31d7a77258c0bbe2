//! Calibration hooks for the gyroscope
//!
//! The driver does not compute calibration itself. At construction it reads
//! per-axis bias values from a [`CalibrationStore`], hands them to a pluggable
//! [`CalibrationAlgorithm`], and then runs every finalized reading through
//! [`Calibration::apply`]. When no algorithm is installed, or it fails to
//! configure, [`Calibration::Absent`] passes raw readings through unchanged.

mod store;

pub use store::{CalibrationRecord, CalibrationStore};

use thiserror::Error;
use tracing::{error, warn};

use crate::event::Vector3;
use crate::sensor::{SensorDescriptor, SensorStatus};

/// Errors raised by calibration collaborators.
///
/// These never fail a driver call; the driver logs them and falls back to raw values.
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No calibration parameters for sensor '{0}'")]
    NotFound(String),

    #[error("Malformed calibration parameters: {0}")]
    Malformed(String),

    #[error("Calibration algorithm rejected configuration: {0}")]
    Configure(String),

    #[error("Calibration conversion failed: {0}")]
    Convert(String),
}

/// Per-axis zero-rate offsets in rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationBias {
    pub offset: [f32; 3],
}

/// Initialization argument for a calibration algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct GyroAlgoArgs {
    pub bias: CalibrationBias,
    pub sensor: SensorDescriptor,
}

/// One gyroscope reading, as seen by the calibration algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GyroReading {
    pub rate: Vector3,
    pub status: SensorStatus,
    pub timestamp: i64,
}

/// A pluggable calibration algorithm.
pub trait CalibrationAlgorithm {
    /// One-time configuration with the stored bias.
    fn configure(&mut self, args: &GyroAlgoArgs) -> Result<(), CalibrationError>;

    /// Produce a calibrated reading from a raw one.
    fn convert(&mut self, raw: &GyroReading) -> Result<GyroReading, CalibrationError>;
}

/// The installed calibration stage.
#[derive(Default)]
pub enum Calibration {
    /// Raw readings pass through unchanged
    #[default]
    Absent,
    /// A configured algorithm
    Active(Box<dyn CalibrationAlgorithm>),
}

impl std::fmt::Debug for Calibration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Calibration::Absent => write!(f, "Calibration::Absent"),
            Calibration::Active(_) => write!(f, "Calibration::Active(..)"),
        }
    }
}

impl Calibration {
    /// Load bias for `sensor` and configure `algorithm` with it.
    ///
    /// A missing or unreadable store yields zero bias. An algorithm that
    /// refuses configuration is dropped and the result is [`Calibration::Absent`].
    pub fn initialize(
        algorithm: Option<Box<dyn CalibrationAlgorithm>>,
        store: Option<&CalibrationStore>,
        sensor: &SensorDescriptor,
    ) -> Self {
        let bias = match store {
            Some(store) => store.read_bias(sensor).unwrap_or_else(|e| {
                error!(
                    "Read dynamic calibration for {} from {} failed: {}",
                    sensor.name,
                    store.path().display(),
                    e
                );
                CalibrationBias::default()
            }),
            None => CalibrationBias::default(),
        };

        let Some(mut algorithm) = algorithm else {
            warn!("No gyroscope calibration algorithm installed, passing raw data through");
            return Calibration::Absent;
        };

        let args = GyroAlgoArgs {
            bias,
            sensor: sensor.clone(),
        };
        match algorithm.configure(&args) {
            Ok(()) => Calibration::Active(algorithm),
            Err(e) => {
                error!("Init gyro calibration parameters failed: {}", e);
                Calibration::Absent
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Calibration::Active(_))
    }

    /// Calibrate `raw`, falling back to `raw` itself when conversion fails.
    pub fn apply(&mut self, raw: &GyroReading) -> GyroReading {
        match self {
            Calibration::Absent => *raw,
            Calibration::Active(algorithm) => algorithm.convert(raw).unwrap_or_else(|e| {
                error!("Gyroscope calibration failed: {}", e);
                *raw
            }),
        }
    }
}
