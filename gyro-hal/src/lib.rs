//! Gyroscope HAL for Linux input devices.
//!
//! This crate turns the raw `EV_ABS`/`EV_SYN` event stream of a gyroscope
//! input device into timestamped, calibrated records for a sensor service.
//!
//! # Modules
//!
//! - [`driver`] - the acquisition pipeline ([`GyroSensor`])
//! - [`input`] - kernel event layout, buffered reading, evdev device access
//! - [`control`] - sysfs `enable`/`poll_delay` attributes
//! - [`calibration`] - bias store and pluggable calibration algorithm
//! - [`clock`] - reference clock and device clock offset
//! - [`config`] - static configuration and runtime properties (loopback mode)
//! - [`test_util`] - scripted event sources for tests and bench simulation

pub mod calibration;
pub mod clock;
pub mod config;
pub mod control;
pub mod driver;
pub mod error;
pub mod event;
pub mod input;
pub mod sensor;
pub mod test_util;

pub use calibration::{
    Calibration, CalibrationAlgorithm, CalibrationBias, CalibrationError, CalibrationStore,
    GyroAlgoArgs, GyroReading,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{GyroConfig, Properties, LOOPBACK_PROPERTY};
pub use control::ControlFiles;
pub use driver::GyroSensor;
pub use error::{GyroError, GyroResult};
pub use event::{EventPayload, GyroSample, MetaData, MetaDataKind, SensorEvent, Vector3};
pub use input::{EventSource, GyroAxis, InputEvent, InputEventReader};
pub use sensor::{SensorDescriptor, SensorStatus, SensorType};
