//! Error types for the gyroscope driver.
//!
//! Control-file and read-path failures surface to the caller as [`GyroError`].
//! Calibration problems are reported through
//! [`CalibrationError`](crate::calibration::CalibrationError) and are absorbed
//! by the driver, so they never appear here at call time.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while driving the gyroscope.
#[derive(Error, Debug)]
pub enum GyroError {
    /// Low-level I/O error (device read or ioctl failure).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A sysfs control file could not be opened or written.
    #[error("Control file {path}: {source}")]
    ControlFile {
        /// Full path of the control file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The caller passed an argument the driver cannot act on.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No input device with the requested name exists.
    #[error("Input device not found: {0}")]
    DeviceNotFound(String),
}

impl GyroError {
    /// Negative errno equivalent, for callers that speak the HAL integer convention.
    pub fn errno(&self) -> i32 {
        match self {
            GyroError::Io(e) | GyroError::ControlFile { source: e, .. } => {
                -e.raw_os_error().unwrap_or(libc::EIO)
            }
            GyroError::InvalidArgument(_) => -libc::EINVAL,
            GyroError::Config(_) => -libc::EINVAL,
            GyroError::DeviceNotFound(_) => -libc::ENODEV,
        }
    }
}

/// Result type for driver operations.
pub type GyroResult<T> = Result<T, GyroError>;
