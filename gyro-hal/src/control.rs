//! sysfs control files of the gyroscope.
//!
//! The kernel driver exposes two write-only attributes next to each other:
//! `enable` takes `1`/`0`, `poll_delay` takes the sampling interval in whole
//! milliseconds as a decimal string.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GyroError, GyroResult};

pub const SYSFS_ENABLE: &str = "enable";
pub const SYSFS_POLL_DELAY: &str = "poll_delay";

const NSEC_PER_MSEC: i64 = 1_000_000;

/// Writer for the per-device control directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFiles {
    base: PathBuf,
}

impl ControlFiles {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn enable_path(&self) -> PathBuf {
        self.base.join(SYSFS_ENABLE)
    }

    pub fn poll_delay_path(&self) -> PathBuf {
        self.base.join(SYSFS_POLL_DELAY)
    }

    /// Write `1` or `0` to the enable attribute.
    pub fn write_enable(&self, on: bool) -> GyroResult<()> {
        write_attribute(&self.enable_path(), if on { "1" } else { "0" })
    }

    /// Write the sampling interval, truncated to whole milliseconds.
    ///
    /// Returns the value written.
    pub fn write_delay(&self, delay_ns: i64) -> GyroResult<i64> {
        let delay_ms = delay_to_ms(delay_ns);
        write_attribute(&self.poll_delay_path(), &delay_ms.to_string())?;
        Ok(delay_ms)
    }
}

/// Nanoseconds to whole milliseconds, truncating.
pub fn delay_to_ms(delay_ns: i64) -> i64 {
    delay_ns / NSEC_PER_MSEC
}

fn write_attribute(path: &Path, value: &str) -> GyroResult<()> {
    let control_err = |source| GyroError::ControlFile {
        path: path.to_path_buf(),
        source,
    };

    // sysfs attributes already exist; never create one by accident.
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(control_err)?;
    file.write_all(value.as_bytes()).map_err(control_err)?;

    debug!("Wrote {:?} to {}", value, path.display());
    Ok(())
}
