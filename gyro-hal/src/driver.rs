//! Gyroscope driver core
//!
//! [`GyroSensor`] turns the raw event stream of a gyroscope input device into
//! composed [`SensorEvent`] records:
//!
//! - axis events overwrite a single pending reading in place (last value wins,
//!   values persist across batches)
//! - `SYN_TIME_SEC`/`SYN_TIME_NSEC` supply a device timestamp; without them the
//!   input core's timestamp on `SYN_REPORT` is used
//! - `SYN_REPORT` finalizes the reading: the enable-time clock offset is
//!   subtracted, calibration is applied, and the raw values are duplicated into
//!   the record's uncalibrated fields
//! - readings stamped before the post-enable settle deadline are discarded, and
//!   the first record after construction or a delay change only seeds the drop
//!   gate; later records are emitted once they are more than the drop period
//!   past it
//!
//! All calls are expected from one thread, typically the service's poll loop.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn demo() -> gyro_hal::GyroResult<()> {
//! use gyro_hal::{GyroConfig, GyroSensor, Properties, SensorEvent};
//!
//! let mut gyro = GyroSensor::open(&GyroConfig::default(), Properties::from_env(), None)?;
//! gyro.set_delay(10_000_000)?;
//!
//! let mut slots = [SensorEvent::default(); 16];
//! let n = gyro.read_events(&mut slots)?;
//! for event in &slots[..n] {
//!     println!("{:?}", event.gyro_sample());
//! }
//! # Ok(())
//! # }
//! ```

use tracing::{debug, error, info, trace, warn};

use crate::calibration::{Calibration, CalibrationAlgorithm, CalibrationStore, GyroReading};
use crate::clock::Clock;
use crate::config::{GyroConfig, Properties};
use crate::control::ControlFiles;
use crate::error::{GyroError, GyroResult};
use crate::event::{GyroSample, SensorEvent, Vector3};
use crate::input::{EventSource, GyroAxis, GyroInput, InputEvent};
use crate::sensor::{SensorDescriptor, SensorStatus};

const NSEC_PER_SEC: i64 = 1_000_000_000;

/// The reading being assembled from axis events.
#[derive(Debug, Clone, Copy, Default)]
struct PendingEvent {
    rate: [f32; 3],
    status: SensorStatus,
    timestamp: i64,
}

impl PendingEvent {
    fn reading(&self, timestamp: i64) -> GyroReading {
        GyroReading {
            rate: Vector3::from(self.rate),
            status: self.status,
            timestamp,
        }
    }
}

/// Driver for one gyroscope input device.
pub struct GyroSensor<S: EventSource> {
    source: S,
    control: ControlFiles,
    properties: Properties,
    clock: Box<dyn Clock>,
    calibration: Calibration,
    sensor: SensorDescriptor,
    enable_settle_ns: i64,
    sample_drop_ns: i64,

    enabled: bool,
    ignore_until_ns: i64,
    clock_offset_ns: i64,

    pending: PendingEvent,
    has_pending_event: bool,
    pending_metadata: usize,
    device_time: bool,
    report_time_ns: i64,
    first_timestamp: Option<i64>,
}

impl<S: EventSource> GyroSensor<S> {
    /// Build a driver around an event source and its control directory.
    ///
    /// Loads calibration bias from `config.calibration_file` (if set) and
    /// configures `algorithm` with it, enables the sensor, and seeds a pending
    /// reading from the device's latched axis values when they can be queried.
    /// Failures in any of these steps are logged, not returned.
    pub fn new(
        source: S,
        control: ControlFiles,
        config: &GyroConfig,
        properties: Properties,
        clock: Box<dyn Clock>,
        algorithm: Option<Box<dyn CalibrationAlgorithm>>,
    ) -> Self {
        let store = config
            .calibration_file
            .as_ref()
            .map(CalibrationStore::with_path);
        let calibration = Calibration::initialize(algorithm, store.as_ref(), &config.sensor);

        let mut sensor = Self {
            source,
            control,
            properties,
            clock,
            calibration,
            sensor: config.sensor.clone(),
            enable_settle_ns: config.enable_settle_ns,
            sample_drop_ns: config.sample_drop_ns,
            enabled: false,
            ignore_until_ns: 0,
            clock_offset_ns: 0,
            pending: PendingEvent::default(),
            has_pending_event: false,
            pending_metadata: 0,
            device_time: false,
            report_time_ns: 0,
            first_timestamp: None,
        };

        info!(
            "Gyroscope '{}' control path is {}",
            sensor.sensor.name,
            sensor.control.base().display()
        );

        if let Err(e) = sensor.enable(true) {
            error!("Failed to enable gyroscope '{}': {}", sensor.sensor.name, e);
        }
        sensor.seed_initial_state();
        sensor
    }

    /// Query the latched value of every axis and queue it as a pending reading.
    fn seed_initial_state(&mut self) {
        let mut rate = [0.0f32; 3];
        for axis in GyroAxis::ALL {
            match self.source.abs_value(axis.abs_code()) {
                Ok(value) => rate[axis.index()] = axis.to_rad_per_sec(value),
                Err(e) => {
                    debug!("No initial state for {:?}: {}", axis, e);
                    return;
                }
            }
        }
        self.pending.rate = rate;
        self.has_pending_event = true;
    }

    /// Enable or disable the sensor.
    ///
    /// Requesting the current state does nothing. Enabling latches the settle
    /// deadline and the device clock offset; disabling clears the deadline.
    /// In loopback mode only the in-memory state changes.
    pub fn enable(&mut self, on: bool) -> GyroResult<()> {
        if self.properties.loopback() {
            warn!("Gyroscope loopback is set, not touching {}", self.control.base().display());
            self.enabled = on;
            self.ignore_until_ns = 0;
            return Ok(());
        }

        if on == self.enabled {
            return Ok(());
        }

        self.control.write_enable(on)?;
        if on {
            self.ignore_until_ns = self.clock.now_ns() + self.enable_settle_ns;
            self.clock_offset_ns = self.clock.device_offset_ns();
        } else {
            self.ignore_until_ns = 0;
        }
        self.enabled = on;

        info!(
            "Gyroscope '{}' {}",
            self.sensor.name,
            if on { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// Set the sampling interval, truncated to whole milliseconds.
    ///
    /// On success the drop gate restarts from the next record.
    pub fn set_delay(&mut self, delay_ns: i64) -> GyroResult<()> {
        if self.properties.loopback() {
            warn!("Gyroscope loopback is set, ignoring delay of {} ns", delay_ns);
            return Ok(());
        }
        if delay_ns < 0 {
            return Err(GyroError::InvalidArgument(format!(
                "negative sampling delay: {delay_ns} ns"
            )));
        }

        let delay_ms = self.control.write_delay(delay_ns)?;
        self.first_timestamp = None;
        debug!("Gyroscope '{}' delay set to {} ms", self.sensor.name, delay_ms);
        Ok(())
    }

    /// Queue a flush-complete record for this sensor.
    pub fn flush(&mut self) -> GyroResult<()> {
        if !self.enabled {
            return Err(GyroError::InvalidArgument(format!(
                "flush of disabled sensor '{}'",
                self.sensor.name
            )));
        }
        self.pending_metadata += 1;
        Ok(())
    }

    /// Whether a call to [`read_events`](Self::read_events) has something to
    /// return without new input.
    pub fn has_pending_events(&self) -> bool {
        self.has_pending_event || self.pending_metadata > 0
    }

    /// Write up to `out.len()` records and return how many were written.
    ///
    /// A queued pending reading or metadata record is returned on its own,
    /// stamped with the current time. Otherwise the source is filled and
    /// drained; if that produces nothing while enabled, one more fill is tried
    /// so a reading split across two fills is still returned by this call.
    ///
    /// # Errors
    ///
    /// [`GyroError::InvalidArgument`] for an empty `out`, [`GyroError::Io`]
    /// when the source fails to fill.
    pub fn read_events(&mut self, out: &mut [SensorEvent]) -> GyroResult<usize> {
        if out.is_empty() {
            return Err(GyroError::InvalidArgument(
                "output buffer has no slots".to_string(),
            ));
        }

        if self.has_pending_event {
            self.has_pending_event = false;
            let now = self.clock.now_ns();
            let rate = Vector3::from(self.pending.rate);
            out[0] = SensorEvent::gyro(
                self.sensor.handle,
                now,
                GyroSample {
                    calibrated: rate,
                    status: self.pending.status,
                    uncalibrated: rate,
                },
            );
            return Ok(usize::from(self.enabled));
        }

        if self.pending_metadata > 0 {
            self.pending_metadata -= 1;
            out[0] = SensorEvent::flush_complete(self.sensor.handle, self.clock.now_ns());
            return Ok(usize::from(self.enabled));
        }

        self.source.fill()?;
        let mut produced = self.drain(out, 0);

        if produced == 0 && self.enabled && self.source.fill()? > 0 {
            produced = self.drain(out, produced);
        }

        Ok(produced)
    }

    /// Consume buffered events until `out` is full or the buffer is empty.
    fn drain(&mut self, out: &mut [SensorEvent], mut produced: usize) -> usize {
        while produced < out.len() {
            let Some(event) = self.source.read_event() else {
                break;
            };

            match event.classify() {
                GyroInput::Axis { axis, value } => {
                    self.pending.rate[axis.index()] = axis.to_rad_per_sec(value);
                }
                GyroInput::TimeSeconds(sec) => {
                    self.device_time = true;
                    self.report_time_ns = sec as i64 * NSEC_PER_SEC;
                }
                GyroInput::TimeNanos(nsec) => {
                    self.device_time = true;
                    self.pending.timestamp = self.report_time_ns + nsec as i64;
                }
                GyroInput::Report => {
                    if let Some(record) = self.finalize(&event) {
                        out[produced] = record;
                        produced += 1;
                    }
                }
                GyroInput::Ignored => {}
                GyroInput::Unknown => {
                    warn!(
                        "GyroSensor: unknown event (type={}, code={})",
                        event.kind, event.code
                    );
                }
            }

            self.source.next();
        }
        produced
    }

    /// Close the pending reading. Returns the record when it should be emitted.
    fn finalize(&mut self, report: &InputEvent) -> Option<SensorEvent> {
        if !self.device_time {
            self.pending.timestamp = report.time_ns();
        }
        self.device_time = false;

        if !self.enabled {
            return None;
        }

        let timestamp = self.pending.timestamp - self.clock_offset_ns;
        if timestamp < self.ignore_until_ns {
            trace!(
                "Dropping reading at {} ns, settling until {} ns",
                timestamp,
                self.ignore_until_ns
            );
            return None;
        }

        let raw = self.pending.reading(timestamp);
        let calibrated = self.calibration.apply(&raw);
        let record = SensorEvent::gyro(
            self.sensor.handle,
            timestamp,
            GyroSample {
                calibrated: calibrated.rate,
                status: calibrated.status,
                uncalibrated: raw.rate,
            },
        );

        match self.first_timestamp {
            None => {
                self.first_timestamp = Some(timestamp);
                None
            }
            Some(first) if timestamp - first > self.sample_drop_ns => Some(record),
            Some(_) => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reference time before which finalized readings are discarded.
    pub fn ignore_until_ns(&self) -> i64 {
        self.ignore_until_ns
    }

    /// Device-minus-reference clock offset latched at the last enable.
    pub fn clock_offset_ns(&self) -> i64 {
        self.clock_offset_ns
    }

    pub fn calibration_active(&self) -> bool {
        self.calibration.is_active()
    }

    pub fn sensor(&self) -> &SensorDescriptor {
        &self.sensor
    }

    pub fn control(&self) -> &ControlFiles {
        &self.control
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(target_os = "linux")]
impl GyroSensor<crate::input::InputDevice> {
    /// Find the input device named `config.input_name` and drive it with the
    /// host clocks.
    pub fn open(
        config: &GyroConfig,
        properties: Properties,
        algorithm: Option<Box<dyn CalibrationAlgorithm>>,
    ) -> GyroResult<Self> {
        config.validate()?;
        let device =
            crate::input::InputDevice::find_by_name(&config.input_name, config.reader_capacity)?;
        let control = ControlFiles::new(
            config
                .control_path
                .clone()
                .unwrap_or_else(|| device.default_control_path()),
        );
        Ok(Self::new(
            device,
            control,
            config,
            properties,
            Box::new(crate::clock::SystemClock),
            algorithm,
        ))
    }
}

#[cfg(target_os = "linux")]
impl std::os::unix::io::AsRawFd for GyroSensor<crate::input::InputDevice> {
    fn as_raw_fd(&self) -> std::os::unix::io::RawFd {
        std::os::unix::io::AsRawFd::as_raw_fd(&self.source)
    }
}

impl<S: EventSource> Drop for GyroSensor<S> {
    fn drop(&mut self) {
        if self.enabled {
            if let Err(e) = self.enable(false) {
                error!("Failed to disable gyroscope '{}': {}", self.sensor.name, e);
            }
        }
    }
}
