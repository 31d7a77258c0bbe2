//! Linux input subsystem plumbing for the gyroscope
//!
//! The kernel driver reports one reading as a run of `EV_ABS` axis events
//! followed by `EV_SYN` markers. Two optional markers carry the device's own
//! timestamp (seconds, then nanoseconds); `SYN_REPORT` closes the reading.
//!
//! ```text
//! EV_ABS  ABS_RX   <x>
//! EV_ABS  ABS_RY   <y>
//! EV_ABS  ABS_RZ   <z>
//! EV_SYN  SYN_TIME_SEC   <sec>     (optional)
//! EV_SYN  SYN_TIME_NSEC  <nsec>    (optional)
//! EV_SYN  SYN_REPORT     0
//! ```

#[cfg(target_os = "linux")]
pub mod device;
pub mod reader;

use bytemuck::{Pod, Zeroable};

#[cfg(target_os = "linux")]
pub use device::InputDevice;
pub use reader::{EventSource, InputEventReader};

/// Event types
pub const EV_SYN: u16 = 0x00;
pub const EV_ABS: u16 = 0x03;

/// Absolute axis codes used for angular rate
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;
pub const ABS_RZ: u16 = 0x05;

/// Synchronization codes
pub const SYN_REPORT: u16 = 0;
pub const SYN_TIME_SEC: u16 = 4;
pub const SYN_TIME_NSEC: u16 = 5;

/// Radians per second for one LSB at the ±2000 °/s range (16.4 LSB per °/s).
pub const GYRO_RAD_PER_LSB: f64 = std::f64::consts::PI / (180.0 * 16.4);

/// Size of one kernel `input_event` on this target.
pub const INPUT_EVENT_SIZE: usize = std::mem::size_of::<RawInputEvent>();

const NSEC_PER_SEC: i64 = 1_000_000_000;
const NSEC_PER_USEC: i64 = 1_000;

/// Kernel `struct input_event`.
///
/// The timestamp is a `timeval`, so the record is 16 bytes on 32-bit
/// userspace and 24 bytes on 64-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct RawInputEvent {
    pub tv_sec: libc::time_t,
    pub tv_usec: libc::suseconds_t,
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

#[cfg(target_os = "linux")]
const _: () = assert!(
    std::mem::size_of::<RawInputEvent>() == std::mem::size_of::<libc::input_event>(),
    "RawInputEvent does not match the kernel input_event layout on this target"
);

/// One decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputEvent {
    /// Wall-clock seconds stamped by the input core
    pub time_sec: i64,
    /// Wall-clock microseconds stamped by the input core
    pub time_usec: i64,
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl InputEvent {
    pub fn new(kind: u16, code: u16, value: i32) -> Self {
        Self {
            kind,
            code,
            value,
            ..Default::default()
        }
    }

    /// Same event with the input core's timestamp set.
    pub fn at(mut self, time_sec: i64, time_usec: i64) -> Self {
        self.time_sec = time_sec;
        self.time_usec = time_usec;
        self
    }

    /// Input core timestamp in nanoseconds.
    pub fn time_ns(&self) -> i64 {
        self.time_sec * NSEC_PER_SEC + self.time_usec * NSEC_PER_USEC
    }

    /// Interpret this event from the gyroscope's point of view.
    pub fn classify(&self) -> GyroInput {
        match (self.kind, self.code) {
            (EV_ABS, code) => match GyroAxis::from_code(code) {
                Some(axis) => GyroInput::Axis {
                    axis,
                    value: self.value,
                },
                None => GyroInput::Ignored,
            },
            (EV_SYN, SYN_TIME_SEC) => GyroInput::TimeSeconds(self.value),
            (EV_SYN, SYN_TIME_NSEC) => GyroInput::TimeNanos(self.value),
            (EV_SYN, SYN_REPORT) => GyroInput::Report,
            (EV_SYN, _) => GyroInput::Ignored,
            _ => GyroInput::Unknown,
        }
    }
}

impl From<RawInputEvent> for InputEvent {
    fn from(raw: RawInputEvent) -> Self {
        Self {
            time_sec: i64::from(raw.tv_sec),
            time_usec: i64::from(raw.tv_usec),
            kind: raw.kind,
            code: raw.code,
            value: raw.value,
        }
    }
}

impl From<InputEvent> for RawInputEvent {
    fn from(event: InputEvent) -> Self {
        Self {
            tv_sec: event.time_sec as libc::time_t,
            tv_usec: event.time_usec as libc::suseconds_t,
            kind: event.kind,
            code: event.code,
            value: event.value,
        }
    }
}

/// What a raw event means to the gyroscope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroInput {
    /// New value for one axis, in device units
    Axis { axis: GyroAxis, value: i32 },
    /// Device timestamp, whole seconds
    TimeSeconds(i32),
    /// Device timestamp, nanoseconds within the second
    TimeNanos(i32),
    /// Reading complete
    Report,
    /// Recognized type, code not used by this sensor
    Ignored,
    /// Event type this sensor does not understand
    Unknown,
}

/// Gyroscope axes with their device code and unit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GyroAxis {
    X,
    Y,
    Z,
}

impl GyroAxis {
    pub const ALL: [GyroAxis; 3] = [GyroAxis::X, GyroAxis::Y, GyroAxis::Z];

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            ABS_RX => Some(GyroAxis::X),
            ABS_RY => Some(GyroAxis::Y),
            ABS_RZ => Some(GyroAxis::Z),
            _ => None,
        }
    }

    pub fn abs_code(self) -> u16 {
        match self {
            GyroAxis::X => ABS_RX,
            GyroAxis::Y => ABS_RY,
            GyroAxis::Z => ABS_RZ,
        }
    }

    pub fn index(self) -> usize {
        match self {
            GyroAxis::X => 0,
            GyroAxis::Y => 1,
            GyroAxis::Z => 2,
        }
    }

    /// Signed conversion factor from device units to rad/s.
    ///
    /// X and Z are mounted inverted relative to the device frame.
    pub fn scale(self) -> f64 {
        match self {
            GyroAxis::X => -GYRO_RAD_PER_LSB,
            GyroAxis::Y => GYRO_RAD_PER_LSB,
            GyroAxis::Z => -GYRO_RAD_PER_LSB,
        }
    }

    /// Convert a raw device value to rad/s.
    pub fn to_rad_per_sec(self, value: i32) -> f32 {
        (value as f64 * self.scale()) as f32
    }
}
