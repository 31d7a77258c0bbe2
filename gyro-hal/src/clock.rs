//! Clock domains.
//!
//! The input core stamps events in the device domain (`CLOCK_REALTIME`), while
//! the sensor service consumes timestamps in its reference domain
//! (`CLOCK_BOOTTIME`). The driver latches the offset between the two when the
//! sensor is enabled and subtracts it from every finalized reading.

use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::error;

const NSEC_PER_SEC: i64 = 1_000_000_000;

/// Source of reference time and of the device-to-reference offset.
pub trait Clock {
    /// Current time in the reference domain, nanoseconds.
    fn now_ns(&self) -> i64;

    /// Device-domain time minus reference-domain time, nanoseconds.
    fn device_offset_ns(&self) -> i64;
}

/// Host clocks read through `clock_gettime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

fn clock_ns(id: libc::clockid_t) -> io::Result<i64> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(id, &mut ts) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(i64::from(ts.tv_sec) * NSEC_PER_SEC + i64::from(ts.tv_nsec))
}

/// Read `id`, logging and reporting 0 if the host refuses.
fn read_clock(id: libc::clockid_t) -> i64 {
    clock_ns(id).unwrap_or_else(|e| {
        error!("clock_gettime({}) failed: {}", id, e);
        0
    })
}

#[cfg(target_os = "linux")]
const REFERENCE_CLOCK: libc::clockid_t = libc::CLOCK_BOOTTIME;
#[cfg(not(target_os = "linux"))]
const REFERENCE_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

impl Clock for SystemClock {
    fn now_ns(&self) -> i64 {
        read_clock(REFERENCE_CLOCK)
    }

    fn device_offset_ns(&self) -> i64 {
        let reference = read_clock(REFERENCE_CLOCK);
        let device = read_clock(libc::CLOCK_REALTIME);
        device - reference
    }
}

/// Hand-driven clock for simulation and tests.
///
/// Clones share state, so a test can keep one handle and move another into
/// the driver.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
    offset: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now_ns: i64, offset_ns: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_ns)),
            offset: Arc::new(AtomicI64::new(offset_ns)),
        }
    }

    pub fn set_now(&self, now_ns: i64) {
        self.now.store(now_ns, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ns: i64) {
        self.now.fetch_add(delta_ns, Ordering::SeqCst);
    }

    pub fn set_offset(&self, offset_ns: i64) {
        self.offset.store(offset_ns, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    fn device_offset_ns(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }
}
