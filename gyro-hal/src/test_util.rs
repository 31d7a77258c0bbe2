//! Deterministic event sources for tests and bench simulation.

use std::collections::VecDeque;
use std::io;

use crate::input::{
    EventSource, GyroAxis, InputEvent, EV_ABS, EV_SYN, SYN_REPORT, SYN_TIME_NSEC, SYN_TIME_SEC,
};

/// An [`EventSource`] that replays scripted fills.
///
/// Each call to `fill` moves the next scripted chunk into the buffer (or
/// fails, if the chunk is an error). Once the script runs out, fills are empty.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Result<Vec<InputEvent>, io::ErrorKind>>,
    buffer: VecDeque<InputEvent>,
    abs_state: Option<[i32; 3]>,
    fill_calls: usize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latched axis values reported by `abs_value`.
    pub fn with_abs_state(mut self, values: [i32; 3]) -> Self {
        self.abs_state = Some(values);
        self
    }

    pub fn push_fill(&mut self, events: Vec<InputEvent>) {
        self.script.push_back(Ok(events));
    }

    pub fn push_fill_error(&mut self, kind: io::ErrorKind) {
        self.script.push_back(Err(kind));
    }

    /// How many times `fill` has been called.
    pub fn fill_calls(&self) -> usize {
        self.fill_calls
    }

    /// Events buffered but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Scripted fills not yet delivered.
    pub fn remaining_fills(&self) -> usize {
        self.script.len()
    }
}

impl EventSource for ScriptedSource {
    fn fill(&mut self) -> io::Result<usize> {
        self.fill_calls += 1;
        match self.script.pop_front() {
            Some(Ok(events)) => {
                let n = events.len();
                self.buffer.extend(events);
                Ok(n)
            }
            Some(Err(kind)) => Err(io::Error::new(kind, "scripted fill failure")),
            None => Ok(0),
        }
    }

    fn read_event(&self) -> Option<InputEvent> {
        self.buffer.front().copied()
    }

    fn next(&mut self) {
        self.buffer.pop_front();
    }

    fn abs_value(&mut self, code: u16) -> io::Result<i32> {
        let values = self
            .abs_state
            .ok_or_else(|| io::Error::new(io::ErrorKind::Unsupported, "no latched state"))?;
        GyroAxis::from_code(code)
            .map(|axis| values[axis.index()])
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "not a gyroscope axis"))
    }
}

/// Axis value event.
pub fn axis(axis: GyroAxis, value: i32) -> InputEvent {
    InputEvent::new(EV_ABS, axis.abs_code(), value)
}

/// `SYN_REPORT` stamped by the input core at `sec.usec`.
pub fn report(sec: i64, usec: i64) -> InputEvent {
    InputEvent::new(EV_SYN, SYN_REPORT, 0).at(sec, usec)
}

/// Device timestamp markers for `sec.nsec`.
pub fn device_time(sec: i32, nsec: i32) -> [InputEvent; 2] {
    [
        InputEvent::new(EV_SYN, SYN_TIME_SEC, sec),
        InputEvent::new(EV_SYN, SYN_TIME_NSEC, nsec),
    ]
}

/// Complete reading closed by a `SYN_REPORT` at `sec.usec`.
pub fn reading_at(values: [i32; 3], sec: i64, usec: i64) -> Vec<InputEvent> {
    vec![
        axis(GyroAxis::X, values[0]),
        axis(GyroAxis::Y, values[1]),
        axis(GyroAxis::Z, values[2]),
        report(sec, usec),
    ]
}

/// Complete reading carrying device timestamp markers.
pub fn reading_with_device_time(values: [i32; 3], sec: i32, nsec: i32) -> Vec<InputEvent> {
    let mut events = vec![
        axis(GyroAxis::X, values[0]),
        axis(GyroAxis::Y, values[1]),
        axis(GyroAxis::Z, values[2]),
    ];
    events.extend(device_time(sec, nsec));
    events.push(report(0, 0));
    events
}
