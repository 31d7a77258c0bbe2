//! Buffered reading of kernel input events.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

use bytemuck::pod_read_unaligned;
use tracing::trace;

use super::{InputEvent, RawInputEvent, INPUT_EVENT_SIZE};

/// A source of raw input events with fill/peek/advance semantics.
///
/// `fill` pulls whatever the device has ready into an internal buffer;
/// `read_event` peeks at the oldest buffered event and `next` consumes it.
pub trait EventSource {
    /// Pull newly available events into the buffer.
    ///
    /// Returns the number of events added. `Ok(0)` means nothing was ready.
    fn fill(&mut self) -> io::Result<usize>;

    /// Oldest buffered event, if any.
    fn read_event(&self) -> Option<InputEvent>;

    /// Drop the oldest buffered event.
    fn next(&mut self);

    /// Last latched value of an absolute axis.
    fn abs_value(&mut self, code: u16) -> io::Result<i32> {
        Err(io::Error::new(
            ErrorKind::Unsupported,
            format!("absolute axis query not supported (code {code})"),
        ))
    }
}

/// Bounded FIFO of input events decoded from any byte stream.
///
/// At most `capacity` events are held; `fill` only reads as many bytes as fit.
/// A short read that splits an event keeps the leading bytes until the rest
/// arrives.
pub struct InputEventReader<R> {
    inner: R,
    capacity: usize,
    events: VecDeque<InputEvent>,
    partial: Vec<u8>,
}

impl<R: Read> InputEventReader<R> {
    pub fn new(inner: R, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            capacity,
            events: VecDeque::with_capacity(capacity),
            partial: Vec::with_capacity(INPUT_EVENT_SIZE),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of decoded events waiting to be consumed.
    pub fn buffered(&self) -> usize {
        self.events.len()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    fn read_some(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> EventSource for InputEventReader<R> {
    fn fill(&mut self) -> io::Result<usize> {
        let free = self.capacity - self.events.len();
        if free == 0 {
            return Ok(0);
        }

        let want = free * INPUT_EVENT_SIZE - self.partial.len();
        let mut buf = vec![0u8; want];
        let n = self.read_some(&mut buf)?;
        self.partial.extend_from_slice(&buf[..n]);

        let complete = self.partial.len() / INPUT_EVENT_SIZE;
        for chunk in self.partial.chunks_exact(INPUT_EVENT_SIZE) {
            let raw: RawInputEvent = pod_read_unaligned(chunk);
            self.events.push_back(raw.into());
        }
        self.partial.drain(..complete * INPUT_EVENT_SIZE);

        trace!(
            "Filled {} input events ({} bytes pending)",
            complete,
            self.partial.len()
        );
        Ok(complete)
    }

    fn read_event(&self) -> Option<InputEvent> {
        self.events.front().copied()
    }

    fn next(&mut self) {
        self.events.pop_front();
    }
}
