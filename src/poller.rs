//! One acquisition cycle: wait, classify, drain, decode.
//!
//! The poller is the only place the engine blocks, and it blocks exactly
//! once per cycle, inside [`EventSource::wait_ready`]. Once readiness has
//! been observed, draining and decoding always run to completion (bounded
//! by [`MAX_EVENTS_PER_CYCLE`]) before the outcome is reported.
//!
//! [`MAX_EVENTS_PER_CYCLE`]: crate::MAX_EVENTS_PER_CYCLE

use std::{
    io,
    time::Duration,
};

use tracing::{
    debug,
    trace,
};

use crate::decode::{
    self,
    EVENT_HEADER_SIZE,
    MAX_EVENTS_PER_CYCLE,
};
use crate::error::CycleError;
use crate::events::Event;

/// Default bounded-blocking cadence for a cycle.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

// Sized for a full cycle's worth of records with short names.
const READ_BUFFER_SIZE: usize = MAX_EVENTS_PER_CYCLE * (EVENT_HEADER_SIZE + 16);

/// Source of raw notification bytes
///
/// Implemented by [`Channel`] against the real inotify descriptor. The
/// trait is the seam between cycle orchestration and the operating system;
/// tests drive [`Poller`] with scripted sources instead of a kernel.
///
/// [`Channel`]: crate::Channel
pub trait EventSource {
    /// Blocks until data is available or the timeout elapses
    ///
    /// Must classify every outcome of the wait; see [`WaitStatus`].
    fn wait_ready(&self, timeout: Duration) -> WaitStatus;

    /// Performs a single read of available bytes into `buffer`
    ///
    /// Called only after [`wait_ready`](Self::wait_ready) reported
    /// readiness. Returns the number of bytes read. Consumed bytes are gone
    /// irreversibly; a sequence read once cannot be re-read.
    fn read_available(&self, buffer: &mut [u8]) -> io::Result<usize>;
}

/// Classified outcome of one bounded wait on an [`EventSource`]
#[derive(Debug)]
pub enum WaitStatus {
    /// The source has data available to read.
    Ready,
    /// The timeout elapsed without data becoming available.
    TimedOut,
    /// The wait was interrupted by a signal.
    Interrupted,
    /// The wait itself failed.
    Failed(io::Error),
}

/// Result of one poll-and-decode cycle
///
/// The single public contract of the acquisition engine. Produced fresh
/// each cycle and never mutated after construction.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Events were drained and decoded, in kernel emission order.
    ///
    /// An empty sequence is valid and distinct from [`Timeout`], though a
    /// real kernel never produces one: a ready descriptor always yields at
    /// least one whole record, and anything less is an error.
    ///
    /// [`Timeout`]: Self::Timeout
    Ready(Vec<Event>),

    /// No data arrived within the timeout window. Expected in normal
    /// operation; callers loop.
    Timeout,

    /// The wait was interrupted by a signal. Recoverable; callers retry.
    Interrupted,

    /// The cycle failed. Aborts only this cycle; invoking the next one is
    /// the entire recovery procedure.
    Error(CycleError),
}

/// Drives poll-and-decode cycles against an [`EventSource`]
///
/// Each cycle is explicitly invoked and runs to completion before the next
/// begins; the poller never re-enters itself and never retries internally.
/// `Interrupted` and `Timeout` outcomes are informational, everything else
/// is surfaced verbatim.
///
/// Owns its read buffer, which is reused across cycles; the raw bytes of
/// one cycle are never retained into the next.
#[derive(Debug)]
pub struct Poller<S> {
    source: S,
    buffer: Box<[u8]>,
}

impl<S> Poller<S>
where
    S: EventSource,
{
    /// Creates a poller that acquires events from `source`
    pub fn new(source: S) -> Self {
        Poller {
            source,
            buffer: vec![0; READ_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Runs one cycle at the default cadence of [`DEFAULT_TIMEOUT`]
    pub fn poll_cycle_default(&mut self) -> CycleOutcome {
        self.poll_cycle(DEFAULT_TIMEOUT)
    }

    /// Runs one poll-and-decode cycle
    ///
    /// Waits on the source for up to `timeout`, classifies the wait
    /// outcome, and on readiness drains and decodes the available bytes.
    /// This is the engine's only suspension point; a cycle cannot be
    /// aborted once readiness has been observed.
    pub fn poll_cycle(&mut self, timeout: Duration) -> CycleOutcome {
        match self.source.wait_ready(timeout) {
            WaitStatus::TimedOut => CycleOutcome::Timeout,
            WaitStatus::Interrupted => CycleOutcome::Interrupted,
            WaitStatus::Failed(error) => CycleOutcome::Error(CycleError::Wait(error)),
            WaitStatus::Ready => self.drain_and_decode(),
        }
    }

    fn drain_and_decode(&mut self) -> CycleOutcome {
        let num_bytes = match self.source.read_available(&mut self.buffer) {
            Ok(0) => return CycleOutcome::Error(CycleError::EmptyRead),
            Ok(num_bytes) => num_bytes,
            Err(error) => return CycleOutcome::Error(CycleError::Read(error)),
        };
        trace!(num_bytes, "drained notification bytes");

        match decode::decode_events(&self.buffer[..num_bytes]) {
            Ok(events) => {
                debug!(count = events.len(), "decoded events");
                CycleOutcome::Ready(events)
            }
            Err(error) => CycleOutcome::Error(CycleError::Decode(error)),
        }
    }

    /// Returns a reference to the underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the poller, returning the underlying source
    pub fn into_source(self) -> S {
        self.source
    }
}
