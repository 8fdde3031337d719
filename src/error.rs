//! Error taxonomy for the acquisition engine.
//!
//! Every failure is returned as data, never raised or swallowed, so callers
//! can branch on the exact kind without unwinding control flow.

use std::io;

use thiserror::Error;

use crate::decode::{
    EVENT_HEADER_SIZE,
    MAX_EVENTS_PER_CYCLE,
};

/// A malformed raw buffer
///
/// Decoding is all-or-nothing per cycle: any of these discards every event
/// from the buffer that produced it. The buffer's bytes have already been
/// consumed from the kernel and cannot be re-read.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The buffer ends partway through a record's fixed header. Also raised
    /// for an empty buffer, which cannot hold a single record.
    #[error(
        "buffer ends {remaining} bytes into a record header at offset {offset}, need {}",
        EVENT_HEADER_SIZE
    )]
    ShortBuffer {
        /// Offset of the incomplete record within the buffer.
        offset: usize,
        /// Bytes remaining at that offset.
        remaining: usize,
    },

    /// A record declares a name length that runs past the end of the
    /// buffer.
    #[error("record at offset {offset} declares a {declared} byte name, but only {remaining} bytes remain")]
    TruncatedRecord {
        /// Offset of the offending record within the buffer.
        offset: usize,
        /// Name length the record's header declares.
        declared: usize,
        /// Bytes actually remaining after the header.
        remaining: usize,
    },

    /// The buffer describes more records than one cycle may deliver.
    /// Decoding aborts before anything is allocated for them.
    #[error("buffer describes more than {} records", MAX_EVENTS_PER_CYCLE)]
    TooManyEvents,
}

/// A structural failure in one poll-and-decode cycle
///
/// Aborts only the cycle it occurred in; the channel stays open and the
/// caller may simply poll again. Repeated structural failures are the
/// caller's cue to stop polling and recreate the channel.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The bounded wait on the notification descriptor failed.
    #[error("wait on the notification descriptor failed")]
    Wait(#[source] io::Error),

    /// The read from the notification descriptor failed.
    #[error("read from the notification descriptor failed")]
    Read(#[source] io::Error),

    /// The descriptor signalled readiness, but the read returned no bytes.
    /// A zero-byte read is never treated as success.
    #[error("descriptor signalled ready but the read returned no bytes")]
    EmptyRead,

    /// The drained buffer could not be decoded.
    #[error("failed to decode the drained buffer")]
    Decode(#[from] DecodeError),
}
