#![warn(missing_docs)]

//! Bounded poll-and-decode engine for Linux's inotify facility.
//!
//! [Inotify][wiki] is a Linux kernel mechanism for monitoring changes to
//! file systems' contents:
//!
//! > The inotify API provides a mechanism for monitoring filesystem
//! > events. Inotify can be used to monitor individual files, or to
//! > monitor directories. When a directory is monitored, inotify will
//! > return events for the directory itself, and for files inside the
//! > directory.
//!
//! This crate bridges that facility to a calling program without the
//! program polling the file system itself. A [`Channel`] owns the inotify
//! descriptor, [`Watches`] registers and removes paths of interest, and a
//! [`Poller`] drives explicit acquisition cycles: block on the descriptor
//! with a bounded timeout (1 second by default), drain the raw bytes when
//! data is ready, and decode them into owned [`Event`] values. Every cycle
//! ends in exactly one [`CycleOutcome`]; errors are data, not panics, and a
//! failed cycle never prevents the next one.
//!
//! The engine is synchronous and single-threaded by construction. One cycle
//! fully completes (or times out) before the next begins, and concurrent
//! polling of a single channel is unsupported; serialize access by running
//! one polling loop and handing decoded events to consumers.
//!
//! # Examples
//!
//! ```
//! use inpoll::{Channel, CycleOutcome, Poller, WatchMask};
//!
//! let channel = Channel::init()
//!     .expect("failed to initialize inotify channel");
//!
//! channel.watches()
//!     .add(std::env::temp_dir(), WatchMask::CREATE | WatchMask::MODIFY)
//!     .expect("failed to add watch");
//!
//! let mut poller = Poller::new(channel);
//!
//! match poller.poll_cycle_default() {
//!     CycleOutcome::Ready(events) => {
//!         for event in events {
//!             // Handle event
//!         }
//!     }
//!     // Both are expected in normal operation; loop and poll again.
//!     CycleOutcome::Timeout | CycleOutcome::Interrupted => (),
//!     CycleOutcome::Error(error) => eprintln!("cycle failed: {}", error),
//! }
//! ```
//!
//! See the [man page][inotify7] for the semantics of the underlying C API,
//! which this crate follows closely.
//!
//! [wiki]: https://en.wikipedia.org/wiki/Inotify
//! [inotify7]: https://man7.org/linux/man-pages/man7/inotify.7.html

#[macro_use]
extern crate bitflags;

mod channel;
mod error;
mod events;
mod fd_guard;
mod poller;
mod util;
mod watches;

pub mod decode;

pub use crate::channel::Channel;
pub use crate::decode::{
    decode_events,
    EVENT_HEADER_SIZE,
    MAX_EVENTS_PER_CYCLE,
};
pub use crate::error::{
    CycleError,
    DecodeError,
};
pub use crate::events::{
    Event,
    EventMask,
};
pub use crate::poller::{
    CycleOutcome,
    EventSource,
    Poller,
    WaitStatus,
    DEFAULT_TIMEOUT,
};
pub use crate::watches::{
    WatchDescriptor,
    WatchMask,
    Watches,
};
