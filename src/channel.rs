use std::{
    io,
    os::unix::io::{
        AsRawFd,
        RawFd,
    },
    sync::Arc,
    time::Duration,
};

use inotify_sys as ffi;
use tracing::debug;

use crate::fd_guard::FdGuard;
use crate::poller::{
    EventSource,
    WaitStatus,
};
use crate::util::read_into_buffer;
use crate::watches::Watches;

/// The process's notification channel
///
/// Owns the single inotify file descriptor for the engine's lifetime. The
/// descriptor is created once by [`Channel::init`], closed once (on drop or
/// through [`Channel::close`]), and must not be polled from more than one
/// thread at a time; callers needing concurrent consumers should run one
/// polling loop and fan decoded events out themselves.
///
/// # Examples
///
/// ```
/// use inpoll::{Channel, Poller, WatchMask};
///
/// let channel = Channel::init()
///     .expect("failed to initialize inotify channel");
///
/// channel.watches()
///     .add(std::env::temp_dir(), WatchMask::CREATE | WatchMask::DELETE)
///     .expect("failed to add watch");
///
/// let mut poller = Poller::new(channel);
/// let outcome = poller.poll_cycle_default();
/// // Handle the outcome
/// ```
#[derive(Debug)]
pub struct Channel {
    fd: Arc<FdGuard>,
}

impl Channel {
    /// Creates the notification channel
    ///
    /// Initializes an inotify instance by calling `inotify_init1`, passing
    /// both of its flags:
    ///
    /// - `IN_CLOEXEC` prevents leaking the descriptor to processes executed
    ///   by this process.
    /// - `IN_NONBLOCK` makes the descriptor non-blocking; blocking behavior
    ///   is managed by the bounded wait in [`Poller::poll_cycle`], never by
    ///   the read itself.
    ///
    /// Must be called before any cycle can run. A failure here is fatal to
    /// the whole engine; no cycle can proceed without a valid descriptor.
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to `inotify_init1`, without
    /// adding any error conditions of its own.
    ///
    /// [`Poller::poll_cycle`]: crate::Poller::poll_cycle
    pub fn init() -> io::Result<Channel> {
        let fd = unsafe { ffi::inotify_init1(ffi::IN_CLOEXEC | ffi::IN_NONBLOCK) };

        match fd {
            -1 => Err(io::Error::last_os_error()),
            _ => {
                debug!(fd, "initialized inotify instance");
                Ok(Channel {
                    fd: Arc::new(FdGuard::new(fd)),
                })
            }
        }
    }

    /// Returns the interface for adding and removing watches
    pub fn watches(&self) -> Watches {
        Watches::new(self.fd.clone())
    }

    /// Returns the error code of the most recent failing system operation
    ///
    /// An errno-style accessor for diagnostic use. Prefer matching on the
    /// errors returned by the individual operations; this exists for
    /// callers that log or report raw codes.
    pub fn last_error_code() -> i32 {
        io::Error::last_os_error().raw_os_error().unwrap_or(0)
    }

    /// Closes the notification channel
    ///
    /// Closes the inotify descriptor. Usually unnecessary, as the
    /// descriptor is closed automatically when the `Channel` is dropped.
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to `close`, without adding
    /// any error conditions of its own.
    pub fn close(self) -> io::Result<()> {
        self.fd.should_not_close();
        match unsafe { ffi::close(self.fd.fd) } {
            0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl EventSource for Channel {
    /// Blocks until the descriptor is readable or the timeout elapses
    ///
    /// Implemented with `poll(2)` on the inotify descriptor. A readiness
    /// report without `POLLIN` (such as a bare `POLLERR`) is classified as
    /// a failure with an explicit "unclassified readiness" error rather
    /// than being silently dropped.
    fn wait_ready(&self, timeout: Duration) -> WaitStatus {
        let mut pollfd = libc::pollfd {
            fd: self.fd.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;

        let result = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };

        match result {
            0 => WaitStatus::TimedOut,
            -1 => {
                let error = io::Error::last_os_error();
                if error.kind() == io::ErrorKind::Interrupted {
                    WaitStatus::Interrupted
                } else {
                    WaitStatus::Failed(error)
                }
            }
            _ if pollfd.revents & libc::POLLIN != 0 => WaitStatus::Ready,
            _ => WaitStatus::Failed(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "unclassified readiness state (revents {:#x})",
                    pollfd.revents
                ),
            )),
        }
    }

    fn read_available(&self, buffer: &mut [u8]) -> io::Result<usize> {
        match read_into_buffer(self.fd.fd, buffer) {
            n if n >= 0 => Ok(n as usize),
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl AsRawFd for Channel {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.fd
    }
}
