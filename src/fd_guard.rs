use std::{
    ops::Deref,
    os::unix::io::RawFd,
    sync::atomic::{
        AtomicBool,
        Ordering,
    },
};

use inotify_sys as ffi;

/// Owner of the inotify file descriptor
///
/// Closes the descriptor exactly once, either when the guard is dropped or
/// through an explicit [`Channel::close`]. Shared via `Arc`, so [`Watches`]
/// can refer to the descriptor without controlling its lifetime.
///
/// [`Channel::close`]: crate::Channel::close
/// [`Watches`]: crate::Watches
#[derive(Debug)]
pub(crate) struct FdGuard {
    pub(crate) fd: RawFd,
    close_on_drop: AtomicBool,
}

impl FdGuard {
    pub(crate) fn new(fd: RawFd) -> Self {
        FdGuard {
            fd,
            close_on_drop: AtomicBool::new(true),
        }
    }

    /// Indicate that the descriptor has been closed elsewhere and must not
    /// be closed again on drop.
    pub(crate) fn should_not_close(&self) {
        self.close_on_drop.store(false, Ordering::Release);
    }
}

impl Deref for FdGuard {
    type Target = RawFd;

    fn deref(&self) -> &RawFd {
        &self.fd
    }
}

impl Drop for FdGuard {
    fn drop(&mut self) {
        if self.close_on_drop.load(Ordering::Acquire) {
            unsafe {
                ffi::close(self.fd);
            }
        }
    }
}

impl PartialEq for FdGuard {
    fn eq(&self, other: &FdGuard) -> bool {
        self.fd == other.fd
    }
}
