use std::{
    ffi::CString,
    io,
    os::raw::c_int,
    os::unix::ffi::OsStrExt,
    path::Path,
    sync::Arc,
};

use inotify_sys as ffi;
use tracing::debug;

use crate::fd_guard::FdGuard;

bitflags! {
    /// Describes a file system watch
    ///
    /// Passed to [`Watches::add`], to describe what file system events to
    /// watch for and how to do that. Multiple flags can be combined with
    /// `|`.
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
    pub struct WatchMask: u32 {
        /// File was accessed.
        const ACCESS = ffi::IN_ACCESS;

        /// Metadata changed.
        const ATTRIB = ffi::IN_ATTRIB;

        /// File opened for writing was closed.
        const CLOSE_WRITE = ffi::IN_CLOSE_WRITE;

        /// File or directory not opened for writing was closed.
        const CLOSE_NOWRITE = ffi::IN_CLOSE_NOWRITE;

        /// File/directory created in watched directory.
        const CREATE = ffi::IN_CREATE;

        /// File/directory deleted from watched directory.
        const DELETE = ffi::IN_DELETE;

        /// Watched file/directory was itself deleted.
        const DELETE_SELF = ffi::IN_DELETE_SELF;

        /// File was modified.
        const MODIFY = ffi::IN_MODIFY;

        /// Watched file/directory was itself moved.
        const MOVE_SELF = ffi::IN_MOVE_SELF;

        /// Generated for the directory containing the old filename when a
        /// file is renamed.
        const MOVED_FROM = ffi::IN_MOVED_FROM;

        /// Generated for the directory containing the new filename when a
        /// file is renamed.
        const MOVED_TO = ffi::IN_MOVED_TO;

        /// File or directory was opened.
        const OPEN = ffi::IN_OPEN;

        /// Watch for all events.
        const ALL_EVENTS = ffi::IN_ALL_EVENTS;

        /// Watch for both `MOVED_FROM` and `MOVED_TO`.
        const MOVE = ffi::IN_MOVE;

        /// Watch for both `CLOSE_WRITE` and `CLOSE_NOWRITE`.
        const CLOSE = ffi::IN_CLOSE;

        /// Don't dereference the path if it is a symbolic link.
        const DONT_FOLLOW = ffi::IN_DONT_FOLLOW;

        /// Don't watch events for children that have been unlinked from the
        /// watched directory.
        const EXCL_UNLINK = ffi::IN_EXCL_UNLINK;

        /// If a watch instance already exists for the inode corresponding
        /// to the given path, amend the existing watch mask instead of
        /// replacing it.
        const MASK_ADD = ffi::IN_MASK_ADD;

        /// Only monitor for one event, then remove the watch.
        const ONESHOT = ffi::IN_ONESHOT;

        /// Only watch path, if it is a directory.
        const ONLYDIR = ffi::IN_ONLYDIR;
    }
}

/// Interface for adding and removing watches
///
/// Obtained from [`Channel::watches`]. Both operations are stateless
/// pass-throughs to the kernel; no validation is performed beyond what the
/// kernel itself does.
///
/// [`Channel::watches`]: crate::Channel::watches
#[derive(Clone, Debug)]
pub struct Watches {
    fd: Arc<FdGuard>,
}

impl Watches {
    pub(crate) fn new(fd: Arc<FdGuard>) -> Self {
        Watches { fd }
    }

    /// Adds or updates a watch for the given path
    ///
    /// Adds a new watch or updates an existing one for the file referred to
    /// by `path`. Returns a watch descriptor that can be used to refer to
    /// this watch later.
    ///
    /// The `mask` argument defines what kind of changes the file should be
    /// watched for, and how to do that. See the documentation of
    /// [`WatchMask`] for details.
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to `inotify_add_watch`
    /// (translated into an [`io::Error`]), without adding any error
    /// conditions of its own.
    pub fn add<P>(&mut self, path: P, mask: WatchMask) -> io::Result<WatchDescriptor>
    where
        P: AsRef<Path>,
    {
        let path = CString::new(path.as_ref().as_os_str().as_bytes())?;

        let wd = unsafe { ffi::inotify_add_watch(**self.fd, path.as_ptr() as *const _, mask.bits()) };

        match wd {
            -1 => Err(io::Error::last_os_error()),
            _ => {
                debug!(wd, path = %path.to_string_lossy(), "added watch");
                Ok(WatchDescriptor(wd))
            }
        }
    }

    /// Stops watching a file
    ///
    /// Removes the watch represented by the provided [`WatchDescriptor`] by
    /// calling `inotify_rm_watch`. Descriptors can be obtained via
    /// [`Watches::add`], or from the `wd` field of [`Event`].
    ///
    /// # Errors
    ///
    /// Directly returns the error from the call to `inotify_rm_watch`,
    /// without adding any error conditions of its own.
    ///
    /// [`Event`]: crate::Event
    pub fn remove(&mut self, wd: WatchDescriptor) -> io::Result<()> {
        let result = unsafe { ffi::inotify_rm_watch(**self.fd, wd.0) };
        match result {
            0 => Ok(()),
            -1 => Err(io::Error::last_os_error()),
            _ => panic!("unexpected return code from inotify_rm_watch ({})", result),
        }
    }
}

/// Represents a watch on an inode
///
/// Can be obtained from [`Watches::add`] or from an [`Event`]. A watch
/// descriptor can be used to stop watching an inode by passing it to
/// [`Watches::remove`].
///
/// [`Event`]: crate::Event
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct WatchDescriptor(pub(crate) c_int);

impl WatchDescriptor {
    /// The kernel's integer id for this watch
    ///
    /// Can be used to distinguish events for files with the same name.
    pub fn id(self) -> c_int {
        self.0
    }
}
