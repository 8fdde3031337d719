use std::ffi::OsString;

use inotify_sys as ffi;

use crate::watches::WatchDescriptor;

/// One decoded change notification
///
/// Describes a change to the file system that the caller previously
/// registered interest in. To watch for events, call [`Watches::add`]. To
/// retrieve events, drive [`Poller::poll_cycle`].
///
/// Events are fully owned: they hold no reference to the raw buffer they
/// were decoded from and live until the caller discards them.
///
/// [`Watches::add`]: crate::Watches::add
/// [`Poller::poll_cycle`]: crate::Poller::poll_cycle
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    /// Identifies the watch this event originates from
    ///
    /// Equal to the [`WatchDescriptor`] that [`Watches::add`] returned when
    /// interest for this event was registered. Not unique across the event
    /// stream; many events may share one descriptor.
    ///
    /// [`Watches::add`]: crate::Watches::add
    pub wd: WatchDescriptor,

    /// Indicates what kind of event this is
    ///
    /// Multiple flags may be set simultaneously, for example
    /// [`EventMask::CREATE`] together with [`EventMask::ISDIR`].
    pub mask: EventMask,

    /// Connects related events to each other
    ///
    /// When a file is renamed, this results in two events:
    /// [`EventMask::MOVED_FROM`] and [`EventMask::MOVED_TO`]. The `cookie`
    /// field is the same for both of them, thereby making it possible to
    /// connect the event pair. Zero when unused.
    pub cookie: u32,

    /// The name of the file the event concerns
    ///
    /// Set only if the subject of the event is a file or directory inside a
    /// watched directory. `None` if the event concerns the watched object
    /// itself. Trailing NUL padding from the raw record is stripped, so the
    /// stored name is never longer than [`raw_len`](Self::raw_len).
    pub name: Option<OsString>,

    /// Declared byte length of the raw record's name field
    ///
    /// Includes any trailing NUL padding. Only meaningful for locating the
    /// record boundary in the raw buffer; the semantic name is
    /// [`name`](Self::name).
    pub raw_len: u32,
}

bitflags! {
    /// Indicates the type of an event
    ///
    /// Retrieved from an [`Event`] via its `mask` field. Compare against the
    /// associated constants using [`EventMask::contains`].
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
    pub struct EventMask: u32 {
        /// File was accessed.
        const ACCESS = ffi::IN_ACCESS;

        /// Metadata (permissions, timestamps, ...) changed.
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

        /// Watch was removed, either explicitly or automatically by the
        /// kernel (because the file was deleted or the file system was
        /// unmounted).
        const IGNORED = ffi::IN_IGNORED;

        /// Subject of this event is a directory.
        const ISDIR = ffi::IN_ISDIR;

        /// Event queue overflowed; events have presumably been lost.
        const Q_OVERFLOW = ffi::IN_Q_OVERFLOW;

        /// File system containing the watched object was unmounted.
        const UNMOUNT = ffi::IN_UNMOUNT;
    }
}
