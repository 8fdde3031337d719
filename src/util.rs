use std::os::unix::io::RawFd;

use inotify_sys as ffi;
use libc::{
    c_void,
    size_t,
};

/// Performs a single read from the descriptor into the buffer.
///
/// Returns the raw return value of `read(2)`; the caller is responsible for
/// translating `-1` into an error.
pub(crate) fn read_into_buffer(fd: RawFd, buffer: &mut [u8]) -> isize {
    unsafe { ffi::read(fd, buffer.as_mut_ptr() as *mut c_void, buffer.len() as size_t) }
}
