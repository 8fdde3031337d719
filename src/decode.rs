//! Decoding of the packed inotify wire format.
//!
//! The kernel hands over a byte buffer holding a sequence of variable-length
//! records: a fixed header, followed by a name field whose length the header
//! declares. This module turns such a buffer into owned [`Event`] values.
//! It is pure and does no I/O; the buffer is assumed to have been drained
//! from the descriptor already.

use std::{
    ffi::OsStr,
    mem,
    os::unix::ffi::OsStrExt,
};

use inotify_sys as ffi;

use crate::error::DecodeError;
use crate::events::{
    Event,
    EventMask,
};
use crate::watches::WatchDescriptor;

/// Size of the fixed portion of a raw event record, in bytes.
pub const EVENT_HEADER_SIZE: usize = mem::size_of::<ffi::inotify_event>();

/// Hard ceiling on the number of events decoded from one cycle's buffer.
///
/// Bounds allocation against a buffer describing an implausible number of
/// records.
pub const MAX_EVENTS_PER_CYCLE: usize = 1024;

/// Decodes a raw buffer into events, preserving kernel emission order
///
/// Decoding is all-or-nothing: any malformed record discards every event
/// from the buffer, and the error names the offending record. A buffer that
/// cannot hold even one fixed header (including the empty buffer) is a
/// [`DecodeError::ShortBuffer`].
pub fn decode_events(buffer: &[u8]) -> Result<Vec<Event>, DecodeError> {
    let count = count_records(buffer)?;

    let mut events = Vec::with_capacity(count);
    let mut pos = 0;
    while pos < buffer.len() {
        let (step, event) = decode_record(&buffer[pos..], pos)?;
        events.push(event);
        pos += step;
    }

    Ok(events)
}

/// Counting pass over the buffer
///
/// Validates the framing of every record and enforces the event ceiling
/// before anything is allocated for the records' contents.
fn count_records(buffer: &[u8]) -> Result<usize, DecodeError> {
    let mut count = 0;
    let mut pos = 0;

    while pos < buffer.len() {
        let remaining = buffer.len() - pos;
        if remaining < EVENT_HEADER_SIZE {
            return Err(DecodeError::ShortBuffer {
                offset: pos,
                remaining,
            });
        }

        let header = read_header(&buffer[pos..]);
        let declared = header.len as usize;
        if declared > remaining - EVENT_HEADER_SIZE {
            return Err(DecodeError::TruncatedRecord {
                offset: pos,
                declared,
                remaining: remaining - EVENT_HEADER_SIZE,
            });
        }

        count += 1;
        if count > MAX_EVENTS_PER_CYCLE {
            return Err(DecodeError::TooManyEvents);
        }

        pos += EVENT_HEADER_SIZE + declared;
    }

    if count == 0 {
        // Only the empty buffer gets here, and an empty buffer cannot hold
        // a record header.
        return Err(DecodeError::ShortBuffer {
            offset: 0,
            remaining: 0,
        });
    }

    Ok(count)
}

/// Materializes the record at the start of `buffer` into an owned [`Event`]
///
/// `offset` is the record's position in the cycle's full buffer, used only
/// for error reporting. Returns the number of bytes the record occupies and
/// the event.
fn decode_record(buffer: &[u8], offset: usize) -> Result<(usize, Event), DecodeError> {
    if buffer.len() < EVENT_HEADER_SIZE {
        return Err(DecodeError::ShortBuffer {
            offset,
            remaining: buffer.len(),
        });
    }

    let header = read_header(buffer);
    let declared = header.len as usize;
    if declared > buffer.len() - EVENT_HEADER_SIZE {
        return Err(DecodeError::TruncatedRecord {
            offset,
            declared,
            remaining: buffer.len() - EVENT_HEADER_SIZE,
        });
    }

    let step = EVENT_HEADER_SIZE + declared;

    // The name field is padded with '\0' up to an alignment boundary; the
    // name ends at the first of those bytes. `splitn` always yields at
    // least one piece, so the `unwrap` cannot fail.
    let name = &buffer[EVENT_HEADER_SIZE..step];
    let name = name.splitn(2, |b| b == &0u8).next().unwrap();
    let name = if name.is_empty() {
        None
    } else {
        Some(OsStr::from_bytes(name).to_os_string())
    };

    let event = Event {
        wd: WatchDescriptor(header.wd),
        mask: EventMask::from_bits_retain(header.mask),
        cookie: header.cookie,
        name,
        raw_len: header.len,
    };

    Ok((step, event))
}

/// Reads the fixed header at the start of `buffer`.
fn read_header(buffer: &[u8]) -> ffi::inotify_event {
    debug_assert!(buffer.len() >= EVENT_HEADER_SIZE);

    // The byte buffer has alignment 1 while `inotify_event` aligns higher,
    // so the pointer must be read unaligned. Bounds were checked by the
    // caller, making the read itself sound.
    let ptr = buffer.as_ptr() as *const ffi::inotify_event;
    unsafe { ptr.read_unaligned() }
}

#[cfg(test)]
mod tests {
    use std::{
        ffi::OsStr,
        mem,
        slice,
    };

    use inotify_sys as ffi;

    use crate::error::DecodeError;
    use crate::events::EventMask;

    use super::{
        decode_events,
        EVENT_HEADER_SIZE,
        MAX_EVENTS_PER_CYCLE,
    };

    /// Appends a synthetic record to `buffer`. The name field is `name`
    /// followed by `padding` NUL bytes, as the kernel pads names up to an
    /// alignment boundary.
    fn put_record(buffer: &mut Vec<u8>, wd: i32, mask: u32, cookie: u32, name: &[u8], padding: usize) {
        let header = ffi::inotify_event {
            wd,
            mask,
            cookie,
            len: (name.len() + padding) as u32,
        };
        let header_bytes = unsafe {
            slice::from_raw_parts(&header as *const _ as *const u8, mem::size_of_val(&header))
        };

        buffer.extend_from_slice(header_bytes);
        buffer.extend_from_slice(name);
        buffer.extend(std::iter::repeat(0u8).take(padding));
    }

    #[test]
    fn preserves_record_order_and_count() {
        let mut buffer = Vec::new();
        put_record(&mut buffer, 1, ffi::IN_CREATE, 0, b"a", 3);
        put_record(&mut buffer, 2, ffi::IN_MODIFY, 0, b"bb", 2);
        put_record(&mut buffer, 3, ffi::IN_DELETE, 0, b"", 0);

        let events = decode_events(&buffer).expect("failed to decode valid buffer");

        assert_eq!(events.len(), 3);
        assert_eq!(
            events.iter().map(|e| e.wd.id()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn round_trips_all_fields() {
        let mut buffer = Vec::new();
        put_record(
            &mut buffer,
            7,
            ffi::IN_CREATE | ffi::IN_ISDIR,
            42,
            b"file.txt",
            8,
        );

        let events = decode_events(&buffer).expect("failed to decode valid buffer");

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.wd.id(), 7);
        assert_eq!(event.mask, EventMask::CREATE | EventMask::ISDIR);
        assert_eq!(event.cookie, 42);
        assert_eq!(event.name.as_deref(), Some(OsStr::new("file.txt")));
        assert_eq!(event.raw_len, 16);
    }

    #[test]
    fn rejects_buffer_shorter_than_one_header() {
        let buffer = [0u8; 10];

        match decode_events(&buffer) {
            Err(DecodeError::ShortBuffer { offset: 0, remaining: 10 }) => (),
            other => panic!("expected short-buffer error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_buffer() {
        match decode_events(&[]) {
            Err(DecodeError::ShortBuffer { offset: 0, remaining: 0 }) => (),
            other => panic!("expected short-buffer error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_buffer_ending_inside_a_header() {
        let mut buffer = Vec::new();
        put_record(&mut buffer, 1, ffi::IN_CREATE, 0, b"", 0);
        buffer.extend_from_slice(&[0u8; 8]);

        match decode_events(&buffer) {
            Err(DecodeError::ShortBuffer { offset, remaining: 8 }) => {
                assert_eq!(offset, EVENT_HEADER_SIZE);
            }
            other => panic!("expected short-buffer error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_trailing_record_with_overrunning_name() {
        let mut buffer = Vec::new();
        put_record(&mut buffer, 1, ffi::IN_CREATE, 0, b"good", 4);

        // Header declaring 64 name bytes, with none following it.
        let offset = buffer.len();
        let header = ffi::inotify_event {
            wd: 2,
            mask: ffi::IN_MODIFY,
            cookie: 0,
            len: 64,
        };
        let header_bytes = unsafe {
            slice::from_raw_parts(&header as *const _ as *const u8, mem::size_of_val(&header))
        };
        buffer.extend_from_slice(header_bytes);

        match decode_events(&buffer) {
            Err(DecodeError::TruncatedRecord {
                offset: reported,
                declared: 64,
                remaining: 0,
            }) => assert_eq!(reported, offset),
            other => panic!("expected truncated-record error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_more_records_than_the_ceiling() {
        let mut buffer = Vec::new();
        for i in 0..(MAX_EVENTS_PER_CYCLE + 1) {
            put_record(&mut buffer, i as i32, ffi::IN_MODIFY, 0, b"", 0);
        }

        match decode_events(&buffer) {
            Err(DecodeError::TooManyEvents) => (),
            other => panic!("expected overflow error, got {:?}", other),
        }
    }

    #[test]
    fn decodes_exactly_the_ceiling() {
        let mut buffer = Vec::new();
        for i in 0..MAX_EVENTS_PER_CYCLE {
            put_record(&mut buffer, i as i32, ffi::IN_MODIFY, 0, b"", 0);
        }

        let events = decode_events(&buffer).expect("failed to decode valid buffer");
        assert_eq!(events.len(), MAX_EVENTS_PER_CYCLE);
    }

    #[test]
    fn does_not_mistake_next_record_for_name_of_previous_record() {
        let mut buffer = Vec::new();
        // A record without a name, followed by a record whose header starts
        // with a non-zero byte.
        put_record(&mut buffer, 0, 0, 0, b"", 0);
        put_record(&mut buffer, 1, ffi::IN_MODIFY, 0, b"", 0);

        let events = decode_events(&buffer).expect("failed to decode valid buffer");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, None);
    }

    #[test]
    fn strips_trailing_padding_from_names() {
        let mut buffer = Vec::new();
        put_record(&mut buffer, 1, ffi::IN_CREATE, 0, b"x", 15);

        let events = decode_events(&buffer).expect("failed to decode valid buffer");

        let event = &events[0];
        assert_eq!(event.name.as_deref(), Some(OsStr::new("x")));
        assert_eq!(event.raw_len, 16);
        assert!(event.name.as_ref().unwrap().len() <= event.raw_len as usize);
    }
}
