use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

use log::trace;

use crate::error::{Error, Result};
use crate::mask::EventMask;

/// Size of the fixed record header: watch id, mask, cookie, name length.
pub const HEADER_LEN: usize = 16;

/// Longest path component the kernel reports (`NAME_MAX`).
pub const NAME_MAX: usize = 255;

/// Smallest read that is guaranteed to hold one complete record.
pub const MAX_RECORD_LEN: usize = HEADER_LEN + NAME_MAX + 1;

/// One decoded notification record.
///
/// Owns its name; nothing here borrows from the buffer it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Event {
    watch_ref: i32,
    mask:      EventMask,
    cookie:    u32,
    len:       u32,
    name:      Option<OsString>,
}

impl Event {
    /// Descriptor id of the watch this event belongs to (-1 on queue overflow).
    pub fn watch_ref(&self) -> i32 {
        self.watch_ref
    }

    pub fn mask(&self) -> EventMask {
        self.mask
    }

    /// Rename correlation id, shared by a `MOVED_FROM`/`MOVED_TO` pair; 0 otherwise.
    pub fn cookie(&self) -> u32 {
        self.cookie
    }

    /// Declared name length, padding included.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Entry name within a watched directory, with padding stripped.
    pub fn name(&self) -> Option<&OsStr> {
        self.name.as_deref()
    }

    /// Whether this event's mask shares any bit with `test_mask`.
    pub fn masks(&self, test_mask: EventMask) -> bool {
        query_mask(self, test_mask)
    }
}

/// Pure bitwise test of `event.mask` against `test_mask`.
pub fn query_mask(event: &Event, test_mask: EventMask) -> bool {
    event.mask.matches(test_mask)
}

/// Decodes every record of one read, all or nothing.
pub fn decode(buffer: &[u8]) -> Result<Vec<Event>> {
    EventDecoder::new(buffer)?.collect()
}

/// Walks the records of a single read buffer in order.
///
/// Yields `Err` once and then stops if a record runs past the end of the
/// buffer.
#[derive(Debug)]
pub struct EventDecoder<'a> {
    buffer: &'a [u8],
    pos:    usize,
    failed: bool,
}

impl<'a> EventDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Result<Self> {
        if buffer.len() < HEADER_LEN {
            return Err(Error::malformed(format!(
                "buffer of {} bytes holds no complete record header ({HEADER_LEN} bytes)",
                buffer.len()
            )));
        }

        Ok(Self {
            buffer,
            pos: 0,
            failed: false,
        })
    }

    fn decode_next(&mut self) -> Result<Event> {
        let rest = &self.buffer[self.pos..];
        if rest.len() < HEADER_LEN {
            return Err(Error::malformed(format!(
                "trailing {} bytes at offset {} are shorter than a record header",
                rest.len(),
                self.pos
            )));
        }

        let watch_ref = i32::from_ne_bytes(field(rest, 0));
        let mask = u32::from_ne_bytes(field(rest, 4));
        let cookie = u32::from_ne_bytes(field(rest, 8));
        let len = u32::from_ne_bytes(field(rest, 12));

        let name_len = len as usize;
        let Some(raw_name) = rest[HEADER_LEN..].get(..name_len) else {
            return Err(Error::malformed(format!(
                "record at offset {} declares a {name_len}-byte name but only {} bytes follow",
                self.pos,
                rest.len() - HEADER_LEN
            )));
        };

        // Names are NUL-terminated and padded with NULs up to the record alignment.
        let name = (name_len > 0).then(|| {
            let end = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
            OsStr::from_bytes(&raw_name[..end]).to_os_string()
        });

        trace!(
            "decoded record at offset {}: wd={watch_ref} mask={mask:#x} cookie={cookie} len={len}",
            self.pos
        );
        self.pos += HEADER_LEN + name_len;

        Ok(Event {
            watch_ref,
            mask: EventMask::from_bits_retain(mask),
            cookie,
            len,
            name,
        })
    }
}

impl Iterator for EventDecoder<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.buffer.len() {
            return None;
        }

        let event = self.decode_next();
        self.failed = event.is_err();
        Some(event)
    }
}

fn field(record: &[u8], offset: usize) -> [u8; 4] {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&record[offset..offset + 4]);
    bytes
}
