use std::collections::HashSet;
use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use inwatch_core::{
    ErrorKind, Event, EventMask, InwatchError as Error, InwatchResult as Result, MAX_RECORD_LEN,
    decode,
};
use log::{debug, trace, warn};

use crate::flags::{InitFlags, WatchMask};
use crate::watch::{ChannelId, Watch};

/// Smallest capacity [`Channel::read_events`] will read with.
pub const MIN_READ_BUFFER: usize = MAX_RECORD_LEN;

/// Capacity the command-line watcher reads with unless told otherwise.
pub const DEFAULT_READ_BUFFER: usize = 4096;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Owned inotify instance.
///
/// Every method takes `&mut self`: the kernel gives no ordering guarantee for
/// concurrent calls on one descriptor, so callers that share a channel across
/// threads wrap it in their own lock.
#[derive(Debug)]
pub struct Channel {
    id:      ChannelId,
    flags:   InitFlags,
    fd:      Option<OwnedFd>,
    /// Descriptors issued by this channel and not yet removed through it.
    watches: HashSet<i32>,
}

impl Channel {
    /// Opens one notification endpoint.
    ///
    /// Flags are handed to `inotify_init1` untouched. Nothing is retried.
    pub fn open(flags: InitFlags) -> Result<Self> {
        let fd = unsafe { libc::inotify_init1(flags.bits()) };
        if fd == -1 {
            let err = Error::from(io::Error::last_os_error());
            debug!("inotify_init1({:#x}) failed: {err}", flags.bits());
            return Err(err);
        }

        // SAFETY: inotify_init1 just returned this descriptor and nothing else holds it.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        let id = ChannelId(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed));
        debug!("opened channel {} on fd {} with flags {flags:?}", id.0, fd.as_raw_fd());

        Ok(Self {
            id,
            flags,
            fd: Some(fd),
            watches: HashSet::new(),
        })
    }

    /// Registers interest in `path` for the events in `mask`.
    ///
    /// Registering a path that is already watched returns the same descriptor
    /// id; whether the mask is replaced or merged is up to the kernel and
    /// `WatchMask::MASK_ADD`.
    pub fn add_watch<P: AsRef<Path>>(&mut self, path: P, mask: WatchMask) -> Result<Watch> {
        let fd = self.raw()?;
        let path = path.as_ref();
        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
            Error::new(
                ErrorKind::InvalidArgument,
                format!("path {} contains an interior NUL byte", path.display()),
            )
        })?;

        let wd = unsafe { libc::inotify_add_watch(fd, c_path.as_ptr(), mask.bits()) };
        if wd == -1 {
            let err = Error::from(io::Error::last_os_error());
            debug!("channel {}: add_watch({}) failed: {err}", self.id.0, path.display());
            return Err(err);
        }

        self.watches.insert(wd);
        debug!("channel {}: watching {} as wd {wd} ({mask:?})", self.id.0, path.display());

        Ok(Watch {
            descriptor: wd,
            channel:    self.id,
        })
    }

    /// Removes a watch this channel issued.
    ///
    /// A watch from another channel, or one already removed through this
    /// channel, fails with `InvalidArgument` before reaching the kernel. A watch
    /// the kernel dropped on its own (oneshot, deleted target) fails with the
    /// kernel's `EINVAL`.
    pub fn remove_watch(&mut self, watch: Watch) -> Result<()> {
        let fd = self.raw()?;

        if watch.channel != self.id {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!(
                    "wd {} was issued by channel {}, not channel {}",
                    watch.descriptor, watch.channel.0, self.id.0
                ),
            ));
        }

        if !self.watches.remove(&watch.descriptor) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("wd {} was already removed", watch.descriptor),
            ));
        }

        let res = unsafe { libc::inotify_rm_watch(fd, watch.descriptor) };
        if res == -1 {
            let err = Error::from(io::Error::last_os_error());
            debug!("channel {}: rm_watch({}) failed: {err}", self.id.0, watch.descriptor);
            return Err(err);
        }

        debug!("channel {}: removed wd {}", self.id.0, watch.descriptor);
        Ok(())
    }

    /// Performs one read of up to `buffer_capacity` bytes.
    ///
    /// Capacities below [`MIN_READ_BUFFER`] are raised to it. Blocks unless the
    /// channel was opened with `NONBLOCKING`. The returned bytes always end on
    /// a record boundary.
    pub fn read_events(&mut self, buffer_capacity: usize) -> Result<Vec<u8>> {
        let fd = self.raw()?;
        let capacity = buffer_capacity.max(MIN_READ_BUFFER);
        let mut buffer = vec![0u8; capacity];

        let read = unsafe { libc::read(fd, buffer.as_mut_ptr().cast(), buffer.len()) };
        if read < 0 {
            let err = Error::from(io::Error::last_os_error());
            if err.kind() != ErrorKind::WouldBlock {
                debug!("channel {}: read failed: {err}", self.id.0);
            }
            return Err(err);
        }
        if read == 0 {
            return Err(Error::new(ErrorKind::IoError, "read returned end-of-file"));
        }

        buffer.truncate(read as usize);
        trace!("channel {}: read {read} bytes", self.id.0);
        Ok(buffer)
    }

    /// Reads once and decodes the result.
    ///
    /// Watches the kernel reports as `IGNORED` are dropped from this channel's
    /// bookkeeping, so a later [`Channel::remove_watch`] on them fails early.
    pub fn read_decoded(&mut self, buffer_capacity: usize) -> Result<Vec<Event>> {
        let buffer = self.read_events(buffer_capacity)?;
        let events = decode(&buffer)?;

        for event in events.iter().filter(|event| event.masks(EventMask::IGNORED)) {
            if self.watches.remove(&event.watch_ref()) {
                debug!("channel {}: wd {} dropped by the kernel", self.id.0, event.watch_ref());
            }
        }

        Ok(events)
    }

    /// Releases the endpoint. Later calls fail with `BadDescriptor`.
    ///
    /// Safe to call more than once. A failing `close(2)` is logged and dropped.
    pub fn close(&mut self) {
        let Some(fd) = self.fd.take() else {
            return;
        };

        let raw = fd.into_raw_fd();
        if unsafe { libc::close(raw) } == -1 {
            warn!(
                "channel {}: closing fd {raw} failed: {}",
                self.id.0,
                io::Error::last_os_error()
            );
        }

        self.watches.clear();
        debug!("closed channel {}", self.id.0);
    }

    pub fn is_open(&self) -> bool {
        self.fd.is_some()
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn flags(&self) -> InitFlags {
        self.flags
    }

    /// Number of watches issued and not yet removed or dropped.
    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    fn raw(&self) -> Result<RawFd> {
        match &self.fd {
            Some(fd) => Ok(fd.as_raw_fd()),
            None => Err(Error::from_os_code(libc::EBADF)),
        }
    }
}

impl AsRawFd for Channel {
    /// `-1` once the channel is closed.
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_ref().map_or(-1, |fd| fd.as_raw_fd())
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}
