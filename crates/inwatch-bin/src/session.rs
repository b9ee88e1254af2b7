use std::collections::HashMap;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inwatch_channel::{Channel, ErrorKind, EventMask, InitFlags, WatchMask};
use log::{debug, info, warn};

use crate::output::EventRecord;

/// How long a non-blocking session waits in `poll(2)` before reading again.
const POLL_TIMEOUT_MS: libc::c_int = 500;

/// Counters shown by `--debug`.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub reads:       usize,
    pub events:      usize,
    pub would_block: usize,
    pub interrupted: usize,
}

/// One channel plus the paths registered on it, keyed by descriptor id.
pub struct Session {
    channel:     Channel,
    paths:       HashMap<i32, PathBuf>,
    buffer_size: usize,
    pub stats:   SessionStats,
}

impl Session {
    pub fn open(flags: InitFlags, buffer_size: usize) -> Result<Self> {
        let channel = Channel::open(flags).context("Failed to open inotify channel")?;
        Ok(Self {
            channel,
            paths: HashMap::new(),
            buffer_size,
            stats: SessionStats::default(),
        })
    }

    pub fn watch(&mut self, path: &Path, mask: WatchMask) -> Result<()> {
        let watch = self
            .channel
            .add_watch(path, mask)
            .with_context(|| format!("Failed to watch {}", path.display()))?;

        info!("watching {} (wd {})", path.display(), watch.descriptor_id());
        self.paths.insert(watch.descriptor_id(), path.to_path_buf());
        Ok(())
    }

    pub fn watched(&self) -> usize {
        self.paths.len()
    }

    /// Reads until `limit` events were emitted or no watch is left.
    ///
    /// `WouldBlock` and `Interrupted` are handled here, every other failure
    /// ends the session.
    pub fn run<F>(&mut self, limit: Option<usize>, mut emit: F) -> Result<usize>
    where
        F: FnMut(&EventRecord) -> Result<()>,
    {
        let reached = |seen: usize| limit.is_some_and(|limit| seen >= limit);

        while !self.paths.is_empty() && !reached(self.stats.events) {
            let events = match self.channel.read_decoded(self.buffer_size) {
                Ok(events) => events,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    self.stats.would_block += 1;
                    self.wait_readable()?;
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {
                    self.stats.interrupted += 1;
                    debug!("read interrupted, retrying");
                    continue;
                }
                Err(err) => return Err(err).context("Failed to read events"),
            };
            self.stats.reads += 1;

            for event in &events {
                if event.masks(EventMask::Q_OVERFLOW) {
                    warn!("event queue overflowed, some events were lost");
                }

                let record = EventRecord::new(event, self.paths.get(&event.watch_ref()).map(PathBuf::as_path));

                if event.masks(EventMask::IGNORED) {
                    if let Some(path) = self.paths.remove(&event.watch_ref()) {
                        info!("watch on {} was removed", path.display());
                    }
                }

                emit(&record)?;
                self.stats.events += 1;
                if reached(self.stats.events) {
                    break;
                }
            }
        }

        Ok(self.stats.events)
    }

    /// Blocks in `poll(2)` until the channel is readable or the timeout passes.
    fn wait_readable(&self) -> Result<()> {
        let mut pollfd = libc::pollfd {
            fd:      self.channel.as_raw_fd(),
            events:  libc::POLLIN,
            revents: 0,
        };

        let ready = unsafe { libc::poll(&mut pollfd, 1, POLL_TIMEOUT_MS) };
        if ready == -1 {
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                return Err(err).context("Failed to poll inotify channel");
            }
        }
        Ok(())
    }
}
