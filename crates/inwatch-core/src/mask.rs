//! Event-type bit sets.
//!
//! The bit values are the kernel's `IN_*` constants from `<sys/inotify.h>`.
//! They are the same on every architecture, so they are spelled out here and
//! the decoder stays free of platform headers.

use bitflags::bitflags;

bitflags! {
    /// Bits describing what happened in a decoded [`Event`](crate::Event).
    ///
    /// Holds the event categories a watch can subscribe to, plus the
    /// administrative bits only the kernel sets (`IGNORED`, `ISDIR`,
    /// `Q_OVERFLOW`, `UNMOUNT`). Bits this type does not name are retained.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EventMask: u32 {
        /// File was accessed.
        const ACCESS        = 0x0000_0001;
        /// File was modified.
        const MODIFY        = 0x0000_0002;
        /// Metadata changed.
        const ATTRIB        = 0x0000_0004;
        /// File opened for writing was closed.
        const CLOSE_WRITE   = 0x0000_0008;
        /// File or directory not opened for writing was closed.
        const CLOSE_NOWRITE = 0x0000_0010;
        /// File or directory was opened.
        const OPEN          = 0x0000_0020;
        /// Entry moved out of a watched directory.
        const MOVED_FROM    = 0x0000_0040;
        /// Entry moved into a watched directory.
        const MOVED_TO      = 0x0000_0080;
        /// Entry created in a watched directory.
        const CREATE        = 0x0000_0100;
        /// Entry deleted from a watched directory.
        const DELETE        = 0x0000_0200;
        /// Watched file or directory was itself deleted.
        const DELETE_SELF   = 0x0000_0400;
        /// Watched file or directory was itself moved.
        const MOVE_SELF     = 0x0000_0800;

        /// Filesystem holding the watched object was unmounted.
        const UNMOUNT       = 0x0000_2000;
        /// Event queue overflowed; the record carries watch id -1.
        const Q_OVERFLOW    = 0x0000_4000;
        /// Watch was removed, explicitly or by the kernel.
        const IGNORED       = 0x0000_8000;
        /// Subject of the event is a directory.
        const ISDIR         = 0x4000_0000;

        const CLOSE         = Self::CLOSE_WRITE.bits() | Self::CLOSE_NOWRITE.bits();
        const MOVE          = Self::MOVED_FROM.bits() | Self::MOVED_TO.bits();
        const ALL_EVENTS    = 0x0000_0fff;

        const _ = !0;
    }
}

impl EventMask {
    /// Pure bitwise test: does this mask share any bit with `test`.
    pub fn matches(&self, test: EventMask) -> bool {
        self.intersects(test)
    }

    /// Names of the single-bit flags set in this mask, in bit order.
    ///
    /// Aggregates (`CLOSE`, `MOVE`, `ALL_EVENTS`) are never reported.
    pub fn flag_names(&self) -> Vec<&'static str> {
        self.iter_names()
            .filter(|(_, flag)| flag.bits().is_power_of_two())
            .map(|(name, _)| name)
            .collect()
    }
}
