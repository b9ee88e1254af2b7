use bitflags::bitflags;
use inwatch_core::EventMask;

bitflags! {
    /// Options for [`Channel::open`](crate::Channel::open).
    ///
    /// Bits not named here can still be passed with `from_bits_retain`; the
    /// kernel decides whether they are valid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InitFlags: libc::c_int {
        /// Reads return `WouldBlock` instead of waiting for events.
        const NONBLOCKING   = libc::IN_NONBLOCK;
        /// The descriptor is closed across `execve`.
        const CLOSE_ON_EXEC = libc::IN_CLOEXEC;
    }
}

bitflags! {
    /// What a watch subscribes to, and how it is registered.
    ///
    /// Option bits follow `<sys/inotify.h>`; like the event bits they do not
    /// vary between architectures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WatchMask: u32 {
        const ACCESS        = EventMask::ACCESS.bits();
        const MODIFY        = EventMask::MODIFY.bits();
        const ATTRIB        = EventMask::ATTRIB.bits();
        const CLOSE_WRITE   = EventMask::CLOSE_WRITE.bits();
        const CLOSE_NOWRITE = EventMask::CLOSE_NOWRITE.bits();
        const OPEN          = EventMask::OPEN.bits();
        const MOVED_FROM    = EventMask::MOVED_FROM.bits();
        const MOVED_TO      = EventMask::MOVED_TO.bits();
        const CREATE        = EventMask::CREATE.bits();
        const DELETE        = EventMask::DELETE.bits();
        const DELETE_SELF   = EventMask::DELETE_SELF.bits();
        const MOVE_SELF     = EventMask::MOVE_SELF.bits();

        const CLOSE         = EventMask::CLOSE.bits();
        const MOVE          = EventMask::MOVE.bits();
        const ALL_EVENTS    = EventMask::ALL_EVENTS.bits();

        /// Only watch the path if it is a directory.
        const ONLYDIR       = 0x0100_0000;
        /// Do not dereference the path if it is a symbolic link.
        const DONT_FOLLOW   = 0x0200_0000;
        /// Stop reporting children once they are unlinked from the directory.
        const EXCL_UNLINK   = 0x0400_0000;
        /// Merge into an existing watch on the same inode instead of replacing it.
        const MASK_ADD      = 0x2000_0000;
        /// Report one event, then drop the watch.
        const ONESHOT       = 0x8000_0000;
    }
}

impl From<EventMask> for WatchMask {
    /// Keeps only the subscribable event categories.
    fn from(mask: EventMask) -> Self {
        WatchMask::from_bits_truncate(mask.bits() & EventMask::ALL_EVENTS.bits())
    }
}
