use inwatch_core::Event;

/// Identity of one [`Channel`](crate::Channel) instance, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub(crate) u64);

/// Handle to one registered watch.
///
/// Only meaningful to the channel that issued it. Holding a `Watch` does not
/// keep that channel open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Watch {
    pub(crate) descriptor: i32,
    pub(crate) channel:    ChannelId,
}

impl Watch {
    pub fn descriptor_id(&self) -> i32 {
        self.descriptor
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel
    }

    /// Whether `event` was reported for this watch.
    pub fn matches(&self, event: &Event) -> bool {
        event.watch_ref() == self.descriptor
    }
}
