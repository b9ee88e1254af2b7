// inwatch-channel: owned inotify endpoint, watch registration and raw reads.
// Linux only; on other targets the crate is empty.

#[cfg(target_os = "linux")]
mod channel;
#[cfg(target_os = "linux")]
mod flags;
#[cfg(target_os = "linux")]
mod watch;

#[cfg(target_os = "linux")]
pub use channel::{Channel, DEFAULT_READ_BUFFER, MIN_READ_BUFFER};
#[cfg(target_os = "linux")]
pub use flags::{InitFlags, WatchMask};
#[cfg(target_os = "linux")]
pub use watch::{ChannelId, Watch};

pub use inwatch_core::{
    ErrorKind,
    Event,
    EventDecoder,
    EventMask,
    InwatchError,
    InwatchResult,
    decode,
    query_mask,
};
