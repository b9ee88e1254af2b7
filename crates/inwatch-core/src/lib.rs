//! Record decoding and error taxonomy for inotify channels.
//!
//! Nothing in this crate performs a syscall. `inwatch-channel` produces the raw
//! bytes, this crate turns them into owned [`Event`] values.

// Do not make this public... We re-export as aliases to crate named err/res
mod error;
mod event;
mod mask;

pub use event::{Event, EventDecoder, HEADER_LEN, MAX_RECORD_LEN, NAME_MAX, decode, query_mask};
pub use mask::EventMask;

// NOTE: Within the crate use Error and Result, only the outbound names are prefixed.
pub use crate::error::{Error as InwatchError, ErrorKind, Result as InwatchResult};
