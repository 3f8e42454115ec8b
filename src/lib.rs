//! A queryable, mutable shadow of Linux `evdev` devices.
//!
//! The crate wraps a caller-owned `/dev/input/event*` descriptor in a
//! [`Device`] model: identity, capabilities, per-axis metadata, multitouch
//! slot state, and the current value of every stateful event code, all
//! queryable without system calls. [`Device::next_event`] streams events
//! while keeping that shadow in step with the kernel — including automatic
//! recovery after the kernel drops events (`SYN_DROPPED`), where the delta
//! between the stale shadow and the fresh kernel state is replayed as a
//! synthesized event sequence.
//!
//! The file descriptor lifecycle belongs to the caller: the crate never
//! opens, closes, or polls descriptors on its own.

#![warn(missing_debug_implementations)]

#[macro_use]
mod macros;

mod abs_info;
pub mod bits;
mod device;
mod error;
pub mod event;
mod input_id;
mod key_repeat;
pub mod logging;
pub mod names;
mod raw;
mod slot;
mod sync;
#[cfg(test)]
mod test;
mod util;
mod version;

pub use abs_info::AbsInfo;
pub use device::{
    ClockId, Device, EnablePayload, GrabMode, LedValue, ReadFlag, ReadStatus,
};
pub use error::{Error, Result};
pub use event::{EventCode, InputEvent, UnknownName};
pub use input_id::{Bus, InputId};
pub use key_repeat::KeyRepeat;
pub use logging::{LogPriority, LogSink, log_priority, set_log_priority, set_log_sink};
pub use slot::{SLOT_SYNC_CAP, Slot};
pub use version::Version;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_sync() {
        fn assert<T: Send + Sync>() {}

        assert::<Device>();
        assert::<Error>();
        assert::<InputEvent>();
    }
}
