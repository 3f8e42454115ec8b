//! The crate's error type.

use std::io;

use crate::util::errorkind2libc;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`Device`][crate::Device] operations.
///
/// Note that a `SYN_DROPPED` event is *not* an error: event loss is reported
/// through [`ReadStatus::Sync`][crate::ReadStatus::Sync] and recovered from
/// automatically.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The operation requires an attached file descriptor.
    #[error("no file descriptor attached to the device")]
    NotAttached,

    /// [`Device::attach`][crate::Device::attach] was called on a device that
    /// already has a descriptor.
    #[error("a file descriptor is already attached to the device")]
    AlreadyAttached,

    /// A type, code, or slot argument was out of range, disabled, or of the
    /// wrong kind for the operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The descriptor does not speak the evdev protocol (the version ioctl
    /// failed).
    #[error("not an evdev device")]
    NotEvdev(#[source] io::Error),

    /// Reading would block on a non-blocking descriptor, or a sync queue has
    /// been fully drained.
    #[error("no event available")]
    WouldBlock,

    /// The running kernel does not provide an ioctl this operation requires.
    #[error("operation not supported by the running kernel")]
    NotSupported,

    /// An ioctl or read failed; the underlying error is passed through
    /// verbatim.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the `errno` value corresponding to this error, for callers
    /// that report errors in the host's negative-errno convention.
    pub fn errno(&self) -> i32 {
        match self {
            Error::NotAttached | Error::AlreadyAttached => libc::EBADF,
            Error::InvalidArgument(_) => libc::EINVAL,
            Error::WouldBlock => libc::EAGAIN,
            Error::NotSupported => libc::ENOTTY,
            Error::NotEvdev(e) | Error::Io(e) => e
                .raw_os_error()
                .or_else(|| errorkind2libc(e.kind()))
                .unwrap_or(libc::EIO),
        }
    }

    /// Maps a `WouldBlock` I/O error onto [`Error::WouldBlock`], everything
    /// else onto [`Error::Io`].
    pub(crate) fn from_read(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::WouldBlock {
            Error::WouldBlock
        } else {
            Error::Io(e)
        }
    }
}
