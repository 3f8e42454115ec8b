use std::{
    ffi::c_int,
    io,
    os::fd::{AsRawFd, RawFd},
};

/// Uses `poll(2)` to determine whether reading from `fd` is possible without
/// blocking.
pub fn is_readable(fd: RawFd) -> io::Result<bool> {
    let mut poll = libc::pollfd {
        fd: fd.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };
    let ret = unsafe { libc::poll(&mut poll, 1, 0) };
    if ret == -1 {
        return Err(io::Error::last_os_error());
    }

    Ok(poll.revents & libc::POLLIN != 0)
}

/// Blocks the calling thread until [`is_readable`] would return `true`.
pub fn block_until_readable(fd: RawFd) -> io::Result<()> {
    loop {
        let mut poll = libc::pollfd {
            fd: fd.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ret = unsafe { libc::poll(&mut poll, 1, -1) };
        if ret == -1 {
            return Err(io::Error::last_os_error());
        }

        if poll.revents & libc::POLLIN != 0 {
            return Ok(());
        }
    }
}

/// Translates an [`io::ErrorKind`] back to the `errno` value it decodes.
pub fn errorkind2libc(kind: io::ErrorKind) -> Option<c_int> {
    use io::ErrorKind::*;

    // let us copy the existing translation straight from libstd
    macro_rules! do_a_flip {
        ( $( $libc:expr => $kind:pat, )* ) => {
            Some(match kind {
                $( $kind => $libc, )*

                // `Uncategorized`, `Other`, ...
                _ => return None
            })
        };
    }

    // from `decode_error_kind` in std/src/sys/pal/unix/mod.rs
    do_a_flip! {
        libc::E2BIG => ArgumentListTooLong,
        libc::EADDRINUSE => AddrInUse,
        libc::EADDRNOTAVAIL => AddrNotAvailable,
        libc::EBUSY => ResourceBusy,
        libc::ECONNABORTED => ConnectionAborted,
        libc::ECONNREFUSED => ConnectionRefused,
        libc::ECONNRESET => ConnectionReset,
        libc::EDEADLK => Deadlock,
        libc::EDQUOT => QuotaExceeded,
        libc::EEXIST => AlreadyExists,
        libc::EFBIG => FileTooLarge,
        libc::EHOSTUNREACH => HostUnreachable,
        libc::EINTR => Interrupted,
        libc::EINVAL => InvalidInput,
        libc::EISDIR => IsADirectory,
        libc::ENOENT => NotFound,
        libc::ENOMEM => OutOfMemory,
        libc::ENOSPC => StorageFull,
        libc::ENOSYS => Unsupported,
        libc::EMLINK => TooManyLinks,
        libc::ENETDOWN => NetworkDown,
        libc::ENETUNREACH => NetworkUnreachable,
        libc::ENOTCONN => NotConnected,
        libc::ENOTDIR => NotADirectory,
        libc::ENOTEMPTY => DirectoryNotEmpty,
        libc::EPIPE => BrokenPipe,
        libc::EROFS => ReadOnlyFilesystem,
        libc::ESPIPE => NotSeekable,
        libc::ESTALE => StaleNetworkFileHandle,
        libc::ETIMEDOUT => TimedOut,
        libc::ETXTBSY => ExecutableFileBusy,
        libc::EXDEV => CrossesDevices,
        // unstable ones are omitted

        // special cases

        // Map `PermissionDenied` to `EACCES`, not `EPERM`.
        libc::EACCES => PermissionDenied,
        // Canonicalize to EWOULDBLOCK, not EAGAIN.
        libc::EWOULDBLOCK => WouldBlock,
    }
}

/// Runs a closure when the returned guard is dropped.
pub fn on_drop<F: FnMut()>(f: F) -> impl Drop {
    struct OnDrop<F: FnMut()>(F);
    impl<F: FnMut()> Drop for OnDrop<F> {
        fn drop(&mut self) {
            self.0();
        }
    }
    OnDrop(f)
}
