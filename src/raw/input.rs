//! `linux/input.h`, reduced to the surface this crate consumes.

#![allow(non_snake_case)] // ioctl constructors keep their kernel names

use std::ffi::{c_char, c_int, c_uint, c_void};

use libc::timeval;
use linux_ioctl::{_IOC, _IOC_READ, _IOR, _IOW, Ioctl};

#[derive(Clone, Copy)]
#[repr(C)]
pub struct input_event {
    pub time: timeval,
    pub type_: u16,
    pub code: u16,
    pub value: i32,
}

impl PartialEq for input_event {
    fn eq(&self, other: &Self) -> bool {
        self.time.tv_sec == other.time.tv_sec
            && self.time.tv_usec == other.time.tv_usec
            && self.type_ == other.type_
            && self.code == other.code
            && self.value == other.value
    }
}
impl Eq for input_event {}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct input_id {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct input_absinfo {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub flat: i32,
    pub resolution: i32,
}

/// Get driver version.
pub const EVIOCGVERSION: Ioctl<*mut c_int> = _IOR(b'E', 0x01);
/// Get device ID.
pub const EVIOCGID: Ioctl<*mut input_id> = _IOR(b'E', 0x02);
/// Get repeat settings.
pub const EVIOCGREP: Ioctl<*mut [c_uint; 2]> = _IOR(b'E', 0x03);

/// Get device name.
pub const fn EVIOCGNAME(len: usize) -> Ioctl<*mut c_char> {
    _IOC(_IOC_READ, b'E', 0x06, len)
}
/// Get physical location.
pub const fn EVIOCGPHYS(len: usize) -> Ioctl<*mut c_char> {
    _IOC(_IOC_READ, b'E', 0x07, len)
}
/// Get unique identifier.
pub const fn EVIOCGUNIQ(len: usize) -> Ioctl<*mut c_char> {
    _IOC(_IOC_READ, b'E', 0x08, len)
}
/// Get device properties.
pub const fn EVIOCGPROP(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x09, len)
}

// NB: declared as `_IOC_READ`, but the caller writes the leading `code` field.
pub const fn EVIOCGMTSLOTS(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x0a, len)
}

/// Get global key state.
pub const fn EVIOCGKEY(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x18, len)
}
/// Get all LEDs.
pub const fn EVIOCGLED(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x19, len)
}
/// Get all sounds state.
pub const fn EVIOCGSND(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x1a, len)
}
/// Get all switch states.
pub const fn EVIOCGSW(len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x1b, len)
}

/// Get the code bits of one event type (`ev == 0` gets the type bits).
pub const fn EVIOCGBIT(ev: u8, len: usize) -> Ioctl<*mut c_void> {
    _IOC(_IOC_READ, b'E', 0x20 + ev, len)
}
/// Get the `input_absinfo` of one absolute axis.
pub const fn EVIOCGABS(abs: u8) -> Ioctl<*mut input_absinfo> {
    _IOR(b'E', 0x40 + abs)
}
/// Set the `input_absinfo` of one absolute axis.
pub const fn EVIOCSABS(abs: u8) -> Ioctl<*const input_absinfo> {
    _IOW(b'E', 0xc0 + abs)
}

/// Grab/Release device.
pub const EVIOCGRAB: Ioctl<c_int> = _IOW(b'E', 0x90).with_direct_arg();

/// Select the clock event timestamps are taken from.
// Somehow *this* one takes the `int` argument indirectly...
pub const EVIOCSCLOCKID: Ioctl<*const c_int> = _IOW(b'E', 0xa0);
