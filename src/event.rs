//! Input events and the typed wrappers around them.
//!
//! Everything read from a device is an [`InputEvent`], the Rust view of the
//! kernel's `struct input_event`:
//!
//! - **Timestamp** ([`InputEvent::time`]): when the event entered the kernel
//!   buffer. The time base defaults to the real-time clock and can be changed
//!   with [`Device::set_clock_id`].
//! - **Event type** ([`InputEvent::event_type`]): the broad category,
//!   determining which wrapper below applies.
//! - **Event code** ([`InputEvent::raw_code`]): a `u16` naming the key, axis,
//!   switch, or other entity the event is about. [`EventCode`] pairs the type
//!   with a typed code.
//! - **Event value** ([`InputEvent::raw_value`]): an `i32` carrying the new
//!   state, movement delta, or other payload.
//!
//! [`InputEvent::kind`] converts an event into the `match`able [`EventKind`].
//!
//! [`Device::set_clock_id`]: crate::Device::set_clock_id

pub(crate) mod codes;

use std::fmt;
use std::ops::Deref;
use std::time::{Duration, SystemTime};

use crate::raw::input::input_event;

pub use codes::{
    Abs, EventType, Ff, InputProp, Key, Led, Misc, Rel, Repeat, Sound, Switch, Syn, UnknownName,
};

/// An input event received from an *evdev*.
///
/// Use [`InputEvent::kind`] to convert it to a `match`able enum.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct InputEvent(pub(crate) input_event);

impl InputEvent {
    /// Creates an [`InputEvent`] from raw values.
    ///
    /// The timestamp of the event will be set to 0.
    #[inline]
    pub const fn new(ty: EventType, raw_code: u16, raw_value: i32) -> Self {
        Self(input_event {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_: ty.0,
            code: raw_code,
            value: raw_value,
        })
    }

    /// Creates an [`InputEvent`] with all fields zeroed out.
    ///
    /// Useful as filler that will be overwritten with a real event. Note that
    /// a zeroed event reads back as a [`Syn::REPORT`].
    #[inline]
    pub const fn zeroed() -> Self {
        Self(input_event {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_: 0,
            code: 0,
            value: 0,
        })
    }

    /// Changes the timestamp of `self` to the given [`SystemTime`].
    ///
    /// The kernel's `timeval` has microsecond resolution, while [`SystemTime`]
    /// can represent nanoseconds on Unix; the value is truncated to fit.
    pub fn with_time(mut self, time: SystemTime) -> Self {
        let dur = if time >= SystemTime::UNIX_EPOCH {
            time.duration_since(SystemTime::UNIX_EPOCH).unwrap()
        } else {
            SystemTime::UNIX_EPOCH.duration_since(time).unwrap()
        };
        let sign = if time >= SystemTime::UNIX_EPOCH {
            1
        } else {
            -1
        };
        self.0.time.tv_sec = dur.as_secs().try_into().unwrap();
        self.0.time.tv_sec *= sign;
        self.0.time.tv_usec = dur.subsec_micros().try_into().unwrap();
        self
    }

    /// Stamps `self` with a raw `timeval`, typically copied from another
    /// event.
    #[inline]
    pub(crate) fn with_timeval(mut self, time: libc::timeval) -> Self {
        self.0.time = time;
        self
    }

    #[inline]
    pub(crate) fn timeval(&self) -> libc::timeval {
        self.0.time
    }

    /// Returns the timestamp stored in the event.
    ///
    /// The clock used for event timestamps can be changed with
    /// [`Device::set_clock_id`][crate::Device::set_clock_id]; the timestamps
    /// of a monotonic-clock device are *not* meaningful as [`SystemTime`]s.
    pub fn time(&self) -> SystemTime {
        match self.try_time() {
            Some(time) => time,
            None => {
                log::warn!(
                    "`input_event` timestamp out of range of `SystemTime`: tv_sec={} tv_usec={}",
                    self.0.time.tv_sec,
                    self.0.time.tv_usec,
                );
                SystemTime::UNIX_EPOCH
            }
        }
    }
    fn try_time(&self) -> Option<SystemTime> {
        let sec = self.0.time.tv_sec;
        let usec = self.0.time.tv_usec.clamp(0, 999_999);

        let dur = Duration::new(
            sec.unsigned_abs() as u64,
            (usec * 1000) as u32, // 999_999_000 fits in u32
        );

        if sec >= 0 {
            SystemTime::UNIX_EPOCH.checked_add(dur)
        } else {
            SystemTime::UNIX_EPOCH.checked_sub(dur)
        }
    }

    /// Returns the [`EventKind`] this [`InputEvent`] encodes.
    ///
    /// [`EventKind`] is `#[non_exhaustive]`; matching requires a wildcard arm
    /// for events without a dedicated variant.
    #[inline]
    pub fn kind(&self) -> EventKind {
        match self.event_type() {
            EventType::SYN => SynEvent(*self).into(),
            EventType::KEY => KeyEvent(*self).into(),
            EventType::REL => RelEvent(*self).into(),
            EventType::ABS => AbsEvent(*self).into(),
            EventType::SW => SwitchEvent(*self).into(),
            EventType::MSC => MiscEvent(*self).into(),
            EventType::LED => LedEvent(*self).into(),
            EventType::REP => RepeatEvent(*self).into(),
            EventType::SND => SoundEvent(*self).into(),
            _ => EventKind::Other(*self),
        }
    }

    /// Returns the [`EventType`] of this event.
    #[inline]
    pub fn event_type(&self) -> EventType {
        EventType(self.0.type_)
    }

    /// Returns the typed [`EventCode`] of this event, or [`None`] when the
    /// event type has no code space known to this crate.
    pub fn code(&self) -> Option<EventCode> {
        EventCode::from_raw(self.event_type(), self.raw_code())
    }

    /// Returns the raw *event code* field.
    #[inline]
    pub fn raw_code(&self) -> u16 {
        self.0.code
    }

    /// Returns the raw *event value* field.
    #[inline]
    pub fn raw_value(&self) -> i32 {
        self.0.value
    }

    /// Returns whether this event is of type `ty`.
    #[inline]
    pub fn is_type(&self, ty: EventType) -> bool {
        self.event_type() == ty
    }

    /// Returns whether this event carries exactly the given [`EventCode`].
    #[inline]
    pub fn is_code(&self, code: EventCode) -> bool {
        self.event_type() == code.event_type() && self.raw_code() == code.raw()
    }
}

impl fmt::Debug for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            EventKind::Other(_) => f
                .debug_struct("InputEvent")
                .field("time", &self.time())
                .field("type", &self.event_type())
                .field("code", &self.raw_code())
                .field("value", &self.raw_value())
                .finish(),
            kind => kind.fmt(f),
        }
    }
}

/// A fully typed event code: an event type paired with a code from that
/// type's code space.
///
/// This is the currency of the capability and value APIs on
/// [`Device`][crate::Device].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventCode {
    Syn(Syn),
    Key(Key),
    Rel(Rel),
    Abs(Abs),
    Misc(Misc),
    Switch(Switch),
    Led(Led),
    Sound(Sound),
    Repeat(Repeat),
    Ff(Ff),
}

impl EventCode {
    /// Builds an [`EventCode`] from an event type and a raw code value.
    ///
    /// Returns [`None`] for event types without a code space known to this
    /// crate (e.g. [`EventType::PWR`]).
    pub fn from_raw(ty: EventType, code: u16) -> Option<Self> {
        Some(match ty {
            EventType::SYN => Self::Syn(Syn(code)),
            EventType::KEY => Self::Key(Key(code)),
            EventType::REL => Self::Rel(Rel(code)),
            EventType::ABS => Self::Abs(Abs(code)),
            EventType::MSC => Self::Misc(Misc(code)),
            EventType::SW => Self::Switch(Switch(code)),
            EventType::LED => Self::Led(Led(code)),
            EventType::SND => Self::Sound(Sound(code)),
            EventType::REP => Self::Repeat(Repeat(code)),
            EventType::FF => Self::Ff(Ff(code)),
            _ => return None,
        })
    }

    /// Returns the [`EventType`] this code belongs to.
    pub fn event_type(self) -> EventType {
        match self {
            Self::Syn(_) => EventType::SYN,
            Self::Key(_) => EventType::KEY,
            Self::Rel(_) => EventType::REL,
            Self::Abs(_) => EventType::ABS,
            Self::Misc(_) => EventType::MSC,
            Self::Switch(_) => EventType::SW,
            Self::Led(_) => EventType::LED,
            Self::Sound(_) => EventType::SND,
            Self::Repeat(_) => EventType::REP,
            Self::Ff(_) => EventType::FF,
        }
    }

    /// Returns the raw code value.
    pub fn raw(self) -> u16 {
        match self {
            Self::Syn(c) => c.0,
            Self::Key(c) => c.0,
            Self::Rel(c) => c.0,
            Self::Abs(c) => c.0,
            Self::Misc(c) => c.0,
            Self::Switch(c) => c.0,
            Self::Led(c) => c.0,
            Self::Sound(c) => c.0,
            Self::Repeat(c) => c.0,
            Self::Ff(c) => c.0,
        }
    }
}

macro_rules! code_conversions {
    ( $( $ty:ident => $variant:ident, )* ) => {
        $(
            impl From<$ty> for EventCode {
                #[inline]
                fn from(code: $ty) -> Self {
                    Self::$variant(code)
                }
            }
        )*
    };
}

code_conversions! {
    Syn => Syn,
    Key => Key,
    Rel => Rel,
    Abs => Abs,
    Misc => Misc,
    Switch => Switch,
    Led => Led,
    Sound => Sound,
    Repeat => Repeat,
    Ff => Ff,
}

macro_rules! event_wrappers {
    ( $(
        $(#[$attr:meta])*
        pub struct $name:ident in $variant:ident;
    )* ) => {
        $(
            $( #[$attr] )*
            #[derive(Clone, Copy, PartialEq, Eq)]
            pub struct $name(InputEvent);

            impl From<$name> for EventKind {
                #[inline]
                fn from(value: $name) -> Self {
                    Self::$variant(value)
                }
            }

            impl From<$name> for InputEvent {
                #[inline]
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl Deref for $name {
                type Target = InputEvent;

                #[inline]
                fn deref(&self) -> &InputEvent {
                    &self.0
                }
            }
        )*

        /// Enumeration of event types.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum EventKind {
            $(
                $( #[$attr] )*
                $variant($name),
            )*

            /// Fallback variant for events this crate has no wrapper for.
            ///
            /// Cannot be matched on by user code; later versions may move
            /// events captured here into dedicated variants.
            #[non_exhaustive] // prevents construction and use in patterns
            Other(InputEvent),
        }

        impl From<EventKind> for InputEvent {
            #[inline]
            fn from(kind: EventKind) -> InputEvent {
                match kind {
                    $(
                        EventKind::$variant(it) => *it,
                    )*
                    EventKind::Other(ev) => ev,
                }
            }
        }
    };
}

event_wrappers! {
    /// A synchronization event.
    pub struct SynEvent in Syn;
    /// A key press/release/repeat event.
    pub struct KeyEvent in Key;
    /// A relative axis change.
    pub struct RelEvent in Rel;
    /// An absolute axis change.
    pub struct AbsEvent in Abs;
    /// A switch state change.
    pub struct SwitchEvent in Switch;
    /// Miscellaneous management events.
    pub struct MiscEvent in Misc;
    /// Reports or changes the state of device LEDs.
    pub struct LedEvent in Led;
    /// The key repeat settings have been changed.
    ///
    /// **Note**: This event does *not* signal key repeats. Repeats arrive as
    /// [`KeyEvent`]s with [`KeyState::REPEAT`].
    pub struct RepeatEvent in Repeat;
    /// Plays simple sounds on the device.
    pub struct SoundEvent in Sound;
}

impl SynEvent {
    #[inline]
    pub fn new(syn: Syn) -> Self {
        Self(InputEvent::new(EventType::SYN, syn.0, 0))
    }

    /// Returns the event code as a [`Syn`] (the specific kind of `SYN` event).
    #[inline]
    pub fn syn(&self) -> Syn {
        Syn(self.raw_code())
    }
}
impl fmt::Debug for SynEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynEvent")
            .field("time", &self.time())
            .field("syn", &self.syn())
            .field("value", &self.raw_value())
            .finish()
    }
}
impl From<Syn> for SynEvent {
    #[inline]
    fn from(syn: Syn) -> Self {
        Self::new(syn)
    }
}
impl From<Syn> for InputEvent {
    #[inline]
    fn from(value: Syn) -> Self {
        SynEvent::new(value).into()
    }
}

impl KeyEvent {
    #[inline]
    pub fn new(key: Key, state: KeyState) -> Self {
        Self(InputEvent::new(EventType::KEY, key.0, state.0))
    }

    /// Returns the [`Key`] code that has been pressed/released/repeated.
    #[inline]
    pub fn key(&self) -> Key {
        Key(self.raw_code())
    }

    /// Returns the state of the key: [`KeyState::RELEASED`],
    /// [`KeyState::PRESSED`], or [`KeyState::REPEAT`].
    #[inline]
    pub fn state(&self) -> KeyState {
        KeyState(self.raw_value())
    }
}
impl fmt::Debug for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEvent")
            .field("time", &self.time())
            .field("key", &self.key())
            .field("state", &self.state())
            .finish()
    }
}

ffi_enum! {
    /// State of a [`Key`], stored as the value of a [`KeyEvent`].
    pub enum KeyState: i32, prefix "" {
        /// The key used to be pressed and has now been released.
        RELEASED = 0,
        /// The key used to be released and has now been pressed.
        PRESSED = 1,
        /// The key has been held down long enough to generate a repeat event.
        REPEAT = 2,
    }
}

impl RelEvent {
    #[inline]
    pub fn new(rel: Rel, value: i32) -> Self {
        Self(InputEvent::new(EventType::REL, rel.0, value))
    }

    /// Returns the [`Rel`] axis identifier of this event.
    #[inline]
    pub fn rel(&self) -> Rel {
        Rel(self.raw_code())
    }

    /// Returns the value by which the axis has moved.
    #[inline]
    pub fn value(&self) -> i32 {
        self.raw_value()
    }
}
impl fmt::Debug for RelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelEvent")
            .field("time", &self.time())
            .field("rel", &self.rel())
            .field("value", &self.value())
            .finish()
    }
}

impl AbsEvent {
    #[inline]
    pub fn new(abs: Abs, value: i32) -> Self {
        Self(InputEvent::new(EventType::ABS, abs.0, value))
    }

    #[inline]
    pub fn abs(&self) -> Abs {
        Abs(self.raw_code())
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.raw_value()
    }
}
impl fmt::Debug for AbsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbsEvent")
            .field("time", &self.time())
            .field("abs", &self.abs())
            .field("value", &self.value())
            .finish()
    }
}

impl SwitchEvent {
    #[inline]
    pub fn new(switch: Switch, on: bool) -> Self {
        Self(InputEvent::new(
            EventType::SW,
            switch.0,
            if on { 1 } else { 0 },
        ))
    }

    #[inline]
    pub fn switch(&self) -> Switch {
        Switch(self.raw_code())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.raw_value() != 0
    }
}
impl fmt::Debug for SwitchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchEvent")
            .field("time", &self.time())
            .field("switch", &self.switch())
            .field("active", &self.is_active())
            .finish()
    }
}

impl MiscEvent {
    #[inline]
    pub fn new(misc: Misc, value: i32) -> Self {
        Self(InputEvent::new(EventType::MSC, misc.0, value))
    }

    /// Returns the event code (the type of *misc* event).
    #[inline]
    pub fn misc(&self) -> Misc {
        Misc(self.raw_code())
    }
}
impl fmt::Debug for MiscEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiscEvent")
            .field("time", &self.time())
            .field("misc", &self.misc())
            .field("value", &self.raw_value())
            .finish()
    }
}

impl LedEvent {
    #[inline]
    pub fn new(led: Led, on: bool) -> Self {
        Self(InputEvent::new(
            EventType::LED,
            led.0,
            if on { 1 } else { 0 },
        ))
    }

    #[inline]
    pub fn led(&self) -> Led {
        Led(self.raw_code())
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.raw_value() != 0
    }
}
impl fmt::Debug for LedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedEvent")
            .field("time", &self.time())
            .field("led", &self.led())
            .field("on", &self.is_on())
            .finish()
    }
}

impl RepeatEvent {
    #[inline]
    pub fn new(repeat: Repeat, value: u32) -> Self {
        Self(InputEvent::new(EventType::REP, repeat.0, value as i32))
    }

    /// Returns which [`Repeat`] setting this event reports or adjusts.
    #[inline]
    pub fn repeat(&self) -> Repeat {
        Repeat(self.raw_code())
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.raw_value() as u32
    }
}
impl fmt::Debug for RepeatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeatEvent")
            .field("time", &self.time())
            .field("repeat", &self.repeat())
            .field("value", &self.raw_value())
            .finish()
    }
}

impl SoundEvent {
    #[inline]
    pub fn new(sound: Sound, playing: bool) -> Self {
        Self(InputEvent::new(
            EventType::SND,
            sound.0,
            if playing { 1 } else { 0 },
        ))
    }

    /// Returns the [`Sound`] this event wants to play.
    #[inline]
    pub fn sound(&self) -> Sound {
        Sound(self.raw_code())
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.raw_value() != 0
    }
}
impl fmt::Debug for SoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundEvent")
            .field("time", &self.time())
            .field("sound", &self.sound())
            .field("value", &self.raw_value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps() {
        const EV: InputEvent = InputEvent::zeroed();

        let epoch = EV.with_time(SystemTime::UNIX_EPOCH);
        assert_eq!(epoch.0.time.tv_sec, 0);
        assert_eq!(epoch.0.time.tv_usec, 0);

        // `suseconds_t` is signed; out-of-range values are clamped like glibc
        // does.
        let mut negative_micros = EV;
        negative_micros.0.time.tv_usec = -1;
        assert_eq!(
            negative_micros.time(),
            SystemTime::UNIX_EPOCH,
            "should saturate to `UNIX_EPOCH`",
        );

        let mut before_epoch = EV;
        before_epoch.0.time.tv_sec = -1;
        assert_eq!(
            before_epoch.time(),
            SystemTime::UNIX_EPOCH - Duration::from_secs(1),
        );

        let mut after_epoch = EV;
        after_epoch.0.time.tv_sec = 1_000_000;
        assert_eq!(
            after_epoch.time(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
        );
    }

    #[test]
    fn typed_codes() {
        let ev = KeyEvent::new(Key::KEY_A, KeyState::PRESSED);
        assert!(ev.is_type(EventType::KEY));
        assert!(ev.is_code(Key::KEY_A.into()));
        assert!(!ev.is_code(Key::KEY_B.into()));
        assert!(!ev.is_code(Led::NUML.into()));

        assert_eq!(ev.code(), Some(EventCode::Key(Key::KEY_A)));
        assert_eq!(
            EventCode::from_raw(EventType::ABS, Abs::MT_SLOT.raw()),
            Some(EventCode::Abs(Abs::MT_SLOT))
        );
        assert_eq!(EventCode::from_raw(EventType::PWR, 0), None);

        let code: EventCode = Abs::X.into();
        assert_eq!(code.event_type(), EventType::ABS);
        assert_eq!(code.raw(), 0);
    }
}
