//! Event types, codes, and property identifiers.
//!
//! The numeric values mirror `linux/input-event-codes.h`. Every type carries
//! a name table mapping values to their full symbolic spelling (`EV_KEY`,
//! `ABS_MT_SLOT`, ...) and back; aliased values resolve to the first table
//! entry.

use std::{error::Error, fmt, io};

ffi_enum! {
    /// Input device properties.
    ///
    /// Many devices don't set any of these; consumers then have to guess from
    /// the advertised axes and buttons.
    pub enum InputProp: u8, prefix "INPUT_PROP_" {
        /// The on-screen position should be indicated by a pointer (touchpads,
        /// drawing tablets).
        POINTER        = 0x00,
        /// The device's absolute axes map directly onto the screen
        /// (touchscreens).
        DIRECT         = 0x01,
        /// Button clicks are registered by pressing down on the touchpad
        /// surface.
        BUTTONPAD      = 0x02,
        SEMI_MT        = 0x03,
        TOPBUTTONPAD   = 0x04,
        POINTING_STICK = 0x05,
        /// `ABS_X`/`ABS_Y`/`ABS_Z` report acceleration instead of position.
        ACCELEROMETER  = 0x06,
    }
}
impl InputProp {
    pub(crate) const MAX: Self = Self(0x1f);
}
bitvalue!(InputProp);

ffi_enum! {
    /// The broad category of an [`InputEvent`][crate::event::InputEvent].
    pub enum EventType: u16, prefix "EV_" {
        /// Synchronization markers ([`Syn`]) structuring the event stream.
        SYN = 0x00,
        /// Key and button presses, releases, and repeats ([`Key`]).
        KEY = 0x01,
        /// Relative axis movement ([`Rel`]).
        REL = 0x02,
        /// Absolute axis changes ([`Abs`]).
        ABS = 0x03,
        /// Miscellaneous events ([`Misc`]).
        MSC = 0x04,
        /// Binary switch state changes ([`Switch`]).
        SW  = 0x05,
        /// LED state changes ([`Led`]).
        LED = 0x11,
        /// Simple sound requests ([`Sound`]).
        SND = 0x12,
        /// Autorepeat setting changes ([`Repeat`]).
        REP = 0x14,
        /// Force-feedback control ([`Ff`]); only capability bits are modeled
        /// here.
        FF  = 0x15,
        /// Power-management events (codeless).
        PWR = 0x16,
        /// Force-feedback status reports (codeless here).
        FF_STATUS = 0x17,
    }
}
impl EventType {
    pub(crate) const MAX: Self = Self(0x1f);
}
bitvalue!(EventType);

ffi_enum! {
    /// Synchronization event codes.
    ///
    /// The *value* of a `SYN` event is meaningless; only its code and its
    /// position in the stream matter.
    pub enum Syn: u16, prefix "SYN_" {
        /// Ends a group of events that happened at the same moment.
        REPORT    = 0,
        CONFIG    = 1,
        /// Legacy ("type A") multitouch framing. Unused.
        MT_REPORT = 2,
        /// One or more events were lost to buffer overflow. The receiver's
        /// view of the device state is stale and must be re-fetched.
        DROPPED   = 3,
    }
}

/// Error returned by `from_name` lookups and [`FromStr`][std::str::FromStr]
/// implementations when no entry matches.
#[derive(Debug, PartialEq, Eq)]
pub struct UnknownName {
    pub(crate) _p: (),
}

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown symbolic name")
    }
}
impl Error for UnknownName {}
impl From<UnknownName> for io::Error {
    fn from(value: UnknownName) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, value)
    }
}

ffi_enum! {
    /// A key or button identifier.
    ///
    /// The constants mimic the `KEY_*` and `BTN_*` preprocessor names from
    /// `linux/input-event-codes.h`, so no shared prefix is stripped.
    ///
    /// Some codes are aliased (e.g. [`Key::BTN_SOUTH`] and [`Key::BTN_A`]
    /// share a value). Such values format as the first table entry.
    pub enum Key: u16, prefix "" {
        KEY_RESERVED   = 0,
        KEY_ESC        = 1,
        KEY_1          = 2,
        KEY_2          = 3,
        KEY_3          = 4,
        KEY_4          = 5,
        KEY_5          = 6,
        KEY_6          = 7,
        KEY_7          = 8,
        KEY_8          = 9,
        KEY_9          = 10,
        KEY_0          = 11,
        KEY_MINUS      = 12,
        KEY_EQUAL      = 13,
        KEY_BACKSPACE  = 14,
        KEY_TAB        = 15,
        KEY_Q          = 16,
        KEY_W          = 17,
        KEY_E          = 18,
        KEY_R          = 19,
        KEY_T          = 20,
        KEY_Y          = 21,
        KEY_U          = 22,
        KEY_I          = 23,
        KEY_O          = 24,
        KEY_P          = 25,
        KEY_LEFTBRACE  = 26,
        KEY_RIGHTBRACE = 27,
        KEY_ENTER      = 28,
        KEY_LEFTCTRL   = 29,
        KEY_A          = 30,
        KEY_S          = 31,
        KEY_D          = 32,
        KEY_F          = 33,
        KEY_G          = 34,
        KEY_H          = 35,
        KEY_J          = 36,
        KEY_K          = 37,
        KEY_L          = 38,
        KEY_SEMICOLON  = 39,
        KEY_APOSTROPHE = 40,
        KEY_GRAVE      = 41,
        KEY_LEFTSHIFT  = 42,
        KEY_BACKSLASH  = 43,
        KEY_Z          = 44,
        KEY_X          = 45,
        KEY_C          = 46,
        KEY_V          = 47,
        KEY_B          = 48,
        KEY_N          = 49,
        KEY_M          = 50,
        KEY_COMMA      = 51,
        KEY_DOT        = 52,
        KEY_SLASH      = 53,
        KEY_RIGHTSHIFT = 54,
        KEY_KPASTERISK = 55,
        KEY_LEFTALT    = 56,
        KEY_SPACE      = 57,
        KEY_CAPSLOCK   = 58,
        KEY_F1         = 59,
        KEY_F2         = 60,
        KEY_F3         = 61,
        KEY_F4         = 62,
        KEY_F5         = 63,
        KEY_F6         = 64,
        KEY_F7         = 65,
        KEY_F8         = 66,
        KEY_F9         = 67,
        KEY_F10        = 68,
        KEY_NUMLOCK    = 69,
        KEY_SCROLLLOCK = 70,
        KEY_KP7        = 71,
        KEY_KP8        = 72,
        KEY_KP9        = 73,
        KEY_KPMINUS    = 74,
        KEY_KP4        = 75,
        KEY_KP5        = 76,
        KEY_KP6        = 77,
        KEY_KPPLUS     = 78,
        KEY_KP1        = 79,
        KEY_KP2        = 80,
        KEY_KP3        = 81,
        KEY_KP0        = 82,
        KEY_KPDOT      = 83,
        KEY_ZENKAKUHANKAKU   = 85,
        KEY_102ND            = 86,
        KEY_F11              = 87,
        KEY_F12              = 88,
        KEY_RO               = 89,
        KEY_KATAKANA         = 90,
        KEY_HIRAGANA         = 91,
        KEY_HENKAN           = 92,
        KEY_KATAKANAHIRAGANA = 93,
        KEY_MUHENKAN         = 94,
        KEY_KPJPCOMMA        = 95,
        KEY_KPENTER          = 96,
        KEY_RIGHTCTRL        = 97,
        KEY_KPSLASH          = 98,
        KEY_SYSRQ            = 99,
        KEY_RIGHTALT         = 100,
        KEY_LINEFEED         = 101,
        KEY_HOME             = 102,
        KEY_UP               = 103,
        KEY_PAGEUP           = 104,
        KEY_LEFT             = 105,
        KEY_RIGHT            = 106,
        KEY_END              = 107,
        KEY_DOWN             = 108,
        KEY_PAGEDOWN         = 109,
        KEY_INSERT           = 110,
        KEY_DELETE           = 111,
        KEY_MACRO            = 112,
        KEY_MUTE             = 113,
        KEY_VOLUMEDOWN       = 114,
        KEY_VOLUMEUP         = 115,
        KEY_POWER            = 116,
        KEY_KPEQUAL          = 117,
        KEY_KPPLUSMINUS      = 118,
        KEY_PAUSE            = 119,
        KEY_SCALE            = 120,
        KEY_KPCOMMA          = 121,
        KEY_HANGEUL          = 122,
        KEY_HANJA            = 123,
        KEY_YEN              = 124,
        KEY_LEFTMETA         = 125,
        KEY_RIGHTMETA        = 126,
        KEY_COMPOSE          = 127,
        KEY_STOP             = 128,
        KEY_AGAIN            = 129,
        KEY_PROPS            = 130,
        KEY_UNDO             = 131,
        KEY_FRONT            = 132,
        KEY_COPY             = 133,
        KEY_OPEN             = 134,
        KEY_PASTE            = 135,
        KEY_FIND             = 136,
        KEY_CUT              = 137,
        KEY_HELP             = 138,
        KEY_MENU             = 139,
        KEY_CALC             = 140,
        KEY_SETUP            = 141,
        KEY_SLEEP            = 142,
        KEY_WAKEUP           = 143,
        KEY_FILE             = 144,
        KEY_SENDFILE         = 145,
        KEY_DELETEFILE       = 146,
        KEY_XFER             = 147,
        KEY_PROG1            = 148,
        KEY_PROG2            = 149,
        KEY_WWW              = 150,
        KEY_MSDOS            = 151,
        KEY_COFFEE           = 152,
        KEY_SCREENLOCK       = Self::KEY_COFFEE.0,
        KEY_ROTATE_DISPLAY   = 153,
        KEY_CYCLEWINDOWS     = 154,
        KEY_MAIL             = 155,
        KEY_BOOKMARKS        = 156,
        KEY_COMPUTER         = 157,
        KEY_BACK             = 158,
        KEY_FORWARD          = 159,
        KEY_CLOSECD          = 160,
        KEY_EJECTCD          = 161,
        KEY_EJECTCLOSECD     = 162,
        KEY_NEXTSONG         = 163,
        KEY_PLAYPAUSE        = 164,
        KEY_PREVIOUSSONG     = 165,
        KEY_STOPCD           = 166,
        KEY_RECORD           = 167,
        KEY_REWIND           = 168,
        KEY_PHONE            = 169,
        KEY_ISO              = 170,
        KEY_CONFIG           = 171,
        KEY_HOMEPAGE         = 172,
        KEY_REFRESH          = 173,
        KEY_EXIT             = 174,
        KEY_MOVE             = 175,
        KEY_EDIT             = 176,
        KEY_SCROLLUP         = 177,
        KEY_SCROLLDOWN       = 178,
        KEY_KPLEFTPAREN      = 179,
        KEY_KPRIGHTPAREN     = 180,
        KEY_NEW              = 181,
        KEY_REDO             = 182,
        KEY_F13              = 183,
        KEY_F14              = 184,
        KEY_F15              = 185,
        KEY_F16              = 186,
        KEY_F17              = 187,
        KEY_F18              = 188,
        KEY_F19              = 189,
        KEY_F20              = 190,
        KEY_F21              = 191,
        KEY_F22              = 192,
        KEY_F23              = 193,
        KEY_F24              = 194,
        KEY_PLAYCD           = 200,
        KEY_PAUSECD          = 201,
        KEY_PROG3            = 202,
        KEY_PROG4            = 203,
        KEY_ALL_APPLICATIONS = 204,
        KEY_SUSPEND          = 205,
        KEY_CLOSE            = 206,
        KEY_PLAY             = 207,
        KEY_FASTFORWARD      = 208,
        KEY_BASSBOOST        = 209,
        KEY_PRINT            = 210,
        KEY_HP               = 211,
        KEY_CAMERA           = 212,
        KEY_SOUND            = 213,
        KEY_QUESTION         = 214,
        KEY_EMAIL            = 215,
        KEY_CHAT             = 216,
        KEY_SEARCH           = 217,
        KEY_CONNECT          = 218,
        KEY_FINANCE          = 219,
        KEY_SPORT            = 220,
        KEY_SHOP             = 221,
        KEY_ALTERASE         = 222,
        KEY_CANCEL           = 223,
        KEY_BRIGHTNESSDOWN   = 224,
        KEY_BRIGHTNESSUP     = 225,
        KEY_MEDIA            = 226,
        KEY_SWITCHVIDEOMODE  = 227,
        KEY_KBDILLUMTOGGLE   = 228,
        KEY_KBDILLUMDOWN     = 229,
        KEY_KBDILLUMUP       = 230,
        KEY_SEND             = 231,
        KEY_REPLY            = 232,
        KEY_FORWARDMAIL      = 233,
        KEY_SAVE             = 234,
        KEY_DOCUMENTS        = 235,
        KEY_BATTERY          = 236,
        KEY_BLUETOOTH        = 237,
        KEY_WLAN             = 238,
        KEY_UWB              = 239,
        KEY_UNKNOWN          = 240,
        KEY_VIDEO_NEXT       = 241,
        KEY_VIDEO_PREV       = 242,
        KEY_BRIGHTNESS_CYCLE = 243,
        KEY_BRIGHTNESS_AUTO  = 244,
        KEY_DISPLAY_OFF      = 245,
        KEY_WWAN             = 246,
        KEY_RFKILL           = 247,
        KEY_MICMUTE          = 248,

        BTN_0 = 0x100,
        BTN_1 = 0x101,
        BTN_2 = 0x102,
        BTN_3 = 0x103,
        BTN_4 = 0x104,
        BTN_5 = 0x105,
        BTN_6 = 0x106,
        BTN_7 = 0x107,
        BTN_8 = 0x108,
        BTN_9 = 0x109,

        BTN_LEFT    = 0x110,
        BTN_RIGHT   = 0x111,
        BTN_MIDDLE  = 0x112,
        BTN_SIDE    = 0x113,
        BTN_EXTRA   = 0x114,
        BTN_FORWARD = 0x115,
        BTN_BACK    = 0x116,
        BTN_TASK    = 0x117,

        BTN_TRIGGER = 0x120,
        BTN_THUMB   = 0x121,
        BTN_THUMB2  = 0x122,
        BTN_TOP     = 0x123,
        BTN_TOP2    = 0x124,
        BTN_PINKIE  = 0x125,
        BTN_BASE    = 0x126,
        BTN_BASE2   = 0x127,
        BTN_BASE3   = 0x128,
        BTN_BASE4   = 0x129,
        BTN_BASE5   = 0x12a,
        BTN_BASE6   = 0x12b,
        BTN_DEAD    = 0x12f,

        BTN_SOUTH  = 0x130,
        BTN_A      = Self::BTN_SOUTH.0,
        BTN_EAST   = 0x131,
        BTN_B      = Self::BTN_EAST.0,
        BTN_C      = 0x132,
        BTN_NORTH  = 0x133,
        BTN_X      = Self::BTN_NORTH.0,
        BTN_WEST   = 0x134,
        BTN_Y      = Self::BTN_WEST.0,
        BTN_Z      = 0x135,
        BTN_TL     = 0x136,
        BTN_TR     = 0x137,
        BTN_TL2    = 0x138,
        BTN_TR2    = 0x139,
        BTN_SELECT = 0x13a,
        BTN_START  = 0x13b,
        BTN_MODE   = 0x13c,
        BTN_THUMBL = 0x13d,
        BTN_THUMBR = 0x13e,

        BTN_TOOL_PEN      = 0x140,
        BTN_TOOL_RUBBER   = 0x141,
        BTN_TOOL_BRUSH    = 0x142,
        BTN_TOOL_PENCIL   = 0x143,
        BTN_TOOL_AIRBRUSH = 0x144,
        BTN_TOOL_FINGER   = 0x145,
        BTN_TOOL_MOUSE    = 0x146,
        BTN_TOOL_LENS     = 0x147,
        BTN_TOOL_QUINTTAP = 0x148,
        BTN_STYLUS3       = 0x149,
        BTN_TOUCH         = 0x14a,
        BTN_STYLUS        = 0x14b,
        BTN_STYLUS2       = 0x14c,
        BTN_TOOL_DOUBLETAP = 0x14d,
        BTN_TOOL_TRIPLETAP = 0x14e,
        BTN_TOOL_QUADTAP   = 0x14f,

        BTN_GEAR_DOWN = 0x150,
        BTN_GEAR_UP   = 0x151,

        BTN_DPAD_UP    = 0x220,
        BTN_DPAD_DOWN  = 0x221,
        BTN_DPAD_LEFT  = 0x222,
        BTN_DPAD_RIGHT = 0x223,

        BTN_TRIGGER_HAPPY1 = 0x2c0,
        BTN_TRIGGER_HAPPY2 = 0x2c1,
        BTN_TRIGGER_HAPPY3 = 0x2c2,
        BTN_TRIGGER_HAPPY4 = 0x2c3,
        BTN_TRIGGER_HAPPY5 = 0x2c4,
        BTN_TRIGGER_HAPPY6 = 0x2c5,
    }
}
impl Key {
    pub(crate) const MAX: Self = Self(0x2ff);
}
bitvalue!(Key);

ffi_enum! {
    /// A relative axis identifier.
    pub enum Rel: u16, prefix "REL_" {
        X             = 0x00,
        Y             = 0x01,
        Z             = 0x02,
        RX            = 0x03,
        RY            = 0x04,
        RZ            = 0x05,
        HWHEEL        = 0x06,
        DIAL          = 0x07,
        WHEEL         = 0x08,
        MISC          = 0x09,
        RESERVED      = 0x0a,
        WHEEL_HI_RES  = 0x0b,
        HWHEEL_HI_RES = 0x0c,
    }
}
impl Rel {
    pub(crate) const MAX: Self = Self(0x0f);
}
bitvalue!(Rel);

ffi_enum! {
    /// An absolute axis identifier.
    ///
    /// Codes above [`Abs::MT_SLOT`] carry per-contact multitouch state; on a
    /// slotted device they address the currently selected slot rather than a
    /// single shared value.
    pub enum Abs: u16, prefix "ABS_" {
        X              = 0x00,
        Y              = 0x01,
        Z              = 0x02,
        RX             = 0x03,
        RY             = 0x04,
        RZ             = 0x05,
        THROTTLE       = 0x06,
        RUDDER         = 0x07,
        WHEEL          = 0x08,
        GAS            = 0x09,
        BRAKE          = 0x0a,
        HAT0X          = 0x10,
        HAT0Y          = 0x11,
        HAT1X          = 0x12,
        HAT1Y          = 0x13,
        HAT2X          = 0x14,
        HAT2Y          = 0x15,
        HAT3X          = 0x16,
        HAT3Y          = 0x17,
        PRESSURE       = 0x18,
        DISTANCE       = 0x19,
        TILT_X         = 0x1a,
        TILT_Y         = 0x1b,
        TOOL_WIDTH     = 0x1c,
        VOLUME         = 0x20,
        PROFILE        = 0x21,
        MISC           = 0x28,
        RESERVED       = 0x2e,
        /// Selects the active multitouch slot.
        MT_SLOT        = 0x2f,
        MT_TOUCH_MAJOR = 0x30,
        MT_TOUCH_MINOR = 0x31,
        MT_WIDTH_MAJOR = 0x32,
        MT_WIDTH_MINOR = 0x33,
        MT_ORIENTATION = 0x34,
        MT_POSITION_X  = 0x35,
        MT_POSITION_Y  = 0x36,
        MT_TOOL_TYPE   = 0x37,
        MT_BLOB_ID     = 0x38,
        /// Identifies a contact across its lifetime; `-1` means the slot is
        /// empty.
        MT_TRACKING_ID = 0x39,
        MT_PRESSURE    = 0x3a,
        MT_DISTANCE    = 0x3b,
        MT_TOOL_X      = 0x3c,
        MT_TOOL_Y      = 0x3d,
    }
}
impl Abs {
    pub(crate) const MAX: Self = Self(0x3f);

    /// Returns whether this code carries per-slot multitouch state
    /// (any code above [`Abs::MT_SLOT`]).
    #[inline]
    pub fn is_mt(self) -> bool {
        self.0 > Self::MT_SLOT.0 && self.0 <= Self::MAX.0
    }
}
bitvalue!(Abs);

ffi_enum! {
    /// A binary switch.
    ///
    /// Unlike [`Key`]s, switches are toggled instead of held and never
    /// autorepeat.
    pub enum Switch: u16, prefix "SW_" {
        LID                  = 0x00,
        TABLET_MODE          = 0x01,
        HEADPHONE_INSERT     = 0x02,
        RFKILL_ALL           = 0x03,
        RADIO                = Self::RFKILL_ALL.0,
        MICROPHONE_INSERT    = 0x04,
        DOCK                 = 0x05,
        LINEOUT_INSERT       = 0x06,
        JACK_PHYSICAL_INSERT = 0x07,
        VIDEOOUT_INSERT      = 0x08,
        CAMERA_LENS_COVER    = 0x09,
        KEYPAD_SLIDE         = 0x0a,
        FRONT_PROXIMITY      = 0x0b,
        ROTATE_LOCK          = 0x0c,
        LINEIN_INSERT        = 0x0d,
        MUTE_DEVICE          = 0x0e,
        PEN_INSERTED         = 0x0f,
        MACHINE_COVER        = 0x10,
        USB_INSERT           = 0x11,
    }
}
impl Switch {
    pub(crate) const MAX: Self = Self(0x11);
}
bitvalue!(Switch);

ffi_enum! {
    /// A miscellaneous event code, such as a timestamp or scancode.
    pub enum Misc: u16, prefix "MSC_" {
        SERIAL    = 0x00,
        PULSELED  = 0x01,
        GESTURE   = 0x02,
        RAW       = 0x03,
        /// Scancode of the following key event.
        SCAN      = 0x04,
        /// Microseconds since the last device reset, as a wrapping `u32`.
        TIMESTAMP = 0x05,
    }
}
impl Misc {
    pub(crate) const MAX: Self = Self(0x07);
}
bitvalue!(Misc);

ffi_enum! {
    /// A device LED or other indicator.
    pub enum Led: u16, prefix "LED_" {
        NUML     = 0x00,
        CAPSL    = 0x01,
        SCROLLL  = 0x02,
        COMPOSE  = 0x03,
        KANA     = 0x04,
        SLEEP    = 0x05,
        SUSPEND  = 0x06,
        MUTE     = 0x07,
        MISC     = 0x08,
        MAIL     = 0x09,
        CHARGING = 0x0a,
    }
}
impl Led {
    pub(crate) const MAX: Self = Self(0x0f);
}
bitvalue!(Led);

ffi_enum! {
    /// An autorepeat setting.
    ///
    /// There is no kernel bitfield for these; a device either supports
    /// [`EventType::REP`] with both settings or not at all.
    pub enum Repeat: u16, prefix "REP_" {
        DELAY  = 0x00,
        PERIOD = 0x01,
    }
}
impl Repeat {
    pub(crate) const MAX: Self = Self(0x01);
}

ffi_enum! {
    /// A sound effect.
    pub enum Sound: u16, prefix "SND_" {
        CLICK = 0x00,
        BELL  = 0x01,
        TONE  = 0x02,
    }
}
impl Sound {
    pub(crate) const MAX: Self = Self(0x07);
}
bitvalue!(Sound);

ffi_enum! {
    /// A force-feedback feature or waveform.
    ///
    /// Only the capability bits and names are modeled; effect upload and
    /// playback are not part of this crate.
    pub enum Ff: u16, prefix "FF_" {
        RUMBLE     = 0x50,
        PERIODIC   = 0x51,
        CONSTANT   = 0x52,
        SPRING     = 0x53,
        FRICTION   = 0x54,
        DAMPER     = 0x55,
        INERTIA    = 0x56,
        RAMP       = 0x57,
        SQUARE     = 0x58,
        TRIANGLE   = 0x59,
        SINE       = 0x5a,
        SAW_UP     = 0x5b,
        SAW_DOWN   = 0x5c,
        CUSTOM     = 0x5d,
        GAIN       = 0x60,
        AUTOCENTER = 0x61,
    }
}
impl Ff {
    pub(crate) const MAX: Self = Self(0x7f);
}
bitvalue!(Ff);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_repr() {
        assert_eq!(format!("{:?}", InputProp::POINTER), "INPUT_PROP_POINTER");
        assert_eq!(format!("{:?}", InputProp(0xff)), "InputProp(0xff)");

        assert_eq!(format!("{:?}", EventType::SYN), "EV_SYN");
        assert_eq!(
            format!("{:?}", EventType::from_raw(0xffff)),
            "EventType(0xffff)"
        );

        assert_eq!(format!("{:?}", Syn::REPORT), "SYN_REPORT");
        assert_eq!("KEY_A".parse(), Ok(Key::KEY_A));
        assert_eq!(format!("{:?}", Key::KEY_A), "KEY_A");
        assert_eq!(format!("{:?}", Key::from_raw(0xffff)), "Key(0xffff)");

        assert_eq!("REL_X".parse(), Ok(Rel::X));
        assert_eq!(format!("{:?}", Rel::X), "REL_X");

        assert_eq!("ABS_MT_SLOT".parse(), Ok(Abs::MT_SLOT));
        assert_eq!(format!("{:?}", Abs::MT_SLOT), "ABS_MT_SLOT");

        assert_eq!("SW_LID".parse(), Ok(Switch::LID));
        assert_eq!("MSC_RAW".parse(), Ok(Misc::RAW));
        assert_eq!("LED_MAIL".parse(), Ok(Led::MAIL));
        assert_eq!(format!("{:?}", Repeat::PERIOD), "REP_PERIOD");
        assert_eq!("SND_TONE".parse(), Ok(Sound::TONE));
        assert_eq!("FF_RUMBLE".parse(), Ok(Ff::RUMBLE));
    }

    #[test]
    fn aliases_resolve_by_table_order() {
        // Both spellings parse; formatting picks the first table entry.
        assert_eq!(Key::from_name("BTN_SOUTH"), Some(Key::BTN_SOUTH));
        assert_eq!(Key::from_name("BTN_A"), Some(Key::BTN_SOUTH));
        assert_eq!(Key::BTN_A.name(), Some("BTN_SOUTH"));

        assert_eq!(Switch::from_name("SW_RADIO"), Some(Switch::RFKILL_ALL));
        assert_eq!(Switch::RADIO.name(), Some("SW_RFKILL_ALL"));

        assert_eq!(Key::KEY_SCREENLOCK.name(), Some("KEY_COFFEE"));
        assert_eq!(Key::from_name("KEY_SCREENLOCK"), Some(Key::KEY_COFFEE));
    }

    #[test]
    fn mt_predicate() {
        assert!(!Abs::X.is_mt());
        assert!(!Abs::MT_SLOT.is_mt());
        assert!(Abs::MT_TOUCH_MAJOR.is_mt());
        assert!(Abs::MT_TOOL_Y.is_mt());
        assert!(!Abs::from_raw(Abs::MAX.raw() + 1).is_mt());
    }
}
