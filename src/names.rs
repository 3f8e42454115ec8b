//! String lookups for event types, event codes, and device properties.
//!
//! All tables are fixed at build time and return `'static` strings. Lookups
//! are case-sensitive exact matches on the full symbolic spelling, prefix
//! included (`"EV_KEY"`, `"ABS_MT_SLOT"`, `"INPUT_PROP_POINTER"`).
//!
//! A handful of codes have several spellings for one value (`BTN_SOUTH` /
//! `BTN_A`). [`event_code_from_name`] accepts every spelling;
//! [`event_code_name`] returns the first table entry, which is treated as the
//! canonical one.

use crate::event::{
    Abs, EventType, Ff, InputProp, Key, Led, Misc, Rel, Repeat, Sound, Switch, Syn,
};

/// Returns the symbolic name of an event type (`"EV_KEY"`), or [`None`] for
/// values without one.
pub fn event_type_name(ty: EventType) -> Option<&'static str> {
    ty.name()
}

/// Looks up an event type by its symbolic name.
pub fn event_type_from_name(name: &str) -> Option<EventType> {
    EventType::from_name(name)
}

/// Returns the highest valid code for the given event type.
///
/// Returns [`None`] for event types without a code table
/// ([`EventType::SYN`], [`EventType::PWR`], ...).
pub fn event_type_max(ty: EventType) -> Option<u16> {
    Some(match ty {
        EventType::KEY => Key::MAX.raw(),
        EventType::REL => Rel::MAX.raw(),
        EventType::ABS => Abs::MAX.raw(),
        EventType::MSC => Misc::MAX.raw(),
        EventType::SW => Switch::MAX.raw(),
        EventType::LED => Led::MAX.raw(),
        EventType::SND => Sound::MAX.raw(),
        EventType::REP => Repeat::MAX.raw(),
        EventType::FF => Ff::MAX.raw(),
        _ => return None,
    })
}

/// Returns the symbolic name of an event code (`"KEY_A"`, `"REL_X"`), picking
/// the table matching `ty`.
///
/// Returns [`None`] when the type has no code table or the code has no name.
pub fn event_code_name(ty: EventType, code: u16) -> Option<&'static str> {
    match ty {
        EventType::SYN => Syn(code).name(),
        EventType::KEY => Key(code).name(),
        EventType::REL => Rel(code).name(),
        EventType::ABS => Abs(code).name(),
        EventType::MSC => Misc(code).name(),
        EventType::SW => Switch(code).name(),
        EventType::LED => Led(code).name(),
        EventType::SND => Sound(code).name(),
        EventType::REP => Repeat(code).name(),
        EventType::FF => Ff(code).name(),
        _ => None,
    }
}

/// Looks up an event code by name within the code table of `ty`.
///
/// The match is case-sensitive and includes the prefix; `"KEY_A"` only
/// resolves under [`EventType::KEY`]. Aliased spellings all resolve to the
/// shared value.
pub fn event_code_from_name(ty: EventType, name: &str) -> Option<u16> {
    match ty {
        EventType::SYN => Syn::from_name(name).map(Syn::raw),
        EventType::KEY => Key::from_name(name).map(Key::raw),
        EventType::REL => Rel::from_name(name).map(Rel::raw),
        EventType::ABS => Abs::from_name(name).map(Abs::raw),
        EventType::MSC => Misc::from_name(name).map(Misc::raw),
        EventType::SW => Switch::from_name(name).map(Switch::raw),
        EventType::LED => Led::from_name(name).map(Led::raw),
        EventType::SND => Sound::from_name(name).map(Sound::raw),
        EventType::REP => Repeat::from_name(name).map(Repeat::raw),
        EventType::FF => Ff::from_name(name).map(Ff::raw),
        _ => None,
    }
}

/// Returns the symbolic name of a device property.
pub fn property_name(prop: InputProp) -> Option<&'static str> {
    prop.name()
}

/// Looks up a device property by its symbolic name.
pub fn property_from_name(name: &str) -> Option<InputProp> {
    InputProp::from_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_round_trip() {
        for raw in 0..=EventType::MAX.raw() {
            let ty = EventType::from_raw(raw);
            let Some(name) = event_type_name(ty) else {
                continue;
            };
            assert_eq!(event_type_from_name(name), Some(ty), "{name}");
        }
        assert_eq!(event_type_from_name("EV_NOPE"), None);
        assert_eq!(event_type_from_name("ev_key"), None, "case-sensitive");
    }

    #[test]
    fn code_round_trip() {
        // Every named code must map back to its own value within its type.
        for ty in [
            EventType::SYN,
            EventType::KEY,
            EventType::REL,
            EventType::ABS,
            EventType::MSC,
            EventType::SW,
            EventType::LED,
            EventType::SND,
            EventType::REP,
            EventType::FF,
        ] {
            let max = event_type_max(ty).unwrap_or(0x3);
            for code in 0..=max {
                let Some(name) = event_code_name(ty, code) else {
                    continue;
                };
                assert_eq!(event_code_from_name(ty, name), Some(code), "{name}");
            }
        }
    }

    #[test]
    fn code_tables_are_per_type() {
        assert_eq!(
            event_code_from_name(EventType::KEY, "KEY_A"),
            Some(Key::KEY_A.raw())
        );
        assert_eq!(event_code_from_name(EventType::REL, "KEY_A"), None);
        assert_eq!(
            event_code_from_name(EventType::ABS, "ABS_X"),
            Some(Abs::X.raw())
        );
        assert_eq!(event_code_from_name(EventType::PWR, "KEY_A"), None);
    }

    #[test]
    fn type_max() {
        assert_eq!(event_type_max(EventType::KEY), Some(0x2ff));
        assert_eq!(event_type_max(EventType::ABS), Some(0x3f));
        assert_eq!(event_type_max(EventType::REP), Some(0x01));
        assert_eq!(event_type_max(EventType::SYN), None);
        assert_eq!(event_type_max(EventType::from_raw(0x1f)), None);
    }

    #[test]
    fn properties() {
        assert_eq!(property_name(InputProp::DIRECT), Some("INPUT_PROP_DIRECT"));
        assert_eq!(
            property_from_name("INPUT_PROP_BUTTONPAD"),
            Some(InputProp::BUTTONPAD)
        );
        assert_eq!(property_from_name("INPUT_PROP_NOPE"), None);
    }

    #[test]
    fn alias_spellings() {
        assert_eq!(
            event_code_from_name(EventType::KEY, "BTN_A"),
            Some(Key::BTN_SOUTH.raw())
        );
        assert_eq!(
            event_code_name(EventType::KEY, Key::BTN_SOUTH.raw()),
            Some("BTN_SOUTH")
        );
    }
}
