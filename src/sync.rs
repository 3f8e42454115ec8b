//! State shadowing and `SYN_DROPPED` recovery.
//!
//! [`DeviceState`] is the client-visible shadow of the kernel's device state.
//! It advances event-by-event as events are pulled through the reader. When
//! the kernel signals event loss, [`enqueue_delta`] compares the shadow
//! against a fresh [`KernelState`] snapshot and synthesizes the minimal event
//! sequence that carries the client from the stale state to the current one.

use std::collections::VecDeque;

use crate::{
    AbsInfo, KeyRepeat, Slot,
    bits::{BitSet, BitValue},
    event::{
        Abs, AbsEvent, EventKind, InputEvent, Key, KeyEvent, KeyState, Led, LedEvent, Repeat,
        Sound, SoundEvent, Switch, SwitchEvent, Syn, SynEvent,
    },
    slot::SlotTable,
};

pub(crate) const ABS_CODES: usize = Abs::MAX.raw() as usize + 1;

/// The crate's shadow of a device's dynamic state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeviceState {
    pub keys: BitSet<Key>,
    pub leds: BitSet<Led>,
    pub switches: BitSet<Switch>,
    pub sounds: BitSet<Sound>,
    /// Axis metadata and current value per `ABS_*` code. On slotted devices
    /// the entries above `ABS_MT_SLOT` are unused; their state lives in
    /// `slots`.
    pub abs: [AbsInfo; ABS_CODES],
    pub repeat: KeyRepeat,
    pub slots: Option<SlotTable>,
}

impl DeviceState {
    /// Creates an empty shadow: nothing pressed, all values zero, no slots.
    pub fn new() -> Self {
        Self {
            keys: BitSet::new(),
            leds: BitSet::new(),
            switches: BitSet::new(),
            sounds: BitSet::new(),
            abs: [AbsInfo::new(0, 0); ABS_CODES],
            repeat: KeyRepeat::default(),
            slots: None,
        }
    }

    /// Ingests one event, updating the shadow accordingly.
    ///
    /// Called for every event handed to the client, real or synthesized, at
    /// the moment it is handed out.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev.kind() {
            EventKind::Abs(ev) => {
                let abs = ev.abs();
                if let Some(slots) = &mut self.slots {
                    if abs == Abs::MT_SLOT {
                        slots.select(ev.value());
                        return;
                    }
                    if abs.is_mt() {
                        slots.apply(abs, ev.value());
                        return;
                    }
                }
                if (abs.raw() as usize) < ABS_CODES {
                    self.abs[abs.raw() as usize].set_clamped_value(ev.value());
                }
            }
            EventKind::Key(ev) => match ev.state() {
                KeyState::PRESSED => {
                    self.keys.insert(ev.key());
                }
                KeyState::RELEASED => {
                    self.keys.remove(ev.key());
                }
                // Repeats don't change the pressed state.
                _ => {}
            },
            EventKind::Led(ev) => self.leds.set(ev.led(), ev.is_on()),
            EventKind::Switch(ev) => self.switches.set(ev.switch(), ev.is_active()),
            EventKind::Sound(ev) => self.sounds.set(ev.sound(), ev.is_playing()),
            EventKind::Repeat(ev) => match ev.repeat() {
                Repeat::DELAY => self.repeat.delay = ev.value(),
                Repeat::PERIOD => self.repeat.period = ev.value(),
                _ => {}
            },
            EventKind::Syn(ev) => {
                // SYN_DROPPED terminates the interrupted frame just like
                // SYN_REPORT ends a complete one.
                if ev.syn() == Syn::REPORT || ev.syn() == Syn::DROPPED {
                    if let Some(slots) = &mut self.slots {
                        slots.end_frame();
                    }
                }
            }
            _ => {}
        }
    }

    /// Discards the shadow's dynamic state in favor of the snapshot.
    ///
    /// Used when the client abandons a sync mid-drain, and as the best-effort
    /// fallback when sync fails.
    pub fn fast_forward(&mut self, fresh: &KernelState) {
        self.keys = fresh.keys;
        self.leds = fresh.leds;
        self.switches = fresh.switches;
        self.sounds = fresh.sounds;
        for (info, value) in self.abs.iter_mut().zip(fresh.abs) {
            info.set_raw_value(value);
        }
        if let (Some(dst), Some(src)) = (&mut self.slots, &fresh.slots) {
            dst.clone_state_from(src);
        }
    }
}

/// A point-in-time snapshot of the kernel's view of a device, covering the
/// same state the shadow tracks (identity and capabilities excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KernelState {
    pub keys: BitSet<Key>,
    pub leds: BitSet<Led>,
    pub switches: BitSet<Switch>,
    pub sounds: BitSet<Sound>,
    /// Current value per `ABS_*` code; entries above `ABS_MT_SLOT` are only
    /// populated for devices without a slot table.
    pub abs: [i32; ABS_CODES],
    pub slots: Option<SlotTable>,
}

impl KernelState {
    pub fn empty() -> Self {
        Self {
            keys: BitSet::new(),
            leds: BitSet::new(),
            switches: BitSet::new(),
            sounds: BitSet::new(),
            abs: [0; ABS_CODES],
            slots: None,
        }
    }
}

/// Computes the delta between `state` and `fresh` and appends it to `queue`
/// as a sequence of synthesized events stamped with `time`.
///
/// The shadow is *not* modified here; it advances as the queued events are
/// drained through the reader, so that interleaved value queries observe the
/// state event-by-event.
///
/// With `force`, the terminating `SYN_REPORT` is emitted even when there is
/// no delta, so the queue is guaranteed to be non-empty afterwards.
pub(crate) fn enqueue_delta(
    state: &DeviceState,
    fresh: &KernelState,
    supported_abs: &BitSet<Abs>,
    time: libc::timeval,
    force: bool,
    queue: &mut VecDeque<InputEvent>,
) {
    let before = queue.len();

    fn diff_bits<V: BitValue>(old: &BitSet<V>, new: &BitSet<V>, mut emit: impl FnMut(V, bool)) {
        for value in old.symmetric_difference(new) {
            emit(value, new.contains(value));
        }
    }

    let mut emit = |ev: InputEvent| queue.push_back(ev.with_timeval(time));

    diff_bits(&state.keys, &fresh.keys, |key, down| {
        let st = if down {
            KeyState::PRESSED
        } else {
            KeyState::RELEASED
        };
        emit(KeyEvent::new(key, st).into());
    });
    diff_bits(&state.leds, &fresh.leds, |led, on| {
        emit(LedEvent::new(led, on).into());
    });
    diff_bits(&state.switches, &fresh.switches, |sw, on| {
        emit(SwitchEvent::new(sw, on).into());
    });
    diff_bits(&state.sounds, &fresh.sounds, |snd, playing| {
        emit(SoundEvent::new(snd, playing).into());
    });

    // Absolute axes. The kernel has already applied fuzz filtering; the
    // snapshot values are replayed as-is. On slotted devices the MT range is
    // covered by the slot diff below.
    for abs in supported_abs.iter() {
        if state.slots.is_some() && (abs.is_mt() || abs == Abs::MT_SLOT) {
            continue;
        }
        let old = state.abs[abs.raw() as usize].raw_value();
        let new = fresh.abs[abs.raw() as usize];
        if old != new {
            emit(AbsEvent::new(abs, new).into());
        }
    }

    if let (Some(old), Some(new)) = (&state.slots, &fresh.slots) {
        enqueue_slot_delta(old, new, &mut emit);
    }

    if queue.len() > before || force {
        log::debug!("sync injected {} events", queue.len() - before);
        let report: InputEvent = SynEvent::new(Syn::REPORT).into();
        queue.push_back(report.with_timeval(time));
    }
}

/// Emits per-slot deltas, then restores the kernel's selected slot.
///
/// Within a slot, `ABS_MT_TRACKING_ID` is ordered so that the synthesized
/// sequence stays a valid touch lifecycle: a new contact's id comes first, a
/// vanished contact's `-1` comes last.
fn enqueue_slot_delta(old: &SlotTable, new: &SlotTable, emit: &mut impl FnMut(InputEvent)) {
    // The slot selection the client will be left on once the queued events
    // are drained.
    let mut ending = old.current();

    for index in 0..old.num_slots() {
        let slot = Slot::from_raw(index as i32);
        let mut changed: Vec<(Abs, i32)> = Vec::new();
        for &code in old.codes() {
            if let (Some(o), Some(n)) = (old.value(slot, code), new.value(slot, code)) {
                if o != n {
                    changed.push((code, n));
                }
            }
        }
        if changed.is_empty() {
            continue;
        }

        if let Some(pos) = changed.iter().position(|(c, _)| *c == Abs::MT_TRACKING_ID) {
            let entry = changed.remove(pos);
            if entry.1 == -1 {
                // Touch ended: the tracking id terminates the slot's delta.
                changed.push(entry);
            } else if old.value(slot, Abs::MT_TRACKING_ID) == Some(-1) {
                // Touch began: announce the contact before its coordinates.
                changed.insert(0, entry);
            } else {
                changed.insert(pos.min(changed.len()), entry);
            }
        }

        emit(AbsEvent::new(Abs::MT_SLOT, index as i32).into());
        ending = index;
        for (code, value) in changed {
            emit(AbsEvent::new(code, value).into());
        }
    }

    if ending != new.current() {
        emit(AbsEvent::new(Abs::MT_SLOT, new.current() as i32).into());
    }
}

#[cfg(test)]
mod tests {
    use crate::test::check_events;

    use super::*;

    const T: libc::timeval = libc::timeval {
        tv_sec: 1,
        tv_usec: 500,
    };

    fn delta(state: &DeviceState, fresh: &KernelState, abs: &BitSet<Abs>) -> Vec<InputEvent> {
        let mut queue = VecDeque::new();
        enqueue_delta(state, fresh, abs, T, false, &mut queue);
        Vec::from(queue)
    }

    fn drain_into(state: &mut DeviceState, events: &[InputEvent]) {
        for ev in events {
            state.apply_event(*ev);
        }
    }

    #[test]
    fn key_delta() {
        let mut state = DeviceState::new();
        state.keys.insert(Key::KEY_A);

        let mut fresh = KernelState::empty();
        fresh.keys.insert(Key::KEY_B);

        let events = delta(&state, &fresh, &BitSet::new());
        check_events(
            events.iter().copied(),
            [
                KeyEvent::new(Key::KEY_A, KeyState::RELEASED).into(),
                KeyEvent::new(Key::KEY_B, KeyState::PRESSED).into(),
                SynEvent::new(Syn::REPORT).into(),
            ],
        );
        for ev in &events {
            assert_eq!(ev.timeval().tv_sec, T.tv_sec);
            assert_eq!(ev.timeval().tv_usec, T.tv_usec);
        }

        // Draining the queue brings the shadow to the snapshot.
        drain_into(&mut state, &events);
        assert_eq!(state.keys, fresh.keys);
    }

    #[test]
    fn abs_delta_skips_unchanged() {
        let mut state = DeviceState::new();
        state.abs[Abs::X.raw() as usize] = AbsInfo::new(0, 200).with_raw_value(100);
        state.abs[Abs::Y.raw() as usize] = AbsInfo::new(0, 200).with_raw_value(50);

        let mut fresh = KernelState::empty();
        fresh.abs[Abs::X.raw() as usize] = 150;
        fresh.abs[Abs::Y.raw() as usize] = 50;

        let abs = BitSet::from_iter([Abs::X, Abs::Y]);
        check_events(
            delta(&state, &fresh, &abs),
            [
                AbsEvent::new(Abs::X, 150).into(),
                SynEvent::new(Syn::REPORT).into(),
            ],
        );
    }

    #[test]
    fn idempotent_once_drained() {
        let mut state = DeviceState::new();
        let mut fresh = KernelState::empty();
        fresh.keys.insert(Key::KEY_Q);
        fresh.switches.insert(Switch::LID);

        let events = delta(&state, &fresh, &BitSet::new());
        assert_eq!(events.len(), 3);
        drain_into(&mut state, &events);

        // A second pass over identical kernel state yields nothing, and only
        // the terminating SYN_REPORT when forced.
        assert!(delta(&state, &fresh, &BitSet::new()).is_empty());

        let mut queue = VecDeque::new();
        enqueue_delta(&state, &fresh, &BitSet::new(), T, true, &mut queue);
        check_events(Vec::from(queue), [SynEvent::new(Syn::REPORT).into()]);
    }

    #[test]
    fn slot_delta_orders_tracking_ids() {
        let codes = vec![Abs::MT_POSITION_X, Abs::MT_TRACKING_ID];
        let mut old = SlotTable::new(2, codes.clone());
        old.set_value(Slot::from(0u8), Abs::MT_POSITION_X, 100);
        old.set_value(Slot::from(0u8), Abs::MT_TRACKING_ID, 3);
        old.set_value(Slot::from(1u8), Abs::MT_TRACKING_ID, -1);

        let mut new = SlotTable::new(2, codes);
        new.set_value(Slot::from(0u8), Abs::MT_POSITION_X, 150);
        new.set_value(Slot::from(0u8), Abs::MT_TRACKING_ID, 3);
        new.set_value(Slot::from(1u8), Abs::MT_TRACKING_ID, 17);
        new.set_value(Slot::from(1u8), Abs::MT_POSITION_X, 200);
        new.set_current(1);

        let mut state = DeviceState::new();
        state.slots = Some(old);
        let mut fresh = KernelState::empty();
        fresh.slots = Some(new);

        let events = delta(&state, &fresh, &BitSet::new());
        check_events(
            events.iter().copied(),
            [
                AbsEvent::new(Abs::MT_SLOT, 0).into(),
                AbsEvent::new(Abs::MT_POSITION_X, 150).into(),
                AbsEvent::new(Abs::MT_SLOT, 1).into(),
                // The new contact is announced before its coordinates.
                AbsEvent::new(Abs::MT_TRACKING_ID, 17).into(),
                AbsEvent::new(Abs::MT_POSITION_X, 200).into(),
                SynEvent::new(Syn::REPORT).into(),
            ],
        );

        drain_into(&mut state, &events);
        assert_eq!(state.slots, fresh.slots);
    }

    #[test]
    fn slot_delta_ends_touches_last() {
        let codes = vec![Abs::MT_POSITION_X, Abs::MT_TRACKING_ID];
        let mut old = SlotTable::new(1, codes.clone());
        old.set_value(Slot::from(0u8), Abs::MT_TRACKING_ID, 5);
        old.set_value(Slot::from(0u8), Abs::MT_POSITION_X, 10);

        let mut new = SlotTable::new(1, codes);
        new.set_value(Slot::from(0u8), Abs::MT_TRACKING_ID, -1);
        new.set_value(Slot::from(0u8), Abs::MT_POSITION_X, 11);

        let mut state = DeviceState::new();
        state.slots = Some(old);
        let mut fresh = KernelState::empty();
        fresh.slots = Some(new);

        check_events(
            delta(&state, &fresh, &BitSet::new()),
            [
                AbsEvent::new(Abs::MT_SLOT, 0).into(),
                AbsEvent::new(Abs::MT_POSITION_X, 11).into(),
                AbsEvent::new(Abs::MT_TRACKING_ID, -1).into(),
                SynEvent::new(Syn::REPORT).into(),
            ],
        );
    }

    #[test]
    fn slot_delta_restores_selection() {
        let codes = vec![Abs::MT_POSITION_X];
        let mut old = SlotTable::new(3, codes.clone());
        old.set_current(2);
        let mut new = SlotTable::new(3, codes);
        new.set_value(Slot::from(0u8), Abs::MT_POSITION_X, 4);
        new.set_current(2);

        let mut state = DeviceState::new();
        state.slots = Some(old);
        let mut fresh = KernelState::empty();
        fresh.slots = Some(new);

        // The delta leaves the client on slot 0, so the kernel's selection
        // (slot 2) has to be restored explicitly.
        let events = delta(&state, &fresh, &BitSet::new());
        check_events(
            events.iter().copied(),
            [
                AbsEvent::new(Abs::MT_SLOT, 0).into(),
                AbsEvent::new(Abs::MT_POSITION_X, 4).into(),
                AbsEvent::new(Abs::MT_SLOT, 2).into(),
                SynEvent::new(Syn::REPORT).into(),
            ],
        );

        drain_into(&mut state, &events);
        assert_eq!(state.slots, fresh.slots);
    }

    #[test]
    fn fast_forward_matches_drain() {
        let mut state = DeviceState::new();
        state.keys.insert(Key::KEY_A);
        state.abs[Abs::X.raw() as usize] = AbsInfo::new(0, 100).with_raw_value(7);

        let mut fresh = KernelState::empty();
        fresh.keys.insert(Key::KEY_B);
        fresh.abs[Abs::X.raw() as usize] = 70;

        let abs = BitSet::from_iter([Abs::X]);
        let mut drained = state.clone();
        drain_into(&mut drained, &delta(&state, &fresh, &abs));

        state.fast_forward(&fresh);
        assert_eq!(state, drained);
    }

    #[test]
    fn event_application_clamps_abs() {
        let mut state = DeviceState::new();
        state.abs[Abs::X.raw() as usize] = AbsInfo::new(-100, 100);

        state.apply_event(AbsEvent::new(Abs::X, 5000).into());
        assert_eq!(state.abs[Abs::X.raw() as usize].raw_value(), 100);
        state.apply_event(AbsEvent::new(Abs::X, -5000).into());
        assert_eq!(state.abs[Abs::X.raw() as usize].raw_value(), -100);
    }

    #[test]
    fn repeat_events_update_settings() {
        let mut state = DeviceState::new();
        state.apply_event(crate::event::RepeatEvent::new(Repeat::DELAY, 250).into());
        state.apply_event(crate::event::RepeatEvent::new(Repeat::PERIOD, 33).into());
        assert_eq!(state.repeat, KeyRepeat::new(250, 33));
    }
}
