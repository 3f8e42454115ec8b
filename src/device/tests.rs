use std::time::{Duration, SystemTime};

use crate::event::{
    AbsEvent, KeyEvent, KeyState, LedEvent, RelEvent, SwitchEvent, SynEvent,
};
use crate::test::check_events;

use super::*;

struct FakeKernel {
    events: VecDeque<InputEvent>,
    state: KernelState,
    now: libc::timeval,
}

impl FakeKernel {
    fn new() -> Self {
        Self {
            events: VecDeque::new(),
            state: KernelState::empty(),
            now: libc::timeval {
                tv_sec: 7,
                tv_usec: 0,
            },
        }
    }

    fn push(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.events.extend(events);
    }
}

impl KernelIo for FakeKernel {
    fn read_events(&mut self, dest: &mut [InputEvent]) -> io::Result<usize> {
        let mut n = 0;
        for slot in dest.iter_mut() {
            match self.events.pop_front() {
                Some(ev) => {
                    *slot = ev;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "no scripted events"));
        }
        Ok(n)
    }

    fn block_until_readable(&mut self) -> io::Result<()> {
        unreachable!("tests don't use blocking reads")
    }

    fn drain(&mut self) -> io::Result<()> {
        // The scripted "kernel buffer" is left alone so tests can continue
        // reading after a sync.
        Ok(())
    }

    fn kernel_state(&mut self, _spec: &StateSpec<'_>) -> io::Result<KernelState> {
        Ok(self.state.clone())
    }

    fn now(&mut self) -> libc::timeval {
        self.now
    }
}

fn keyboard() -> Device {
    let mut dev = Device::new();
    dev.enable_event_code(Key::KEY_A.into(), EnablePayload::None)
        .unwrap();
    dev.enable_event_code(Key::KEY_B.into(), EnablePayload::None)
        .unwrap();
    dev
}

/// Two-slot touchscreen tracking `ABS_MT_POSITION_X` and
/// `ABS_MT_TRACKING_ID`.
fn touchscreen() -> Device {
    let mut dev = Device::new();
    dev.enable_event_code(
        Abs::MT_SLOT.into(),
        EnablePayload::Abs(AbsInfo::new(0, 1)),
    )
    .unwrap();
    dev.enable_event_code(
        Abs::MT_POSITION_X.into(),
        EnablePayload::Abs(AbsInfo::new(0, 4000)),
    )
    .unwrap();
    dev.enable_event_code(
        Abs::MT_TRACKING_ID.into(),
        EnablePayload::Abs(AbsInfo::new(-1, 0xffff)),
    )
    .unwrap();
    dev
}

fn drain_sync(dev: &mut Device, io: &mut FakeKernel) -> Vec<InputEvent> {
    let mut out = Vec::new();
    loop {
        match dev.next_event_impl(io, ReadFlag::SYNC) {
            Ok((status, ev)) => {
                assert_eq!(status, ReadStatus::Sync);
                out.push(ev);
            }
            Err(Error::WouldBlock) => return out,
            Err(e) => panic!("unexpected error while draining sync: {e}"),
        }
    }
}

#[test]
fn keyboard_single_key() {
    let mut dev = keyboard();
    let mut io = FakeKernel::new();
    io.push([
        KeyEvent::new(Key::KEY_A, KeyState::PRESSED).into(),
        SynEvent::new(Syn::REPORT).into(),
    ]);

    let (status, ev) = dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    assert_eq!(status, ReadStatus::Success);
    assert!(ev.is_code(Key::KEY_A.into()));
    assert_eq!(ev.raw_value(), 1);
    assert_eq!(dev.event_value(Key::KEY_A.into()), 1);

    let (status, ev) = dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    assert_eq!(status, ReadStatus::Success);
    assert!(ev.is_code(EventCode::Syn(Syn::REPORT)));

    assert!(matches!(
        dev.next_event_impl(&mut io, ReadFlag::NORMAL),
        Err(Error::WouldBlock)
    ));
}

#[test]
fn value_shadowing() {
    let mut dev = Device::new();
    dev.enable_event_code(Led::CAPSL.into(), EnablePayload::None)
        .unwrap();
    dev.enable_event_code(Switch::LID.into(), EnablePayload::None)
        .unwrap();

    let mut io = FakeKernel::new();
    io.push([
        LedEvent::new(Led::CAPSL, true).into(),
        SwitchEvent::new(Switch::LID, true).into(),
        SynEvent::new(Syn::REPORT).into(),
    ]);

    for _ in 0..3 {
        dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    }
    assert_eq!(dev.event_value(Led::CAPSL.into()), 1);
    assert_eq!(dev.event_value(Switch::LID.into()), 1);
    assert_eq!(dev.fetch_event_value(Led::NUML.into()), None);
}

#[test]
fn dropped_triggers_sync_with_key_delta() {
    crate::test::init_logging();
    let mut dev = keyboard();
    dev.set_event_value(Key::KEY_A.into(), 1).unwrap();

    let mut io = FakeKernel::new();
    io.state.keys.insert(Key::KEY_B);

    let dropped = InputEvent::new(EventType::SYN, Syn::DROPPED.raw(), 0)
        .with_time(SystemTime::UNIX_EPOCH + Duration::from_secs(42));
    io.push([dropped]);

    let (status, ev) = dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    assert_eq!(status, ReadStatus::Sync);
    assert!(ev.is_code(EventCode::Syn(Syn::DROPPED)));

    let events = drain_sync(&mut dev, &mut io);
    check_events(
        events.iter().copied(),
        [
            KeyEvent::new(Key::KEY_A, KeyState::RELEASED).into(),
            KeyEvent::new(Key::KEY_B, KeyState::PRESSED).into(),
            SynEvent::new(Syn::REPORT).into(),
        ],
    );
    // Synthesized events carry the SYN_DROPPED timestamp.
    for ev in &events {
        assert_eq!(ev.timeval().tv_sec, 42);
    }

    // The shadow has caught up with the kernel snapshot.
    assert_eq!(dev.event_value(Key::KEY_A.into()), 0);
    assert_eq!(dev.event_value(Key::KEY_B.into()), 1);
}

#[test]
fn sync_advances_shadow_event_by_event() {
    let mut dev = keyboard();
    let mut io = FakeKernel::new();
    io.state.keys.insert(Key::KEY_A);
    io.state.keys.insert(Key::KEY_B);
    io.push([InputEvent::new(EventType::SYN, Syn::DROPPED.raw(), 0)]);

    dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();

    // Values advance as the queue drains, not when it is filled.
    assert_eq!(dev.event_value(Key::KEY_A.into()), 0);
    assert_eq!(dev.event_value(Key::KEY_B.into()), 0);

    let (_, ev) = dev.next_event_impl(&mut io, ReadFlag::SYNC).unwrap();
    assert!(ev.is_code(Key::KEY_A.into()));
    assert_eq!(dev.event_value(Key::KEY_A.into()), 1);
    assert_eq!(dev.event_value(Key::KEY_B.into()), 0);

    drain_sync(&mut dev, &mut io);
    assert_eq!(dev.event_value(Key::KEY_B.into()), 1);
}

#[test]
fn mt_slot_resync() {
    let mut dev = touchscreen();
    dev.set_slot_value(0u16, Abs::MT_POSITION_X, 100).unwrap();
    dev.set_slot_value(1u16, Abs::MT_TRACKING_ID, -1).unwrap();

    let mut io = FakeKernel::new();
    let mut fresh = SlotTable::new(2, vec![Abs::MT_POSITION_X, Abs::MT_TRACKING_ID]);
    fresh.set_value(Slot::from(0u8), Abs::MT_POSITION_X, 150);
    fresh.set_value(Slot::from(1u8), Abs::MT_TRACKING_ID, 17);
    fresh.set_value(Slot::from(1u8), Abs::MT_POSITION_X, 200);
    fresh.set_current(1);
    io.state.slots = Some(fresh);
    io.push([InputEvent::new(EventType::SYN, Syn::DROPPED.raw(), 0)]);

    let (status, _) = dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    assert_eq!(status, ReadStatus::Sync);

    check_events(
        drain_sync(&mut dev, &mut io),
        [
            AbsEvent::new(Abs::MT_SLOT, 0).into(),
            AbsEvent::new(Abs::MT_POSITION_X, 150).into(),
            AbsEvent::new(Abs::MT_SLOT, 1).into(),
            AbsEvent::new(Abs::MT_TRACKING_ID, 17).into(),
            AbsEvent::new(Abs::MT_POSITION_X, 200).into(),
            SynEvent::new(Syn::REPORT).into(),
        ],
    );

    assert_eq!(dev.slot_value(0u16, Abs::MT_POSITION_X), Some(150));
    assert_eq!(dev.slot_value(1u16, Abs::MT_POSITION_X), Some(200));
    assert_eq!(dev.slot_value(1u16, Abs::MT_TRACKING_ID), Some(17));
    assert_eq!(dev.current_slot(), Some(Slot::from(1u8)));
}

#[test]
fn forced_sync_always_produces_a_report() {
    let mut dev = keyboard();
    let mut io = FakeKernel::new();

    let (status, _) = dev
        .next_event_impl(&mut io, ReadFlag::FORCE_SYNC)
        .unwrap();
    assert_eq!(status, ReadStatus::Sync);

    let (status, ev) = dev.next_event_impl(&mut io, ReadFlag::SYNC).unwrap();
    assert_eq!(status, ReadStatus::Sync);
    assert!(ev.is_code(EventCode::Syn(Syn::REPORT)));
    assert_eq!(ev.timeval().tv_sec, 7, "forced sync is stamped with now()");

    assert!(matches!(
        dev.next_event_impl(&mut io, ReadFlag::SYNC),
        Err(Error::WouldBlock)
    ));
}

#[test]
fn abandoned_sync_fast_forwards() {
    let mut dev = keyboard();
    dev.set_event_value(Key::KEY_A.into(), 1).unwrap();

    let mut io = FakeKernel::new();
    io.state.keys.insert(Key::KEY_B);
    io.push([InputEvent::new(EventType::SYN, Syn::DROPPED.raw(), 0)]);

    let (status, _) = dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    assert_eq!(status, ReadStatus::Sync);
    assert!(!dev.queue.is_empty());

    // Going back to NORMAL without draining discards the queue and jumps the
    // shadow to the snapshot.
    assert!(matches!(
        dev.next_event_impl(&mut io, ReadFlag::NORMAL),
        Err(Error::WouldBlock)
    ));
    assert!(dev.queue.is_empty());
    assert_eq!(dev.mode, ReadMode::Normal);
    assert_eq!(dev.event_value(Key::KEY_A.into()), 0);
    assert_eq!(dev.event_value(Key::KEY_B.into()), 1);
}

#[test]
fn enable_then_query() {
    let mut dev = Device::new();
    dev.enable_event_code(
        Abs::X.into(),
        EnablePayload::Abs(AbsInfo::new(-100, 100).with_fuzz(2)),
    )
    .unwrap();

    assert!(dev.has_event_type(EventType::ABS));
    assert!(dev.has_event_code(Abs::X.into()));
    assert_eq!(dev.abs_minimum(Abs::X), -100);
    assert_eq!(dev.abs_maximum(Abs::X), 100);
    assert_eq!(dev.abs_fuzz(Abs::X), 2);
    assert_eq!(dev.event_value(Abs::X.into()), 0);

    // Scalar accessors report 0 for axes that don't exist.
    assert_eq!(dev.abs_minimum(Abs::Y), 0);
    assert_eq!(dev.abs_info(Abs::Y), None);
}

#[test]
fn disabled_codes_are_filtered() {
    let mut dev = keyboard();
    dev.enable_event_code(Rel::X.into(), EnablePayload::None)
        .unwrap();
    dev.disable_event_code(Rel::X.into()).unwrap();

    let mut io = FakeKernel::new();
    io.push([
        RelEvent::new(Rel::X, 3).into(),
        KeyEvent::new(Key::KEY_A, KeyState::PRESSED).into(),
    ]);

    // The disabled REL_X is skipped; the key event comes straight through.
    let (_, ev) = dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    assert!(ev.is_code(Key::KEY_A.into()));
}

#[test]
fn capability_consistency() {
    let mut dev = Device::new();
    dev.enable_event_code(Rel::WHEEL.into(), EnablePayload::None)
        .unwrap();

    assert!(dev.has_event_type(EventType::REL));
    assert!(dev.has_event_code(Rel::WHEEL.into()));

    // Disabling the type hides every code of that type.
    dev.disable_event_type(EventType::REL).unwrap();
    assert!(!dev.has_event_type(EventType::REL));
    assert!(!dev.has_event_code(Rel::WHEEL.into()));

    // Re-enabling the type brings the code bits back into view.
    dev.enable_event_type(EventType::REL).unwrap();
    assert!(dev.has_event_code(Rel::WHEEL.into()));
}

#[test]
fn syn_is_protected() {
    let mut dev = Device::new();
    assert!(matches!(
        dev.disable_event_type(EventType::SYN),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        dev.disable_event_code(EventCode::Syn(Syn::REPORT)),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn enable_payload_validation() {
    let mut dev = Device::new();
    assert!(matches!(
        dev.enable_event_code(Abs::X.into(), EnablePayload::None),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        dev.enable_event_code(
            Key::KEY_A.into(),
            EnablePayload::Abs(AbsInfo::new(0, 1))
        ),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        dev.enable_event_code(Repeat::DELAY.into(), EnablePayload::None),
        Err(Error::InvalidArgument(_))
    ));

    dev.enable_event_code(
        Repeat::DELAY.into(),
        EnablePayload::Repeat(KeyRepeat::new(250, 33)),
    )
    .unwrap();
    assert_eq!(dev.event_value(Repeat::DELAY.into()), 250);
    assert_eq!(dev.event_value(Repeat::PERIOD.into()), 33);
}

#[test]
fn set_event_value_does_not_clamp() {
    let mut dev = Device::new();
    dev.enable_event_code(Abs::X.into(), EnablePayload::Abs(AbsInfo::new(-100, 100)))
        .unwrap();

    // Caller writes bypass the range check; only event updates clamp.
    dev.set_event_value(Abs::X.into(), 500).unwrap();
    assert_eq!(dev.event_value(Abs::X.into()), 500);

    let mut io = FakeKernel::new();
    io.push([AbsEvent::new(Abs::X, 500).into()]);
    dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    assert_eq!(dev.event_value(Abs::X.into()), 100);
}

#[test]
fn slot_shadowing() {
    let mut dev = touchscreen();
    assert_eq!(dev.num_slots(), Some(2));

    let mut io = FakeKernel::new();
    io.push([
        AbsEvent::new(Abs::MT_SLOT, 1).into(),
        AbsEvent::new(Abs::MT_POSITION_X, 77).into(),
        SynEvent::new(Syn::REPORT).into(),
    ]);
    for _ in 0..3 {
        dev.next_event_impl(&mut io, ReadFlag::NORMAL).unwrap();
    }

    assert_eq!(dev.current_slot(), Some(Slot::from(1u8)));
    assert_eq!(dev.slot_value(1u16, Abs::MT_POSITION_X), Some(77));
    assert_eq!(dev.slot_value(0u16, Abs::MT_POSITION_X), Some(0));

    // MT codes don't answer through the scalar getters on a slotted device,
    // except ABS_MT_SLOT, which reports the selection.
    assert_eq!(dev.fetch_event_value(Abs::MT_POSITION_X.into()), None);
    assert_eq!(dev.event_value(Abs::MT_SLOT.into()), 1);
}

#[test]
fn slot_argument_validation() {
    let mut dev = touchscreen();
    assert!(matches!(
        dev.set_slot_value(2u16, Abs::MT_POSITION_X, 1),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        dev.set_slot_value(0u16, Abs::X, 1),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        dev.set_slot_value(0u16, Abs::MT_PRESSURE, 1),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(dev.slot_value(5u16, Abs::MT_POSITION_X), None);
}

#[test]
fn fake_mt_devices_have_no_slots() {
    let mut dev = Device::new();
    dev.enable_event_code(
        Abs::MT_SLOT.into(),
        EnablePayload::Abs(AbsInfo::new(0, 9)),
    )
    .unwrap();
    dev.enable_event_code(
        Abs::MT_POSITION_X.into(),
        EnablePayload::Abs(AbsInfo::new(0, 100)),
    )
    .unwrap();
    // The axis right below ABS_MT_SLOT marks the MT range as incidental.
    dev.enable_event_code(
        Abs::from_raw(Abs::MT_SLOT.raw() - 1).into(),
        EnablePayload::Abs(AbsInfo::new(0, 100)),
    )
    .unwrap();

    assert_eq!(dev.num_slots(), None);
    assert_eq!(dev.current_slot(), None);

    // MT axes behave like ordinary absolute axes with shared state.
    dev.set_event_value(Abs::MT_POSITION_X.into(), 55).unwrap();
    assert_eq!(dev.event_value(Abs::MT_POSITION_X.into()), 55);
}

#[test]
fn read_flag_validation() {
    let mut dev = keyboard();
    let mut io = FakeKernel::new();

    assert!(matches!(
        dev.next_event_impl(&mut io, ReadFlag::NORMAL | ReadFlag::SYNC),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        dev.next_event_impl(&mut io, ReadFlag::BLOCKING),
        Err(Error::InvalidArgument(_))
    ));

    // SYNC outside of sync mode has nothing to deliver.
    assert!(matches!(
        dev.next_event_impl(&mut io, ReadFlag::SYNC),
        Err(Error::WouldBlock)
    ));
}

#[test]
fn detached_operations_fail() {
    let mut dev = Device::new();
    assert!(matches!(
        dev.next_event(ReadFlag::NORMAL),
        Err(Error::NotAttached)
    ));
    assert!(matches!(dev.grab(GrabMode::Grab), Err(Error::NotAttached)));
    assert!(matches!(dev.has_event_pending(), Err(Error::NotAttached)));
    assert!(matches!(
        dev.change_descriptor(3),
        Err(Error::NotAttached)
    ));
    assert!(matches!(
        dev.kernel_set_abs_info(Abs::X, AbsInfo::new(0, 1)),
        Err(Error::NotAttached)
    ));
}

#[test]
fn identity_setters_are_local() {
    let mut dev = Device::new();
    dev.set_name("synthetic pad");
    dev.set_phys("test/phys0");
    dev.set_uniq("0123");
    dev.set_id_vendor(0x1234);
    dev.set_id_product(0x5678);
    dev.set_id_bustype(crate::Bus::USB);

    assert_eq!(dev.name(), "synthetic pad");
    assert_eq!(dev.phys(), Some("test/phys0"));
    assert_eq!(dev.uniq(), Some("0123"));
    assert_eq!(dev.input_id().vendor(), 0x1234);
    assert_eq!(dev.input_id().product(), 0x5678);
    assert_eq!(dev.input_id().bus(), crate::Bus::USB);
}

#[test]
fn led_batch_validates_before_writing() {
    let mut dev = Device::new();
    dev.enable_event_code(Led::NUML.into(), EnablePayload::None)
        .unwrap();

    // No descriptor: even a valid batch fails with NotAttached, an invalid
    // one with InvalidArgument is never reached without validation.
    assert!(matches!(
        dev.kernel_set_led_value(Led::NUML, LedValue::On),
        Err(Error::NotAttached)
    ));
}

#[test]
fn sync_queue_bound_covers_full_delta() {
    let dev = touchscreen();
    // 2 slots x 2 codes, plus one MT_SLOT per slot, the selection restore,
    // the abs codes, and the frame markers.
    let bound = dev.sync_queue_bound();
    assert!(bound >= 2 * 2 + 2 + 1 + 2, "bound {bound} too small");
}
