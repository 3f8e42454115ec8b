//! The device model and its event reader.

#[cfg(test)]
mod tests;

use std::{
    collections::VecDeque,
    error,
    ffi::{c_char, c_int, c_uint, c_void},
    fmt, io,
    mem::MaybeUninit,
    os::fd::{BorrowedFd, RawFd},
    slice,
    time::Instant,
};

use linux_ioctl::Ioctl;

use crate::{
    AbsInfo, InputId, KeyRepeat, Slot, Version,
    bits::{BitSet, BitValue, BitValueImpl, Word},
    error::{Error, Result},
    event::{
        Abs, EventCode, EventType, Ff, InputEvent, InputProp, Key, Led, Misc, Rel, Repeat, Sound,
        Switch, Syn,
    },
    raw::input::{
        EVIOCGABS, EVIOCGBIT, EVIOCGID, EVIOCGKEY, EVIOCGLED, EVIOCGMTSLOTS, EVIOCGNAME,
        EVIOCGPHYS, EVIOCGPROP, EVIOCGRAB, EVIOCGREP, EVIOCGSND, EVIOCGSW, EVIOCGUNIQ,
        EVIOCGVERSION, EVIOCSABS, EVIOCSCLOCKID,
    },
    slot::{SLOT_SYNC_CAP, SlotTable},
    sync::{self, DeviceState, KernelState},
    util,
};

bitflags::bitflags! {
    /// Flags controlling [`Device::next_event`].
    ///
    /// Exactly one of [`NORMAL`][Self::NORMAL], [`SYNC`][Self::SYNC], and
    /// [`FORCE_SYNC`][Self::FORCE_SYNC] must be set;
    /// [`BLOCKING`][Self::BLOCKING] composes with any of them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReadFlag: u32 {
        /// Process events in their normal order.
        const NORMAL = 1 << 0;
        /// Drain events synthesized by sync recovery.
        const SYNC = 1 << 1;
        /// Re-synchronize with the kernel state right now, as if a
        /// `SYN_DROPPED` had been received.
        const FORCE_SYNC = 1 << 2;
        /// Wait for an event instead of reporting
        /// [`Error::WouldBlock`], even on a non-blocking descriptor.
        const BLOCKING = 1 << 3;
    }
}

/// Outcome of a successful [`Device::next_event`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// A regular device event.
    Success,
    /// Sync recovery is in progress; the event is either the triggering
    /// `SYN_DROPPED` or a synthesized delta event.
    Sync,
}

/// The clock event timestamps are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockId {
    /// The wall clock, as used by `SystemTime::now`. The kernel default.
    #[default]
    Realtime,
    /// The monotonic clock; immune to wall-clock adjustments.
    Monotonic,
}

impl ClockId {
    fn raw(self) -> libc::clockid_t {
        match self {
            ClockId::Realtime => libc::CLOCK_REALTIME,
            ClockId::Monotonic => libc::CLOCK_MONOTONIC,
        }
    }
}

/// Whether a device is held exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    /// Release the exclusive hold.
    Ungrab,
    /// Hold the device exclusively; other readers stop receiving its events.
    Grab,
}

/// Target state for a device LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedValue {
    Off,
    On,
}

/// Per-type payload for [`Device::enable_event_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnablePayload {
    /// For codes that carry no metadata.
    None,
    /// Axis metadata, required when enabling an [`Abs`] code.
    Abs(AbsInfo),
    /// Autorepeat settings, required when enabling a [`Repeat`] code.
    Repeat(KeyRepeat),
}

/// The reader's mode: normal streaming, or draining a sync delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    Normal,
    Sync,
}

/// The crate's shadow of one evdev device.
///
/// A [`Device`] starts out empty and detached. Its identity and capabilities
/// can be populated by hand (via the `set_*` and `enable_*` methods) or, more
/// commonly, probed from a kernel device with [`Device::attach`].
///
/// The descriptor stays owned by the caller: the crate never closes it, and
/// it must outlive the attachment. Reading events without blocking requires
/// the caller to have put the descriptor into non-blocking mode (or passing
/// [`ReadFlag::BLOCKING`]).
///
/// A [`Device`] is not internally synchronized; concurrent use from several
/// threads requires external serialization.
pub struct Device {
    fd: Option<RawFd>,

    // identity
    name: String,
    phys: Option<String>,
    uniq: Option<String>,
    id: InputId,
    driver_version: Version,

    // capabilities
    props: BitSet<InputProp>,
    types: BitSet<EventType>,
    keys: BitSet<Key>,
    rels: BitSet<Rel>,
    abs: BitSet<Abs>,
    miscs: BitSet<Misc>,
    switches: BitSet<Switch>,
    leds: BitSet<Led>,
    sounds: BitSet<Sound>,
    ffs: BitSet<Ff>,

    // dynamic state
    state: DeviceState,

    clock: ClockId,
    grabbed: bool,

    // reader
    mode: ReadMode,
    queue: VecDeque<InputEvent>,
    /// The kernel snapshot backing the queued sync delta; used to fast-forward
    /// when the client abandons the sync.
    pending: Option<KernelState>,
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("fd", &self.fd)
            .field("name", &self.name)
            .field("id", &self.id)
            .field("types", &self.types)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Device {
    /// Creates an empty, detached device model.
    pub fn new() -> Self {
        Self {
            fd: None,
            name: String::new(),
            phys: None,
            uniq: None,
            id: InputId::default(),
            driver_version: Version::default(),
            props: BitSet::new(),
            types: BitSet::new(),
            keys: BitSet::new(),
            rels: BitSet::new(),
            abs: BitSet::new(),
            miscs: BitSet::new(),
            switches: BitSet::new(),
            leds: BitSet::new(),
            sounds: BitSet::new(),
            ffs: BitSet::new(),
            state: DeviceState::new(),
            clock: ClockId::Realtime,
            grabbed: false,
            mode: ReadMode::Normal,
            queue: VecDeque::new(),
            pending: None,
        }
    }

    fn fd(&self) -> Result<RawFd> {
        self.fd.ok_or(Error::NotAttached)
    }

    /// Returns the attached file descriptor, if any.
    pub fn descriptor(&self) -> Option<RawFd> {
        self.fd
    }

    /// Probes `fd` and populates the model from the kernel's answers.
    ///
    /// The descriptor must refer to an evdev character device; it is probed
    /// exactly once. Identity and capabilities set on the model beforehand
    /// are overwritten.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyAttached`] if the model already has a descriptor.
    /// - [`Error::NotEvdev`] if the version ioctl is not understood.
    /// - [`Error::Io`] for any other probe failure; the model is left
    ///   detached and unchanged.
    pub fn attach(&mut self, fd: RawFd) -> Result<()> {
        if self.fd.is_some() {
            return Err(Error::AlreadyAttached);
        }

        let mut version = 0;
        if let Err(e) = unsafe { ioctl(fd, "EVIOCGVERSION", EVIOCGVERSION, &mut version) } {
            return Err(Error::NotEvdev(e));
        }
        let driver_version = Version(version);

        let id = unsafe {
            let mut out = MaybeUninit::uninit();
            ioctl(fd, "EVIOCGID", EVIOCGID, out.as_mut_ptr())?;
            InputId(out.assume_init())
        };
        let name = unsafe { fetch_string(fd, "EVIOCGNAME", EVIOCGNAME)? };
        let phys = unsafe { fetch_optional_string(fd, "EVIOCGPHYS", EVIOCGPHYS)? };
        let uniq = unsafe { fetch_optional_string(fd, "EVIOCGUNIQ", EVIOCGUNIQ)? };

        // A kernel without the property ioctl simply has no properties.
        let props = match unsafe { fetch_bits::<InputProp>(fd, "EVIOCGPROP", EVIOCGPROP) } {
            Ok(props) => props,
            Err(e) if is_missing_ioctl(&e) => BitSet::new(),
            Err(e) => return Err(e.into()),
        };

        let types =
            unsafe { fetch_bits::<EventType>(fd, "EVIOCGBIT", |len| EVIOCGBIT(0, len))? };
        let keys = unsafe { fetch_code_bits::<Key>(fd, &types, EventType::KEY)? };
        let rels = unsafe { fetch_code_bits::<Rel>(fd, &types, EventType::REL)? };
        let abs = unsafe { fetch_code_bits::<Abs>(fd, &types, EventType::ABS)? };
        let miscs = unsafe { fetch_code_bits::<Misc>(fd, &types, EventType::MSC)? };
        let switches = unsafe { fetch_code_bits::<Switch>(fd, &types, EventType::SW)? };
        let leds = unsafe { fetch_code_bits::<Led>(fd, &types, EventType::LED)? };
        let sounds = unsafe { fetch_code_bits::<Sound>(fd, &types, EventType::SND)? };
        let ffs = unsafe { fetch_code_bits::<Ff>(fd, &types, EventType::FF)? };

        let mut state = DeviceState::new();
        for code in abs.iter() {
            state.abs[code.raw() as usize] = unsafe {
                let mut out = MaybeUninit::uninit();
                ioctl(fd, "EVIOCGABS", EVIOCGABS(code.raw() as u8), out.as_mut_ptr())?;
                AbsInfo(out.assume_init())
            };
        }

        state.keys = unsafe { fetch_bits(fd, "EVIOCGKEY", EVIOCGKEY)? };
        state.leds = unsafe { fetch_bits(fd, "EVIOCGLED", EVIOCGLED)? };
        state.sounds = unsafe { fetch_bits(fd, "EVIOCGSND", EVIOCGSND)? };
        state.switches = unsafe { fetch_bits(fd, "EVIOCGSW", EVIOCGSW)? };

        if types.contains(EventType::REP) {
            let mut rep = [0 as c_uint; 2];
            match unsafe { ioctl(fd, "EVIOCGREP", EVIOCGREP, &mut rep) } {
                Ok(_) => state.repeat = KeyRepeat::new(rep[0] as u32, rep[1] as u32),
                Err(e) if is_missing_ioctl(&e) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if abs.contains(Abs::MT_SLOT) && !is_fake_mt(&abs) {
            let info = state.abs[Abs::MT_SLOT.raw() as usize];
            if info.minimum() != 0 {
                log::warn!("`ABS_MT_SLOT` has a non-0 minimum: {info:?}");
            }
            if info.maximum() >= SLOT_SYNC_CAP {
                log::warn!(
                    "device reports {} slots, tracking only the first {SLOT_SYNC_CAP}",
                    info.maximum() + 1,
                );
            }
            let num_slots = info.maximum().saturating_add(1).clamp(0, SLOT_SYNC_CAP) as u32;
            let codes: Vec<Abs> = abs.iter().filter(|c| c.is_mt()).collect();
            let mut table = SlotTable::new(num_slots, codes);
            fill_slot_values(fd, &mut table)?;
            if num_slots > 0 {
                table.set_current(info.value().clamp(0, num_slots as i32 - 1) as u32);
            }
            state.slots = Some(table);
        }

        if self.clock != ClockId::Realtime {
            let id: c_int = self.clock.raw();
            match unsafe { ioctl(fd, "EVIOCSCLOCKID", EVIOCSCLOCKID, &id) } {
                Ok(_) => {}
                Err(e) if is_missing_ioctl(&e) => return Err(Error::NotSupported),
                Err(e) => return Err(e.into()),
            }
        }

        // Commit. Everything above only touched locals.
        self.driver_version = driver_version;
        self.id = id;
        self.name = name;
        self.phys = phys;
        self.uniq = uniq;
        self.props = props;
        self.types = types;
        self.keys = keys;
        self.rels = rels;
        self.abs = abs;
        self.miscs = miscs;
        self.switches = switches;
        self.leds = leds;
        self.sounds = sounds;
        self.ffs = ffs;
        self.state = state;
        self.fd = Some(fd);
        self.mode = ReadMode::Normal;
        self.queue = VecDeque::with_capacity(self.sync_queue_bound());
        self.pending = None;

        log::debug!(
            "attached '{}' ({:?}), driver version {}",
            self.name,
            self.id,
            self.driver_version,
        );
        Ok(())
    }

    /// Swaps the attached descriptor for `fd` without re-probing.
    ///
    /// Intended for reopening the same device (e.g. with different access
    /// mode). The cached capabilities, state, and grab bookkeeping are kept;
    /// if `fd` refers to a *different* device, the shadow is garbage until
    /// the next sync.
    pub fn change_descriptor(&mut self, fd: RawFd) -> Result<()> {
        if self.fd.is_none() {
            return Err(Error::NotAttached);
        }
        self.fd = Some(fd);
        Ok(())
    }

    /// Derived capacity bound for the sync queue: every supported stateful
    /// code, every tracked slot value, the slot selection events, and the
    /// frame markers.
    fn sync_queue_bound(&self) -> usize {
        let scalar =
            self.keys.len() + self.leds.len() + self.switches.len() + self.sounds.len();
        let abs = self.abs.len();
        let slots = match &self.state.slots {
            Some(t) => t.num_slots() as usize * (t.codes().len() + 1) + 1,
            None => 0,
        };
        scalar + abs + slots + 2
    }
}

/// Identity accessors.
impl Device {
    /// Returns the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overrides the device name in the model.
    ///
    /// Caller-local; overwritten by [`Device::attach`].
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// Returns the physical location string, if the device reports one.
    pub fn phys(&self) -> Option<&str> {
        self.phys.as_deref()
    }

    /// Overrides the physical location in the model.
    pub fn set_phys(&mut self, phys: &str) {
        self.phys = Some(phys.to_owned());
    }

    /// Returns the unique identifier, if the device reports one.
    pub fn uniq(&self) -> Option<&str> {
        self.uniq.as_deref()
    }

    /// Overrides the unique identifier in the model.
    pub fn set_uniq(&mut self, uniq: &str) {
        self.uniq = Some(uniq.to_owned());
    }

    /// Returns the hardware identity (bus, vendor, product, version).
    pub fn input_id(&self) -> InputId {
        self.id
    }

    /// Overrides the hardware identity in the model.
    pub fn set_input_id(&mut self, id: InputId) {
        self.id = id;
    }

    pub fn set_id_bustype(&mut self, bus: crate::Bus) {
        self.id.set_bus(bus);
    }
    pub fn set_id_vendor(&mut self, vendor: u16) {
        self.id.set_vendor(vendor);
    }
    pub fn set_id_product(&mut self, product: u16) {
        self.id.set_product(product);
    }
    pub fn set_id_version(&mut self, version: u16) {
        self.id.set_version(version);
    }

    /// Returns the evdev subsystem version reported at attach time.
    pub fn driver_version(&self) -> Version {
        self.driver_version
    }
}

/// Capability queries and caller-local mutations.
impl Device {
    /// Returns whether the device advertises `prop`.
    pub fn has_property(&self, prop: InputProp) -> bool {
        self.props.contains(prop)
    }

    /// Marks `prop` as present on the model. Caller-local.
    pub fn enable_property(&mut self, prop: InputProp) -> Result<()> {
        if prop.raw() > InputProp::MAX.raw() {
            return Err(Error::InvalidArgument("property out of range"));
        }
        self.props.insert(prop);
        Ok(())
    }

    /// Returns whether the device supports events of type `ty`.
    pub fn has_event_type(&self, ty: EventType) -> bool {
        self.types.contains(ty)
    }

    /// Returns whether the device supports the given event code.
    ///
    /// A code only counts as supported while its event type does: disabling
    /// the type hides every code of that type.
    pub fn has_event_code(&self, code: EventCode) -> bool {
        if !self.has_event_type(code.event_type()) {
            return false;
        }
        match code {
            // The SYN codes exist on every device with EV_SYN.
            EventCode::Syn(_) => true,
            EventCode::Key(c) => self.keys.contains(c),
            EventCode::Rel(c) => self.rels.contains(c),
            EventCode::Abs(c) => self.abs.contains(c),
            EventCode::Misc(c) => self.miscs.contains(c),
            EventCode::Switch(c) => self.switches.contains(c),
            EventCode::Led(c) => self.leds.contains(c),
            EventCode::Sound(c) => self.sounds.contains(c),
            EventCode::Repeat(c) => c.raw() <= Repeat::MAX.raw(),
            EventCode::Ff(c) => self.ffs.contains(c),
        }
    }

    /// Marks an event type as supported. Caller-local.
    pub fn enable_event_type(&mut self, ty: EventType) -> Result<()> {
        if ty.raw() > EventType::MAX.raw() {
            return Err(Error::InvalidArgument("event type out of range"));
        }
        self.types.insert(ty);
        Ok(())
    }

    /// Removes an event type and hides all of its codes. Caller-local.
    ///
    /// [`EventType::SYN`] structures the stream itself and cannot be
    /// disabled.
    pub fn disable_event_type(&mut self, ty: EventType) -> Result<()> {
        if ty == EventType::SYN {
            return Err(Error::InvalidArgument("EV_SYN cannot be disabled"));
        }
        if ty.raw() > EventType::MAX.raw() {
            return Err(Error::InvalidArgument("event type out of range"));
        }
        self.types.remove(ty);
        Ok(())
    }

    /// Marks an event code as supported, implicitly enabling its type.
    /// Caller-local.
    ///
    /// [`Abs`] codes require [`EnablePayload::Abs`] carrying the axis
    /// metadata, [`Repeat`] codes require [`EnablePayload::Repeat`], all
    /// other codes take [`EnablePayload::None`].
    pub fn enable_event_code(&mut self, code: EventCode, payload: EnablePayload) -> Result<()> {
        match (code, payload) {
            (EventCode::Abs(c), EnablePayload::Abs(info)) => {
                if c.raw() > Abs::MAX.raw() {
                    return Err(Error::InvalidArgument("ABS code out of range"));
                }
                self.types.insert(EventType::ABS);
                self.abs.insert(c);
                self.state.abs[c.raw() as usize] = info;
                self.rebuild_slot_table();
                Ok(())
            }
            (EventCode::Repeat(c), EnablePayload::Repeat(rep)) => {
                if c.raw() > Repeat::MAX.raw() {
                    return Err(Error::InvalidArgument("REP code out of range"));
                }
                self.types.insert(EventType::REP);
                self.state.repeat = rep;
                Ok(())
            }
            (EventCode::Abs(_), _) => {
                Err(Error::InvalidArgument("enabling an ABS code requires axis metadata"))
            }
            (EventCode::Repeat(_), _) => {
                Err(Error::InvalidArgument("enabling a REP code requires repeat settings"))
            }
            (_, EnablePayload::Abs(_) | EnablePayload::Repeat(_)) => {
                Err(Error::InvalidArgument("payload not applicable to this code"))
            }
            (code, EnablePayload::None) => {
                let ok = match code {
                    EventCode::Syn(_) => true,
                    EventCode::Key(c) => try_insert(&mut self.keys, c),
                    EventCode::Rel(c) => try_insert(&mut self.rels, c),
                    EventCode::Misc(c) => try_insert(&mut self.miscs, c),
                    EventCode::Switch(c) => try_insert(&mut self.switches, c),
                    EventCode::Led(c) => try_insert(&mut self.leds, c),
                    EventCode::Sound(c) => try_insert(&mut self.sounds, c),
                    EventCode::Ff(c) => try_insert(&mut self.ffs, c),
                    EventCode::Abs(_) | EventCode::Repeat(_) => unreachable!(),
                };
                if !ok {
                    return Err(Error::InvalidArgument("event code out of range"));
                }
                self.types.insert(code.event_type());
                Ok(())
            }
        }
    }

    /// Removes an event code from the model. Caller-local.
    ///
    /// Events for disabled codes are silently dropped by the reader.
    /// `SYN` codes cannot be disabled.
    pub fn disable_event_code(&mut self, code: EventCode) -> Result<()> {
        match code {
            EventCode::Syn(_) => Err(Error::InvalidArgument("SYN codes cannot be disabled")),
            EventCode::Key(c) => try_remove(&mut self.keys, c),
            EventCode::Rel(c) => try_remove(&mut self.rels, c),
            EventCode::Abs(c) => {
                try_remove(&mut self.abs, c)?;
                self.rebuild_slot_table();
                Ok(())
            }
            EventCode::Misc(c) => try_remove(&mut self.miscs, c),
            EventCode::Switch(c) => try_remove(&mut self.switches, c),
            EventCode::Led(c) => try_remove(&mut self.leds, c),
            EventCode::Sound(c) => try_remove(&mut self.sounds, c),
            EventCode::Ff(c) => try_remove(&mut self.ffs, c),
            EventCode::Repeat(_) => Err(Error::InvalidArgument(
                "REP codes have no individual capability bit; disable EV_REP instead",
            )),
        }
    }

    /// Rebuilds the slot table after a caller-local change to the `ABS`
    /// capabilities. Previously tracked per-slot values are reset.
    fn rebuild_slot_table(&mut self) {
        if !self.abs.contains(Abs::MT_SLOT) || is_fake_mt(&self.abs) {
            self.state.slots = None;
            return;
        }
        let info = self.state.abs[Abs::MT_SLOT.raw() as usize];
        let num_slots = info.maximum().saturating_add(1).clamp(0, SLOT_SYNC_CAP) as u32;
        let codes: Vec<Abs> = self.abs.iter().filter(|c| c.is_mt()).collect();
        let mut table = SlotTable::new(num_slots, codes);
        if num_slots > 0 {
            table.set_current(info.value().clamp(0, num_slots as i32 - 1) as u32);
        }
        self.state.slots = Some(table);
    }
}

/// Axis metadata.
impl Device {
    /// Returns the [`AbsInfo`] of `abs`, or [`None`] iff the code isn't
    /// supported.
    pub fn abs_info(&self, abs: Abs) -> Option<AbsInfo> {
        if !self.has_event_code(abs.into()) {
            return None;
        }
        Some(self.state.abs[abs.raw() as usize])
    }

    /// Returns the minimum of `abs`, or 0 when the axis isn't supported.
    pub fn abs_minimum(&self, abs: Abs) -> i32 {
        self.abs_info(abs).map_or(0, |i| i.minimum())
    }

    /// Returns the maximum of `abs`, or 0 when the axis isn't supported.
    pub fn abs_maximum(&self, abs: Abs) -> i32 {
        self.abs_info(abs).map_or(0, |i| i.maximum())
    }

    /// Returns the fuzz of `abs`, or 0 when the axis isn't supported.
    pub fn abs_fuzz(&self, abs: Abs) -> i32 {
        self.abs_info(abs).map_or(0, |i| i.fuzz())
    }

    /// Returns the flat of `abs`, or 0 when the axis isn't supported.
    pub fn abs_flat(&self, abs: Abs) -> i32 {
        self.abs_info(abs).map_or(0, |i| i.flat())
    }

    /// Returns the resolution of `abs`, or 0 when the axis isn't supported.
    pub fn abs_resolution(&self, abs: Abs) -> i32 {
        self.abs_info(abs).map_or(0, |i| i.resolution())
    }

    /// Replaces the [`AbsInfo`] of `abs` in the model.
    ///
    /// Caller-local, and a silent no-op when the axis isn't supported
    /// (matching the historical contract of the C library).
    pub fn set_abs_info(&mut self, abs: Abs, info: AbsInfo) {
        if self.has_event_code(abs.into()) {
            self.state.abs[abs.raw() as usize] = info;
        }
    }

    pub fn set_abs_minimum(&mut self, abs: Abs, minimum: i32) {
        self.update_abs(abs, |i| i.0.minimum = minimum);
    }
    pub fn set_abs_maximum(&mut self, abs: Abs, maximum: i32) {
        self.update_abs(abs, |i| i.0.maximum = maximum);
    }
    pub fn set_abs_fuzz(&mut self, abs: Abs, fuzz: i32) {
        self.update_abs(abs, |i| i.0.fuzz = fuzz);
    }
    pub fn set_abs_flat(&mut self, abs: Abs, flat: i32) {
        self.update_abs(abs, |i| i.0.flat = flat);
    }
    pub fn set_abs_resolution(&mut self, abs: Abs, resolution: i32) {
        self.update_abs(abs, |i| i.0.resolution = resolution);
    }

    fn update_abs(&mut self, abs: Abs, f: impl FnOnce(&mut AbsInfo)) {
        if self.has_event_code(abs.into()) {
            f(&mut self.state.abs[abs.raw() as usize]);
        }
    }

    /// Writes new axis metadata into the kernel via `EVIOCSABS` and, on
    /// success, mirrors it into the model.
    ///
    /// This changes a device-global property visible to every user of the
    /// device.
    pub fn kernel_set_abs_info(&mut self, abs: Abs, info: AbsInfo) -> Result<()> {
        let fd = self.fd()?;
        if !self.has_event_code(abs.into()) {
            return Err(Error::InvalidArgument("axis not supported by the device"));
        }
        unsafe {
            ioctl(fd, "EVIOCSABS", EVIOCSABS(abs.raw() as u8), &info.0)?;
        }
        self.state.abs[abs.raw() as usize] = info;
        Ok(())
    }
}

/// Value access.
impl Device {
    /// Returns the current value of a non-multitouch event code, or 0 when
    /// the code isn't supported or carries no state.
    ///
    /// For `ABS_MT_SLOT` on a slotted device this is the currently selected
    /// slot. Other `ABS_MT_*` codes of a slotted device are per-slot state;
    /// use [`Device::slot_value`] for those.
    pub fn event_value(&self, code: EventCode) -> i32 {
        self.fetch_event_value(code).unwrap_or(0)
    }

    /// Combined existence check and value read: [`None`] when the code isn't
    /// supported, doesn't carry state, or is routed through the slot table.
    pub fn fetch_event_value(&self, code: EventCode) -> Option<i32> {
        if !self.has_event_code(code) {
            return None;
        }
        match code {
            EventCode::Key(c) => Some(self.state.keys.contains(c) as i32),
            EventCode::Led(c) => Some(self.state.leds.contains(c) as i32),
            EventCode::Switch(c) => Some(self.state.switches.contains(c) as i32),
            EventCode::Sound(c) => Some(self.state.sounds.contains(c) as i32),
            EventCode::Repeat(c) => match c {
                Repeat::DELAY => Some(self.state.repeat.delay() as i32),
                Repeat::PERIOD => Some(self.state.repeat.period() as i32),
                _ => None,
            },
            EventCode::Abs(c) => {
                if let Some(slots) = &self.state.slots {
                    if c == Abs::MT_SLOT {
                        return Some(slots.current() as i32);
                    }
                    if c.is_mt() {
                        return None;
                    }
                }
                Some(self.state.abs[c.raw() as usize].raw_value())
            }
            // Stateless or structural codes.
            EventCode::Syn(_) | EventCode::Rel(_) | EventCode::Misc(_) | EventCode::Ff(_) => None,
        }
    }

    /// Overwrites the cached value of a non-multitouch event code.
    ///
    /// For [`Abs`] codes the value is stored as-is, *without* clamping into
    /// `[minimum, maximum]`; only values arriving as device events are
    /// clamped.
    pub fn set_event_value(&mut self, code: EventCode, value: i32) -> Result<()> {
        if !self.has_event_code(code) {
            return Err(Error::InvalidArgument("event code not enabled"));
        }
        match code {
            EventCode::Key(c) => self.state.keys.set(c, value != 0),
            EventCode::Led(c) => self.state.leds.set(c, value != 0),
            EventCode::Switch(c) => self.state.switches.set(c, value != 0),
            EventCode::Sound(c) => self.state.sounds.set(c, value != 0),
            EventCode::Repeat(c) => match c {
                Repeat::DELAY => self.state.repeat.delay = value as u32,
                Repeat::PERIOD => self.state.repeat.period = value as u32,
                _ => return Err(Error::InvalidArgument("unknown REP code")),
            },
            EventCode::Abs(c) => {
                if let Some(slots) = &mut self.state.slots {
                    if c == Abs::MT_SLOT {
                        if value < 0 || value >= slots.num_slots() as i32 {
                            return Err(Error::InvalidArgument("slot out of range"));
                        }
                        slots.set_current(value as u32);
                        return Ok(());
                    }
                    if c.is_mt() {
                        return Err(Error::InvalidArgument(
                            "multitouch codes are per-slot; use set_slot_value",
                        ));
                    }
                }
                self.state.abs[c.raw() as usize].set_raw_value(value);
            }
            EventCode::Syn(_) | EventCode::Rel(_) | EventCode::Misc(_) | EventCode::Ff(_) => {
                return Err(Error::InvalidArgument("event code carries no state"));
            }
        }
        Ok(())
    }

    /// Returns the number of tracked multitouch slots, or [`None`] for
    /// devices without true slotted multitouch (including fake-MT devices).
    pub fn num_slots(&self) -> Option<i32> {
        if !self.has_event_code(Abs::MT_SLOT.into()) {
            return None;
        }
        self.state.slots.as_ref().map(|t| t.num_slots() as i32)
    }

    /// Returns the currently selected multitouch slot, or [`None`] for
    /// devices without a slot table.
    pub fn current_slot(&self) -> Option<Slot> {
        if !self.has_event_code(Abs::MT_SLOT.into()) {
            return None;
        }
        self.state
            .slots
            .as_ref()
            .map(|t| Slot::from_raw(t.current() as i32))
    }

    /// Returns the cached value of `code` in `slot`, or [`None`] when the
    /// device has no slot table, the slot is out of range, or the code isn't
    /// a tracked `ABS_MT_*` code.
    pub fn slot_value(&self, slot: impl TryInto<Slot>, code: Abs) -> Option<i32> {
        let slot: Slot = slot.try_into().ok()?;
        if !self.has_event_code(code.into()) {
            return None;
        }
        self.state.slots.as_ref()?.value(slot, code)
    }

    /// Alias of [`Device::slot_value`], mirroring the combined
    /// check-and-fetch shape of [`Device::fetch_event_value`].
    pub fn fetch_slot_value(&self, slot: impl TryInto<Slot>, code: Abs) -> Option<i32> {
        self.slot_value(slot, code)
    }

    /// Overwrites the cached value of `code` in `slot`.
    pub fn set_slot_value(&mut self, slot: impl TryInto<Slot>, code: Abs, value: i32) -> Result<()> {
        let slot: Slot = slot
            .try_into()
            .map_err(|_| Error::InvalidArgument("slot out of range"))?;
        if !code.is_mt() {
            return Err(Error::InvalidArgument("not a multitouch code"));
        }
        if !self.has_event_code(code.into()) {
            return Err(Error::InvalidArgument("event code not enabled"));
        }
        let Some(slots) = &mut self.state.slots else {
            return Err(Error::InvalidArgument("device has no multitouch slots"));
        };
        if slots.set_value(slot, code, value) {
            Ok(())
        } else {
            Err(Error::InvalidArgument("slot out of range"))
        }
    }
}

/// Kernel-effecting operations.
impl Device {
    /// Takes or releases an exclusive hold on the device.
    ///
    /// Grabbing an already-grabbed handle (and ungrabbing an ungrabbed one)
    /// is a no-op returning success. A grab held by *another* handle
    /// surfaces as the kernel's `EBUSY`.
    pub fn grab(&mut self, mode: GrabMode) -> Result<()> {
        let fd = self.fd()?;
        match (self.grabbed, mode) {
            (true, GrabMode::Grab) | (false, GrabMode::Ungrab) => Ok(()),
            (false, GrabMode::Grab) => {
                unsafe { ioctl(fd, "EVIOCGRAB", EVIOCGRAB, 1)? };
                self.grabbed = true;
                Ok(())
            }
            (true, GrabMode::Ungrab) => {
                unsafe { ioctl(fd, "EVIOCGRAB", EVIOCGRAB, 0)? };
                self.grabbed = false;
                Ok(())
            }
        }
    }

    /// Sets one device LED by writing an `EV_LED` event to the descriptor.
    pub fn kernel_set_led_value(&mut self, led: Led, value: LedValue) -> Result<()> {
        self.kernel_set_led_values(&[(led, value)])
    }

    /// Sets several LEDs in one batch.
    ///
    /// The pairs are validated up front; any invalid pair fails the whole
    /// batch before anything is written. The events are written with a
    /// terminating `SYN_REPORT` in a single `write(2)`, and the LED shadow
    /// state is updated on success.
    pub fn kernel_set_led_values(&mut self, leds: &[(Led, LedValue)]) -> Result<()> {
        let fd = self.fd()?;
        for (led, _) in leds {
            if !self.has_event_code((*led).into()) {
                return Err(Error::InvalidArgument("LED not supported by the device"));
            }
        }

        let mut events: Vec<InputEvent> = Vec::with_capacity(leds.len() + 1);
        for (led, value) in leds {
            events.push(crate::event::LedEvent::new(*led, *value == LedValue::On).into());
        }
        events.push(crate::event::SynEvent::new(Syn::REPORT).into());
        write_events(fd, &events)?;

        for (led, value) in leds {
            self.state.leds.set(*led, *value == LedValue::On);
        }
        Ok(())
    }

    /// Selects the clock used for event timestamps.
    ///
    /// Takes effect immediately on an attached device (via `EVIOCSCLOCKID`);
    /// on a detached model the choice is remembered and applied by
    /// [`Device::attach`]. Events already buffered in the kernel keep their
    /// old time base, so this is only meaningful before reading starts.
    pub fn set_clock_id(&mut self, clock: ClockId) -> Result<()> {
        if let Some(fd) = self.fd {
            let id: c_int = clock.raw();
            match unsafe { ioctl(fd, "EVIOCSCLOCKID", EVIOCSCLOCKID, &id) } {
                Ok(_) => {}
                Err(e) if is_missing_ioctl(&e) => return Err(Error::NotSupported),
                Err(e) => return Err(e.into()),
            }
        }
        self.clock = clock;
        Ok(())
    }

    /// Returns the currently selected clock.
    pub fn clock_id(&self) -> ClockId {
        self.clock
    }
}

/// The event reader.
impl Device {
    /// Returns whether a call to `next_event(ReadFlag::NORMAL)` would have an
    /// event to deliver: either queued sync events or readable bytes on the
    /// descriptor.
    pub fn has_event_pending(&self) -> Result<bool> {
        let fd = self.fd()?;
        if !self.queue.is_empty() {
            return Ok(true);
        }
        Ok(util::is_readable(fd)?)
    }

    /// Reads the next event, honouring the reader state machine.
    ///
    /// - `NORMAL`: deliver the next device event, silently skipping events
    ///   whose code is disabled in the model. A `SYN_DROPPED` switches the
    ///   reader into sync mode, returns `(Sync, <the SYN_DROPPED event>)`,
    ///   and queues a synthesized state delta.
    /// - `SYNC`: drain one synthesized event from the queue, returning
    ///   `(Sync, event)`. Once the queue is empty the reader drops back to
    ///   normal mode and reports [`Error::WouldBlock`].
    /// - `FORCE_SYNC`: behave as if a `SYN_DROPPED` had been read. The
    ///   returned event is a zeroed placeholder and must not be inspected;
    ///   drain the delta with `SYNC` reads. At least the terminating
    ///   `SYN_REPORT` is queued even when nothing changed.
    /// - Calling with `NORMAL` while sync events are still queued abandons
    ///   the sync: the queue is discarded, the model jumps to the kernel
    ///   snapshot, and the call proceeds as a normal read.
    ///
    /// Every event handed out has already been applied to the model, so
    /// value getters reflect the stream up to and including the returned
    /// event.
    pub fn next_event(&mut self, flags: ReadFlag) -> Result<(ReadStatus, InputEvent)> {
        let fd = self.fd()?;
        let mut io = FdIo {
            fd,
            clock: self.clock,
        };
        self.next_event_impl(&mut io, flags)
    }

    fn next_event_impl(
        &mut self,
        io: &mut impl KernelIo,
        flags: ReadFlag,
    ) -> Result<(ReadStatus, InputEvent)> {
        let mode_bits = flags & (ReadFlag::NORMAL | ReadFlag::SYNC | ReadFlag::FORCE_SYNC);
        if mode_bits.bits().count_ones() != 1 {
            return Err(Error::InvalidArgument(
                "exactly one of NORMAL, SYNC, and FORCE_SYNC must be set",
            ));
        }

        if flags.contains(ReadFlag::FORCE_SYNC) {
            let time = io.now();
            let fresh = io.kernel_state(&StateSpec {
                abs: &self.abs,
                slots: self.state.slots.as_ref(),
            })?;
            self.queue.clear();
            sync::enqueue_delta(&self.state, &fresh, &self.abs, time, true, &mut self.queue);
            self.pending = Some(fresh);
            self.mode = ReadMode::Sync;
            // The caller is documented not to inspect this event.
            return Ok((ReadStatus::Sync, InputEvent::zeroed()));
        }

        if flags.contains(ReadFlag::SYNC) {
            if self.mode != ReadMode::Sync {
                return Err(Error::WouldBlock);
            }
            return match self.queue.pop_front() {
                Some(ev) => {
                    self.state.apply_event(ev);
                    if self.queue.is_empty() {
                        // Fully drained; the shadow now equals the snapshot.
                        self.mode = ReadMode::Normal;
                        self.pending = None;
                    }
                    Ok((ReadStatus::Sync, ev))
                }
                None => {
                    self.mode = ReadMode::Normal;
                    self.pending = None;
                    Err(Error::WouldBlock)
                }
            };
        }

        // NORMAL read. An abandoned sync is resolved first: forget the
        // remaining delta and jump the shadow straight to the snapshot.
        if self.mode == ReadMode::Sync {
            self.queue.clear();
            if let Some(fresh) = self.pending.take() {
                self.state.fast_forward(&fresh);
            }
            self.mode = ReadMode::Normal;
        }

        loop {
            let mut ev = InputEvent::zeroed();
            match io.read_events(slice::from_mut(&mut ev)) {
                Ok(0) => return Err(Error::WouldBlock),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock && flags.contains(ReadFlag::BLOCKING) => {
                    io.block_until_readable()?;
                    continue;
                }
                Err(e) => return Err(Error::from_read(e)),
            }

            if ev.is_type(EventType::SYN) && ev.raw_code() == Syn::DROPPED.raw() {
                log::debug!("SYN_DROPPED: events were lost, resyncing");
                self.state.apply_event(ev);
                self.resync(io, ev.timeval())?;
                self.mode = ReadMode::Sync;
                return Ok((ReadStatus::Sync, ev));
            }

            if !self.wants(&ev) {
                continue;
            }

            self.state.apply_event(ev);
            return Ok((ReadStatus::Success, ev));
        }
    }

    /// Snapshots the kernel state and queues the recovery delta.
    ///
    /// On failure the queue is discarded and the shadow is advanced to
    /// whatever snapshot could be taken, leaving the reader in a best-effort
    /// consistent normal mode.
    fn resync(&mut self, io: &mut impl KernelIo, time: libc::timeval) -> Result<()> {
        let start = Instant::now();
        let _d = util::on_drop(move || log::debug!("resync took {:?}", start.elapsed()));

        // Drop whatever is sitting in the kernel buffer; those events are
        // part of the history the snapshot already includes.
        if let Err(e) = io.drain() {
            log::warn!("failed to drain kernel buffer during resync: {e}");
        }

        let fresh = match io.kernel_state(&StateSpec {
            abs: &self.abs,
            slots: self.state.slots.as_ref(),
        }) {
            Ok(fresh) => fresh,
            Err(e) => {
                self.queue.clear();
                self.mode = ReadMode::Normal;
                self.pending = None;
                return Err(e.into());
            }
        };

        self.queue.clear();
        sync::enqueue_delta(&self.state, &fresh, &self.abs, time, false, &mut self.queue);
        self.pending = Some(fresh);
        Ok(())
    }

    /// Returns whether the reader should forward `ev` to the client.
    ///
    /// `SYN` events always pass; everything else requires the code (or, for
    /// codeless types, the type) to be enabled in the model.
    fn wants(&self, ev: &InputEvent) -> bool {
        if ev.is_type(EventType::SYN) {
            return true;
        }
        match ev.code() {
            Some(code) => self.has_event_code(code),
            None => self.has_event_type(ev.event_type()),
        }
    }
}

fn try_insert<V: BitValue>(set: &mut BitSet<V>, value: V) -> bool {
    if value.into_index() > V::MAX.into_index() {
        return false;
    }
    set.insert(value);
    true
}

fn try_remove<V: BitValue>(set: &mut BitSet<V>, value: V) -> Result<()> {
    if value.into_index() > V::MAX.into_index() {
        return Err(Error::InvalidArgument("event code out of range"));
    }
    set.remove(value);
    Ok(())
}

fn is_fake_mt(abs: &BitSet<Abs>) -> bool {
    // Devices predating the slotted protocol reused the code right below
    // `ABS_MT_SLOT` as an ordinary axis; for them the MT range is incidental
    // numbering, not per-slot state.
    abs.contains(Abs::MT_SLOT) && abs.contains(Abs::from_raw(Abs::MT_SLOT.raw() - 1))
}

/// The reader's seam to the kernel, so the state machine can be driven by
/// scripted events and snapshots in tests.
pub(crate) trait KernelIo {
    fn read_events(&mut self, dest: &mut [InputEvent]) -> io::Result<usize>;
    fn block_until_readable(&mut self) -> io::Result<()>;
    /// Discards everything currently readable (bounded).
    fn drain(&mut self) -> io::Result<()>;
    fn kernel_state(&mut self, spec: &StateSpec<'_>) -> io::Result<KernelState>;
    /// Current time on the device's clock, for stamping forced syncs.
    fn now(&mut self) -> libc::timeval;
}

/// What [`KernelIo::kernel_state`] has to fetch: the supported axes and the
/// shape of the slot table, if any.
pub(crate) struct StateSpec<'a> {
    pub abs: &'a BitSet<Abs>,
    pub slots: Option<&'a SlotTable>,
}

/// The real [`KernelIo`] backed by the attached descriptor.
struct FdIo {
    fd: RawFd,
    clock: ClockId,
}

impl KernelIo for FdIo {
    fn read_events(&mut self, dest: &mut [InputEvent]) -> io::Result<usize> {
        let bytes = unsafe {
            libc::read(
                self.fd,
                dest.as_mut_ptr().cast(),
                size_of::<InputEvent>() * dest.len(),
            )
        };
        if bytes < 0 {
            return Err(io::Error::last_os_error());
        }
        debug_assert_eq!(bytes as usize % size_of::<InputEvent>(), 0);
        Ok(bytes as usize / size_of::<InputEvent>())
    }

    fn block_until_readable(&mut self) -> io::Result<()> {
        util::block_until_readable(self.fd)
    }

    fn drain(&mut self) -> io::Result<()> {
        const READ_LIMIT: usize = 16;
        const READ_SIZE: usize = 128;

        let mut reads = 0;
        while util::is_readable(self.fd)? && reads < READ_LIMIT {
            let mut out = [InputEvent::zeroed(); READ_SIZE];
            self.read_events(&mut out)?;
            reads += 1;
        }
        if reads >= READ_LIMIT {
            log::warn!("resync: kernel buffer not empty after {reads}x{READ_SIZE} reads");
        }
        Ok(())
    }

    fn kernel_state(&mut self, spec: &StateSpec<'_>) -> io::Result<KernelState> {
        let mut fresh = KernelState::empty();
        fresh.keys = unsafe { fetch_bits(self.fd, "EVIOCGKEY", EVIOCGKEY)? };
        fresh.leds = unsafe { fetch_bits(self.fd, "EVIOCGLED", EVIOCGLED)? };
        fresh.sounds = unsafe { fetch_bits(self.fd, "EVIOCGSND", EVIOCGSND)? };
        fresh.switches = unsafe { fetch_bits(self.fd, "EVIOCGSW", EVIOCGSW)? };

        for abs in spec.abs.iter() {
            let slotted = spec.slots.is_some();
            if slotted && abs.is_mt() {
                continue;
            }
            let info = unsafe {
                let mut out = MaybeUninit::uninit();
                ioctl(self.fd, "EVIOCGABS", EVIOCGABS(abs.raw() as u8), out.as_mut_ptr())?;
                AbsInfo(out.assume_init())
            };
            fresh.abs[abs.raw() as usize] = info.raw_value();
        }

        if let Some(template) = spec.slots {
            let mut table = SlotTable::new(template.num_slots(), template.codes().to_vec());
            fill_slot_values(self.fd, &mut table)?;
            let n = table.num_slots();
            if n > 0 {
                let current = fresh.abs[Abs::MT_SLOT.raw() as usize];
                table.set_current(current.clamp(0, n as i32 - 1) as u32);
            }
            fresh.slots = Some(table);
        }

        Ok(fresh)
    }

    fn now(&mut self) -> libc::timeval {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        unsafe {
            libc::clock_gettime(self.clock.raw(), &mut ts);
        }
        libc::timeval {
            tv_sec: ts.tv_sec,
            tv_usec: ts.tv_nsec / 1000,
        }
    }
}

/// Fetches current per-slot values for every code tracked by `table`.
///
/// A kernel without `EVIOCGMTSLOTS` leaves all values at zero.
fn fill_slot_values(fd: RawFd, table: &mut SlotTable) -> io::Result<()> {
    let n = table.num_slots() as usize;
    let codes: Vec<Abs> = table.codes().to_vec();
    for code in codes {
        // Wire format: the leading i32 selects the code, the kernel fills in
        // one value per slot after it.
        let mut buf = vec![0i32; n + 1];
        buf[0] = code.raw() as i32;
        match unsafe {
            ioctl(
                fd,
                "EVIOCGMTSLOTS",
                EVIOCGMTSLOTS(buf.len() * size_of::<i32>()),
                buf.as_mut_ptr().cast::<c_void>(),
            )
        } {
            Ok(_) => {
                for (slot, value) in buf[1..].iter().enumerate() {
                    table.set_value(Slot::from_raw(slot as i32), code, *value);
                }
            }
            Err(e) if is_missing_ioctl(&e) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Writes a batch of events to the device in one `write(2)`.
fn write_events(fd: RawFd, events: &[InputEvent]) -> io::Result<()> {
    let bytes = events.len() * size_of::<InputEvent>();
    let written = unsafe { libc::write(fd, events.as_ptr().cast(), bytes) };
    if written < 0 {
        return Err(io::Error::last_os_error());
    }
    if written as usize != bytes {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            "short write to evdev device",
        ));
    }
    Ok(())
}

/// Executes `ioctl` and adds context to the error.
pub(crate) unsafe fn ioctl<T>(
    fd: RawFd,
    name: &'static str,
    ioctl: Ioctl<T>,
    arg: T,
) -> io::Result<c_int> {
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    match unsafe { ioctl.ioctl(&borrowed, arg) } {
        Ok(ok) => Ok(ok),
        Err(e) => {
            #[derive(Debug)]
            struct WrappedError {
                cause: io::Error,
                msg: String,
            }

            impl fmt::Display for WrappedError {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.msg)
                }
            }
            impl error::Error for WrappedError {
                fn source(&self) -> Option<&(dyn error::Error + 'static)> {
                    Some(&self.cause)
                }
            }

            let msg = format!("ioctl {name} failed ({:?})", e.kind());
            Err(io::Error::new(e.kind(), WrappedError { cause: e, msg }))
        }
    }
}

/// Whether an ioctl error means "this kernel doesn't have that ioctl".
fn is_missing_ioctl(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::ENOTTY) | Some(libc::ENOSYS) | Some(libc::EINVAL))
        || e.kind() == io::ErrorKind::Unsupported
}

unsafe fn fetch_string(
    fd: RawFd,
    ioctl_name: &'static str,
    ioctl_fn: fn(usize) -> Ioctl<*mut c_char>,
) -> io::Result<String> {
    // "fetch string" ioctls return the number of bytes copied into the
    // buffer, at most the buffer length. On a full buffer some bytes might
    // have been lost, so the call is retried with twice the space.

    const INITIAL_LEN: usize = 64;
    let mut buf = vec![0_u8; INITIAL_LEN];
    let len = loop {
        let len = unsafe {
            ioctl(
                fd,
                ioctl_name,
                ioctl_fn(buf.len()),
                buf.as_mut_ptr() as *mut c_char,
            )?
        };
        if len as usize == buf.len() {
            buf.resize(buf.len() * 2, 0);
        } else {
            break len;
        }
    };

    // `len` includes the trailing 0 byte
    buf.truncate(len.saturating_sub(1) as usize);

    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

unsafe fn fetch_optional_string(
    fd: RawFd,
    ioctl_name: &'static str,
    ioctl_fn: fn(usize) -> Ioctl<*mut c_char>,
) -> io::Result<Option<String>> {
    match unsafe { fetch_string(fd, ioctl_name, ioctl_fn) } {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

unsafe fn fetch_bits<V: BitValue>(
    fd: RawFd,
    ioctl_name: &'static str,
    ioctl_fn: impl FnOnce(usize) -> Ioctl<*mut c_void>,
) -> io::Result<BitSet<V>> {
    let mut set = BitSet::<V>::new();
    let words = set.words_mut();
    unsafe {
        ioctl(
            fd,
            ioctl_name,
            ioctl_fn(words.len() * size_of::<Word>()),
            words.as_mut_ptr().cast(),
        )?;
    };
    Ok(set)
}

/// Fetches the code bits of `ty`, or an empty set when the type itself is
/// not advertised.
unsafe fn fetch_code_bits<V: BitValue>(
    fd: RawFd,
    types: &BitSet<EventType>,
    ty: EventType,
) -> io::Result<BitSet<V>> {
    if !types.contains(ty) {
        return Ok(BitSet::new());
    }
    unsafe { fetch_bits(fd, "EVIOCGBIT", |len| EVIOCGBIT(ty.raw() as u8, len)) }
}
