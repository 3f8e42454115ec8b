use std::num::TryFromIntError;

use crate::event::Abs;

/// Maximum number of multitouch slots tracked per device.
///
/// Devices may advertise more; slots at indices at or above this cap are
/// ignored by the state shadow and by sync recovery, and their cached values
/// stay untouched until a real event addresses them.
pub const SLOT_SYNC_CAP: i32 = 60;

/// A multitouch slot index.
///
/// The slot index travels as an event value, which has type `i32`; [`Slot`]
/// adds the invariant that the value is non-negative.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Slot(i32);

impl Slot {
    /// Returns the slot index as an `i32`.
    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }

    pub(crate) fn from_raw(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<u16> for Slot {
    #[inline]
    fn from(value: u16) -> Self {
        Self(value.into())
    }
}

impl From<u8> for Slot {
    #[inline]
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

impl TryFrom<i32> for Slot {
    type Error = TryFromIntError;

    #[inline]
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        // This checks that it isn't negative:
        let nonneg = u32::try_from(value)? as i32;
        Ok(Self(nonneg))
    }
}

impl PartialEq<i32> for Slot {
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}

impl PartialEq<u16> for Slot {
    fn eq(&self, other: &u16) -> bool {
        *self == Slot::from(*other)
    }
}

/// Per-slot multitouch state: one row of `num_slots` values for every
/// supported `ABS_MT_*` code above `ABS_MT_SLOT`, plus the currently selected
/// slot.
///
/// The code-major layout matches the `EVIOCGMTSLOTS` wire format, which
/// transfers one code's values for all slots at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SlotTable {
    /// Supported `ABS_MT_*` codes, ascending.
    codes: Vec<Abs>,
    /// `codes.len() * num_slots` values, grouped by code.
    values: Vec<i32>,
    num_slots: u32,
    current: u32,
    /// Set when an out-of-range `ABS_MT_SLOT` was seen; per-slot writes are
    /// dropped until the frame ends.
    suppressed: bool,
}

impl SlotTable {
    pub fn new(num_slots: u32, codes: Vec<Abs>) -> Self {
        debug_assert!(codes.iter().all(|c| c.is_mt()));
        let values = vec![0; codes.len() * num_slots as usize];
        Self {
            codes,
            values,
            num_slots,
            current: 0,
            suppressed: false,
        }
    }

    pub fn num_slots(&self) -> u32 {
        self.num_slots
    }

    pub fn codes(&self) -> &[Abs] {
        &self.codes
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub(crate) fn set_current(&mut self, slot: u32) {
        debug_assert!(slot < self.num_slots);
        self.current = slot;
    }

    /// Returns one value of `code` per slot, or [`None`] if `code` isn't
    /// tracked.
    pub fn row(&self, code: Abs) -> Option<&[i32]> {
        let idx = self.codes.iter().position(|c| *c == code)?;
        let n = self.num_slots as usize;
        Some(&self.values[idx * n..(idx + 1) * n])
    }

    fn row_mut(&mut self, code: Abs) -> Option<&mut [i32]> {
        let idx = self.codes.iter().position(|c| *c == code)?;
        let n = self.num_slots as usize;
        Some(&mut self.values[idx * n..(idx + 1) * n])
    }

    /// Returns the value of `code` in `slot`, or [`None`] when the slot is
    /// out of range or the code isn't tracked.
    pub fn value(&self, slot: Slot, code: Abs) -> Option<i32> {
        let row = self.row(code)?;
        row.get(usize::try_from(slot.raw()).ok()?).copied()
    }

    /// Stores `value` for `code` in `slot`.
    ///
    /// Returns `false` when the slot is out of range or the code isn't
    /// tracked.
    pub fn set_value(&mut self, slot: Slot, code: Abs, value: i32) -> bool {
        let Some(row) = self.row_mut(code) else {
            return false;
        };
        let Some(cell) = usize::try_from(slot.raw()).ok().and_then(|i| row.get_mut(i)) else {
            return false;
        };
        *cell = value;
        true
    }

    /// Processes an `ABS_MT_SLOT` event value.
    ///
    /// Non-negative values select the slot, clamped to the last valid index.
    /// Negative values leave the selection unchanged and suppress per-slot
    /// writes until [`SlotTable::end_frame`].
    pub fn select(&mut self, value: i32) {
        if value < 0 {
            log::warn!("ignoring out-of-range ABS_MT_SLOT value {value}");
            self.suppressed = true;
            return;
        }
        self.current = (value as u32).min(self.num_slots.saturating_sub(1));
    }

    /// Processes an `ABS_MT_*` event for the currently selected slot.
    pub fn apply(&mut self, code: Abs, value: i32) {
        if self.suppressed {
            return;
        }
        let slot = self.current;
        if let Some(row) = self.row_mut(code) {
            if let Some(cell) = row.get_mut(slot as usize) {
                *cell = value;
            }
        }
    }

    /// Ends the current event frame (`SYN_REPORT`), lifting any write
    /// suppression.
    pub fn end_frame(&mut self) {
        self.suppressed = false;
    }

    /// Replaces all tracked values and the selection with `src`'s.
    pub fn clone_state_from(&mut self, src: &SlotTable) {
        debug_assert_eq!(self.codes, src.codes);
        self.values.clone_from(&src.values);
        self.num_slots = src.num_slots;
        self.current = src.current;
    }
}
