use std::fmt::{self, LowerHex};

use crate::raw::input::input_id;

/// Input device identity: bus type, vendor, product, and version.
///
/// `uinput` devices, devices exported by ALSA, and other virtual devices
/// often leave this structure empty (all-zeroes).
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct InputId(pub(crate) input_id);

impl InputId {
    /// Creates an [`InputId`] from its components.
    #[inline]
    pub const fn new(bus: Bus, vendor: u16, product: u16, version: u16) -> Self {
        Self(input_id {
            bustype: bus.0,
            vendor,
            product,
            version,
        })
    }

    /// Returns the bus type this device is attached to the system with.
    #[inline]
    pub fn bus(&self) -> Bus {
        Bus(self.0.bustype)
    }

    /// Returns the vendor ID, typically taken from the USB/PCI device
    /// descriptor.
    #[inline]
    pub fn vendor(&self) -> u16 {
        self.0.vendor
    }

    /// Returns the product ID, typically taken from the USB/PCI device
    /// descriptor.
    #[inline]
    pub fn product(&self) -> u16 {
        self.0.product
    }

    /// Returns the device or transport version (`bcdHID` for USB devices).
    #[inline]
    pub fn version(&self) -> u16 {
        self.0.version
    }

    #[inline]
    pub(crate) fn set_bus(&mut self, bus: Bus) {
        self.0.bustype = bus.0;
    }
    #[inline]
    pub(crate) fn set_vendor(&mut self, vendor: u16) {
        self.0.vendor = vendor;
    }
    #[inline]
    pub(crate) fn set_product(&mut self, product: u16) {
        self.0.product = product;
    }
    #[inline]
    pub(crate) fn set_version(&mut self, version: u16) {
        self.0.version = version;
    }
}

impl fmt::Debug for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Hex<T: LowerHex>(T);
        impl<T: LowerHex> fmt::Debug for Hex<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#06x}", self.0)
            }
        }

        f.debug_struct("InputId")
            .field("bustype", &self.bus())
            .field("vendor", &Hex(self.vendor()))
            .field("product", &Hex(self.product()))
            .field("version", &Hex(self.version()))
            .finish()
    }
}

ffi_enum! {
    /// Bus types that devices can be attached to the system with.
    pub enum Bus: u16, prefix "BUS_" {
        PCI         = 0x01,
        ISAPNP      = 0x02,
        USB         = 0x03,
        HIL         = 0x04,
        BLUETOOTH   = 0x05,
        VIRTUAL     = 0x06,
        ISA         = 0x10,
        I8042       = 0x11,
        XTKBD       = 0x12,
        RS232       = 0x13,
        GAMEPORT    = 0x14,
        PARPORT     = 0x15,
        AMIGA       = 0x16,
        ADB         = 0x17,
        I2C         = 0x18,
        HOST        = 0x19,
        GSC         = 0x1A,
        ATARI       = 0x1B,
        SPI         = 0x1C,
        RMI         = 0x1D,
        CEC         = 0x1E,
        INTEL_ISHTP = 0x1F,
        AMD_SFH     = 0x20,
    }
}
