/// ffi_enum! {}
///
/// Generates a `#[repr(transparent)]` newtype over a kernel constant, plus a
/// name table keyed by the full symbolic spelling (prefix included).
///
/// Several kernel constants share a numeric value under different spellings
/// (`BTN_SOUTH` / `BTN_A` and friends). Lookups resolve by table order:
/// `name()` returns the first entry carrying the value, `from_name()` returns
/// the first entry matching the string.
macro_rules! ffi_enum {
    (
        $( #[$attrs:meta] )*
        $v:vis enum $name:ident: $native:ty, prefix $prefix:literal {
            $(
                $( #[$variant_attrs:meta] )*
                $variant:ident = $value:expr
            ),+
            $(,)?
        }
    ) => {
        $( #[$attrs] )*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        $v struct $name(pub(crate) $native);

        impl $name {
            $(
                $( #[$variant_attrs] )*
                $v const $variant: Self = Self($value);
            )+

            /// Returns the full symbolic name of `self`, or [`None`] if the
            /// value has no entry in the name table.
            #[allow(unreachable_patterns)] // aliased values: first arm wins
            $v fn name(self) -> Option<&'static str> {
                match self {
                    $(
                        Self::$variant => Some(concat!($prefix, stringify!($variant))),
                    )*
                    _ => None,
                }
            }

            /// Looks up a value by its full symbolic name.
            ///
            /// Case-sensitive exact match, prefix included.
            $v fn from_name(name: &str) -> Option<Self> {
                $(
                    if name == concat!($prefix, stringify!($variant)) {
                        return Some(Self::$variant);
                    }
                )*
                None
            }

            /// Returns the raw value wrapped by `self`.
            #[inline]
            $v const fn raw(self) -> $native {
                self.0
            }

            /// Creates a new value from its raw representation.
            #[inline]
            $v const fn from_raw(raw: $native) -> Self {
                Self(raw)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, concat!(stringify!($name), "({:#x})"), self.0),
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::event::codes::UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or($crate::event::codes::UnknownName { _p: () })
            }
        }
    };
}

macro_rules! bitvalue {
    ($type:ty) => {
        impl $crate::bits::BitValueImpl for $type {
            type __PrivateArray = [$crate::bits::Word;
                (Self::MAX.0 as usize + 1).div_ceil($crate::bits::Word::BITS as usize)];
            const __PRIVATE_ZERO: Self::__PrivateArray =
                [0; (Self::MAX.0 as usize + 1).div_ceil($crate::bits::Word::BITS as usize)];

            #[inline]
            fn from_index(index: usize) -> Self {
                Self(index as _)
            }
            #[inline]
            fn into_index(self) -> usize {
                self.0 as _
            }
        }
        impl $crate::bits::BitValue for $type {
            const MAX: Self = <Self>::MAX;
        }
    };
}
