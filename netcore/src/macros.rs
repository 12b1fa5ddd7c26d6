/// An enum over the assigned values of a protocol field.
///
/// Conversion from the raw integer never fails. Values without a variant land in `Unknown` and
/// parsers decide whether to reject them.
///
/// ```
/// # use netcore::enum_with_unknown;
/// # fn main() { }
/// enum_with_unknown! {
///     /// Hardware types of an arp packet.
///     pub enum LinkKind(u16) {
///         Ethernet = 1,
///         Ieee802 = 6,
///     }
/// }
/// ```
#[macro_export]
macro_rules! enum_with_unknown {
    (
        $( #[$enum_attr:meta] )*
        pub enum $name:ident($ty:ty) {
            $(
              $( #[$variant_attr:meta] )*
              $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
        $( #[$enum_attr] )*
        pub enum $name {
            $(
              $( #[$variant_attr] )*
              $variant
            ),*,
            /// A value that has no assigned meaning for this field.
            Unknown($ty)
        }

        impl ::core::convert::From<$ty> for $name {
            fn from(raw: $ty) -> $name {
                $( if raw == $value { return $name::$variant; } )+
                $name::Unknown(raw)
            }
        }

        impl ::core::convert::From<$name> for $ty {
            fn from(known: $name) -> $ty {
                match known {
                    $( $name::$variant => $value, )+
                    $name::Unknown(raw) => raw,
                }
            }
        }
    }
}

/// An unsized packet view, a `#[repr(transparent)]` newtype of `[u8]`.
///
/// References to the view are cast from references to the buffer. The two casts are private
/// (`__from_macro_new_unchecked` and `__from_macro_new_unchecked_mut`) and each wire module wraps
/// them in constructors that check lengths.
///
/// ```
/// # use netcore::byte_wrapper;
/// byte_wrapper! {
///     /// A udp packet.
///     pub struct udp([u8]);
/// }
///
/// impl udp {
///     pub fn view(datagram: &[u8]) -> &udp {
///         udp::__from_macro_new_unchecked(datagram)
///     }
/// }
///
/// let header = [0x0f, 0xa0, 0x00, 0x07, 0x00, 0x08, 0x00, 0x00];
/// assert_eq!(udp::view(&header).0.len(), 8);
/// ```
#[macro_export]
macro_rules! byte_wrapper {
    (
        $( #[$attr:meta] )*
        pub struct $name:ident([u8])$(;)*
    ) => {
        #[allow(non_camel_case_types)]
        #[repr(transparent)]
        $( #[$attr] )*
        pub struct $name([u8]);

        impl $name {
            #[allow(dead_code)]
            fn __from_macro_new_unchecked(data: &[u8]) -> &Self {
                // SAFETY: `Self` is repr(transparent) over `[u8]`, the layouts agree.
                unsafe { &*(data as *const [u8] as *const Self) }
            }

            #[allow(dead_code)]
            fn __from_macro_new_unchecked_mut(data: &mut [u8]) -> &mut Self {
                // SAFETY: as above, and the borrow is unique.
                unsafe { &mut *(data as *mut [u8] as *mut Self) }
            }
        }
    }
}

#[cfg(feature = "log")]
macro_rules! net_log {
    (trace, $($arg:expr),*) => { ::log::trace!($($arg),*) };
    (debug, $($arg:expr),*) => { ::log::debug!($($arg),*) };
    (warn, $($arg:expr),*) => { ::log::warn!($($arg),*) };
}

#[cfg(not(feature = "log"))]
macro_rules! net_log {
    ($level:ident, $($arg:expr),*) => {{ $( let _ = $arg; )* }}
}

macro_rules! net_trace {
    ($($arg:expr),*) => { net_log!(trace, $($arg),*) };
}

macro_rules! net_debug {
    ($($arg:expr),*) => { net_log!(debug, $($arg),*) };
}

macro_rules! net_warn {
    ($($arg:expr),*) => { net_log!(warn, $($arg),*) };
}
