//! Packed record abstraction
//!
//! Every region exchanged with a module is a packed, fixed-size,
//! little-endian sequence of fields. Records are declared once with
//! [`packed_record!`]; the macro derives the byte size, the codec and the
//! field layout from the field list, so a device family is a data table
//! rather than hand-written glue.
//!
//! # Field encodings
//!
//! | Rust type        | Wire width     | Encoding   |
//! |------------------|----------------|------------|
//! | `u8`/`u16`/`u32` | 1/2/4          | `Unsigned` |
//! | `f32`            | 4              | `Float`    |
//! | `FixedString<N>` | N              | `Chars`    |
//! | `[T; N]`         | `N * T::WIDTH` | `Array`    |
//! | nested record    | record size    | `Record`   |

use std::borrow::Cow;
use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RecordError, Result};

/// Wire encoding of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Unsigned little-endian integer
    Unsigned,
    /// IEEE-754 single precision, little-endian
    Float,
    /// NUL-padded character array
    Chars,
    /// Fixed-length array of another field type
    Array,
    /// Nested packed record
    Record,
}

/// Position of one field inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
    pub encoding: Encoding,
}

/// A value with a fixed wire width
///
/// `get` reads exactly `WIDTH` bytes; callers check the buffer length first.
pub trait Field: Sized {
    const WIDTH: usize;
    const ENCODING: Encoding;

    fn put(&self, buf: &mut impl BufMut);

    fn get(buf: &mut impl Buf) -> Self;
}

/// A complete packed record with a compile-time size
pub trait PackedRecord: Field {
    /// Record name used in errors and logs
    const NAME: &'static str;

    /// Total byte size
    const SIZE: usize = <Self as Field>::WIDTH;

    /// Field layout (name, offset, width, encoding) in wire order
    fn layout() -> Vec<FieldSpec>;

    /// Decode a record from exactly `SIZE` bytes
    ///
    /// Decoding is all-or-nothing: any other length fails with
    /// [`RecordError::Malformed`].
    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::SIZE {
            return Err(RecordError::Malformed {
                record: Self::NAME,
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }

        let mut cursor = bytes;
        Ok(Self::get(&mut cursor))
    }

    /// Encode the record into exactly `SIZE` bytes
    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.put(&mut buf);
        buf.freeze()
    }
}

/// Byte size of a record kind
pub const fn size_of<R: PackedRecord>() -> usize {
    R::SIZE
}

// ============================================================================
// Primitive fields
// ============================================================================

macro_rules! scalar_field {
    ($ty:ty, $encoding:ident, $put:ident, $get:ident) => {
        impl Field for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const ENCODING: Encoding = Encoding::$encoding;

            #[inline]
            fn put(&self, buf: &mut impl BufMut) {
                buf.$put(*self);
            }

            #[inline]
            fn get(buf: &mut impl Buf) -> Self {
                buf.$get()
            }
        }
    };
}

scalar_field!(u8, Unsigned, put_u8, get_u8);
scalar_field!(u16, Unsigned, put_u16_le, get_u16_le);
scalar_field!(u32, Unsigned, put_u32_le, get_u32_le);
scalar_field!(f32, Float, put_f32_le, get_f32_le);

impl<T: Field, const N: usize> Field for [T; N] {
    const WIDTH: usize = T::WIDTH * N;
    const ENCODING: Encoding = Encoding::Array;

    fn put(&self, buf: &mut impl BufMut) {
        for item in self {
            item.put(buf);
        }
    }

    fn get(buf: &mut impl Buf) -> Self {
        std::array::from_fn(|_| T::get(buf))
    }
}

// ============================================================================
// Fixed-length character array
// ============================================================================

/// NUL-padded character array of exactly `N` bytes
///
/// Text ends at the first NUL; the remaining bytes are kept verbatim so a
/// decoded value re-encodes to the same bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedString<const N: usize>([u8; N]);

impl<const N: usize> FixedString<N> {
    /// Build from text, leaving room for the terminating NUL
    pub fn new(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        if bytes.len() >= N {
            return Err(RecordError::TextTooLong {
                capacity: N,
                length: bytes.len(),
            });
        }

        let mut raw = [0u8; N];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// Wrap raw bytes as received from a module
    pub fn from_bytes(raw: [u8; N]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Text up to the first NUL
    pub fn as_str(&self) -> Cow<'_, str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        String::from_utf8_lossy(&self.0[..end])
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl<const N: usize> Field for FixedString<N> {
    const WIDTH: usize = N;
    const ENCODING: Encoding = Encoding::Chars;

    fn put(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.0);
    }

    fn get(buf: &mut impl Buf) -> Self {
        let mut raw = [0u8; N];
        buf.copy_to_slice(&mut raw);
        Self(raw)
    }
}

impl<const N: usize> Serialize for FixedString<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedString<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::new(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Empty region
// ============================================================================

/// Placeholder for a region a device family does not have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoRegion;

impl Field for NoRegion {
    const WIDTH: usize = 0;
    const ENCODING: Encoding = Encoding::Record;

    fn put(&self, _buf: &mut impl BufMut) {}

    fn get(_buf: &mut impl Buf) -> Self {
        NoRegion
    }
}

impl PackedRecord for NoRegion {
    const NAME: &'static str = "NoRegion";

    fn layout() -> Vec<FieldSpec> {
        Vec::new()
    }
}

// ============================================================================
// Record declaration macro
// ============================================================================

/// Declare a packed record from its field list
///
/// Fields are encoded in declaration order with no padding. The generated
/// struct derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Default` and serde.
macro_rules! packed_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )+
        }

        impl $crate::record::Field for $name {
            const WIDTH: usize = 0 $(+ <$ty as $crate::record::Field>::WIDTH)+;
            const ENCODING: $crate::record::Encoding = $crate::record::Encoding::Record;

            fn put(&self, buf: &mut impl bytes::BufMut) {
                $( $crate::record::Field::put(&self.$field, buf); )+
            }

            fn get(buf: &mut impl bytes::Buf) -> Self {
                Self {
                    $( $field: <$ty as $crate::record::Field>::get(buf), )+
                }
            }
        }

        impl $crate::record::PackedRecord for $name {
            const NAME: &'static str = stringify!($name);

            fn layout() -> Vec<$crate::record::FieldSpec> {
                let mut fields = Vec::new();
                let mut offset = 0;
                $(
                    let width = <$ty as $crate::record::Field>::WIDTH;
                    fields.push($crate::record::FieldSpec {
                        name: stringify!($field),
                        offset,
                        width,
                        encoding: <$ty as $crate::record::Field>::ENCODING,
                    });
                    offset += width;
                )+
                debug_assert_eq!(offset, <Self as $crate::record::PackedRecord>::SIZE);
                fields
            }
        }
    };
}

pub(crate) use packed_record;

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    packed_record! {
        struct Sample {
            flag: u8,
            word: u16,
            dword: u32,
            analog: f32,
            name: FixedString<5>,
            pairs: [u16; 2],
        }
    }

    packed_record! {
        struct Outer {
            head: u8,
            inner: [Sample; 2],
        }
    }

    fn sample() -> Sample {
        Sample {
            flag: 0xA5,
            word: 0x1234,
            dword: 0xDEADBEEF,
            analog: 1.5,
            name: FixedString::new("AIM").unwrap(),
            pairs: [0x0102, 0x0304],
        }
    }

    #[test]
    fn test_size_is_sum_of_widths() {
        assert_eq!(Sample::SIZE, 1 + 2 + 4 + 4 + 5 + 4);
        assert_eq!(size_of::<Sample>(), Sample::SIZE);
        assert_eq!(Outer::SIZE, 1 + 2 * Sample::SIZE);
        assert_eq!(NoRegion::SIZE, 0);
    }

    #[test]
    fn test_little_endian_encoding() {
        let bytes = sample().encode();
        assert_eq!(bytes.len(), Sample::SIZE);
        assert_eq!(&bytes[..7], &[0xA5, 0x34, 0x12, 0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(&bytes[7..11], &1.5f32.to_le_bytes());
        assert_eq!(&bytes[11..16], b"AIM\0\0");
        assert_eq!(&bytes[16..], &[0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn test_decode_restores_record() {
        let original = sample();
        let decoded = Sample::decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);

        let outer = Outer {
            head: 7,
            inner: [original, Sample::default()],
        };
        assert_eq!(Outer::decode(&outer.encode()).unwrap(), outer);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let bytes = sample().encode();

        let short = Sample::decode(&bytes[..Sample::SIZE - 1]).unwrap_err();
        assert_eq!(
            short,
            RecordError::Malformed {
                record: "Sample",
                expected: Sample::SIZE,
                actual: Sample::SIZE - 1,
            }
        );

        let mut long = bytes.to_vec();
        long.push(0);
        assert!(matches!(
            Sample::decode(&long),
            Err(RecordError::Malformed { actual, .. }) if actual == Sample::SIZE + 1
        ));

        assert!(NoRegion::decode(&[]).is_ok());
        assert!(NoRegion::decode(&[0]).is_err());
    }

    #[test]
    fn test_layout_offsets() {
        let layout = Sample::layout();
        let offsets: Vec<_> = layout.iter().map(|f| (f.name, f.offset, f.width)).collect();
        assert_eq!(
            offsets,
            vec![
                ("flag", 0, 1),
                ("word", 1, 2),
                ("dword", 3, 4),
                ("analog", 7, 4),
                ("name", 11, 5),
                ("pairs", 16, 4),
            ]
        );
        assert_eq!(layout[3].encoding, Encoding::Float);
        assert_eq!(layout[4].encoding, Encoding::Chars);
        assert_eq!(layout[5].encoding, Encoding::Array);
        assert_eq!(Outer::layout()[1].encoding, Encoding::Array);
    }

    #[test]
    fn test_fixed_string() {
        let text = FixedString::<8>::new("DIM712").unwrap();
        assert_eq!(text.as_str(), "DIM712");
        assert_eq!(text.to_string(), "DIM712");

        assert_eq!(
            FixedString::<4>::new("ABCD").unwrap_err(),
            RecordError::TextTooLong {
                capacity: 4,
                length: 4
            }
        );

        // No terminator: the whole array is text
        let full = FixedString::from_bytes(*b"ABCD");
        assert_eq!(full.as_str(), "ABCD");

        // Bytes after the terminator survive a round trip
        let raw = *b"AB\0Z";
        let mut cursor = &raw[..];
        let decoded = FixedString::<4>::get(&mut cursor);
        assert_eq!(decoded.as_str(), "AB");
        let mut out = BytesMut::new();
        decoded.put(&mut out);
        assert_eq!(&out[..], &raw);
    }

    #[test]
    fn test_fixed_string_serde() {
        let text = FixedString::<6>::new("OM751").unwrap();
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(json, "\"OM751\"");
        let back: FixedString<6> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, text);
        assert!(serde_json::from_str::<FixedString<3>>("\"TOOLONG\"").is_err());
    }
}
