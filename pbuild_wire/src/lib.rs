//! Protobuf wire encoding primitives.
//!
//! Everything here appends to a caller-owned `Vec<u8>` so that repeated calls
//! against the same buffer reuse its capacity. The generator uses these
//! functions to pre-encode tags, and generated Builders call them at runtime.
//!
//! # Example
//! ```
//! let mut buf = Vec::new();
//! pbuild_wire::append_varint(&mut buf, pbuild_wire::make_tag(1, pbuild_wire::WireType::Varint));
//! pbuild_wire::append_varint(&mut buf, 150);
//! assert_eq!(buf, [0x08, 0x96, 0x01]);
//! ```

use std::io::{self, Write};

/// Largest field number a tag can carry.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Longest encoding of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// 3-bit framing code carried in the low bits of every tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// `(number << 3) | wire_type`, as a varint-ready value.
#[inline]
pub const fn make_tag(number: u32, wire_type: WireType) -> u64 {
    ((number as u64) << 3) | wire_type as u64
}

/// Appends `value` as a base-128 varint, least significant group first.
#[inline]
pub fn append_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Number of bytes `append_varint` would produce for `value`.
#[inline]
pub const fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

#[inline]
pub fn append_fixed32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

#[inline]
pub fn append_fixed64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Maps signed integers onto unsigned ones so small magnitudes stay short.
#[inline]
pub const fn encode_zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub const fn decode_zigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Appends a length varint followed by the raw bytes.
#[inline]
pub fn append_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    append_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Flushes one length-delimited field whose payload is already complete:
/// tag and length go through `scratch` in a single write, then the payload
/// is written as-is.
pub fn write_delimited<W: Write + ?Sized>(
    writer: &mut W,
    scratch: &mut Vec<u8>,
    tag: &[u8],
    payload: &[u8],
) -> io::Result<()> {
    scratch.clear();
    scratch.extend_from_slice(tag);
    append_varint(scratch, payload.len() as u64);
    writer.write_all(scratch)?;
    writer.write_all(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        append_varint(&mut buf, value);
        buf
    }

    #[test]
    fn varint_known_vectors() {
        assert_eq!(varint(0), [0x00]);
        assert_eq!(varint(1), [0x01]);
        assert_eq!(varint(127), [0x7f]);
        assert_eq!(varint(128), [0x80, 0x01]);
        assert_eq!(varint(300), [0xac, 0x02]);
        assert_eq!(
            varint(u64::MAX),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
        /* negative int32 values are sign extended before encoding */
        assert_eq!(varint(-1i32 as u64).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn varint_len_matches_encoding() {
        for value in [0, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX >> 1, u64::MAX] {
            assert_eq!(varint_len(value), varint(value).len(), "value {value}");
        }
    }

    #[test]
    fn varint_agrees_with_prost() {
        for value in [0u64, 5, 150, 1 << 35, u64::MAX] {
            let mut expected = Vec::new();
            prost::encoding::encode_varint(value, &mut expected);
            assert_eq!(varint(value), expected);
        }
    }

    #[test]
    fn zigzag_boundaries() {
        assert_eq!(encode_zigzag(0), 0);
        assert_eq!(encode_zigzag(-1), 1);
        assert_eq!(encode_zigzag(1), 2);
        assert_eq!(encode_zigzag(-2), 3);
        assert_eq!(encode_zigzag(i32::MAX as i64), 0xffff_fffe);
        assert_eq!(encode_zigzag(i32::MIN as i64), 0xffff_ffff);
        assert_eq!(encode_zigzag(i64::MAX), u64::MAX - 1);
        assert_eq!(encode_zigzag(i64::MIN), u64::MAX);
        for value in [0, 1, -1, i32::MIN as i64, i32::MAX as i64, i64::MIN, i64::MAX] {
            assert_eq!(decode_zigzag(encode_zigzag(value)), value);
        }
    }

    #[test]
    fn fixed_width_is_little_endian() {
        let mut buf = Vec::new();
        append_fixed32(&mut buf, 0x0102_0304);
        append_fixed64(&mut buf, 1.5f64.to_bits());
        assert_eq!(&buf[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&buf[4..], &1.5f64.to_bits().to_le_bytes());
    }

    #[test]
    fn tags() {
        assert_eq!(make_tag(1, WireType::Varint), 0x08);
        assert_eq!(make_tag(3, WireType::LengthDelimited), 0x1a);
        assert_eq!(make_tag(2, WireType::Fixed32), 0x15);
        assert_eq!(make_tag(MAX_FIELD_NUMBER, WireType::Fixed64), ((MAX_FIELD_NUMBER as u64) << 3) | 1);
        assert_eq!(WireType::from_code(2), Some(WireType::LengthDelimited));
        assert_eq!(WireType::from_code(3), None);
    }

    #[test]
    fn delimited_flush_writes_prefix_then_payload() {
        let mut out = Vec::new();
        let mut scratch = Vec::with_capacity(16);
        scratch.extend_from_slice(b"stale");
        write_delimited(&mut out, &mut scratch, &[0x0a], b"hello").unwrap();
        assert_eq!(out, b"\x0a\x05hello");
        assert_eq!(scratch, [0x0a, 0x05]);
        assert!(scratch.capacity() >= 16);

        let mut bytes = Vec::new();
        append_bytes(&mut bytes, b"");
        assert_eq!(bytes, [0x00]);
    }
}
