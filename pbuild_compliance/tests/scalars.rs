/* Scalar encoding: boundaries, default omission and reset isolation */

use pbuild_compliance::scalars::ScalarsBuilder;
use prost::Message;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
enum Kind {
    Unknown = 0,
    Alpha = 1,
    Beta = 2,
}

#[derive(Clone, PartialEq, Message)]
struct Scalars {
    #[prost(double, tag = "1")]
    f_double: f64,
    #[prost(float, tag = "2")]
    f_float: f32,
    #[prost(int64, tag = "3")]
    f_int64: i64,
    #[prost(uint64, tag = "4")]
    f_uint64: u64,
    #[prost(int32, tag = "5")]
    f_int32: i32,
    #[prost(fixed64, tag = "6")]
    f_fixed64: u64,
    #[prost(fixed32, tag = "7")]
    f_fixed32: u32,
    #[prost(bool, tag = "8")]
    f_bool: bool,
    #[prost(string, tag = "9")]
    f_string: String,
    #[prost(bytes = "vec", tag = "10")]
    f_bytes: Vec<u8>,
    #[prost(uint32, tag = "11")]
    f_uint32: u32,
    #[prost(enumeration = "Kind", tag = "13")]
    kind: i32,
    #[prost(sfixed32, tag = "15")]
    f_sfixed32: i32,
    #[prost(sfixed64, tag = "16")]
    f_sfixed64: i64,
    #[prost(sint32, tag = "17")]
    f_sint32: i32,
    #[prost(sint64, tag = "18")]
    f_sint64: i64,
    #[prost(sint64, repeated, tag = "19")]
    r_sint64: Vec<i64>,
    #[prost(string, repeated, tag = "20")]
    r_string: Vec<String>,
    #[prost(fixed32, repeated, tag = "21")]
    r_fixed32: Vec<u32>,
    #[prost(bool, repeated, tag = "22")]
    r_bool: Vec<bool>,
    #[prost(uint32, tag = "536870911")]
    far_away: u32,
}

fn encode(populate: impl FnOnce(&mut ScalarsBuilder<Vec<u8>>) -> io::Result<()>) -> Vec<u8> {
    let mut builder = ScalarsBuilder::new(Vec::new());
    populate(&mut builder).unwrap();
    builder.into_inner()
}

fn decode(bytes: &[u8]) -> Scalars {
    Scalars::decode(bytes).unwrap()
}

#[test]
fn every_scalar_type_round_trips() {
    let bytes = encode(|b| {
        b.set_f_double(-2.5)?;
        b.set_f_float(1.25)?;
        b.set_f_int64(-9_000_000_000)?;
        b.set_f_uint64(18_000_000_000)?;
        b.set_f_int32(-1)?;
        b.set_f_fixed64(0xdead_beef_0000_0001)?;
        b.set_f_fixed32(0xcafe_f00d)?;
        b.set_f_bool(true)?;
        b.set_f_string("héllo")?;
        b.set_f_bytes(&[0, 1, 2, 255])?;
        b.set_f_uint32(u32::MAX)?;
        b.set_kind(Kind::Beta as i32)?;
        b.set_f_sfixed32(-5)?;
        b.set_f_sfixed64(-6)?;
        b.set_f_sint32(-7)?;
        b.set_f_sint64(-8)?;
        b.add_r_sint64(-1)?;
        b.add_r_sint64(2)?;
        b.add_r_string("a")?;
        b.add_r_string("")?;
        b.add_r_fixed32(7)?;
        b.add_r_fixed32(0)?;
        b.set_far_away(77)
    });

    let expected = Scalars {
        f_double: -2.5,
        f_float: 1.25,
        f_int64: -9_000_000_000,
        f_uint64: 18_000_000_000,
        f_int32: -1,
        f_fixed64: 0xdead_beef_0000_0001,
        f_fixed32: 0xcafe_f00d,
        f_bool: true,
        f_string: "héllo".to_string(),
        f_bytes: vec![0, 1, 2, 255],
        f_uint32: u32::MAX,
        kind: Kind::Beta as i32,
        f_sfixed32: -5,
        f_sfixed64: -6,
        f_sint32: -7,
        f_sint64: -8,
        r_sint64: vec![-1, 2],
        r_string: vec!["a".to_string(), String::new()],
        r_fixed32: vec![7, 0],
        r_bool: Vec::new(),
        far_away: 77,
    };
    assert_eq!(decode(&bytes), expected);
    assert_eq!(decode(&bytes).kind(), Kind::Beta);
}

#[test]
fn zigzag_boundaries() {
    for v in [0, 1, -1, i32::MIN, i32::MAX] {
        let bytes = encode(|b| b.set_f_sint32(v));
        assert_eq!(decode(&bytes).f_sint32, v);
    }
    for v in [0, 1, -1, i64::from(i32::MIN), i64::from(i32::MAX), i64::MIN, i64::MAX] {
        let bytes = encode(|b| b.set_f_sint64(v));
        assert_eq!(decode(&bytes).f_sint64, v);
    }
    /* -1 zigzags to 1: tag 0x88 0x01, value 0x01 */
    assert_eq!(encode(|b| b.set_f_sint32(-1)), [0x88, 0x01, 0x01]);
}

#[test]
fn fixed_width_boundaries() {
    let bytes = encode(|b| {
        b.set_f_fixed64(u64::MAX)?;
        b.set_f_sfixed64(i64::MIN)
    });
    let decoded = decode(&bytes);
    assert_eq!(decoded.f_fixed64, u64::MAX);
    assert_eq!(decoded.f_sfixed64, i64::MIN);

    let bytes = encode(|b| {
        b.set_f_sfixed64(i64::MAX)?;
        b.set_f_fixed32(u32::MAX)?;
        b.set_f_sfixed32(i32::MIN)
    });
    let decoded = decode(&bytes);
    assert_eq!(decoded.f_sfixed64, i64::MAX);
    assert_eq!(decoded.f_fixed32, u32::MAX);
    assert_eq!(decoded.f_sfixed32, i32::MIN);

    assert_eq!(
        encode(|b| b.set_f_sfixed64(i64::MIN)),
        [0x81, 0x01, 0, 0, 0, 0, 0, 0, 0, 0x80]
    );
}

#[test]
fn only_bool_and_enum_omit_defaults() {
    assert!(encode(|b| b.set_f_bool(false)).is_empty());
    assert!(encode(|b| b.set_kind(0)).is_empty());
    assert_eq!(encode(|b| b.add_r_bool(false)), Vec::<u8>::new());

    assert_eq!(encode(|b| b.set_f_int32(0)), [0x28, 0x00]);
    assert_eq!(encode(|b| b.set_f_uint64(0)), [0x20, 0x00]);
    assert_eq!(encode(|b| b.set_f_sint64(0)), [0x90, 0x01, 0x00]);
    assert_eq!(encode(|b| b.set_f_string("")), [0x4a, 0x00]);
    assert_eq!(encode(|b| b.set_f_bytes(&[])), [0x52, 0x00]);
    assert_eq!(encode(|b| b.set_f_fixed32(0)), [0x3d, 0, 0, 0, 0]);
    assert_eq!(encode(|b| b.set_f_double(0.0)), [0x09, 0, 0, 0, 0, 0, 0, 0, 0]);

    let bytes = encode(|b| {
        b.add_r_bool(true)?;
        b.add_r_bool(false)?;
        b.add_r_bool(true)
    });
    assert_eq!(decode(&bytes).r_bool, vec![true, true]);
}

#[test]
fn negative_int32_is_sign_extended() {
    let bytes = encode(|b| b.set_f_int32(-1));
    assert_eq!(bytes.len(), 1 + 10);
    assert_eq!(bytes[10], 0x01);
    assert_eq!(decode(&bytes).f_int32, -1);
}

#[test]
fn reset_starts_a_clean_session() -> io::Result<()> {
    let mut builder = ScalarsBuilder::new(Vec::new());
    builder.set_f_string("first session")?;
    builder.set_f_int64(1)?;
    builder.add_r_string("stale")?;
    builder.set_f_bytes_with(|buf| {
        buf.extend_from_slice(b"partial");
        Ok(())
    })?;

    let first = builder.reset(Vec::new());
    builder.set_f_uint32(9)?;
    let second = builder.into_inner();

    let first = decode(&first);
    assert_eq!(first.f_string, "first session");
    assert_eq!(first.f_bytes, b"partial");

    assert_eq!(
        decode(&second),
        Scalars {
            f_uint32: 9,
            ..Default::default()
        }
    );
    Ok(())
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_errors_surface_immediately() {
    let mut builder = ScalarsBuilder::new(Broken);
    assert_eq!(builder.set_f_int64(1).unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    /* skipped defaults never reach the sink */
    assert!(builder.set_f_bool(false).is_ok());
    assert!(builder.get_mut().flush().is_ok());
}
