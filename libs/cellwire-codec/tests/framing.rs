use prost::Message;
use proptest::prelude::*;

use cellwire_api::WireError;
use cellwire_codec::magic::{MAGIC_LEN, has_magic_in};
use cellwire_codec::{MessageReader, frame, has_magic, proto, require_magic, strip_magic, write_delimited};

proptest! {
    #[test]
    fn prop_framed_bytes_have_magic(payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let framed = frame(&payload);
        prop_assert!(has_magic(&framed));
        prop_assert_eq!(strip_magic(&framed).unwrap(), &payload[..]);
    }

    #[test]
    fn prop_short_input_never_has_magic(bytes in prop::collection::vec(any::<u8>(), 0..MAGIC_LEN)) {
        prop_assert!(!has_magic(&bytes));
        prop_assert!(matches!(require_magic(&bytes), Err(WireError::Format(_))));
    }
}

#[test]
fn magic_can_sit_inside_a_larger_buffer() {
    let mut buf = b"xx".to_vec();
    buf.extend_from_slice(&frame(b"body"));
    assert!(!has_magic(&buf));
    assert!(has_magic_in(&buf, 2, buf.len() - 2));
    assert!(!has_magic_in(&buf, 2, 3));
}

#[test]
fn empty_stream_yields_no_message() {
    let reader = MessageReader::unbounded();
    let none: Option<proto::Cell> = reader.parse_delimited(&[][..]).unwrap();
    assert!(none.is_none());
    let all: Vec<proto::Cell> = reader.parse_all_delimited(&[][..]).unwrap();
    assert!(all.is_empty());
}

#[test]
fn over_declared_length_is_a_format_error() {
    let range = proto::TimeRange { from: Some(1), to: Some(2) };
    let mut stream = range.encode_length_delimited_to_vec();
    stream.pop();
    let err = MessageReader::unbounded()
        .parse_delimited::<proto::TimeRange, _>(&stream[..])
        .unwrap_err();
    assert!(matches!(err, WireError::Format(_)));
}

#[test]
fn written_units_read_back_in_order() {
    let ranges: Vec<proto::TimeRange> =
        (0..5).map(|i| proto::TimeRange { from: Some(i), to: Some(i + 10) }).collect();
    let mut stream = Vec::new();
    for range in &ranges {
        write_delimited(range, &mut stream).unwrap();
    }
    let back: Vec<proto::TimeRange> = MessageReader::unbounded().parse_all_delimited(&stream[..]).unwrap();
    assert_eq!(back, ranges);
}

#[test]
fn garbage_inside_a_span_is_rejected() {
    // Field 0 is never valid.
    let stream = [2u8, 0x00, 0x00];
    let err = MessageReader::unbounded()
        .parse_delimited::<proto::TimeRange, _>(&stream[..])
        .unwrap_err();
    assert!(matches!(err, WireError::Format(_)));
}

#[test]
fn limit_applies_to_delimited_units() {
    let range = proto::TimeRange { from: Some(1), to: Some(2) };
    let stream = range.encode_length_delimited_to_vec();
    let reader = MessageReader::with_limit(1);
    assert!(matches!(
        reader.parse_delimited::<proto::TimeRange, _>(&stream[..]),
        Err(WireError::Format(_))
    ));
}
