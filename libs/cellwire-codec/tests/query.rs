mod common;

use std::sync::Arc;

use prost::Message;

use cellwire_api::{
    Cell, Consistency, Get, KeyType, Mutation, ReadType, Scan, TimeRange, WireError,
};
use cellwire_codec::{
    CellTransport, MessageReader, decode_get, decode_get_from_mutation, decode_scan, encode_get,
    encode_mutation, encode_scan, proto,
};
use cellwire_comparator_binary::BinaryPrefixComparator;
use cellwire_filter_prefix::PrefixFilter;

#[test]
fn get_with_prefix_filter_round_trips() {
    let registry = common::registry();
    let mut get = Get::new("user#1").unwrap().with_filter(Arc::new(PrefixFilter::new(&b"user#"[..])));
    get.add_family("profile").add_column("stats", "visits");
    get.time_range = TimeRange::new(100, 200).unwrap();
    get.cf_time_ranges.insert("stats".into(), TimeRange::at(150));
    get.max_versions = 3;
    get.store_limit = Some(10);
    get.existence_only = true;
    get.consistency = Consistency::Timeline;
    get.load_column_families_on_demand = Some(false);
    get.attributes.insert("trace".into(), "abc".into());

    let bytes = encode_get(&get).encode_to_vec();
    let wire: proto::Get = MessageReader::unbounded().parse_slice(&bytes).unwrap();
    let back = decode_get(&wire, &registry).unwrap();
    assert_eq!(back, get);

    let filter = back.filter.as_ref().unwrap();
    assert!(filter.accepts(&Cell::new("user#9", "f", "q", 1, KeyType::Put, "v")));
    assert!(!filter.accepts(&Cell::new("order#9", "f", "q", 1, KeyType::Put, "v")));
}

#[test]
fn unregistered_filter_fails_resolution() {
    let get = Get::new("r").unwrap().with_filter(Arc::new(PrefixFilter::new(&b"r"[..])));
    let wire = encode_get(&get);
    let err = decode_get(&wire, &cellwire_codec::PluginRegistry::new()).unwrap_err();
    assert!(matches!(err, WireError::PluginResolution { .. }));
    assert!(!err.is_retryable());
}

#[test]
fn scan_round_trips_every_field() {
    let registry = common::registry();
    let mut scan = Scan {
        start_row: "a".into(),
        include_start_row: false,
        stop_row: "m".into(),
        include_stop_row: true,
        batch_size: Some(100),
        max_result_size: Some(1 << 20),
        store_offset: 2,
        reversed: true,
        consistency: Consistency::Timeline,
        caching: Some(50),
        allow_partial_results: true,
        mvcc_read_point: Some(77),
        read_type: ReadType::Stream,
        ..Scan::default()
    }
    .with_filter(Arc::new(PrefixFilter::new(&b"a"[..])));
    scan.add_column("f", "q");

    let back = decode_scan(&encode_scan(&scan), &registry).unwrap();
    assert_eq!(back, scan);
}

#[test]
fn small_scan_reads_with_pread() {
    let scan = Scan { small: true, ..Scan::default() };
    let back = decode_scan(&encode_scan(&scan), &common::registry()).unwrap();
    assert!(back.small);
    assert_eq!(back.read_type, ReadType::Pread);
}

#[test]
fn inverted_time_range_is_a_format_error() {
    let mut wire = encode_get(&Get::new("r").unwrap());
    wire.time_range = Some(proto::TimeRange { from: Some(9), to: Some(3) });
    assert!(matches!(decode_get(&wire, &common::registry()), Err(WireError::Format(_))));
}

#[test]
fn comparator_payload_resolves_through_the_registry() {
    let registry = common::registry();
    let wire = cellwire_codec::encode_comparator(&BinaryPrefixComparator::new(&b"ab"[..]));
    let cmp = registry.decode_comparator(&wire).unwrap();
    assert_eq!(cmp.compare_to(b"abc"), std::cmp::Ordering::Equal);
}

#[test]
fn increment_reads_back_as_get() {
    let inc = common::increment();
    let wire = encode_mutation(&inc, CellTransport::Inline, None).unwrap();
    let get = decode_get_from_mutation(&wire, None).unwrap();
    assert_eq!(&get.row[..], b"counter");
    assert_eq!(get.time_range, TimeRange::new(10, 20).unwrap());
    assert_eq!(get.columns.len(), 1);
    assert_eq!(get.columns.values().next().map(|q| q.len()), Some(2));

    let put = encode_mutation(&Mutation::put("p").unwrap(), CellTransport::Inline, None).unwrap();
    assert!(matches!(
        decode_get_from_mutation(&put, None),
        Err(WireError::ProtocolViolation(_))
    ));
}
