mod common;

use bytes::Bytes;
use prost::Message;
use proptest::prelude::*;

use cellwire_api::{Cell, CellSource, Durability, KeyType, Mutation, MutationKind, VecCellSource, WireError};
use cellwire_codec::{
    CellBlockSource, CellTransport, MessageReader, decode_mutation, decode_put, encode_cell_block,
    encode_mutation, proto, strip_magic, to_delimited_bytes,
};

fn round_trip(mutation: &Mutation, transport: CellTransport) -> Mutation {
    let wire = encode_mutation(mutation, transport, None).unwrap();
    let bytes = wire.encode_to_vec();
    let wire: proto::MutationProto = MessageReader::unbounded().parse_slice(&bytes).unwrap();
    match transport {
        CellTransport::Inline => decode_mutation(&wire, None).unwrap(),
        CellTransport::SideChannel => {
            let mut block = CellBlockSource::new(encode_cell_block(mutation.cells()));
            decode_mutation(&wire, Some(&mut block)).unwrap()
        }
    }
}

#[test]
fn put_example_inline_and_count_only() {
    let put = common::put_r1();

    let inline = encode_mutation(&put, CellTransport::Inline, None).unwrap();
    let back = decode_put(&inline, None).unwrap();
    let cells: Vec<&Cell> = back.cells().collect();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0], &Cell::new("r1", "cf", "q", 100, KeyType::Put, "v"));
    assert_eq!(back, put);

    let count_only = encode_mutation(&put, CellTransport::SideChannel, None).unwrap();
    assert_eq!(count_only.associated_cell_count, Some(1));
    assert!(count_only.column_value.is_empty());
    let mut source = VecCellSource::new(vec![Cell::new("r1", "cf", "q", 100, KeyType::Put, "v")]);
    assert_eq!(decode_put(&count_only, Some(&mut source)).unwrap(), put);
}

#[test]
fn every_fixture_survives_both_transports() {
    for mutation in [common::put_r1(), common::mixed_put(), common::delete_row(), common::increment(), common::append()] {
        assert_eq!(round_trip(&mutation, CellTransport::Inline), mutation, "inline {}", mutation.kind());
        assert_eq!(round_trip(&mutation, CellTransport::SideChannel), mutation, "side channel {}", mutation.kind());
    }
}

#[test]
fn mixed_put_infers_delete_types() {
    let wire = encode_mutation(&common::mixed_put(), CellTransport::Inline, None).unwrap();
    let delete_types: Vec<Option<i32>> = wire
        .column_value
        .iter()
        .flat_map(|cv| cv.qualifier_value.iter().map(|qv| qv.delete_type))
        .collect();
    assert_eq!(
        delete_types,
        vec![
            None,
            None,
            Some(proto::DeleteType::DeleteOneVersion as i32),
            Some(proto::DeleteType::DeleteMultipleVersions as i32),
            Some(proto::DeleteType::DeleteFamily as i32),
            Some(proto::DeleteType::DeleteFamilyVersion as i32),
        ]
    );
}

#[test]
fn short_block_is_a_protocol_violation() {
    let mixed = common::mixed_put();
    let wire = encode_mutation(&mixed, CellTransport::SideChannel, None).unwrap();
    let short: Vec<Cell> = mixed.cells().take(mixed.size() - 1).cloned().collect();
    let mut block = CellBlockSource::new(encode_cell_block(&short));
    let err = decode_mutation(&wire, Some(&mut block)).unwrap_err();
    assert!(matches!(err, WireError::ProtocolViolation(ref msg) if msg.contains("row=row-7")));
}

#[test]
fn oversized_cell_count_fails_on_the_short_source() {
    let wire = proto::MutationProto {
        row: Some(Bytes::from_static(b"r")),
        mutate_type: Some(proto::MutationType::Put as i32),
        associated_cell_count: Some(i32::MAX),
        ..Default::default()
    };
    let mut source = VecCellSource::new(vec![common::value_cell("r", "q")]);
    let err = decode_put(&wire, Some(&mut source)).unwrap_err();
    assert!(matches!(err, WireError::ProtocolViolation(ref msg) if msg.contains("index 1")));
}

#[test]
fn side_channel_serves_several_mutations_in_order() {
    let first = common::put_r1();
    let second = common::increment();
    let mut block_cells: Vec<Cell> = first.cells().cloned().collect();
    block_cells.extend(second.cells().cloned());
    let mut block = CellBlockSource::new(encode_cell_block(&block_cells));

    let mut stream = Vec::new();
    for m in [&first, &second] {
        let wire = encode_mutation(m, CellTransport::SideChannel, Some(7)).unwrap();
        stream.extend_from_slice(&wire.encode_length_delimited_to_vec());
    }

    let reader = MessageReader::unbounded();
    let units: Vec<proto::MutationProto> = reader.parse_all_delimited(&stream[..]).unwrap();
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|u| u.nonce == Some(7)));
    assert_eq!(decode_mutation(&units[0], Some(&mut block)).unwrap(), first);
    assert_eq!(decode_mutation(&units[1], Some(&mut block)).unwrap(), second);
    assert!(!block.advance().unwrap());
}

#[test]
fn persisted_blob_carries_magic_and_length() {
    let wire = encode_mutation(&common::delete_row(), CellTransport::Inline, None).unwrap();
    let blob = to_delimited_bytes(&wire);
    let body = strip_magic(&blob).unwrap();
    let back: Option<proto::MutationProto> = MessageReader::unbounded().parse_delimited(body).unwrap();
    assert_eq!(back.as_ref(), Some(&wire));
    assert_eq!(decode_mutation(&wire, None).unwrap(), common::delete_row());
}

#[test]
fn nonce_is_emitted_only_when_given() {
    let put = common::put_r1();
    assert_eq!(encode_mutation(&put, CellTransport::Inline, None).unwrap().nonce, None);
    assert_eq!(encode_mutation(&put, CellTransport::Inline, Some(42)).unwrap().nonce, Some(42));
}

// ---- property: any mutation survives either transport ----

fn key_type_for(kind: MutationKind) -> BoxedStrategy<KeyType> {
    let deletes = prop_oneof![
        Just(KeyType::Delete),
        Just(KeyType::DeleteColumn),
        Just(KeyType::DeleteFamily),
        Just(KeyType::DeleteFamilyVersion),
    ];
    match kind {
        MutationKind::Delete => deletes.boxed(),
        MutationKind::Put => prop_oneof![Just(KeyType::Put), deletes].boxed(),
        MutationKind::Increment | MutationKind::Append => Just(KeyType::Put).boxed(),
    }
}

fn arb_cell(row: Bytes, kind: MutationKind) -> impl Strategy<Value = Cell> {
    (
        prop::sample::select(vec!["a", "b", "c"]),
        prop::collection::vec(any::<u8>(), 0..6),
        0u64..1_000,
        key_type_for(kind),
        prop::collection::vec(any::<u8>(), 0..12),
        prop::collection::vec(any::<u8>(), 0..4),
    )
        .prop_map(move |(family, qualifier, ts, key_type, value, tags)| {
            let cell = if key_type.is_delete() {
                Cell::delete_marker(row.clone(), family, qualifier, ts, key_type)
            } else {
                Cell::new(row.clone(), family, qualifier, ts, key_type, value)
            };
            cell.with_tags(tags)
        })
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    let kinds = prop_oneof![
        Just(MutationKind::Put),
        Just(MutationKind::Delete),
        Just(MutationKind::Increment),
        Just(MutationKind::Append),
    ];
    let durability = prop_oneof![
        Just(Durability::UseDefault),
        Just(Durability::SkipWal),
        Just(Durability::AsyncWal),
        Just(Durability::SyncWal),
        Just(Durability::FsyncWal),
    ];
    (kinds, prop::collection::vec(any::<u8>(), 1..8), durability, 0u64..5_000).prop_flat_map(
        |(kind, row, durability, ts)| {
            let row = Bytes::from(row);
            let cells = prop::collection::vec(arb_cell(row.clone(), kind), 0..8);
            cells.prop_map(move |cells| {
                let mut m = Mutation::new(kind, row.clone())
                    .unwrap()
                    .with_timestamp(ts)
                    .with_durability(durability);
                for cell in cells {
                    m.add_cell(cell).unwrap();
                }
                m
            })
        },
    )
}

proptest! {
    #[test]
    fn prop_mutation_round_trips(m in arb_mutation()) {
        prop_assert_eq!(&round_trip(&m, CellTransport::Inline), &m);
        prop_assert_eq!(&round_trip(&m, CellTransport::SideChannel), &m);
    }
}
