//! Mutation codec.
//!
//! A mutation travels either with its cells inline, as family → qualifier →
//! value entries, or as a header that only declares how many cells follow
//! on a side channel. Decoding a count-only header pulls exactly that many
//! cells from the caller's [`CellSource`].

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use cellwire_api::{
    Cell, CellSource, Get, KeyType, LATEST_TIMESTAMP, Mutation, MutationKind, WireError,
    to_string_binary,
};

use crate::cell::reserved_cells;
use crate::enums::{
    delete_type_from_wire, delete_type_to_wire, durability_from_wire, durability_to_wire,
    mutation_type_from_wire, mutation_type_to_wire,
};
use crate::proto;
use crate::query::{decode_attributes, decode_time_range, encode_attributes, encode_bounded_time_range, owned};

/// Where cell data goes when a mutation or result is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTransport {
    /// Cells embedded in the message.
    #[default]
    Inline,
    /// Message carries a cell count only; cells go out separately.
    SideChannel,
}

/// `row=<escaped>, type=<TYPE>`. Never includes cell data, so it is safe in
/// error messages.
pub fn short_string(wire: &proto::MutationProto) -> String {
    let row = wire.row.as_deref().map(to_string_binary).unwrap_or_default();
    let kind = match wire.mutate_type {
        None => "NONE".to_string(),
        Some(code) => match mutation_type_from_wire(Some(code)) {
            Ok(kind) => kind.to_string(),
            Err(_) => format!("UNKNOWN({code})"),
        },
    };
    format!("row={row}, type={kind}")
}

// ════════════════════════════════════════════════════════════════
//  Encode
// ════════════════════════════════════════════════════════════════

/// Encode with the chosen transport. With [`CellTransport::SideChannel`]
/// the caller ships `mutation.cells()` itself, in that order.
pub fn encode_mutation(
    mutation: &Mutation,
    transport: CellTransport,
    nonce: Option<u64>,
) -> Result<proto::MutationProto, WireError> {
    match transport {
        CellTransport::Inline => to_mutation_proto(mutation, nonce),
        CellTransport::SideChannel => to_mutation_proto_no_data(mutation, nonce),
    }
}

fn header(mutation: &Mutation, nonce: Option<u64>) -> proto::MutationProto {
    proto::MutationProto {
        row: Some(mutation.row().clone()),
        mutate_type: Some(mutation_type_to_wire(mutation.kind()) as i32),
        durability: Some(durability_to_wire(mutation.durability()) as i32),
        timestamp: Some(mutation.timestamp()),
        attribute: encode_attributes(mutation.attributes()),
        time_range: match mutation.kind() {
            MutationKind::Increment => encode_bounded_time_range(mutation.time_range()),
            _ => None,
        },
        nonce,
        ..Default::default()
    }
}

/// Header plus every cell inline.
///
/// Delete mutations and delete markers riding in a put carry a delete type
/// derived from the cell type. A value cell inside a delete mutation has no
/// delete type and fails with `UnsupportedVariant`.
pub fn to_mutation_proto(
    mutation: &Mutation,
    nonce: Option<u64>,
) -> Result<proto::MutationProto, WireError> {
    let mut wire = header(mutation, nonce);
    let kind = mutation.kind();
    for (family, cells) in mutation.family_map() {
        let mut column = proto::ColumnValue { family: family.clone(), qualifier_value: Vec::with_capacity(cells.len()) };
        for cell in cells {
            let needs_delete_type =
                kind == MutationKind::Delete || (kind == MutationKind::Put && cell.is_delete());
            let delete_type = if needs_delete_type {
                Some(delete_type_to_wire(cell.key_type)? as i32)
            } else {
                None
            };
            column.qualifier_value.push(proto::QualifierValue {
                qualifier: Some(cell.qualifier.clone()),
                value: Some(cell.value.clone()),
                timestamp: Some(cell.timestamp),
                delete_type,
                tags: cell.tags.clone(),
            });
        }
        wire.column_value.push(column);
    }
    Ok(wire)
}

/// Header plus the cell count; no cell data.
pub fn to_mutation_proto_no_data(
    mutation: &Mutation,
    nonce: Option<u64>,
) -> Result<proto::MutationProto, WireError> {
    let count = i32::try_from(mutation.size()).map_err(|_| {
        WireError::format(format!("{} cells do not fit the cell count field", mutation.size()))
    })?;
    let mut wire = header(mutation, nonce);
    wire.associated_cell_count = Some(count);
    Ok(wire)
}

// ════════════════════════════════════════════════════════════════
//  Decode
// ════════════════════════════════════════════════════════════════

/// Decode whatever kind the message declares.
pub fn decode_mutation(
    wire: &proto::MutationProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Mutation, WireError> {
    let kind = mutation_type_from_wire(wire.mutate_type)?;
    decode_as(kind, wire, source)
}

pub fn decode_put(
    wire: &proto::MutationProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Mutation, WireError> {
    expect_kind(wire, &[MutationKind::Put])?;
    decode_as(MutationKind::Put, wire, source)
}

pub fn decode_delete(
    wire: &proto::MutationProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Mutation, WireError> {
    expect_kind(wire, &[MutationKind::Delete])?;
    decode_as(MutationKind::Delete, wire, source)
}

pub fn decode_increment(
    wire: &proto::MutationProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Mutation, WireError> {
    expect_kind(wire, &[MutationKind::Increment])?;
    decode_as(MutationKind::Increment, wire, source)
}

pub fn decode_append(
    wire: &proto::MutationProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Mutation, WireError> {
    expect_kind(wire, &[MutationKind::Append])?;
    decode_as(MutationKind::Append, wire, source)
}

/// Read back the columns an increment or append touches, as a Get.
pub fn decode_get_from_mutation(
    wire: &proto::MutationProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Get, WireError> {
    expect_kind(wire, &[MutationKind::Increment, MutationKind::Append])?;
    let count = wire.associated_cell_count.unwrap_or(0);
    let mut get = if count > 0 {
        let cells = pull_all(wire, count, source)?;
        let mut get = Get::new(first_row(wire, &cells)?)?;
        for cell in cells {
            get.add_column(cell.family, cell.qualifier);
        }
        get
    } else {
        let mut get = Get::new(required_row(wire)?)?;
        for column in &wire.column_value {
            for qv in &column.qualifier_value {
                if qv.value.is_none() {
                    return Err(missing_value(wire));
                }
                get.add_column(owned(&column.family), qv.qualifier.as_ref().map(owned).unwrap_or_default());
            }
        }
        get
    };
    if let Some(range) = &wire.time_range {
        get.time_range = decode_time_range(range)?;
    }
    get.attributes = decode_attributes(&wire.attribute);
    Ok(get)
}

fn expect_kind(wire: &proto::MutationProto, expected: &[MutationKind]) -> Result<(), WireError> {
    let kind = mutation_type_from_wire(wire.mutate_type)?;
    if expected.contains(&kind) {
        Ok(())
    } else {
        Err(WireError::protocol(format!(
            "expected {} message: {}",
            expected.iter().map(ToString::to_string).collect::<Vec<_>>().join(" or "),
            short_string(wire)
        )))
    }
}

fn required_row(wire: &proto::MutationProto) -> Result<Bytes, WireError> {
    wire.row
        .as_ref()
        .map(owned)
        .ok_or_else(|| WireError::format(format!("row is missing: {}", short_string(wire))))
}

fn require_source<'a>(
    wire: &proto::MutationProto,
    count: i32,
    source: Option<&'a mut dyn CellSource>,
) -> Result<&'a mut dyn CellSource, WireError> {
    source.ok_or_else(|| {
        WireError::protocol(format!(
            "cell count of {count} but no cell source: {}",
            short_string(wire)
        ))
    })
}

/// Pull exactly `count` cells in order.
fn pull_all(
    wire: &proto::MutationProto,
    count: i32,
    source: Option<&mut dyn CellSource>,
) -> Result<Vec<Cell>, WireError> {
    let source = require_source(wire, count, source)?;
    let mut cells = Vec::with_capacity(reserved_cells(count));
    for index in 0..count {
        let exhausted = || {
            WireError::protocol(format!(
                "cell count of {count} but at index {index} no cell returned: {}",
                short_string(wire)
            ))
        };
        if !source.advance()? {
            return Err(exhausted());
        }
        cells.push(source.current().cloned().ok_or_else(exhausted)?);
    }
    Ok(cells)
}

/// Row of the first pulled cell, for headers that omit it.
fn first_row(wire: &proto::MutationProto, cells: &[Cell]) -> Result<Bytes, WireError> {
    cells
        .first()
        .map(|cell| cell.row.clone())
        .ok_or_else(|| WireError::format(format!("row is missing: {}", short_string(wire))))
}

fn missing_value(wire: &proto::MutationProto) -> WireError {
    WireError::protocol(format!(
        "qualifier entry carries neither a value nor a delete type: {}",
        short_string(wire)
    ))
}

fn decode_as(
    kind: MutationKind,
    wire: &proto::MutationProto,
    source: Option<&mut dyn CellSource>,
) -> Result<Mutation, WireError> {
    let timestamp = wire.timestamp.unwrap_or(LATEST_TIMESTAMP);
    let count = wire.associated_cell_count.unwrap_or(0);
    let header_row = wire.row.as_ref().map(owned);

    let mut mutation = if count > 0 {
        let cells = pull_all(wire, count, source)?;
        let row = match header_row {
            Some(row) => row,
            None => first_row(wire, &cells)?,
        };
        let mut mutation = Mutation::new(kind, row)?.with_timestamp(timestamp);
        for cell in cells {
            mutation.add_cell(cell).map_err(|e| e.with_context(short_string(wire)))?;
        }
        mutation
    } else {
        let row = required_row(wire)?;
        let mut mutation = Mutation::new(kind, row.clone())?.with_timestamp(timestamp);
        for column in &wire.column_value {
            let family = owned(&column.family);
            for qv in &column.qualifier_value {
                let cell = inline_cell(kind, wire, &row, &family, qv, timestamp)?;
                mutation.add_cell(cell)?;
            }
        }
        mutation
    };

    mutation = mutation.with_durability(durability_from_wire(wire.durability)?);
    if kind == MutationKind::Increment {
        if let Some(range) = &wire.time_range {
            mutation = mutation.with_time_range(decode_time_range(range)?);
        }
    }
    for (name, value) in decode_attributes(&wire.attribute) {
        mutation.set_attribute(name, value);
    }
    Ok(mutation)
}

/// Rebuild one inline qualifier entry.
///
/// A delete type makes the entry a delete marker and no value is needed;
/// otherwise the entry must carry a value. In a delete, such an entry is a
/// one-version delete. Entries without a timestamp take
/// the mutation's, except in deletes where they mean "latest".
fn inline_cell(
    kind: MutationKind,
    wire: &proto::MutationProto,
    row: &Bytes,
    family: &Bytes,
    qv: &proto::QualifierValue,
    timestamp: u64,
) -> Result<Cell, WireError> {
    let qualifier = qv.qualifier.as_ref().map(owned).unwrap_or_default();
    let tags = qv.tags.as_ref().map(owned).unwrap_or_default();
    let cell = match kind {
        MutationKind::Delete => {
            // An unset delete type is the wire default, a one-version delete.
            let key_type = match (qv.delete_type, &qv.value) {
                (Some(code), _) => delete_type_from_wire(code)?,
                (None, Some(_)) => KeyType::Delete,
                (None, None) => return Err(missing_value(wire)),
            };
            let ts = qv.timestamp.unwrap_or(LATEST_TIMESTAMP);
            Cell::delete_marker(row.clone(), family.clone(), qualifier, ts, key_type)
        }
        MutationKind::Put => {
            let ts = qv.timestamp.unwrap_or(timestamp);
            match (qv.delete_type, &qv.value) {
                (Some(code), _) => {
                    let key_type = delete_type_from_wire(code)?;
                    Cell::delete_marker(row.clone(), family.clone(), qualifier, ts, key_type)
                }
                (None, Some(value)) => {
                    Cell::new(row.clone(), family.clone(), qualifier, ts, KeyType::Put, owned(value))
                }
                (None, None) => return Err(missing_value(wire)),
            }
        }
        MutationKind::Increment | MutationKind::Append => {
            if qv.delete_type.is_some() {
                return Err(WireError::protocol(format!(
                    "delete type on a {kind} entry: {}",
                    short_string(wire)
                )));
            }
            let value = qv.value.as_ref().ok_or_else(|| missing_value(wire))?;
            let ts = qv.timestamp.unwrap_or(timestamp);
            Cell::new(row.clone(), family.clone(), qualifier, ts, KeyType::Put, owned(value))
        }
    };
    Ok(cell.with_tags(tags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellwire_api::{Durability, TimeRange, VecCellSource};

    fn put() -> Mutation {
        let mut put = Mutation::put("r1").unwrap().with_timestamp(100);
        put.add_column("cf", "q", "v");
        put
    }

    #[test]
    fn inline_put_round_trip() {
        let wire = encode_mutation(&put(), CellTransport::Inline, None).unwrap();
        assert_eq!(wire.associated_cell_count, None);
        let back = decode_put(&wire, None).unwrap();
        assert_eq!(back, put());
        let cell = back.cells().next().unwrap();
        assert_eq!(cell, &Cell::new("r1", "cf", "q", 100, KeyType::Put, "v"));
    }

    #[test]
    fn count_only_put_pulls_from_source() {
        let original = put();
        let wire = encode_mutation(&original, CellTransport::SideChannel, None).unwrap();
        assert_eq!(wire.associated_cell_count, Some(1));
        assert!(wire.column_value.is_empty());
        let mut source = VecCellSource::new(original.cells().cloned().collect());
        let back = decode_mutation(&wire, Some(&mut source)).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn short_source_is_a_protocol_violation() {
        let mut original = put();
        original.add_column("cf", "q2", "v2");
        let wire = to_mutation_proto_no_data(&original, None).unwrap();
        let mut source = VecCellSource::new(vec![original.cells().next().unwrap().clone()]);
        let err = decode_put(&wire, Some(&mut source)).unwrap_err();
        assert!(matches!(err, WireError::ProtocolViolation(ref m) if m.contains("index 1")));
    }

    #[test]
    fn missing_source_is_a_protocol_violation() {
        let wire = to_mutation_proto_no_data(&put(), None).unwrap();
        assert!(matches!(decode_put(&wire, None), Err(WireError::ProtocolViolation(_))));
    }

    #[test]
    fn row_comes_from_first_pulled_cell() {
        let mut wire = to_mutation_proto_no_data(&put(), None).unwrap();
        wire.row = None;
        let mut source = VecCellSource::new(put().cells().cloned().collect());
        let back = decode_put(&wire, Some(&mut source)).unwrap();
        assert_eq!(back.row(), &Bytes::from_static(b"r1"));
    }

    #[test]
    fn inline_mutation_needs_a_row() {
        let mut wire = to_mutation_proto(&put(), None).unwrap();
        wire.row = None;
        assert!(matches!(decode_put(&wire, None), Err(WireError::Format(_))));
    }

    #[test]
    fn mismatched_kind_is_rejected() {
        let wire = to_mutation_proto(&put(), None).unwrap();
        assert!(matches!(decode_delete(&wire, None), Err(WireError::ProtocolViolation(_))));
        assert!(matches!(decode_get_from_mutation(&wire, None), Err(WireError::ProtocolViolation(_))));
    }

    #[test]
    fn put_with_delete_marker_carries_delete_type() {
        let mut mixed = put();
        mixed.add_cell(Cell::delete_marker("r1", "cf", "old", 90, KeyType::DeleteColumn)).unwrap();
        let wire = to_mutation_proto(&mixed, None).unwrap();
        let entries = &wire.column_value[0].qualifier_value;
        assert_eq!(entries[0].delete_type, None);
        assert_eq!(entries[1].delete_type, Some(proto::DeleteType::DeleteMultipleVersions as i32));
        assert_eq!(decode_put(&wire, None).unwrap(), mixed);
    }

    #[test]
    fn delete_round_trip() {
        let mut delete = Mutation::delete("r1").unwrap().with_durability(Durability::SkipWal);
        delete.delete_column("cf", "a", 5).delete_columns("cf", "b", 6).delete_family("cg", 7);
        delete.delete_family_version("ch", 8);
        delete.set_attribute("by", "test");
        let wire = to_mutation_proto(&delete, Some(11)).unwrap();
        assert_eq!(wire.nonce, Some(11));
        assert_eq!(decode_delete(&wire, None).unwrap(), delete);
    }

    #[test]
    fn delete_entry_without_timestamp_means_latest() {
        let wire = proto::MutationProto {
            row: Some(Bytes::from_static(b"r")),
            mutate_type: Some(proto::MutationType::Delete as i32),
            timestamp: Some(3),
            column_value: vec![proto::ColumnValue {
                family: Bytes::from_static(b"f"),
                qualifier_value: vec![proto::QualifierValue {
                    qualifier: Some(Bytes::from_static(b"q")),
                    delete_type: Some(proto::DeleteType::DeleteOneVersion as i32),
                    ..Default::default()
                }],
            }],
            ..Default::default()
        };
        let delete = decode_delete(&wire, None).unwrap();
        assert_eq!(delete.cells().next().unwrap().timestamp, LATEST_TIMESTAMP);
    }

    #[test]
    fn untyped_delete_entry_is_a_one_version_delete() {
        let wire = proto::MutationProto {
            row: Some(Bytes::from_static(b"r")),
            mutate_type: Some(proto::MutationType::Delete as i32),
            column_value: vec![proto::ColumnValue {
                family: Bytes::from_static(b"f"),
                qualifier_value: vec![proto::QualifierValue {
                    qualifier: Some(Bytes::from_static(b"q")),
                    timestamp: Some(4),
                    value: Some(Bytes::new()),
                    ..Default::default()
                }],
            }],
            ..Default::default()
        };
        let delete = decode_delete(&wire, None).unwrap();
        let cell = delete.cells().next().unwrap();
        assert_eq!(cell, &Cell::delete_marker("r", "f", "q", 4, KeyType::Delete));
    }

    #[test]
    fn value_cell_in_delete_cannot_be_encoded() {
        // Built through serde to get a value cell into a delete mutation.
        let mut json = serde_json::to_value(put()).unwrap();
        json["kind"] = "delete".into();
        let bogus: Mutation = serde_json::from_value(json).unwrap();
        assert!(matches!(
            to_mutation_proto(&bogus, None),
            Err(WireError::UnsupportedVariant { what: "delete type", code: 4 })
        ));
    }

    #[test]
    fn empty_qualifier_entry_is_a_protocol_violation() {
        for kind in [proto::MutationType::Put, proto::MutationType::Delete, proto::MutationType::Append] {
            let wire = proto::MutationProto {
                row: Some(Bytes::from_static(b"r")),
                mutate_type: Some(kind as i32),
                column_value: vec![proto::ColumnValue {
                    family: Bytes::from_static(b"f"),
                    qualifier_value: vec![proto::QualifierValue {
                        qualifier: Some(Bytes::from_static(b"q")),
                        ..Default::default()
                    }],
                }],
                ..Default::default()
            };
            assert!(matches!(decode_mutation(&wire, None), Err(WireError::ProtocolViolation(_))));
        }
    }

    #[test]
    fn increment_keeps_time_range_in_both_modes() {
        let mut inc = Mutation::increment("r").unwrap().with_time_range(TimeRange::new(1, 9).unwrap());
        inc.add_increment("f", "hits", 3);
        for transport in [CellTransport::Inline, CellTransport::SideChannel] {
            let wire = encode_mutation(&inc, transport, None).unwrap();
            assert_eq!(wire.time_range, Some(proto::TimeRange { from: Some(1), to: Some(9) }));
            let mut source = VecCellSource::new(inc.cells().cloned().collect());
            assert_eq!(decode_increment(&wire, Some(&mut source)).unwrap(), inc);
        }
    }

    #[test]
    fn append_as_get_lists_columns() {
        let mut append = Mutation::append("r").unwrap();
        append.add_column("f", "a", "x").add_column("g", "b", "y");
        let wire = to_mutation_proto(&append, None).unwrap();
        let get = decode_get_from_mutation(&wire, None).unwrap();
        assert_eq!(get.row, Bytes::from_static(b"r"));
        assert_eq!(get.columns.len(), 2);

        let wire = to_mutation_proto_no_data(&append, None).unwrap();
        let mut source = VecCellSource::new(append.cells().cloned().collect());
        let pulled = decode_get_from_mutation(&wire, Some(&mut source)).unwrap();
        assert_eq!(pulled, get);
    }

    #[test]
    fn unknown_durability_is_unsupported() {
        let mut wire = to_mutation_proto(&put(), None).unwrap();
        wire.durability = Some(42);
        assert!(matches!(decode_put(&wire, None), Err(WireError::UnsupportedVariant { code: 42, .. })));
    }

    #[test]
    fn short_string_hides_values() {
        let wire = to_mutation_proto(&put(), None).unwrap();
        assert_eq!(short_string(&wire), "row=r1, type=PUT");
        assert_eq!(short_string(&proto::MutationProto::default()), "row=, type=NONE");
    }
}
