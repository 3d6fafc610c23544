//! Domain ⇄ wire enum mappings.
//!
//! Encoding is total. Decoding is strict: a code outside the table fails
//! with `UnsupportedVariant` instead of collapsing to a default.

use cellwire_api::{Consistency, Durability, KeyType, MutationKind, ReadType, WireError};

use crate::proto;

// ---- cell type ----

pub fn cell_type_to_wire(key_type: KeyType) -> proto::CellType {
    match key_type {
        KeyType::Put => proto::CellType::Put,
        KeyType::Delete => proto::CellType::Delete,
        KeyType::DeleteFamilyVersion => proto::CellType::DeleteFamilyVersion,
        KeyType::DeleteColumn => proto::CellType::DeleteColumn,
        KeyType::DeleteFamily => proto::CellType::DeleteFamily,
    }
}

/// An absent type reads as the wire default (`Minimum`), which no real
/// cell carries.
pub fn cell_type_from_wire(code: Option<i32>) -> Result<KeyType, WireError> {
    let code = code.unwrap_or(proto::CellType::Minimum as i32);
    u8::try_from(code)
        .ok()
        .and_then(KeyType::from_code)
        .ok_or_else(|| WireError::unsupported("cell type", code))
}

// ---- mutation type ----

pub fn mutation_type_to_wire(kind: MutationKind) -> proto::MutationType {
    match kind {
        MutationKind::Append => proto::MutationType::Append,
        MutationKind::Increment => proto::MutationType::Increment,
        MutationKind::Put => proto::MutationType::Put,
        MutationKind::Delete => proto::MutationType::Delete,
    }
}

pub fn mutation_type_from_wire(code: Option<i32>) -> Result<MutationKind, WireError> {
    let code = code.ok_or_else(|| WireError::format("mutation type is missing"))?;
    match proto::MutationType::try_from(code) {
        Ok(proto::MutationType::Append) => Ok(MutationKind::Append),
        Ok(proto::MutationType::Increment) => Ok(MutationKind::Increment),
        Ok(proto::MutationType::Put) => Ok(MutationKind::Put),
        Ok(proto::MutationType::Delete) => Ok(MutationKind::Delete),
        Err(_) => Err(WireError::unsupported("mutation type", code)),
    }
}

// ---- delete type ----

/// Only delete markers have a delete type.
pub fn delete_type_to_wire(key_type: KeyType) -> Result<proto::DeleteType, WireError> {
    match key_type {
        KeyType::Delete => Ok(proto::DeleteType::DeleteOneVersion),
        KeyType::DeleteColumn => Ok(proto::DeleteType::DeleteMultipleVersions),
        KeyType::DeleteFamily => Ok(proto::DeleteType::DeleteFamily),
        KeyType::DeleteFamilyVersion => Ok(proto::DeleteType::DeleteFamilyVersion),
        KeyType::Put => Err(WireError::unsupported("delete type", i32::from(key_type.code()))),
    }
}

pub fn delete_type_from_wire(code: i32) -> Result<KeyType, WireError> {
    match proto::DeleteType::try_from(code) {
        Ok(proto::DeleteType::DeleteOneVersion) => Ok(KeyType::Delete),
        Ok(proto::DeleteType::DeleteMultipleVersions) => Ok(KeyType::DeleteColumn),
        Ok(proto::DeleteType::DeleteFamily) => Ok(KeyType::DeleteFamily),
        Ok(proto::DeleteType::DeleteFamilyVersion) => Ok(KeyType::DeleteFamilyVersion),
        Err(_) => Err(WireError::unsupported("delete type", code)),
    }
}

// ---- durability ----

pub fn durability_to_wire(durability: Durability) -> proto::Durability {
    match durability {
        Durability::UseDefault => proto::Durability::UseDefault,
        Durability::SkipWal => proto::Durability::SkipWal,
        Durability::AsyncWal => proto::Durability::AsyncWal,
        Durability::SyncWal => proto::Durability::SyncWal,
        Durability::FsyncWal => proto::Durability::FsyncWal,
    }
}

pub fn durability_from_wire(code: Option<i32>) -> Result<Durability, WireError> {
    let Some(code) = code else {
        return Ok(Durability::UseDefault);
    };
    match proto::Durability::try_from(code) {
        Ok(proto::Durability::UseDefault) => Ok(Durability::UseDefault),
        Ok(proto::Durability::SkipWal) => Ok(Durability::SkipWal),
        Ok(proto::Durability::AsyncWal) => Ok(Durability::AsyncWal),
        Ok(proto::Durability::SyncWal) => Ok(Durability::SyncWal),
        Ok(proto::Durability::FsyncWal) => Ok(Durability::FsyncWal),
        Err(_) => Err(WireError::unsupported("durability", code)),
    }
}

// ---- consistency ----

pub fn consistency_to_wire(consistency: Consistency) -> proto::Consistency {
    match consistency {
        Consistency::Strong => proto::Consistency::Strong,
        Consistency::Timeline => proto::Consistency::Timeline,
    }
}

pub fn consistency_from_wire(code: i32) -> Result<Consistency, WireError> {
    match proto::Consistency::try_from(code) {
        Ok(proto::Consistency::Strong) => Ok(Consistency::Strong),
        Ok(proto::Consistency::Timeline) => Ok(Consistency::Timeline),
        Err(_) => Err(WireError::unsupported("consistency", code)),
    }
}

// ---- read type ----

pub fn read_type_to_wire(read_type: ReadType) -> proto::ReadType {
    match read_type {
        ReadType::Default => proto::ReadType::Default,
        ReadType::Stream => proto::ReadType::Stream,
        ReadType::Pread => proto::ReadType::Pread,
    }
}

pub fn read_type_from_wire(code: i32) -> Result<ReadType, WireError> {
    match proto::ReadType::try_from(code) {
        Ok(proto::ReadType::Default) => Ok(ReadType::Default),
        Ok(proto::ReadType::Stream) => Ok(ReadType::Stream),
        Ok(proto::ReadType::Pread) => Ok(ReadType::Pread),
        Err(_) => Err(WireError::unsupported("read type", code)),
    }
}
