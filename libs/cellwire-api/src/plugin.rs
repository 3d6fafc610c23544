use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;

use crate::cell::Cell;

// ════════════════════════════════════════════════════════════════
//  Named extensions
// ════════════════════════════════════════════════════════════════

/// Server-side row filter carried on reads.
///
/// `type_name` is the fully-qualified identifier the remote side resolves
/// the implementation by; `to_bytes` is the implementation's own payload.
/// Both travel opaquely through the codec.
pub trait Filter: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn to_bytes(&self) -> Bytes;

    fn as_any(&self) -> &dyn Any;

    /// Whether the filter lets `cell` through. Used by local tooling; the
    /// codec itself never calls it.
    fn accepts(&self, cell: &Cell) -> bool;
}

/// Byte comparator used by comparison filters.
pub trait Comparator: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn to_bytes(&self) -> Bytes;

    fn as_any(&self) -> &dyn Any;

    /// Compare the comparator's operand against `other`.
    fn compare_to(&self, other: &[u8]) -> Ordering;
}
