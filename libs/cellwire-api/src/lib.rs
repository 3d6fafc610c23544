//! Domain model for the cell wire codec: cells, mutations, row results,
//! read descriptors, the side-channel cell source and the error taxonomy
//! shared by every crate in the workspace.

pub mod b64;
pub mod cell;
pub mod error;
pub mod mutation;
pub mod plugin;
pub mod query;
pub mod result;
pub mod source;

pub use cell::{BufferCell, Cell, CellRef, KeyType, LATEST_TIMESTAMP, MAX_ROW_LENGTH, to_string_binary};
pub use error::{ErrorKind, WireError};
pub use mutation::{Durability, Mutation, MutationKind};
pub use plugin::{Comparator, Filter};
pub use query::{Consistency, Get, ReadType, Scan, TimeRange};
pub use result::RowResult;
pub use source::{CellSource, VecCellSource};
