//! Protobuf codec for cells, mutations, row results and read descriptors.
//!
//! Every persisted or transmitted unit is framed with the `PBUF` prefix
//! (see [`magic`]); message bodies are parsed without a size ceiling unless
//! one is configured (see [`reader`]).

pub mod cell;
pub mod cellblock;
pub mod config;
pub mod enums;
pub mod magic;
pub mod metrics;
pub mod mutation;
pub mod plugin;
pub mod proto;
pub mod query;
pub mod reader;
pub mod result;

pub use cell::{decode_cell, encode_cell};
pub use cellblock::{CellBlockSource, encode_cell_block};
pub use config::{CodecConfig, ConfigError};
pub use magic::{MAGIC, frame, has_magic, require_magic, strip_magic};
pub use metrics::{decode_scan_metrics, encode_scan_metrics};
pub use mutation::{
    CellTransport, decode_append, decode_delete, decode_get_from_mutation, decode_increment,
    decode_mutation, decode_put, encode_mutation, short_string, to_mutation_proto,
    to_mutation_proto_no_data,
};
pub use plugin::{ComparatorParseFn, FilterParseFn, PluginRegistry, encode_comparator, encode_filter};
pub use query::{decode_get, decode_scan, decode_time_range, encode_get, encode_scan, encode_time_range};
pub use reader::{MessageReader, to_delimited_bytes, write_delimited};
pub use result::{decode_result, encode_result, encode_result_no_data, existence_result};
