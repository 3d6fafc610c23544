use bytes::Bytes;
use prost::Message;
use serde::Serialize;

use cellwire_api::CellSource;
use cellwire_codec::{
    CellBlockSource, CodecConfig, MessageReader, decode_get, decode_mutation, decode_result,
    decode_scan, proto, strip_magic,
};

use crate::config::{InspectArgs, Kind};
use crate::error::{CliError, read_file};

pub fn run(codec: &CodecConfig, args: InspectArgs) -> Result<(), CliError> {
    let raw = read_file(&args.file)?;
    let body = if args.magic { strip_magic(&raw)? } else { &raw[..] };
    let reader = MessageReader::from_config(codec);
    let registry = super::bundled_registry();

    let mut block = match &args.cells {
        Some(path) => Some(CellBlockSource::new(Bytes::from(read_file(path)?))),
        None => None,
    };

    let docs = match args.kind {
        Kind::Mutation => {
            let mut out = Vec::new();
            for wire in units::<proto::MutationProto>(&reader, body, args.delimited)? {
                let source = block.as_mut().map(|b| b as &mut dyn CellSource);
                out.push(to_json(&decode_mutation(&wire, source)?)?);
            }
            out
        }
        Kind::Result => {
            let mut out = Vec::new();
            for wire in units::<proto::ResultProto>(&reader, body, args.delimited)? {
                let source = block.as_mut().map(|b| b as &mut dyn CellSource);
                out.push(to_json(&*decode_result(&wire, source)?)?);
            }
            out
        }
        Kind::Get => units::<proto::Get>(&reader, body, args.delimited)?
            .iter()
            .map(|wire| to_json(&decode_get(wire, &registry)?))
            .collect::<Result<Vec<_>, CliError>>()?,
        Kind::Scan => units::<proto::Scan>(&reader, body, args.delimited)?
            .iter()
            .map(|wire| to_json(&decode_scan(wire, &registry)?))
            .collect::<Result<Vec<_>, CliError>>()?,
    };

    if let Some(block) = &block {
        if block.remaining_len() > 0 {
            tracing::warn!(remaining = block.remaining_len(), "cell block not fully consumed");
        }
    }
    tracing::debug!(kind = ?args.kind, units = docs.len(), "decoded");

    let output = if args.delimited {
        serde_json::to_string_pretty(&docs)?
    } else {
        match docs.into_iter().next() {
            Some(doc) => serde_json::to_string_pretty(&doc)?,
            None => return Err(CliError::Usage("nothing decoded".into())),
        }
    };
    println!("{output}");
    Ok(())
}

fn units<M: Message + Default>(
    reader: &MessageReader,
    body: &[u8],
    delimited: bool,
) -> Result<Vec<M>, CliError> {
    if delimited {
        Ok(reader.parse_all_delimited(body)?)
    } else {
        Ok(vec![reader.parse_slice(body)?])
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, CliError> {
    Ok(serde_json::to_value(value)?)
}
