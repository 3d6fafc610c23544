use bytes::Bytes;
use prost::Message;

use cellwire_api::{Get, Mutation, RowResult, Scan};
use cellwire_codec::{
    CellTransport, CodecConfig, encode_cell_block, encode_get, encode_mutation, encode_result,
    encode_result_no_data, encode_scan, frame,
};

use crate::config::{EncodeArgs, Kind};
use crate::error::{CliError, read_file, write_file};

pub fn run(codec: &CodecConfig, args: EncodeArgs) -> Result<(), CliError> {
    let json = read_file(&args.json)?;
    let transport = args.transport.map(CellTransport::from).unwrap_or(codec.transport);

    let (message, block): (Vec<u8>, Option<Bytes>) = match args.kind {
        Kind::Mutation => {
            let mutation: Mutation = serde_json::from_slice(&json)?;
            let wire = encode_mutation(&mutation, transport, args.nonce)?;
            let block = (transport == CellTransport::SideChannel)
                .then(|| encode_cell_block(mutation.cells()));
            (wire.encode_to_vec(), block)
        }
        Kind::Result => {
            let result: RowResult = serde_json::from_slice(&json)?;
            match transport {
                CellTransport::Inline => (encode_result(&result).encode_to_vec(), None),
                CellTransport::SideChannel => (
                    encode_result_no_data(&result)?.encode_to_vec(),
                    Some(encode_cell_block(result.cells())),
                ),
            }
        }
        Kind::Get => {
            let get: Get = serde_json::from_slice(&json)?;
            (encode_get(&get).encode_to_vec(), None)
        }
        Kind::Scan => {
            let scan: Scan = serde_json::from_slice(&json)?;
            (encode_scan(&scan).encode_to_vec(), None)
        }
    };

    match (block, &args.cells_out) {
        (Some(block), Some(path)) => {
            write_file(path, &block)?;
            tracing::info!(cells_out = %path, len = block.len(), "wrote cell block");
        }
        (Some(_), None) => {
            return Err(CliError::Usage(
                "side-channel transport needs --cells-out for the cell block".into(),
            ));
        }
        (None, Some(path)) => {
            tracing::warn!(cells_out = %path, "nothing goes on the side channel; --cells-out ignored");
        }
        (None, None) => {}
    }

    write_file(&args.out, &frame(&message))?;
    tracing::info!(kind = ?args.kind, ?transport, out = %args.out, len = message.len(), "encoded");
    Ok(())
}
