use cellwire_codec::{frame, has_magic};

use crate::config::FrameArgs;
use crate::error::{CliError, read_file, write_file};

pub fn run(args: FrameArgs) -> Result<(), CliError> {
    let payload = read_file(&args.input)?;
    if has_magic(&payload) {
        tracing::warn!(input = %args.input, "input already starts with the magic prefix");
    }
    write_file(&args.output, &frame(&payload))?;
    tracing::info!(input = %args.input, output = %args.output, len = payload.len(), "framed");
    Ok(())
}
