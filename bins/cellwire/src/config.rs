use clap::{Args, Parser, Subcommand, ValueEnum};

use cellwire_codec::{CellTransport, CodecConfig};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "cellwire", about = "Inspect and produce protobuf cell-wire blobs")]
pub struct Cli {
    /// Codec TOML config. Defaults apply when unset.
    #[arg(long, global = true, env = "CELLWIRE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a blob and print it as JSON
    Inspect(InspectArgs),
    /// Encode a JSON object into its wire form
    Encode(EncodeArgs),
    /// Prepend the magic prefix to a file
    Frame(FrameArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Mutation,
    Result,
    Get,
    Scan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Inline,
    SideChannel,
}

impl From<Transport> for CellTransport {
    fn from(t: Transport) -> Self {
        match t {
            Transport::Inline => CellTransport::Inline,
            Transport::SideChannel => CellTransport::SideChannel,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct InspectArgs {
    #[arg(long, value_enum)]
    pub kind: Kind,

    /// Require and strip the magic prefix
    #[arg(long)]
    pub magic: bool,

    /// Input is a run of length-delimited messages
    #[arg(long)]
    pub delimited: bool,

    /// Cell block supplying side-channel cells
    #[arg(long)]
    pub cells: Option<String>,

    pub file: String,
}

#[derive(Args, Clone, Debug)]
pub struct EncodeArgs {
    #[arg(long, value_enum)]
    pub kind: Kind,

    /// Overrides the configured transport
    #[arg(long, value_enum)]
    pub transport: Option<Transport>,

    /// Where count-only encoding writes the cell block
    #[arg(long)]
    pub cells_out: Option<String>,

    /// Nonce carried on mutations
    #[arg(long)]
    pub nonce: Option<u64>,

    /// Output file; the framed message is written here
    #[arg(long, short)]
    pub out: String,

    /// JSON input file
    pub json: String,
}

#[derive(Args, Clone, Debug)]
pub struct FrameArgs {
    pub input: String,
    pub output: String,
}

pub fn load_codec_config(path: Option<&str>) -> Result<CodecConfig, CliError> {
    match path {
        Some(path) => {
            let config = CodecConfig::load(path)?;
            tracing::info!(config = %path, "loaded config");
            Ok(config)
        }
        None => Ok(CodecConfig::default()),
    }
}
