mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands};

mod cmd;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = config::load_codec_config(cli.config.as_deref()).and_then(|codec| match cli.command {
        Commands::Inspect(args) => cmd::inspect::run(&codec, args),
        Commands::Encode(args) => cmd::encode::run(&codec, args),
        Commands::Frame(args) => cmd::frame::run(args),
    });
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
