use anyhow::Result;
use clap::Parser;
use proxygen_cli::{Cargo, CargoCommand, Proxygen};

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // `cargo proxygen ...` passes "proxygen" as the first argument
    let args: Vec<String> = std::env::args().collect();
    let command = if args.get(1).is_some_and(|arg| arg == "proxygen") {
        let CargoCommand::Proxygen(proxygen) = Cargo::parse().command;
        proxygen.command
    } else {
        Proxygen::parse().command
    };

    command.execute()
}
