use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{GenerateOptions, analyze_command, generate_command, init_command};

#[derive(Parser)]
#[command(bin_name = "cargo")]
#[command(version, propagate_version = true)]
pub struct Cargo {
    #[command(subcommand)]
    pub command: CargoCommand,
}

#[derive(Subcommand, Debug)]
pub enum CargoCommand {
    #[command(name = "proxygen")]
    #[command(about = "Generate forwarding proxies for marked traits")]
    Proxygen(Proxygen),
}

#[derive(Parser, Debug)]
#[command(name = "cargo-proxygen")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Proxygen {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan sources and write the generated proxies file
    #[command(visible_alias = "g")]
    Generate {
        /// Source directory to scan, may be repeated (defaults to the config's, then `src`)
        #[arg(short, long = "src")]
        src: Vec<PathBuf>,

        /// Output directory (defaults to `OUT_DIR`, then `target/proxygen`)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Config file to use instead of searching for proxygen.json
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the generated file instead of writing it
        #[arg(long)]
        stdout: bool,

        /// Exit successfully even when declarations were rejected
        #[arg(long)]
        allow_errors: bool,
    },
    /// List marked declarations and what would be generated for them
    #[command(visible_alias = "a")]
    Analyze {
        /// Source directory to scan, may be repeated
        #[arg(short, long = "src")]
        src: Vec<PathBuf>,

        /// Config file to use instead of searching for proxygen.json
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the analysis as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Write a default proxygen.json
    Init {
        /// Directory to initialize (defaults to the current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Overwrite an existing proxygen.json
        #[arg(short, long)]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        tracing::debug!("Executing {:?}", self);
        match self {
            Commands::Generate {
                src,
                out,
                config,
                stdout,
                allow_errors,
            } => generate_command(GenerateOptions {
                source_dirs: src,
                out_dir: out,
                config,
                stdout,
                allow_errors,
            }),
            Commands::Analyze { src, config, json } => {
                analyze_command(&src, config.as_deref(), json)
            }
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}
