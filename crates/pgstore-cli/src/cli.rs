use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pgstore",
    about = "PGStore: content-addressed objects over NOTP",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum EncodeKind {
    /// Raw file bytes
    Blob,
    /// JSON commit description
    Commit,
    /// JSON tree description
    Tree,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the identity of a file's bytes
    Hash(HashArgs),
    /// Encode a file as a typed object record
    Encode(EncodeArgs),
    /// Decode an object record and show its contents
    Inspect(InspectArgs),
    /// Bundle files as blob sections and write them as a NOTP packet
    Pack(PackArgs),
    /// Read a NOTP packet and decode every object it carries
    Unpack(UnpackArgs),
}

#[derive(Args)]
pub struct HashArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct EncodeArgs {
    pub kind: EncodeKind,
    pub input: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct InspectArgs {
    pub record: PathBuf,
}

#[derive(Args)]
pub struct PackArgs {
    pub files: Vec<PathBuf>,
    /// Logical path recorded on the bundle
    #[arg(long, default_value = "bundle")]
    pub path: String,
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct UnpackArgs {
    pub packet: PathBuf,
    /// Write each blob into this directory, named by its identity
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
