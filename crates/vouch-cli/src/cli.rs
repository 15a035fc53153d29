use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vouch",
    about = "Signed user records that consumers re-verify",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

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

#[derive(Subcommand)]
pub enum Command {
    /// Create or inspect the signing key pair
    Keys(KeysArgs),
    /// Canonicalize, hash and sign an email
    Seal(SealArgs),
    /// Verify an exported batch against a public key
    Verify(VerifyArgs),
    /// Write a batch of freshly sealed records to a file
    Export(ExportArgs),
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct KeyDirArg {
    /// Key directory (defaults to ./keys)
    #[arg(long)]
    pub key_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub action: KeysAction,
}

#[derive(Subcommand)]
pub enum KeysAction {
    /// Load the key pair, generating it if absent
    Init(KeyDirArg),
    /// Print the stored public key without generating anything
    Show(KeyDirArg),
}

#[derive(Args)]
pub struct SealArgs {
    pub email: String,
    #[command(flatten)]
    pub keys: KeyDirArg,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Batch file produced by `vouch export` or the export endpoint
    #[arg(long)]
    pub batch: PathBuf,
    /// PEM public key of the server that produced the batch
    #[arg(long)]
    pub public_key: PathBuf,
    /// Verify on a worker pool of this size instead of sequentially
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Args)]
pub struct ExportArgs {
    #[arg(short, long)]
    pub out: PathBuf,
    /// Emails to include; sample addresses are used when none are given
    pub emails: Vec<String>,
    /// Number of sample records when no emails are given
    #[arg(long, default_value = "3")]
    pub count: usize,
    #[command(flatten)]
    pub keys: KeyDirArg,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[command(flatten)]
    pub keys: KeyDirArg,
}
