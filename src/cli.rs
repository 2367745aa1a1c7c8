use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::KvConfig;
use crate::error::KvError;

pub mod kv;

// Ошибка в тексте команды -> 2, всё остальное (IO, decode) -> 1.
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_BAD_COMMAND: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "snapkv",
    version,
    about = "In-memory KV store with SET/GET/DELETE commands and JSON snapshots",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// SET foo bar, SET hello world, persist, restore into a fresh store, GET both keys
    Demo {
        /// Snapshot file (default: $SNAPKV_SNAPSHOT_PATH or snapshot.json)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Apply one command to the store kept in the snapshot file
    ///
    /// Пример:
    ///   snapkv apply --path ./kv.json --cmd "SET foo bar"
    ///   snapkv apply --path ./kv.json --cmd "GET foo"
    Apply {
        #[arg(long)]
        path: Option<PathBuf>,
        /// Command text: SET <key> <value> | GET <key> | DELETE <key>
        #[arg(long)]
        cmd: String,
    },
    /// Apply a script (one command per line), persist once at the end
    Batch {
        #[arg(long)]
        path: Option<PathBuf>,
        /// Script file
        #[arg(long, conflicts_with = "stdin")]
        file: Option<PathBuf>,
        /// Read the script from stdin
        #[arg(long, default_value_t = false)]
        stdin: bool,
    },
    /// Print snapshot contents
    Dump {
        #[arg(long)]
        path: Option<PathBuf>,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = KvConfig::from_env();
    log::debug!("{}", cfg);

    match cli.cmd {
        Cmd::Demo { path } => kv::cmd_demo(&with_path(&cfg, path)),
        Cmd::Apply { path, cmd } => kv::cmd_apply(&with_path(&cfg, path), &cmd),
        Cmd::Batch { path, file, stdin } => kv::cmd_batch(&with_path(&cfg, path), file, stdin),
        Cmd::Dump { path, json } => kv::cmd_dump(&with_path(&cfg, path), json),
    }
}

// --path перекрывает SNAPKV_SNAPSHOT_PATH
fn with_path(cfg: &KvConfig, path: Option<PathBuf>) -> KvConfig {
    match path {
        Some(p) => cfg.clone().with_snapshot_path(p),
        None => cfg.clone(),
    }
}

/// Process exit code for an error returned by run(); context layers are looked through.
pub fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<KvError>() {
        Some(kv) if kv.is_command_error() => EXIT_BAD_COMMAND,
        _ => EXIT_FAILURE,
    }
}
