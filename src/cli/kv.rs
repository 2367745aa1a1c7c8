use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::PathBuf;

use crate::command::Command;
use crate::config::KvConfig;
use crate::snapshot::Snapshot;
use crate::store::{KvStore, Outcome};

/// Demo: SET foo bar, SET hello world -> snapshot -> persist -> новый стор -> restore -> GET.
pub fn cmd_demo(cfg: &KvConfig) -> Result<()> {
    let path = &cfg.snapshot_path;

    let mut store = KvStore::new();
    for c in ["SET foo bar", "SET hello world"] {
        let out = store.apply(c)?;
        println!("{} -> {}", c, out);
    }

    let snap = store.snapshot()?;
    snap.persist_with(path, cfg)
        .with_context(|| format!("persist demo snapshot to {}", path.display()))?;
    println!("persisted {} key(s) to {}", snap.len(), path.display());

    let mut restored = KvStore::new();
    restored
        .restore(path)
        .with_context(|| format!("restore demo snapshot from {}", path.display()))?;

    for c in ["GET foo", "GET hello"] {
        let out = restored.apply(c)?;
        println!("{} -> {}", c, out);
    }
    Ok(())
}

/// Apply one command; persist only if it changed the store.
pub fn cmd_apply(cfg: &KvConfig, text: &str) -> Result<()> {
    let cmd = Command::parse(text)?;
    let path = &cfg.snapshot_path;

    let mut store =
        KvStore::open(cfg).with_context(|| format!("open store from {}", path.display()))?;
    let (verb, key, mutating) = (cmd.verb(), cmd.key().to_string(), cmd.is_mutating());
    let out = store.execute(cmd);
    println!("{} '{}': {}", verb, key, out);

    if mutating {
        store
            .snapshot()?
            .persist_with(path, cfg)
            .with_context(|| format!("persist store to {}", path.display()))?;
    }
    Ok(())
}

/// Script from --file or --stdin; nothing is persisted if any line fails.
pub fn cmd_batch(cfg: &KvConfig, file: Option<PathBuf>, stdin: bool) -> Result<()> {
    let script = match (file, stdin) {
        (Some(p), _) => std::fs::read_to_string(&p)
            .with_context(|| format!("read script {}", p.display()))?,
        (None, true) => {
            let mut s = String::new();
            std::io::stdin()
                .lock()
                .read_to_string(&mut s)
                .context("read script from stdin")?;
            s
        }
        (None, false) => bail!("provide --file <script> or --stdin"),
    };

    let path = &cfg.snapshot_path;
    let mut store =
        KvStore::open(cfg).with_context(|| format!("open store from {}", path.display()))?;
    let outcomes = store.apply_script(&script).context("apply script")?;
    if outcomes.is_empty() {
        println!("No commands to apply.");
        return Ok(());
    }
    for out in &outcomes {
        println!("{}", out);
    }

    if outcomes.iter().any(|o| *o == Outcome::Done) {
        store
            .snapshot()?
            .persist_with(path, cfg)
            .with_context(|| format!("persist store to {}", path.display()))?;
    }
    println!("Batch: OK ({} command(s))", outcomes.len());
    Ok(())
}

pub fn cmd_dump(cfg: &KvConfig, json: bool) -> Result<()> {
    let path = &cfg.snapshot_path;
    let snap =
        Snapshot::load(path).with_context(|| format!("load snapshot {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
        return Ok(());
    }

    println!("Snapshot at {} ({} key(s))", path.display(), snap.len());
    for (k, v) in snap.iter() {
        println!("  {} = {}", k, v);
    }
    Ok(())
}
