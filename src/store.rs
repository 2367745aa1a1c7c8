//! KvStore — единственное изменяемое отображение string -> string.
//!
//! apply() разбирает текст команды (см. command.rs) и применяет её.
//! snapshot() снимает независимую копию, restore() заменяет состояние целиком.
//!
//! Restore декодирует файл во временное отображение и подменяет состояние только
//! при полном успехе: при IO/Decode ошибке прежнее содержимое не меняется.

use log::{debug, info};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use crate::command::Command;
use crate::config::KvConfig;
use crate::error::{KvError, Result};
use crate::snapshot::Snapshot;

/// Result of applying one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// SET / DELETE.
    Done,
    /// GET; None when the key is absent.
    Value(Option<String>),
}

impl Outcome {
    pub fn value(&self) -> Option<&str> {
        match self {
            Outcome::Value(v) => v.as_deref(),
            Outcome::Done => None,
        }
    }

    /// Missing key and empty value look the same here.
    pub fn value_or_empty(&self) -> &str {
        self.value().unwrap_or("")
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Done => write!(f, "OK"),
            Outcome::Value(Some(v)) => write!(f, "{}", v),
            Outcome::Value(None) => write!(f, "(nil)"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KvStore {
    state: BTreeMap<String, String>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from cfg.snapshot_path; only a missing file means "start empty",
    /// every other error (permissions, directory in place of a file, bad JSON) is returned.
    pub fn open(cfg: &KvConfig) -> Result<Self> {
        let mut store = Self::new();
        match store.restore(&cfg.snapshot_path) {
            Ok(()) => Ok(store),
            Err(KvError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "open: {} not found, starting empty",
                    cfg.snapshot_path.display()
                );
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Parse and apply a command. On error the mapping is left as it was.
    pub fn apply(&mut self, command: &str) -> Result<Outcome> {
        let cmd = Command::parse(command)?;
        Ok(self.execute(cmd))
    }

    /// Apply an already parsed command.
    pub fn execute(&mut self, cmd: Command) -> Outcome {
        debug!("apply: {}", cmd);
        match cmd {
            Command::Set { key, value } => {
                self.set(key, value);
                Outcome::Done
            }
            Command::Get { key } => Outcome::Value(self.get(&key).map(str::to_string)),
            Command::Delete { key } => {
                self.delete(&key);
                Outcome::Done
            }
        }
    }

    /// Apply one command per line, in order. Blank lines and lines starting
    /// with '#' are skipped; a trailing '\r' is dropped. Stops at the first error,
    /// keeping whatever earlier lines already changed.
    pub fn apply_script(&mut self, script: &str) -> Result<Vec<Outcome>> {
        let mut out = Vec::new();
        for line in script.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            out.push(self.apply(line)?);
        }
        Ok(out)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.state.insert(key.into(), value.into());
    }

    /// Returns true if the key existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.state.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.state.iter()
    }

    /// Deep copy of the current mapping. Never fails today.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::from(self.state.clone()))
    }

    /// Replace the whole mapping with the contents of `path` (no merge).
    pub fn restore<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let snap = Snapshot::load(path)?;
        let prev = self.len();
        self.restore_snapshot(snap);
        info!(
            "restore: {} key(s) from {} (replaced {})",
            self.len(),
            path.display(),
            prev
        );
        Ok(())
    }

    pub fn restore_snapshot(&mut self, snap: Snapshot) {
        self.state = snap.into_inner();
    }
}
