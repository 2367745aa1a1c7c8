//! Centralized configuration for snapkv.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - KvConfig::from_env() reads SNAPKV_* variables; builder setters override them.
//!
//! Env:
//! - SNAPKV_SNAPSHOT_PATH — default snapshot file (default "snapshot.json")
//! - SNAPKV_PRETTY        — pretty-print JSON on persist (default off)
//! - SNAPKV_FSYNC         — sync_all() the file after writing (default off)
//! - SNAPKV_ATOMIC        — write to "<file>.tmp" and rename over the target (default off)
//!
//! Boolean values accept "1|true|on|yes" / "0|false|off|no"; anything else keeps the default.

use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SNAPSHOT_PATH: &str = "snapshot.json";

pub const ENV_SNAPSHOT_PATH: &str = "SNAPKV_SNAPSHOT_PATH";
pub const ENV_PRETTY: &str = "SNAPKV_PRETTY";
pub const ENV_FSYNC: &str = "SNAPKV_FSYNC";
pub const ENV_ATOMIC: &str = "SNAPKV_ATOMIC";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KvConfig {
    /// Snapshot file used by the CLI and KvStore::open.
    pub snapshot_path: PathBuf,

    /// Pretty JSON instead of a single line.
    pub pretty: bool,

    /// fsync the snapshot file after the write.
    pub fsync: bool,

    /// tmp + rename instead of truncating the target in place.
    pub atomic: bool,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            pretty: false,
            fsync: false,
            atomic: false,
        }
    }
}

impl KvConfig {
    /// Load configuration from SNAPKV_* environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as from_env, but values come from `lookup` (tests, embedding).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup(ENV_SNAPSHOT_PATH) {
            let s = v.trim();
            if !s.is_empty() {
                cfg.snapshot_path = PathBuf::from(s);
            }
        }
        if let Some(on) = lookup(ENV_PRETTY).as_deref().and_then(parse_flag) {
            cfg.pretty = on;
        }
        if let Some(on) = lookup(ENV_FSYNC).as_deref().and_then(parse_flag) {
            cfg.fsync = on;
        }
        if let Some(on) = lookup(ENV_ATOMIC).as_deref().and_then(parse_flag) {
            cfg.atomic = on;
        }

        cfg
    }

    pub fn with_snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_pretty(mut self, on: bool) -> Self {
        self.pretty = on;
        self
    }

    pub fn with_fsync(mut self, on: bool) -> Self {
        self.fsync = on;
        self
    }

    pub fn with_atomic(mut self, on: bool) -> Self {
        self.atomic = on;
        self
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Display for KvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KvConfig {{ snapshot_path: {}, pretty: {}, fsync: {}, atomic: {} }}",
            self.snapshot_path.display(),
            self.pretty,
            self.fsync,
            self.atomic,
        )
    }
}
