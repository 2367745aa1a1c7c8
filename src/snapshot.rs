//! snapshot — захват состояния KvStore и его запись/чтение в JSON.
//!
//! Формат файла: один JSON-объект {"key":"value",...} и завершающий '\n'.
//! Ни версии схемы, ни контрольной суммы, ни сжатия.
//!
//! Поведение:
//! - Snapshot владеет собственной копией отображения: последующие изменения
//!   стора в снапшот не попадают.
//! - persist() пишет файл одним вызовом кодировщика, файл закрывается на Drop
//!   при любом исходе.
//! - persist_with() дополнительно умеет pretty JSON, fsync и запись через tmp+rename.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::KvConfig;
use crate::error::{KvError, Result};

/// Point-in-time copy of a store's mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    state: BTreeMap<String, String>,
}

impl Snapshot {
    /// Read and decode a persisted snapshot without touching any store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| KvError::io(path, e))?;
        let snap: Snapshot = serde_json::from_slice(&bytes).map_err(|e| KvError::decode(path, e))?;
        debug!(
            "snapshot load: {} key(s), {} B from {}",
            snap.len(),
            bytes.len(),
            path.display()
        );
        Ok(snap)
    }

    /// Create/truncate `path` and write the mapping as compact JSON.
    pub fn persist<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.persist_with(path, &KvConfig::default())
    }

    /// Like persist(), honouring cfg.pretty / cfg.fsync / cfg.atomic.
    /// cfg.snapshot_path is ignored: the target is always `path`.
    pub fn persist_with<P: AsRef<Path>>(&self, path: P, cfg: &KvConfig) -> Result<()> {
        let path = path.as_ref();

        if cfg.atomic {
            let tmp = tmp_path(path);
            if let Err(e) = self.write_file(&tmp, cfg) {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
            if let Err(e) = fs::rename(&tmp, path) {
                let _ = fs::remove_file(&tmp);
                return Err(KvError::io(path, e));
            }
        } else {
            self.write_file(path, cfg)?;
        }

        info!(
            "snapshot persist: {} key(s) -> {} (pretty={}, fsync={}, atomic={})",
            self.len(),
            path.display(),
            cfg.pretty,
            cfg.fsync,
            cfg.atomic
        );
        Ok(())
    }

    fn write_file(&self, path: &Path, cfg: &KvConfig) -> Result<()> {
        let f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .map_err(|e| KvError::io(path, e))?;
        let mut w = BufWriter::new(f);

        let encoded = if cfg.pretty {
            serde_json::to_writer_pretty(&mut w, self)
        } else {
            serde_json::to_writer(&mut w, self)
        };
        encoded.map_err(|e| KvError::io(path, e.into()))?;
        w.write_all(b"\n").map_err(|e| KvError::io(path, e))?;

        let f: File = w
            .into_inner()
            .map_err(|e| KvError::io(path, e.into_error()))?;
        if cfg.fsync {
            f.sync_all().map_err(|e| KvError::io(path, e))?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
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

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.state
    }
}

impl From<BTreeMap<String, String>> for Snapshot {
    fn from(state: BTreeMap<String, String>) -> Self {
        Self { state }
    }
}

/// "<path>.tmp" рядом с целевым файлом (rename в пределах одного каталога).
fn tmp_path(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}
