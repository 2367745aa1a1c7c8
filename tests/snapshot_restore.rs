use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use snapkv::{KvConfig, KvError, KvStore, Snapshot};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("snapkv-restore-{prefix}-{pid}-{t}-{id}"))
}

#[test]
fn demo_scenario_roundtrip() -> Result<()> {
    let root = unique_root("demo");
    fs::create_dir_all(&root)?;
    let path = root.join("snapshot.json");

    let mut src = KvStore::new();
    src.apply("SET foo bar")?;
    src.apply("SET hello world")?;
    src.snapshot()?.persist(&path)?;

    let mut dst = KvStore::new();
    dst.restore(&path)?;
    assert_eq!(dst.apply("GET foo")?.value(), Some("bar"));
    assert_eq!(dst.apply("GET hello")?.value(), Some("world"));
    assert_eq!(dst, src);
    Ok(())
}

#[test]
fn persisted_file_is_json_object_with_newline() -> Result<()> {
    let root = unique_root("format");
    fs::create_dir_all(&root)?;
    let path = root.join("snap.json");

    let mut s = KvStore::new();
    s.apply("SET b 2")?;
    s.apply("SET a 1")?;
    s.snapshot()?.persist(&path)?;

    let text = fs::read_to_string(&path)?;
    assert_eq!(text, "{\"a\":\"1\",\"b\":\"2\"}\n");
    Ok(())
}

#[test]
fn persist_truncates_existing_content() -> Result<()> {
    let root = unique_root("truncate");
    fs::create_dir_all(&root)?;
    let path = root.join("snap.json");
    fs::write(&path, "x".repeat(4096))?;

    let mut s = KvStore::new();
    s.apply("SET k v")?;
    s.snapshot()?.persist(&path)?;

    let back = Snapshot::load(&path)?;
    assert_eq!(back.len(), 1);
    assert_eq!(back.get("k"), Some("v"));
    Ok(())
}

#[test]
fn restore_replaces_instead_of_merging() -> Result<()> {
    let root = unique_root("replace");
    fs::create_dir_all(&root)?;
    let path = root.join("snap.json");

    let mut src = KvStore::new();
    src.apply("SET only here")?;
    src.snapshot()?.persist(&path)?;

    let mut dst = KvStore::new();
    dst.apply("SET stale value")?;
    dst.restore(&path)?;

    assert_eq!(dst.len(), 1);
    assert_eq!(dst.get("stale"), None);
    assert_eq!(dst.get("only"), Some("here"));
    Ok(())
}

#[test]
fn restore_missing_file_is_io_and_keeps_state() -> Result<()> {
    let root = unique_root("missing");
    let mut s = KvStore::new();
    s.apply("SET keep me")?;
    let before = s.clone();

    match s.restore(root.join("nope.json")) {
        Err(KvError::Io { path, .. }) => assert!(path.ends_with("nope.json")),
        other => panic!("expected Io error, got {:?}", other),
    }
    assert_eq!(s, before);
    Ok(())
}

#[test]
fn restore_invalid_content_is_decode_and_keeps_state() -> Result<()> {
    let root = unique_root("invalid");
    fs::create_dir_all(&root)?;

    let mut s = KvStore::new();
    s.apply("SET keep me")?;
    let before = s.clone();

    // невалидный JSON, не-строковые значения, не-объект, не-UTF-8
    let cases: [&[u8]; 4] = [
        b"{\"a\": \"1\", ",
        b"{\"a\": 1}",
        b"[\"a\"]",
        b"\xff\xfe\x00",
    ];
    for (i, body) in cases.iter().enumerate() {
        let path = root.join(format!("bad-{i}.json"));
        fs::write(&path, body)?;
        let r = s.restore(&path);
        assert!(
            matches!(r, Err(KvError::Decode { .. })),
            "case {i}: expected Decode, got {:?}",
            r
        );
        assert_eq!(s, before, "case {i}: store must be untouched");
    }
    Ok(())
}

#[test]
fn persist_into_missing_dir_is_io() -> Result<()> {
    let root = unique_root("nodir");
    let snap = KvStore::new().snapshot()?;
    let r = snap.persist(root.join("sub").join("snap.json"));
    assert!(matches!(r, Err(KvError::Io { .. })));
    Ok(())
}

#[test]
fn snapshot_taken_before_writes_persists_old_state() -> Result<()> {
    let root = unique_root("isolation");
    fs::create_dir_all(&root)?;
    let path = root.join("snap.json");

    let mut s = KvStore::new();
    s.apply("SET a 1")?;
    let snap = s.snapshot()?;
    s.apply("SET a 2")?;
    s.apply("DELETE a")?;
    snap.persist(&path)?;

    let back = Snapshot::load(&path)?;
    assert_eq!(back.get("a"), Some("1"));
    Ok(())
}

#[test]
fn atomic_pretty_persist_leaves_no_tmp() -> Result<()> {
    let root = unique_root("atomic");
    fs::create_dir_all(&root)?;
    let path = root.join("snap.json");
    let cfg = KvConfig::default()
        .with_atomic(true)
        .with_pretty(true)
        .with_fsync(true);

    let mut s = KvStore::new();
    s.apply("SET x y")?;
    s.snapshot()?.persist_with(&path, &cfg)?;

    assert!(path.exists());
    assert!(!root.join("snap.json.tmp").exists());
    let text = fs::read_to_string(&path)?;
    assert!(text.contains('\n') && text.trim_end().ends_with('}'));
    assert_eq!(Snapshot::load(&path)?.get("x"), Some("y"));
    Ok(())
}

#[test]
fn open_uses_configured_snapshot() -> Result<()> {
    let root = unique_root("open");
    fs::create_dir_all(&root)?;
    let cfg = KvConfig::default().with_snapshot_path(root.join("kv.json"));

    // файла ещё нет -> пустой стор
    let mut s = KvStore::open(&cfg)?;
    assert!(s.is_empty());

    s.apply("SET k v")?;
    s.snapshot()?.persist_with(&cfg.snapshot_path, &cfg)?;

    let reopened = KvStore::open(&cfg)?;
    assert_eq!(reopened.get("k"), Some("v"));
    Ok(())
}

#[test]
fn open_propagates_errors_other_than_missing_file() -> Result<()> {
    let root = unique_root("open-errors");
    fs::create_dir_all(&root)?;

    // каталог на месте файла снапшота
    let dir_path = root.join("is-a-dir.json");
    fs::create_dir_all(&dir_path)?;
    let cfg = KvConfig::default().with_snapshot_path(&dir_path);
    assert!(matches!(KvStore::open(&cfg), Err(KvError::Io { .. })));

    // битый JSON не превращается в пустой стор
    let bad = root.join("bad.json");
    fs::write(&bad, "{not json")?;
    let cfg = KvConfig::default().with_snapshot_path(&bad);
    assert!(matches!(KvStore::open(&cfg), Err(KvError::Decode { .. })));

    // отсутствующий файл -> пустой стор
    let cfg = KvConfig::default().with_snapshot_path(root.join("absent.json"));
    assert!(KvStore::open(&cfg)?.is_empty());
    Ok(())
}
