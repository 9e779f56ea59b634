//! End-to-end pipeline tests: determinism, resume, crash semantics,
//! ordering under concurrency, and checkpoint lifecycle.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use trawler::checkpoint::CheckpointStore;
use trawler::{
    LoadError, LoadErrorKind, Loader, Position, ReadLoader, RootKind, Trawl, TrawlError,
    TrawlOpts, trawl,
};

/// root/
///   one/{a,b,c}
///   two/{d,e}
///   f
fn fixture_tree() -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("tree");
    fs::create_dir_all(root.join("one")).unwrap();
    fs::create_dir_all(root.join("two")).unwrap();
    for f in ["one/a", "one/b", "one/c", "two/d", "two/e", "f"] {
        fs::write(root.join(f), f.as_bytes()).unwrap();
    }
    (tmp, root.canonicalize().unwrap())
}

fn expected_order(root: &Path) -> Vec<PathBuf> {
    ["one/a", "one/b", "one/c", "two/d", "two/e", "f"]
        .iter()
        .map(|f| root.join(f))
        .collect()
}

fn state_opts(tmp: &tempfile::TempDir) -> TrawlOpts {
    TrawlOpts {
        state_dir: Some(tmp.path().join("state")),
        ..Default::default()
    }
}

/// Drain the whole crawl, committing every item. Returns delivered paths.
fn run_to_completion(mut t: Trawl<Vec<u8>>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for item in t.by_ref() {
        paths.push(item.path().to_path_buf());
        item.finish().unwrap();
    }
    t.finish().unwrap();
    paths
}

/// Loader with pseudo-random per-item latency, so load completion order
/// diverges from production order.
struct JitterLoader;

impl Loader for JitterLoader {
    type Payload = ();

    fn load(&self, path: &Path) -> Result<(), LoadError> {
        let mut h = DefaultHasher::new();
        path.hash(&mut h);
        std::thread::sleep(Duration::from_millis(h.finish() % 25));
        Ok(())
    }
}

// --- determinism ---

#[test]
fn test_full_traversal_is_deterministic() {
    let (tmp, root) = fixture_tree();
    let opts = state_opts(&tmp);
    let first = run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());
    let second = run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());
    assert_eq!(first, expected_order(&root));
    assert_eq!(first, second);
}

// --- resume equivalence ---

#[test]
fn test_resume_yields_exact_remainder() {
    let (tmp, root) = fixture_tree();
    let opts = state_opts(&tmp);
    let full = expected_order(&root);

    let mut t = trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap();
    let mut before = Vec::new();
    for _ in 0..3 {
        let item = t.next().unwrap();
        before.push(item.path().to_path_buf());
        item.finish().unwrap();
    }
    // Each release flushed its own commit.
    let store = CheckpointStore::open(&root, RootKind::Dir, Some(&tmp.path().join("state")))
        .unwrap();
    assert_eq!(store.get().unwrap(), Some(Position::Path(full[2].clone())));
    drop(t); // abrupt termination: no finish, no clear

    let after = run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());
    assert_eq!(after, &full[3..]);

    let mut replayed = before;
    replayed.extend(after);
    assert_eq!(replayed, full, "no duplicate or missing element");
}

// --- uncommitted on crash ---

#[test]
fn test_unreleased_item_is_redelivered() {
    let (tmp, root) = fixture_tree();
    let opts = state_opts(&tmp);
    let full = expected_order(&root);

    let mut t = trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap();
    for _ in 0..3 {
        t.next().unwrap().finish().unwrap();
    }
    // Acquire the fourth item but never release it (simulated caller fault).
    let fourth = t.next().unwrap();
    assert_eq!(fourth.path(), full[3]);
    drop(fourth);
    drop(t);

    let rerun = run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());
    assert_eq!(rerun[0], full[3], "the abandoned item comes back first");
    assert_eq!(rerun, &full[3..]);
}

// --- ordering under concurrency ---

#[test]
fn test_delivery_order_is_traversal_order_despite_load_jitter() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("tree");
    for d in 0..5 {
        let dir = root.join(format!("d{d}"));
        fs::create_dir_all(&dir).unwrap();
        for f in 0..8 {
            fs::write(dir.join(format!("f{f:02}")), b"x").unwrap();
        }
    }
    let root = root.canonicalize().unwrap();

    let reference: Vec<PathBuf> = walkdir::WalkDir::new(&root)
        .sort_by(|a, b| a.path().as_os_str().cmp(b.path().as_os_str()))
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    let opts = TrawlOpts {
        workers: Some(8),
        prefetch_depth: Some(4),
        state_dir: Some(tmp.path().join("state")),
        ..Default::default()
    };
    let mut t = trawl(&root, &opts, Arc::new(JitterLoader)).unwrap();
    let mut delivered = Vec::new();
    for item in t.by_ref() {
        delivered.push(item.path().to_path_buf());
        item.finish().unwrap();
    }
    assert_eq!(t.finish().unwrap(), reference.len());
    assert_eq!(delivered, reference);
}

// --- exhaustion clears state ---

#[test]
fn test_exhaustion_clears_the_checkpoint() {
    let (tmp, root) = fixture_tree();
    let opts = state_opts(&tmp);
    run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());

    let store = CheckpointStore::open(&root, RootKind::Dir, Some(&tmp.path().join("state")))
        .unwrap();
    assert_eq!(store.get().unwrap(), None);

    // A fresh run starts over from the beginning.
    let again = run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());
    assert_eq!(again, expected_order(&root));
}

// --- list-file mode ---

#[test]
fn test_list_file_resumes_past_consumed_lines() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    for f in ["p1", "p2", "p3"] {
        fs::write(data.join(f), f.as_bytes()).unwrap();
    }
    let list = tmp.path().join("paths.txt");
    let lines: Vec<String> = ["p1", "p2", "p3"]
        .iter()
        .map(|f| data.join(f).display().to_string())
        .collect();
    fs::write(&list, lines.join("\n") + "\n").unwrap();
    let list = list.canonicalize().unwrap();

    let state = tmp.path().join("state");
    CheckpointStore::open(&list, RootKind::List, Some(&state))
        .unwrap()
        .set(&Position::Line(1))
        .unwrap();

    let opts = TrawlOpts {
        state_dir: Some(state),
        ..Default::default()
    };
    let delivered = run_to_completion(trawl(&list, &opts, Arc::new(ReadLoader::new())).unwrap());
    assert_eq!(delivered, vec![data.join("p2"), data.join("p3")]);
}

// --- stale checkpoint ---

#[test]
fn test_stale_checkpoint_is_surfaced_not_swallowed() {
    let (tmp, root) = fixture_tree();
    let opts = state_opts(&tmp);
    let state = tmp.path().join("state");

    CheckpointStore::open(&root, RootKind::Dir, Some(&state))
        .unwrap()
        .set(&Position::Path(root.join("one/gone")))
        .unwrap();

    let err = trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap_err();
    match err {
        TrawlError::StaleCheckpoint { path, .. } => assert_eq!(path, root.join("one/gone")),
        other => panic!("expected StaleCheckpoint, got {other:?}"),
    }

    // Clearing the checkpoint is the documented way out.
    assert!(trawler::clear_checkpoint(&root, &opts).unwrap());
    let delivered = run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());
    assert_eq!(delivered, expected_order(&root));
}

// --- per-item errors are non-fatal ---

#[test]
fn test_load_errors_do_not_stop_the_pipeline() {
    let (tmp, root) = fixture_tree();
    fs::write(root.join("one/notes.txt"), b"not a data file").unwrap();
    let opts = state_opts(&tmp);

    // fixture files have no extension; only notes.txt is filtered out.
    let loader = Arc::new(ReadLoader::with_extensions(vec!["txt".into()]));
    let mut t = trawl(&root, &opts, loader).unwrap();
    let mut errored = Vec::new();
    let mut delivered = 0_usize;
    for item in t.by_ref() {
        if let Some(err) = item.error() {
            errored.push((item.path().to_path_buf(), err.kind));
        }
        delivered += 1;
        item.finish().unwrap();
    }
    assert_eq!(t.finish().unwrap(), 7);
    assert_eq!(delivered, 7);
    // Everything except notes.txt failed the extension filter, and the
    // pipeline still delivered all of it in order.
    assert_eq!(errored.len(), 6);
    assert!(errored.iter().all(|(_, k)| *k == LoadErrorKind::WrongKind));
}

// --- clean shutdown ---

#[test]
fn test_cancellation_keeps_the_checkpoint() {
    let (tmp, root) = fixture_tree();
    let opts = state_opts(&tmp);
    let full = expected_order(&root);

    let mut t = trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap();
    let token = t.cancel_token();
    let first = t.next().unwrap();
    first.finish().unwrap();
    token.store(true, Ordering::Relaxed);
    assert!(t.next().is_none(), "no delivery after cancellation");
    t.finish().unwrap();

    let store = CheckpointStore::open(&root, RootKind::Dir, Some(&tmp.path().join("state")))
        .unwrap();
    assert_eq!(store.get().unwrap(), Some(Position::Path(full[0].clone())));

    // The cancelled run resumes like a crashed one.
    let rest = run_to_completion(trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap());
    assert_eq!(rest, &full[1..]);
}

// --- checkpoint write failures are fatal ---

#[test]
fn test_commit_failure_propagates_to_the_caller() {
    let (tmp, root) = fixture_tree();
    let state = tmp.path().join("state");
    let opts = TrawlOpts {
        state_dir: Some(state.clone()),
        ..Default::default()
    };

    let mut t = trawl(&root, &opts, Arc::new(ReadLoader::new())).unwrap();
    let item = t.next().unwrap();
    fs::remove_dir_all(&state).unwrap();
    let err = item.finish().unwrap_err();
    assert!(matches!(err, TrawlError::StorageWrite { .. }));
}
