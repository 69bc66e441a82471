// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::config::StreamOptions;
use crate::error::FailureKind;
use crate::events::{EventReceiver, Subscription};
use crate::segment::SegmentNamer;
use async_trait::async_trait;
use spool_adapters::{FakeFsAdapter, FsCall, FsOp, LocalFsAdapter};
use tempfile::TempDir;

const INTERVAL: Duration = Duration::from_millis(100);

struct Fixture {
    _dir: TempDir,
    working: PathBuf,
    stable: PathBuf,
    clock: FakeClock,
    fs: FakeFsAdapter,
    stream: Arc<StreamManager<FakeClock>>,
    bus: EventBus,
    rx: EventReceiver,
    shutdown: ShutdownSignal,
    scheduler: TransferScheduler<FakeFsAdapter, FakeClock>,
}

fn fixture() -> Fixture {
    fixture_with_interval(INTERVAL)
}

fn fixture_with_interval(interval: Duration) -> Fixture {
    let dir = TempDir::new().unwrap();
    let working = dir.path().join("working");
    let stable = dir.path().join("stable");
    std::fs::create_dir_all(&working).unwrap();
    std::fs::create_dir_all(&stable).unwrap();

    let clock = FakeClock::new(10_000);
    let bus = EventBus::new();
    let rx = bus.subscribe(Subscription::all("test"));
    let namer = SegmentNamer::new("flume-", clock.clone()).unwrap();
    let stream = Arc::new(StreamManager::new(
        working.clone(),
        namer,
        StreamOptions::default(),
        bus.clone(),
    ));
    stream.open().unwrap();

    let fs = FakeFsAdapter::new();
    let shutdown = ShutdownSignal::new();
    let scheduler = TransferScheduler::new(
        Arc::clone(&stream),
        fs.clone(),
        bus.clone(),
        stable.clone(),
        interval,
        shutdown.clone(),
    );

    Fixture {
        _dir: dir,
        working,
        stable,
        clock,
        fs,
        stream,
        bus,
        rx,
        shutdown,
        scheduler,
    }
}

fn drain(rx: &mut EventReceiver) -> Vec<SpoolEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn error_kinds(events: &[SpoolEvent]) -> Vec<FailureKind> {
    events
        .iter()
        .filter_map(|e| match e {
            SpoolEvent::Error { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

#[tokio::test]
async fn aged_segments_move_and_young_ones_stay() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();
    std::fs::write(f.working.join("flume-9950.log"), b"young").unwrap();

    let report = f.scheduler.run_cycle().await.unwrap();

    // cutoff is 10_000 - 100; the segment opened at 10_000 is also too young
    assert_eq!(report.moved, vec!["flume-1000.log".to_string()]);
    assert!(report.removed.is_empty());
    assert_eq!(report.failed, 0);
    assert_eq!(
        std::fs::read(f.stable.join("flume-1000.log")).unwrap(),
        b"old"
    );
    assert!(f.working.join("flume-9950.log").exists());
    assert_eq!(drain(&mut f.rx), vec![SpoolEvent::Transfer]);
}

#[tokio::test]
async fn empty_segments_are_deleted_not_moved() {
    let f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"").unwrap();

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.removed, vec!["flume-1000.log".to_string()]);
    assert!(report.moved.is_empty());
    assert!(!f.working.join("flume-1000.log").exists());
    assert!(!f.stable.join("flume-1000.log").exists());
}

#[tokio::test]
async fn rotated_segment_transfers_once_it_has_aged() {
    let f = fixture();
    let first = f.stream.active_path().unwrap();
    f.stream.write(b"spooled").unwrap();

    f.clock.advance(INTERVAL);
    let report = f.scheduler.run_cycle().await.unwrap();

    let name = first.file_name().unwrap().to_str().unwrap().to_string();
    assert_eq!(report.moved, vec![name.clone()]);
    assert_eq!(std::fs::read(f.stable.join(&name)).unwrap(), b"spooled");
    assert_eq!(
        f.stream.active_path(),
        Some(f.working.join("flume-10100.log"))
    );
}

#[tokio::test]
async fn segment_names_match_case_insensitively() {
    let f = fixture();
    std::fs::write(f.working.join("FLUME-1000.LOG"), b"upper").unwrap();

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.moved, vec!["FLUME-1000.LOG".to_string()]);
    assert!(f.stable.join("FLUME-1000.LOG").exists());
}

#[tokio::test]
async fn non_segment_files_are_ignored() {
    let f = fixture();
    for name in ["notes.txt", "flume-abc.log", "other-1000.log", "flume-1000.log.tmp"] {
        std::fs::write(f.working.join(name), b"x").unwrap();
    }

    let report = f.scheduler.run_cycle().await.unwrap();

    assert!(report.moved.is_empty());
    assert!(report.removed.is_empty());
    assert_eq!(std::fs::read_dir(&f.stable).unwrap().count(), 0);
    let touched: Vec<_> = f
        .fs
        .calls()
        .into_iter()
        .filter(|c| !matches!(c, FsCall::ListDir { .. }))
        .collect();
    assert!(touched.is_empty(), "unexpected calls: {:?}", touched);
}

#[tokio::test]
async fn several_segments_move_in_one_cycle() {
    let f = fixture();
    for ts in [1000, 2000, 3000] {
        std::fs::write(f.working.join(format!("flume-{}.log", ts)), b"x").unwrap();
    }

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(
        sorted(report.moved),
        vec!["flume-1000.log", "flume-2000.log", "flume-3000.log"]
    );
}

#[tokio::test]
async fn list_failure_publishes_error_and_no_transfer() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();
    f.fs.fail_times(FsOp::ListDir, 1, "disk gone");

    assert!(f.scheduler.run_cycle().await.is_none());

    let events = drain(&mut f.rx);
    assert_eq!(error_kinds(&events), vec![FailureKind::ListDirectory]);
    assert!(!events.contains(&SpoolEvent::Transfer));
    assert!(f.working.join("flume-1000.log").exists());
}

#[tokio::test]
async fn rename_failure_leaves_file_for_next_cycle() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();
    f.fs.fail_times(FsOp::Rename, 1, "busy");

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(f.working.join("flume-1000.log").exists());
    let events = drain(&mut f.rx);
    assert_eq!(error_kinds(&events), vec![FailureKind::PerFileIo]);
    assert_eq!(events.last(), Some(&SpoolEvent::Transfer));
    match &events[0] {
        SpoolEvent::Error { message, .. } => assert!(message.contains("flume-1000.log")),
        other => panic!("expected error, got {:?}", other),
    }

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.moved, vec!["flume-1000.log".to_string()]);
    assert!(f.stable.join("flume-1000.log").exists());
}

#[tokio::test]
async fn one_failed_file_does_not_stop_the_others() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"").unwrap();
    std::fs::write(f.working.join("flume-2000.log"), b"data").unwrap();
    f.fs.fail(FsOp::Remove, "read-only");

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.moved, vec!["flume-2000.log".to_string()]);
    assert_eq!(report.failed, 1);
    assert!(f.working.join("flume-1000.log").exists());
    assert_eq!(
        error_kinds(&drain(&mut f.rx)),
        vec![FailureKind::PerFileIo]
    );
}

#[tokio::test]
async fn stat_failure_is_per_file() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"data").unwrap();
    f.fs.fail_times(FsOp::Stat, 1, "stale handle");

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(!f
        .fs
        .calls()
        .iter()
        .any(|c| matches!(c, FsCall::Rename { .. } | FsCall::RemoveFile { .. })));
    assert_eq!(
        error_kinds(&drain(&mut f.rx)),
        vec![FailureKind::PerFileIo]
    );
}

#[tokio::test]
async fn rotation_failure_still_transfers_closed_segments() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();
    // Occupy the next segment name so the rotation cannot open it
    f.clock.advance(Duration::from_millis(50));
    std::fs::create_dir(f.working.join("flume-10050.log")).unwrap();

    let report = f.scheduler.run_cycle().await.unwrap();

    assert_eq!(report.moved, vec!["flume-1000.log".to_string()]);
    assert!(!f.stream.is_open());
    let events = drain(&mut f.rx);
    assert_eq!(error_kinds(&events), vec![FailureKind::StreamOpen]);
    assert_eq!(events.last(), Some(&SpoolEvent::Transfer));
}

#[tokio::test]
async fn no_cycle_after_shutdown() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();
    f.shutdown.trigger();

    assert!(f.scheduler.run_cycle().await.is_none());

    assert!(drain(&mut f.rx).is_empty());
    assert!(f.fs.calls().is_empty());
    assert!(f.working.join("flume-1000.log").exists());
}

#[tokio::test]
async fn no_cycle_once_stream_is_shut_down() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();
    f.stream.shutdown();

    assert!(f.scheduler.run_cycle().await.is_none());

    assert!(drain(&mut f.rx).is_empty());
    assert!(!f.stream.is_open());
}

#[tokio::test]
async fn run_loop_transfers_until_shutdown() {
    let f = fixture();
    let mut rx = f.rx;
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();

    let handle = tokio::spawn(f.scheduler.run());

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, SpoolEvent::Transfer);
    assert!(f.stable.join("flume-1000.log").exists());

    f.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn sub_millisecond_interval_keeps_the_new_segment() {
    let f = fixture_with_interval(Duration::from_micros(500));

    let report = f.scheduler.run_cycle().await.unwrap();

    // Rotation reopened flume-10000.log in the same millisecond
    let active = f.working.join("flume-10000.log");
    assert!(report.removed.is_empty(), "removed {:?}", report.removed);
    assert!(report.moved.is_empty(), "moved {:?}", report.moved);
    assert_eq!(f.stream.active_path(), Some(active.clone()));

    f.stream.write(b"precious").unwrap();
    f.stream.shutdown();
    assert_eq!(std::fs::read(&active).unwrap(), b"precious");
}

#[test]
fn cutoff_age_rounds_up_to_whole_milliseconds() {
    assert_eq!(cutoff_age_millis(Duration::from_nanos(1)), 1);
    assert_eq!(cutoff_age_millis(Duration::from_micros(500)), 1);
    assert_eq!(cutoff_age_millis(Duration::from_micros(1500)), 2);
    assert_eq!(cutoff_age_millis(Duration::from_millis(100)), 100);
}

/// Local filesystem whose stat panics, killing the relocation task
#[derive(Clone, Default)]
struct PanickingStat(LocalFsAdapter);

#[async_trait]
impl FsAdapter for PanickingStat {
    fn ensure_dir(&self, path: &Path) -> Result<(), FsError> {
        self.0.ensure_dir(path)
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<String>, FsError> {
        self.0.list_dir(path).await
    }

    async fn file_len(&self, path: &Path) -> Result<u64, FsError> {
        panic!("stat of {} blew up", path.display());
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.0.rename(from, to).await
    }

    async fn remove_file(&self, path: &Path) -> Result<(), FsError> {
        self.0.remove_file(path).await
    }
}

#[tokio::test]
async fn failed_relocation_task_is_published() {
    let mut f = fixture();
    std::fs::write(f.working.join("flume-1000.log"), b"old").unwrap();
    let scheduler = TransferScheduler::new(
        Arc::clone(&f.stream),
        PanickingStat::default(),
        f.bus.clone(),
        f.stable.clone(),
        INTERVAL,
        f.shutdown.clone(),
    );

    let report = scheduler.run_cycle().await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(f.working.join("flume-1000.log").exists());
    let events = drain(&mut f.rx);
    assert_eq!(error_kinds(&events), vec![FailureKind::PerFileIo]);
    match &events[0] {
        SpoolEvent::Error { message, .. } => assert!(message.contains("file task failed")),
        other => panic!("expected error, got {:?}", other),
    }
    assert_eq!(events.last(), Some(&SpoolEvent::Transfer));
}
