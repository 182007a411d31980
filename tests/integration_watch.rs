//! Watch-mode tests against a real notification backend.
//!
//! Timeouts are generous so slow CI machines do not flake.

mod common;

use common::jpeg_with_dates;
use photo_ingest::core::pipeline::IngestionCoordinator;
use photo_ingest::core::watcher::WatcherConfig;
use photo_ingest::events::{
    BatchSummary, Event, EventChannel, EventReceiver, IngestOutcome, WatcherEvent,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(20);

struct Session {
    stop: crossbeam_channel::Sender<()>,
    events: EventReceiver,
    handle: JoinHandle<BatchSummary>,
}

fn start(source: &Path, destination: &Path, quarantine: &Path) -> Session {
    let mut coordinator = IngestionCoordinator::builder()
        .destination(destination)
        .quarantine(quarantine)
        .watcher_config(WatcherConfig {
            settle: Duration::from_millis(150),
            poll_interval: Duration::from_millis(25),
            max_wait: Duration::from_secs(5),
            recursive: false,
        })
        .build();

    let (stop, stop_rx) = crossbeam_channel::bounded(1);
    let (sender, events) = EventChannel::new();
    let source = source.to_path_buf();
    let handle = thread::spawn(move || coordinator.watch(&source, &stop_rx, &sender).unwrap());

    let session = Session {
        stop,
        events,
        handle,
    };
    wait_for(&session.events, |event| {
        matches!(event, Event::Watcher(WatcherEvent::Started { .. }))
    });
    session
}

fn wait_for(events: &EventReceiver, mut wanted: impl FnMut(&Event) -> bool) -> Event {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        match events.try_recv() {
            Some(event) if wanted(&event) => return event,
            Some(_) => {}
            None => thread::sleep(Duration::from_millis(20)),
        }
    }
    panic!("timed out waiting for event");
}

fn next_outcome(events: &EventReceiver) -> IngestOutcome {
    match wait_for(events, |event| matches!(event, Event::Ingest(_))) {
        Event::Ingest(outcome) => outcome,
        _ => unreachable!(),
    }
}

/// Canonical paths, since the backend reports resolved locations
fn dirs(temp: &TempDir) -> (PathBuf, PathBuf, PathBuf) {
    let root = fs::canonicalize(temp.path()).unwrap();
    let source = root.join("drop");
    fs::create_dir(&source).unwrap();
    (source, root.join("organized"), root.join("quarantine"))
}

#[test]
fn new_photo_is_filed_by_date() {
    let temp = TempDir::new().unwrap();
    let (source, destination, quarantine) = dirs(&temp);
    let session = start(&source, &destination, &quarantine);

    fs::write(
        source.join("sunset.jpg"),
        jpeg_with_dates(Some("2022:08:20 19:45:00"), None),
    )
    .unwrap();

    let outcome = next_outcome(&session.events);
    assert_eq!(
        outcome,
        IngestOutcome::Organized {
            source: source.join("sunset.jpg"),
            destination: destination.join("2022/08/20/sunset.jpg"),
        }
    );

    session.stop.send(()).unwrap();
    let summary = session.handle.join().unwrap();
    assert_eq!(summary.organized, 1);
    assert!(!source.join("sunset.jpg").exists());
}

#[test]
fn repeated_drop_is_quarantined() {
    let temp = TempDir::new().unwrap();
    let (source, destination, quarantine) = dirs(&temp);
    let session = start(&source, &destination, &quarantine);
    let bytes = jpeg_with_dates(Some("2022:08:20 19:45:00"), None);

    fs::write(source.join("first.jpg"), &bytes).unwrap();
    assert!(matches!(
        next_outcome(&session.events),
        IngestOutcome::Organized { .. }
    ));

    fs::write(source.join("again.jpg"), &bytes).unwrap();
    assert_eq!(
        next_outcome(&session.events),
        IngestOutcome::Quarantined {
            source: source.join("again.jpg"),
            destination: quarantine.join("again.jpg"),
        }
    );

    session.stop.send(()).unwrap();
    let summary = session.handle.join().unwrap();
    assert_eq!(summary.organized, 1);
    assert_eq!(summary.quarantined, 1);
    assert!(!source.join("first.jpg").exists());
    assert!(!source.join("again.jpg").exists());
    assert_eq!(fs::read(quarantine.join("again.jpg")).unwrap(), bytes);
    assert_eq!(
        fs::read(destination.join("2022/08/20/first.jpg")).unwrap(),
        bytes
    );
}

#[test]
fn file_renamed_into_folder_is_picked_up() {
    let temp = TempDir::new().unwrap();
    let (source, destination, quarantine) = dirs(&temp);
    let staging = temp.path().join("staging.jpg");
    fs::write(&staging, jpeg_with_dates(Some("2016:04:04 04:04:04"), None)).unwrap();
    let session = start(&source, &destination, &quarantine);

    fs::rename(&staging, source.join("moved.jpg")).unwrap();

    let outcome = next_outcome(&session.events);
    assert_eq!(
        outcome,
        IngestOutcome::Organized {
            source: source.join("moved.jpg"),
            destination: destination.join("2016/04/04/moved.jpg"),
        }
    );

    session.stop.send(()).unwrap();
    session.handle.join().unwrap();
}

#[test]
fn watch_ends_when_shutdown_sender_drops() {
    let temp = TempDir::new().unwrap();
    let (source, destination, quarantine) = dirs(&temp);
    let session = start(&source, &destination, &quarantine);

    drop(session.stop);
    let summary = session.handle.join().unwrap();

    assert_eq!(summary.total(), 0);
    wait_for(&session.events, |event| {
        matches!(event, Event::Watcher(WatcherEvent::Stopped { .. }))
    });
}
