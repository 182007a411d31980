//! Write-completion heuristic for freshly created files.
//!
//! A creation notification fires when the file is opened, not when the writer
//! is done. Before reading we poll size and mtime until both have held still
//! for the settle interval. This narrows the window for reading a half-written
//! file but cannot close it: a writer that pauses longer than the settle
//! interval still fools it.

use super::WatcherConfig;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant, SystemTime};

/// How waiting for a file ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Size and mtime were stable for the full settle interval
    Settled,
    /// The file disappeared while waiting
    Vanished,
    /// Still changing when `max_wait` ran out
    TimedOut,
}

fn snapshot(path: &Path) -> Option<(u64, Option<SystemTime>)> {
    let metadata = fs::metadata(path).ok()?;
    Some((metadata.len(), metadata.modified().ok()))
}

/// Block until `path` stops changing, vanishes, or `max_wait` elapses
pub fn wait_until_settled(path: &Path, config: &WatcherConfig) -> SettleOutcome {
    let started = Instant::now();
    let Some(mut last) = snapshot(path) else {
        return SettleOutcome::Vanished;
    };
    let mut stable_since = Instant::now();

    loop {
        if stable_since.elapsed() >= config.settle {
            return SettleOutcome::Settled;
        }
        if started.elapsed() >= config.max_wait {
            return SettleOutcome::TimedOut;
        }

        let until_settled = config.settle.saturating_sub(stable_since.elapsed());
        let pause = config
            .poll_interval
            .min(until_settled)
            .max(Duration::from_millis(1));
        thread::sleep(pause);

        let Some(current) = snapshot(path) else {
            return SettleOutcome::Vanished;
        };
        if current != last {
            last = current;
            stable_since = Instant::now();
        }
    }
}
