//! Shared fixtures for the integration tests.

#![allow(dead_code)]

#[path = "../../src/core/metadata/fixtures.rs"]
mod exif_fixture;

pub use exif_fixture::jpeg_with_dates;

use chrono::{Local, TimeZone};
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;

/// Noon local time, so the calendar day is stable in any timezone
pub fn local_noon(year: i32, month: u32, day: u32) -> SystemTime {
    Local
        .with_ymd_and_hms(year, month, day, 12, 0, 0)
        .single()
        .unwrap()
        .into()
}

pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}
