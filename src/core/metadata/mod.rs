//! # Metadata Module
//!
//! Resolves the capture date of a photo.
//!
//! ## Priority
//! 1. EXIF `DateTimeOriginal` - when the shutter fired
//! 2. EXIF `DateTime` - last written by the camera or an editor
//! 3. Filesystem modification time - always available
//!
//! Both EXIF fields use the fixed `YYYY:MM:DD HH:MM:SS` text format and carry
//! no timezone, so the result is a naive local wall-clock time. Anything that
//! goes wrong while reading EXIF (unsupported container, corrupt segment,
//! missing tag, unparsable value) silently drops to the next rung.

use crate::error::DateError;
use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// EXIF timestamp layout
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Which rung of the fallback chain produced a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    DateTimeOriginal,
    DateTime,
    FileModified,
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSource::DateTimeOriginal => write!(f, "EXIF DateTimeOriginal"),
            DateSource::DateTime => write!(f, "EXIF DateTime"),
            DateSource::FileModified => write!(f, "file modification time"),
        }
    }
}

/// A resolved capture timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDate {
    pub taken: NaiveDateTime,
    pub source: DateSource,
}

/// Resolve the capture date of a file, falling back to its mtime
pub fn resolve_capture_date(path: &Path) -> Result<CaptureDate, DateError> {
    if let Some(date) = read_exif_date(path) {
        return Ok(date);
    }

    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| DateError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
    let local: DateTime<Local> = modified.into();

    Ok(CaptureDate {
        taken: local.naive_local(),
        source: DateSource::FileModified,
    })
}

fn read_exif_date(path: &Path) -> Option<CaptureDate> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(exif) => exif,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no usable EXIF block");
            return None;
        }
    };

    for (tag, source) in [
        (Tag::DateTimeOriginal, DateSource::DateTimeOriginal),
        (Tag::DateTime, DateSource::DateTime),
    ] {
        let parsed = exif
            .get_field(tag, In::PRIMARY)
            .and_then(|field| ascii_value(&field.value))
            .and_then(|s| parse_exif_datetime(&s));

        if let Some(taken) = parsed {
            return Some(CaptureDate { taken, source });
        }
    }

    None
}

/// Parse the EXIF `YYYY:MM:DD HH:MM:SS` layout
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), EXIF_DATE_FORMAT).ok()
}

fn ascii_value(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        let bytes = vec.first()?;
        let s = std::str::from_utf8(bytes).ok()?;
        let trimmed = s.trim_end_matches('\0').trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod fixtures;
