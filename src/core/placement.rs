//! Collision-free file placement.
//!
//! Shared by the quarantine mover and the organizer. Each target directory is
//! its own namespace: the file keeps its base name if that is free, otherwise
//! `<stem>_<n>.<ext>` is tried for n = 1, 2, ... up to a cap.
//!
//! A candidate is claimed by creating it with `create_new`, which fails if
//! anything already has that name. The transfer then replaces our own empty
//! placeholder, so an existing file is never overwritten even when another
//! writer races for the same name.

use crate::core::organize::OperationMode;
use crate::error::PlacementError;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Default cap on `_<n>` suffixes tried before giving up
pub const DEFAULT_MAX_NAME_PROBES: usize = 10_000;

/// Build the `n`th candidate name for a file (`n == 0` is the name itself)
pub fn candidate_name(file_name: &OsStr, n: usize) -> OsString {
    if n == 0 {
        return file_name.to_os_string();
    }

    let path = Path::new(file_name);
    let stem = path.file_stem().unwrap_or(file_name);
    let mut name = stem.to_os_string();
    name.push(format!("_{}", n));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Claim a name in `dir` that nothing else is using.
///
/// On success an empty placeholder file exists at the returned path.
pub fn reserve_unique_path(
    dir: &Path,
    file_name: &OsStr,
    max_probes: usize,
) -> Result<PathBuf, PlacementError> {
    for n in 0..=max_probes {
        let candidate = dir.join(candidate_name(file_name, n));

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(PlacementError::Io {
                    path: candidate,
                    source,
                })
            }
        }
    }

    Err(PlacementError::CollisionExhausted {
        dir: dir.to_path_buf(),
        name: file_name.to_string_lossy().into_owned(),
        attempts: max_probes + 1,
    })
}

/// Move or copy `source` into `dir` under a collision-free name.
///
/// `dir` is created if missing. On failure the source is left untouched and
/// nothing is left behind in `dir`.
pub fn place_file(
    source: &Path,
    dir: &Path,
    mode: OperationMode,
    max_probes: usize,
) -> Result<PathBuf, PlacementError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| PlacementError::MissingFileName {
            path: source.to_path_buf(),
        })?;

    fs::create_dir_all(dir).map_err(|e| PlacementError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let destination = reserve_unique_path(dir, file_name, max_probes)?;

    match transfer(source, &destination, mode) {
        Ok(()) => Ok(destination),
        Err(e) => {
            let _ = fs::remove_file(&destination);
            Err(PlacementError::Transfer {
                from: source.to_path_buf(),
                to: destination,
                source: e,
            })
        }
    }
}

/// Canonical path when it exists, otherwise an absolute lexical path
pub fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

fn transfer(source: &Path, destination: &Path, mode: OperationMode) -> io::Result<()> {
    match mode {
        OperationMode::Copy => copy_preserving_mtime(source, destination),
        OperationMode::Move => fs::rename(source, destination).or_else(|rename_err| {
            if rename_err.kind() == ErrorKind::NotFound {
                return Err(rename_err);
            }

            // rename fails across filesystems, fall back to copy+delete
            // with size verification before deleting source
            let source_size = fs::metadata(source)?.len();
            copy_preserving_mtime(source, destination)?;

            let dest_size = fs::metadata(destination)?.len();
            if dest_size != source_size {
                return Err(io::Error::new(
                    ErrorKind::Other,
                    format!(
                        "Copy verification failed: source {} bytes, dest {} bytes",
                        source_size, dest_size
                    ),
                ));
            }

            fs::remove_file(source)
        }),
    }
}

fn copy_preserving_mtime(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;

    // The copy already carries the source's permission bits, which may be
    // read-only. Timestamps only need ownership, not a writable handle.
    let modified = fs::metadata(source)?.modified()?;
    File::open(destination)?.set_modified(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn candidate_name_inserts_suffix_before_extension() {
        assert_eq!(candidate_name(OsStr::new("photo.jpg"), 0), "photo.jpg");
        assert_eq!(candidate_name(OsStr::new("photo.jpg"), 1), "photo_1.jpg");
        assert_eq!(candidate_name(OsStr::new("photo.jpg"), 12), "photo_12.jpg");
    }

    #[test]
    fn candidate_name_without_extension() {
        assert_eq!(candidate_name(OsStr::new("README"), 2), "README_2");
    }

    #[test]
    fn candidate_name_keeps_inner_dots() {
        assert_eq!(
            candidate_name(OsStr::new("trip.final.jpeg"), 1),
            "trip.final_1.jpeg"
        );
    }

    #[test]
    fn reserve_skips_taken_names() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("photo.jpg"), b"a").unwrap();
        fs::write(temp_dir.path().join("photo_1.jpg"), b"b").unwrap();

        let reserved =
            reserve_unique_path(temp_dir.path(), OsStr::new("photo.jpg"), 10).unwrap();

        assert_eq!(reserved, temp_dir.path().join("photo_2.jpg"));
        assert!(reserved.exists());
        assert_eq!(fs::read(temp_dir.path().join("photo.jpg")).unwrap(), b"a");
    }

    #[test]
    fn reserve_gives_up_after_cap() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["photo.jpg", "photo_1.jpg", "photo_2.jpg", "photo_3.jpg"] {
            fs::write(temp_dir.path().join(name), b"taken").unwrap();
        }

        let result = reserve_unique_path(temp_dir.path(), OsStr::new("photo.jpg"), 3);

        match result {
            Err(PlacementError::CollisionExhausted { attempts, name, .. }) => {
                assert_eq!(attempts, 4);
                assert_eq!(name, "photo.jpg");
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn place_move_removes_source() {
        let src_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("test.jpg");
        fs::write(&source, b"test content").unwrap();

        let placed = place_file(
            &source,
            &dest_dir.path().join("nested/dir"),
            OperationMode::Move,
            DEFAULT_MAX_NAME_PROBES,
        )
        .unwrap();

        assert!(!source.exists());
        assert_eq!(placed, dest_dir.path().join("nested/dir/test.jpg"));
        assert_eq!(fs::read(&placed).unwrap(), b"test content");
    }

    #[test]
    fn place_copy_keeps_source_and_mtime() {
        let src_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("test.jpg");
        fs::write(&source, b"test content").unwrap();
        let old = SystemTime::now() - Duration::from_secs(86_400 * 400);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let placed = place_file(
            &source,
            dest_dir.path(),
            OperationMode::Copy,
            DEFAULT_MAX_NAME_PROBES,
        )
        .unwrap();

        assert!(source.exists());
        let copied = fs::metadata(&placed).unwrap().modified().unwrap();
        let delta = copied
            .duration_since(old)
            .unwrap_or_else(|e| e.duration());
        assert!(delta < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn place_copy_of_read_only_source() {
        use std::os::unix::fs::PermissionsExt;

        let src_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("cam.jpg");
        fs::write(&source, b"from the card").unwrap();
        let old = SystemTime::now() - Duration::from_secs(86_400 * 30);
        File::options()
            .write(true)
            .open(&source)
            .unwrap()
            .set_modified(old)
            .unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o444)).unwrap();

        let placed = place_file(&source, dest_dir.path(), OperationMode::Copy, 10).unwrap();

        assert_eq!(fs::read(&placed).unwrap(), b"from the card");
        assert!(fs::metadata(&placed).unwrap().permissions().readonly());
        let copied = fs::metadata(&placed).unwrap().modified().unwrap();
        let delta = copied
            .duration_since(old)
            .unwrap_or_else(|e| e.duration());
        assert!(delta < Duration::from_secs(2));
    }

    #[test]
    fn place_missing_source_leaves_no_placeholder() {
        let dest_dir = TempDir::new().unwrap();

        let result = place_file(
            Path::new("/nonexistent/photo.jpg"),
            dest_dir.path(),
            OperationMode::Move,
            DEFAULT_MAX_NAME_PROBES,
        );

        match result {
            Err(PlacementError::Transfer { from, to, source }) => {
                assert_eq!(from, Path::new("/nonexistent/photo.jpg"));
                assert_eq!(to, dest_dir.path().join("photo.jpg"));
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected transfer error, got {:?}", other),
        }
        assert!(!dest_dir.path().join("photo.jpg").exists());
    }

    #[test]
    fn place_never_overwrites_existing() {
        let src_dir = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        fs::write(dest_dir.path().join("dup.jpg"), b"already here").unwrap();
        let source = src_dir.path().join("dup.jpg");
        fs::write(&source, b"newcomer").unwrap();

        let placed = place_file(
            &source,
            dest_dir.path(),
            OperationMode::Move,
            DEFAULT_MAX_NAME_PROBES,
        )
        .unwrap();

        assert_eq!(placed, dest_dir.path().join("dup_1.jpg"));
        assert_eq!(
            fs::read(dest_dir.path().join("dup.jpg")).unwrap(),
            b"already here"
        );
        assert_eq!(fs::read(&placed).unwrap(), b"newcomer");
    }
}
