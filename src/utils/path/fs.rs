//! Filesystem path helpers.
//!
//! - `normalize_path` - absolute form of a configured directory
//! - `write_atomically` - produce a file under a sibling `.part` name, then rename
//!
//! Existence of a cache or output file is the only "done" signal the pipeline
//! has, so a file must never be visible under its final name half-written.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Suffix of every in-progress file.
pub const PART_SUFFIX: &str = ".part";

static PART_SEQ: AtomicU64 = AtomicU64::new(0);

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Sibling path used while `dest` is being written (`a.png` → `a.png.<pid>-<n>.part`).
///
/// Unique per call, so two writers racing on the same `dest` never share one.
pub fn partial_path(dest: &Path) -> PathBuf {
    let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}-{seq}{PART_SUFFIX}", std::process::id()));
    dest.with_file_name(name)
}

/// Create `dest` by letting `write` fill a temporary sibling, then renaming.
///
/// Parent directories are created as needed. On error the temporary file is
/// removed and `dest` is left untouched.
pub fn write_atomically<T>(
    dest: &Path,
    write: impl FnOnce(&Path) -> io::Result<T>,
) -> io::Result<T> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part = partial_path(dest);
    let result = write(&part).and_then(|value| fs::rename(&part, dest).map(|()| value));
    if result.is_err() {
        let _ = fs::remove_file(&part);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    fn leftover_parts(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(PART_SUFFIX)
            })
            .count()
    }

    #[test]
    fn test_partial_path_is_unique_sibling() {
        let dest = Path::new("cache/abc.png");
        let first = partial_path(dest);
        let second = partial_path(dest);

        assert_ne!(first, second);
        assert_eq!(first.parent(), dest.parent());
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("abc.png."));
        assert!(name.ends_with(PART_SUFFIX));
    }

    #[test]
    fn test_concurrent_writers_to_same_dest() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("shared.png");
        let bodies: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 64 * 1024]).collect();

        std::thread::scope(|s| {
            for body in &bodies {
                let dest = &dest;
                s.spawn(move || {
                    write_atomically(dest, |part| {
                        fs::write(part, body)?;
                        Ok(())
                    })
                    .unwrap();
                });
            }
        });

        // Whichever writer renamed last, the file is one complete body
        let written = fs::read(&dest).unwrap();
        assert!(bodies.contains(&written));
        assert_eq!(leftover_parts(dir.path()), 0);
    }

    #[test]
    fn test_write_atomically_creates_parents() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested/out.png");

        let written = write_atomically(&dest, |part| {
            fs::write(part, b"png")?;
            Ok(3)
        })
        .unwrap();

        assert_eq!(written, 3);
        assert_eq!(fs::read(&dest).unwrap(), b"png");
        assert_eq!(leftover_parts(&dir.path().join("nested")), 0);
    }

    #[test]
    fn test_write_atomically_cleans_up_on_error() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.png");

        let result: io::Result<()> = write_atomically(&dest, |part| {
            fs::write(part, b"half")?;
            Err(io::Error::other("connection reset"))
        });

        assert!(result.is_err());
        assert!(!dest.exists());
        assert_eq!(leftover_parts(dir.path()), 0);
    }
}
