//! Copies the script source tree into the directory the runtime loads from

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("mirror I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to mirror {} into {}: directories overlap", src.display(), dst.display())]
    Overlap { src: PathBuf, dst: PathBuf },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> MirrorError + '_ {
    move |source| MirrorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn check_overlap(src: &Path, dst: &Path) -> Result<(), MirrorError> {
    if src.starts_with(dst) || dst.starts_with(src) {
        return Err(MirrorError::Overlap {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }
    Ok(())
}

/// Copy every file under `src` into `dst`, creating directories and
/// overwriting existing files. Does nothing when both are the same directory.
///
/// Returns the number of files copied.
pub fn mirror_directory(src: &Path, dst: &Path) -> Result<usize, MirrorError> {
    if src == dst {
        return Ok(0);
    }
    check_overlap(src, dst)?;

    fs::create_dir_all(dst).map_err(io_error(dst))?;
    copy_tree(src, dst)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<usize, MirrorError> {
    let mut copied = 0;

    for entry in fs::read_dir(src).map_err(io_error(src))? {
        let entry = entry.map_err(io_error(src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(io_error(&from))?;

        if file_type.is_dir() {
            fs::create_dir_all(&to).map_err(io_error(&to))?;
            copied += copy_tree(&from, &to)?;
        } else {
            trace!(target: "hotplay", "Mirroring {} -> {}", from.display(), to.display());
            fs::copy(&from, &to).map_err(io_error(&to))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Delete `dst`, recreate it and mirror `src` into it
///
/// Leaves `dst` without stale files from earlier runs. Does nothing when both
/// are the same directory.
pub fn regenerate(src: &Path, dst: &Path) -> Result<usize, MirrorError> {
    if src == dst {
        return Ok(0);
    }
    check_overlap(src, dst)?;

    if dst.exists() {
        fs::remove_dir_all(dst).map_err(io_error(dst))?;
    }

    let copied = mirror_directory(src, dst)?;
    debug!(
        target: "hotplay",
        "Regenerated {} ({} files)",
        dst.display(),
        copied
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_mirror_copies_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("game");
        let dst = temp_dir.path().join("runtime");
        write(&src.join("game.rhai"), "fn Update() {}");
        write(&src.join("util/palette.rhai"), "const RED = 1;");

        assert_eq!(mirror_directory(&src, &dst).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(dst.join("util/palette.rhai")).unwrap(),
            "const RED = 1;"
        );
    }

    #[test]
    fn test_mirror_same_directory_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("game.rhai"), "");

        assert_eq!(mirror_directory(temp_dir.path(), temp_dir.path()).unwrap(), 0);
        assert_eq!(regenerate(temp_dir.path(), temp_dir.path()).unwrap(), 0);
        assert!(temp_dir.path().join("game.rhai").exists());
    }

    #[test]
    fn test_regenerate_removes_stale_files() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("game");
        let dst = temp_dir.path().join("runtime");
        write(&src.join("game.rhai"), "new");
        write(&dst.join("game.rhai"), "old");
        write(&dst.join("deleted.rhai"), "stale");

        regenerate(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("game.rhai")).unwrap(), "new");
        assert!(!dst.join("deleted.rhai").exists());
    }

    #[test]
    fn test_overlapping_trees_are_refused() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("game");
        write(&src.join("game.rhai"), "");

        let nested = src.join("out");
        assert!(matches!(
            regenerate(&src, &nested),
            Err(MirrorError::Overlap { .. })
        ));
        assert!(matches!(
            regenerate(&src, temp_dir.path()),
            Err(MirrorError::Overlap { .. })
        ));
        // Source is untouched
        assert!(src.join("game.rhai").exists());
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("missing");
        let dst = temp_dir.path().join("runtime");

        let err = mirror_directory(&src, &dst).unwrap_err();
        assert!(matches!(err, MirrorError::Io { ref path, .. } if path == &src));
    }
}
