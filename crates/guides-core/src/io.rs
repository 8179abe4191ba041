use crate::error::{GuidesError, Result};
use std::fs;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Copy `src` over `dst` through a tempfile in the destination directory, so a
/// reader never sees a half-written file. Source permissions are carried over.
pub fn copy_file_atomic(src: &Path, dst: &Path) -> Result<()> {
    let dir = dst.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| GuidesError::copy_failed(dir, e))?;

    let mut reader = fs::File::open(src).map_err(|e| GuidesError::copy_failed(src, e))?;
    let permissions = reader
        .metadata()
        .map_err(|e| GuidesError::copy_failed(src, e))?
        .permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| GuidesError::copy_failed(dst, e))?;
    std::io::copy(&mut reader, &mut tmp).map_err(|e| GuidesError::copy_failed(dst, e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| GuidesError::copy_failed(dst, e))?;

    // A directory in the way would make the rename fail.
    if fs::symlink_metadata(dst).is_ok_and(|m| m.is_dir()) {
        remove_path_if_exists(dst)?;
    }
    tmp.persist(dst).map_err(|e| GuidesError::copy_failed(dst, e.error))?;
    Ok(())
}

/// Remove a directory tree, file, or symlink at `path`. Returns true if something was removed.
pub fn remove_path_if_exists(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(GuidesError::copy_failed(path, e)),
    };
    let res = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    res.map_err(|e| GuidesError::copy_failed(path, e))?;
    tracing::debug!(path = %path.display(), "removed");
    Ok(true)
}

/// Recursively copy `src` into `dst`, creating `dst` if needed.
///
/// Symlinks are recreated as symlinks on Unix and dereferenced elsewhere.
/// Special files (sockets, fifos, devices) are skipped and reported through
/// `warnings`. Returns the number of files and links written.
pub fn copy_dir_recursive(src: &Path, dst: &Path, warnings: &mut Vec<String>) -> Result<u64> {
    let mut ancestors = HashSet::new();
    copy_dir_guarded(src, dst, warnings, &mut ancestors)
}

/// `ancestors` holds the resolved directories currently being copied; a
/// directory reached again through a link is a cycle and is skipped.
fn copy_dir_guarded(
    src: &Path,
    dst: &Path,
    warnings: &mut Vec<String>,
    ancestors: &mut HashSet<PathBuf>,
) -> Result<u64> {
    let real = fs::canonicalize(src).map_err(|e| GuidesError::copy_failed(src, e))?;
    if !ancestors.insert(real.clone()) {
        warnings.push(format!("symlink loop skipped: {}", src.display()));
        return Ok(0);
    }

    fs::create_dir_all(dst).map_err(|e| GuidesError::copy_failed(dst, e))?;

    let mut entries = fs::read_dir(src)
        .map_err(|e| GuidesError::copy_failed(src, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| GuidesError::copy_failed(src, e))?;
    entries.sort_by_key(|e| e.file_name());

    let mut copied = 0u64;
    for entry in entries {
        let path_src = entry.path();
        let path_dst = dst.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| GuidesError::copy_failed(&path_src, e))?;

        if file_type.is_symlink() {
            copied += copy_symlink(&path_src, &path_dst, warnings, ancestors)?;
        } else if file_type.is_dir() {
            copied += copy_dir_guarded(&path_src, &path_dst, warnings, ancestors)?;
        } else if file_type.is_file() {
            fs::copy(&path_src, &path_dst).map_err(|e| GuidesError::copy_failed(&path_src, e))?;
            tracing::debug!(from = %path_src.display(), to = %path_dst.display(), "copied");
            copied += 1;
        } else {
            warnings.push(format!("special file skipped: {}", path_src.display()));
        }
    }

    ancestors.remove(&real);
    Ok(copied)
}

/// Number of files and links [`copy_dir_recursive`] would write for `src`.
pub fn count_files(src: &Path) -> Result<u64> {
    let mut n = 0u64;
    for entry in fs::read_dir(src).map_err(|e| GuidesError::copy_failed(src, e))? {
        let entry = entry.map_err(|e| GuidesError::copy_failed(src, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| GuidesError::copy_failed(entry.path(), e))?;
        if file_type.is_dir() {
            n += count_files(&entry.path())?;
        } else if file_type.is_file() || file_type.is_symlink() {
            n += 1;
        }
    }
    Ok(n)
}

#[cfg(unix)]
fn copy_symlink(
    src: &Path,
    dst: &Path,
    _warnings: &mut Vec<String>,
    _ancestors: &mut HashSet<PathBuf>,
) -> Result<u64> {
    let link = fs::read_link(src).map_err(|e| GuidesError::copy_failed(src, e))?;
    std::os::unix::fs::symlink(&link, dst).map_err(|e| GuidesError::copy_failed(dst, e))?;
    Ok(1)
}

#[cfg(not(unix))]
fn copy_symlink(
    src: &Path,
    dst: &Path,
    warnings: &mut Vec<String>,
    ancestors: &mut HashSet<PathBuf>,
) -> Result<u64> {
    if src.is_dir() {
        copy_dir_guarded(src, dst, warnings, ancestors)
    } else {
        fs::copy(src, dst).map_err(|e| GuidesError::copy_failed(src, e))?;
        Ok(1)
    }
}

/// Absolute, symlink-resolved form of `path`, which need not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// rejoined, so a symlinked parent directory resolves to where writes land.
pub fn resolve_existing(path: &Path) -> Result<PathBuf> {
    let mut tail = Vec::new();
    let mut current = path;
    loop {
        match fs::canonicalize(current) {
            Ok(base) => {
                return Ok(tail.iter().rev().fold(base, |acc: PathBuf, part| acc.join(part)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (current.parent(), current.file_name()) else {
                    return Err(e.into());
                };
                tail.push(name.to_os_string());
                current = parent;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Where a write to `path` lands: the parent chain is resolved, the last
/// component is kept as-is because it is replaced, not followed.
pub fn resolve_write_target(path: &Path) -> Result<PathBuf> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok(resolve_existing(parent)?.join(name)),
        _ => resolve_existing(path),
    }
}

/// True when either path is equal to or nested inside the other.
/// Both paths must already be absolute and normalized.
pub fn is_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copy_file_atomic_overwrites() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.md");
        let dst = dir.path().join("out/dst.md");
        fs::write(&src, "new").unwrap();
        fs::create_dir_all(dst.parent().unwrap()).unwrap();
        fs::write(&dst, "old").unwrap();

        copy_file_atomic(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn copy_file_atomic_replaces_directory_in_the_way() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.md");
        let dst = dir.path().join("dst.md");
        fs::write(&src, "content").unwrap();
        fs::create_dir_all(dst.join("nested")).unwrap();

        copy_file_atomic(&src, &dst).unwrap();
        assert!(dst.is_file());
    }

    #[test]
    fn copy_file_atomic_missing_source_names_path() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("absent.md");
        let err = copy_file_atomic(&src, &dir.path().join("dst.md")).unwrap_err();
        assert!(err.to_string().contains("absent.md"));
        assert!(!dir.path().join("dst.md").exists());
    }

    #[test]
    fn copy_dir_recursive_mirrors_tree() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("client");
        fs::create_dir_all(src.join("core/rules")).unwrap();
        fs::write(src.join("README.md"), "# Client").unwrap();
        fs::write(src.join("core/rules/state.md"), "state rules").unwrap();
        fs::create_dir_all(src.join("empty")).unwrap();

        let dst = dir.path().join("out/client");
        let mut warnings = Vec::new();
        let n = copy_dir_recursive(&src, &dst, &mut warnings).unwrap();

        assert_eq!(n, 2);
        assert_eq!(count_files(&src).unwrap(), 2);
        assert!(warnings.is_empty());
        assert_eq!(fs::read_to_string(dst.join("README.md")).unwrap(), "# Client");
        assert_eq!(
            fs::read_to_string(dst.join("core/rules/state.md")).unwrap(),
            "state rules"
        );
        assert!(dst.join("empty").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_recursive_keeps_symlinks() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("server");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("target.md"), "t").unwrap();
        std::os::unix::fs::symlink("target.md", src.join("alias.md")).unwrap();

        let dst = dir.path().join("copy");
        let mut warnings = Vec::new();
        copy_dir_recursive(&src, &dst, &mut warnings).unwrap();

        let link = fs::read_link(dst.join("alias.md")).unwrap();
        assert_eq!(link, Path::new("target.md"));
    }

    #[cfg(unix)]
    #[test]
    fn copy_dir_recursive_skips_special_files() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("server");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("README.md"), "# Server").unwrap();
        let _listener = std::os::unix::net::UnixListener::bind(src.join("agent.sock")).unwrap();

        let dst = dir.path().join("copy");
        let mut warnings = Vec::new();
        let n = copy_dir_recursive(&src, &dst, &mut warnings).unwrap();

        assert_eq!(n, 1);
        assert_eq!(count_files(&src).unwrap(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("special file skipped:"));
        assert!(warnings[0].contains("agent.sock"));
        assert!(fs::symlink_metadata(dst.join("agent.sock")).is_err());
        assert!(dst.join("README.md").is_file());
    }

    #[test]
    fn copy_dir_guarded_stops_at_directory_already_on_the_path() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("client");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("README.md"), "# Client").unwrap();

        let mut ancestors = HashSet::new();
        ancestors.insert(fs::canonicalize(&src).unwrap());
        let dst = dir.path().join("copy");
        let mut warnings = Vec::new();
        let n = copy_dir_guarded(&src, &dst, &mut warnings, &mut ancestors).unwrap();

        assert_eq!(n, 0);
        assert!(warnings[0].starts_with("symlink loop skipped:"));
        assert!(!dst.exists());
    }

    #[test]
    fn copy_dir_guarded_allows_same_directory_twice_when_not_nested() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("client");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("README.md"), "# Client").unwrap();

        let mut ancestors = HashSet::new();
        let mut warnings = Vec::new();
        let a = copy_dir_guarded(&src, &dir.path().join("a"), &mut warnings, &mut ancestors);
        let b = copy_dir_guarded(&src, &dir.path().join("b"), &mut warnings, &mut ancestors);

        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert!(warnings.is_empty());
        assert!(ancestors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_write_target_follows_symlinked_parent() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        fs::create_dir_all(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

        let resolved = resolve_write_target(&dir.path().join("link/missing/README.md")).unwrap();
        assert_eq!(
            resolved,
            fs::canonicalize(&real).unwrap().join("missing/README.md")
        );

        // The final component is replaced, never followed.
        let leaf = resolve_write_target(&dir.path().join("link")).unwrap();
        assert_eq!(leaf, fs::canonicalize(dir.path()).unwrap().join("link"));
    }

    #[test]
    fn remove_path_handles_missing_file_and_dir() {
        let dir = TempDir::new().unwrap();
        assert!(!remove_path_if_exists(&dir.path().join("nope")).unwrap());

        let file = dir.path().join("f.md");
        fs::write(&file, "x").unwrap();
        assert!(remove_path_if_exists(&file).unwrap());
        assert!(!file.exists());

        let tree = dir.path().join("tree/deep");
        fs::create_dir_all(&tree).unwrap();
        assert!(remove_path_if_exists(&dir.path().join("tree")).unwrap());
        assert!(!dir.path().join("tree").exists());
    }

    #[test]
    fn overlap_detection() {
        assert!(is_overlap(Path::new("/a/b"), Path::new("/a/b")));
        assert!(is_overlap(Path::new("/a/b/c"), Path::new("/a/b")));
        assert!(is_overlap(Path::new("/a"), Path::new("/a/b")));
        assert!(!is_overlap(Path::new("/a/b"), Path::new("/a/bc")));
    }
}
