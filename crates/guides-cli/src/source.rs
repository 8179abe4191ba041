use guides_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the guide source root.
///
/// Priority:
/// 1. `--source` flag / `GUIDES_SOURCE` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `GUIDES-README.md` or `guides.yaml`
/// 3. Fall back to `cwd`
pub fn resolve_source(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_source_root(&cwd).unwrap_or(cwd)
}

fn find_source_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| paths::is_source_root(dir))
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_source_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_source(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_source_root_from_subdir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("GUIDES-README.md"), "# Guides\n").unwrap();
        let subdir = dir.path().join("client/core");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_source_root(&subdir).as_deref(), Some(dir.path()));
    }

    #[test]
    fn layout_file_marks_source_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("guides.yaml"), "guides_dir: docs\n").unwrap();
        assert_eq!(find_source_root(dir.path()).as_deref(), Some(dir.path()));
    }
}
