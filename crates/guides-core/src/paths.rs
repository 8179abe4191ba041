use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

/// Subdirectory of the target repository that receives the guides.
pub const GUIDES_DIR: &str = "guides";

/// Optional layout override read from the source root.
pub const LAYOUT_FILE: &str = "guides.yaml";

pub const CLIENT_DIR: &str = "client";
pub const SERVER_DIR: &str = "server";

pub const GUIDES_README_MD: &str = "GUIDES-README.md";
pub const README_MD: &str = "README.md";
pub const AGENTS_MD_ALIGNMENT_MD: &str = "AGENTS-MD-ALIGNMENT.md";
pub const UPDATE_ARCHITECTURE_MD: &str = "UPDATE-ARCHITECTURE.md";

/// Files whose presence marks a directory as a guide source root.
pub const SOURCE_MARKERS: &[&str] = &[GUIDES_README_MD, LAYOUT_FILE];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn guides_dir(target: &Path, dir_name: &str) -> PathBuf {
    target.join(dir_name)
}

pub fn layout_path(source_root: &Path) -> PathBuf {
    source_root.join(LAYOUT_FILE)
}

/// True when `dir` holds any of the [`SOURCE_MARKERS`].
pub fn is_source_root(dir: &Path) -> bool {
    SOURCE_MARKERS.iter().any(|m| dir.join(m).is_file())
}

/// Render `path` relative to `base` for status lines, falling back to the full path.
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}
