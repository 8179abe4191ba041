use crate::error::{GuidesError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// LayoutWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// LayoutEntry
// ---------------------------------------------------------------------------

/// One source path (relative to the source root) and where it lands under
/// the guides directory. `destination` defaults to `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl LayoutEntry {
    pub fn same(name: &str) -> Self {
        Self {
            source: name.to_string(),
            destination: None,
        }
    }

    pub fn renamed(source: &str, destination: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: Some(destination.to_string()),
        }
    }

    pub fn destination(&self) -> &str {
        self.destination.as_deref().unwrap_or(&self.source)
    }
}

// ---------------------------------------------------------------------------
// GuideLayout
// ---------------------------------------------------------------------------

/// What gets copied into a target repository.
///
/// Directories replace their destination wholesale; files overwrite theirs.
/// A `guides.yaml` in the source root overrides any of the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideLayout {
    #[serde(default = "default_guides_dir")]
    pub guides_dir: String,
    #[serde(default = "default_dirs")]
    pub dirs: Vec<LayoutEntry>,
    #[serde(default = "default_files")]
    pub files: Vec<LayoutEntry>,
}

fn default_guides_dir() -> String {
    paths::GUIDES_DIR.to_string()
}

fn default_dirs() -> Vec<LayoutEntry> {
    vec![
        LayoutEntry::same(paths::CLIENT_DIR),
        LayoutEntry::same(paths::SERVER_DIR),
    ]
}

fn default_files() -> Vec<LayoutEntry> {
    vec![
        LayoutEntry::renamed(paths::GUIDES_README_MD, paths::README_MD),
        LayoutEntry::same(paths::AGENTS_MD_ALIGNMENT_MD),
        LayoutEntry::same(paths::UPDATE_ARCHITECTURE_MD),
    ]
}

impl Default for GuideLayout {
    fn default() -> Self {
        Self {
            guides_dir: default_guides_dir(),
            dirs: default_dirs(),
            files: default_files(),
        }
    }
}

impl GuideLayout {
    /// Load `guides.yaml` from `source_root`, or the built-in layout when absent.
    pub fn load(source_root: &Path) -> Result<Self> {
        let path = paths::layout_path(source_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let layout: GuideLayout = serde_yaml::from_str(&data)?;
        tracing::debug!(path = %path.display(), "loaded guide layout");
        Ok(layout)
    }

    /// Check the layout for entries that would escape the guides directory or
    /// clobber each other.
    pub fn validate(&self) -> Vec<LayoutWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(LayoutWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        // 1. guides_dir must be a single plain path component
        let mut components = Path::new(&self.guides_dir).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => error(format!(
                "guides_dir '{}' must be a single directory name",
                self.guides_dir
            )),
        }

        // 2. Every entry path must be relative and stay inside its root
        let entries = self
            .dirs
            .iter()
            .map(|e| ("dirs", e))
            .chain(self.files.iter().map(|e| ("files", e)));
        for (section, entry) in entries.clone() {
            if let Some(problem) = path_problem(&entry.source) {
                error(format!("{section}: source '{}' {problem}", entry.source));
            }
            if let Some(problem) = path_problem(entry.destination()) {
                error(format!(
                    "{section}: destination '{}' {problem}",
                    entry.destination()
                ));
            }
        }

        // 3. No two entries may write the same destination, or one inside another
        let mut seen_dst: Vec<(PathBuf, &str)> = Vec::new();
        for (section, entry) in entries.clone() {
            if path_problem(entry.destination()).is_some() {
                continue;
            }
            let dst = normalized(entry.destination());
            if let Some((_, other)) = seen_dst.iter().find(|(d, _)| *d == dst) {
                error(format!(
                    "{section}: destination '{}' is written by more than one entry \
                     (also '{other}')",
                    entry.destination()
                ));
            } else if let Some((_, other)) = seen_dst
                .iter()
                .find(|(d, _)| dst.starts_with(d) || d.starts_with(&dst))
            {
                error(format!(
                    "{section}: destination '{}' is nested with destination '{other}'",
                    entry.destination()
                ));
            }
            seen_dst.push((dst, entry.destination()));
        }

        // 4. Duplicate sources are allowed but probably a mistake
        let mut seen_src = HashSet::new();
        for (section, entry) in entries {
            if !seen_src.insert(normalized(&entry.source)) {
                warnings.push(LayoutWarning {
                    level: WarnLevel::Warning,
                    message: format!("{section}: source '{}' is listed twice", entry.source),
                });
            }
        }

        warnings
    }

    /// Run [`validate`](Self::validate) and fail on the first error-level finding.
    pub fn ensure_valid(&self) -> Result<()> {
        for w in self.validate() {
            if w.level == WarnLevel::Error {
                return Err(GuidesError::InvalidLayout(w.message));
            }
            tracing::warn!("{}", w.message);
        }
        Ok(())
    }
}

/// Lexical form used for comparisons: `./a/./b` and `a/b` are the same entry.
fn normalized(raw: &str) -> PathBuf {
    Path::new(raw)
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect()
}

fn path_problem(raw: &str) -> Option<&'static str> {
    if raw.trim().is_empty() {
        return Some("is empty");
    }
    let path = Path::new(raw);
    if path.is_absolute() || path.has_root() {
        return Some("must be relative");
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Some("must not contain '..'");
    }
    if path.components().all(|c| c == Component::CurDir) {
        return Some("must name a path below the root");
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
