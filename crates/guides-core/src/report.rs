//! Outcome of one guide sync run.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Destination did not exist and was written.
    Created,
    /// Destination existed and was overwritten.
    Replaced,
    /// Source was missing; destination left as it was.
    Skipped,
    /// Dry run: would have been written.
    Planned,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Created => "created",
            ItemStatus::Replaced => "replaced",
            ItemStatus::Skipped => "skipped",
            ItemStatus::Planned => "planned",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    pub kind: EntryKind,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Destination relative to the target root, e.g. `guides/client`.
    pub display: String,
    pub status: ItemStatus,
    /// Files (and links) written, or that would be written on a dry run.
    pub files: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub source_root: PathBuf,
    pub target: PathBuf,
    pub guides_dir: PathBuf,
    pub dry_run: bool,
    pub items: Vec<ItemOutcome>,
    /// Non-fatal findings: missing sources, skipped special files.
    pub warnings: Vec<String>,
}

impl SyncReport {
    pub fn copied_count(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Created | ItemStatus::Replaced))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|s| s == ItemStatus::Skipped)
    }

    pub fn planned_count(&self) -> usize {
        self.count(|s| s == ItemStatus::Planned)
    }

    pub fn files_copied(&self) -> u64 {
        self.items.iter().map(|i| i.files).sum()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// One-line closing summary.
    pub fn summary(&self) -> String {
        if self.dry_run {
            format!(
                "Dry run: {} would be copied, {} skipped ({} files)",
                self.planned_count(),
                self.skipped_count(),
                self.files_copied()
            )
        } else {
            format!(
                "Guides synced: {} copied, {} skipped ({} files)",
                self.copied_count(),
                self.skipped_count(),
                self.files_copied()
            )
        }
    }

    fn count(&self, pred: impl Fn(ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|i| pred(i.status)).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ItemStatus, files: u64) -> ItemOutcome {
        ItemOutcome {
            kind: EntryKind::Dir,
            source: PathBuf::from("/src/client"),
            destination: PathBuf::from("/dst/guides/client"),
            display: "guides/client".to_string(),
            status,
            files,
        }
    }

    fn report(dry_run: bool, items: Vec<ItemOutcome>) -> SyncReport {
        SyncReport {
            source_root: PathBuf::from("/src"),
            target: PathBuf::from("/dst"),
            guides_dir: PathBuf::from("/dst/guides"),
            dry_run,
            items,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn summary_counts_items() {
        let r = report(
            false,
            vec![
                item(ItemStatus::Created, 3),
                item(ItemStatus::Replaced, 2),
                item(ItemStatus::Skipped, 0),
            ],
        );
        assert_eq!(r.summary(), "Guides synced: 2 copied, 1 skipped (5 files)");
        assert_eq!(r.to_string(), r.summary());
    }

    #[test]
    fn dry_run_summary() {
        let r = report(true, vec![item(ItemStatus::Planned, 4)]);
        assert_eq!(r.summary(), "Dry run: 1 would be copied, 0 skipped (4 files)");
    }

    #[test]
    fn serializes_status_snake_case() {
        let r = report(false, vec![item(ItemStatus::Replaced, 1)]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["items"][0]["status"], "replaced");
        assert_eq!(json["items"][0]["kind"], "dir");
    }
}
