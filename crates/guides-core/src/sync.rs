//! Directory synchronizer: mirror the guide sources into `<target>/guides/`.
//!
//! Runs strictly in sequence: directories first, then files, each in layout
//! order. A missing source is a warning and the run continues. Every other
//! failure aborts immediately; there is no rollback.

use crate::config::{GuideLayout, LayoutEntry};
use crate::error::{GuidesError, Result};
use crate::io;
use crate::paths;
use crate::report::{EntryKind, ItemOutcome, ItemStatus, SyncReport};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute outcomes without writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct PlannedItem {
    pub kind: EntryKind,
    /// Path relative to the source root, as written in the layout.
    pub source_rel: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub source_root: PathBuf,
    pub target: PathBuf,
    pub guides_dir: PathBuf,
    pub items: Vec<PlannedItem>,
}

/// Resolve `layout` against `source_root` and `target` into absolute copy steps.
///
/// Fails when the layout is invalid, or when any destination would land on,
/// inside, or above any entry's source once symlinks are resolved. Replacing
/// such a destination would delete or rewrite a source before it is copied.
pub fn plan(source_root: &Path, target: &Path, layout: &GuideLayout) -> Result<SyncPlan> {
    if !source_root.is_dir() {
        return Err(GuidesError::SourceNotFound(source_root.to_path_buf()));
    }
    layout.ensure_valid()?;

    let guides_dir = paths::guides_dir(target, &layout.guides_dir);

    let to_item = |kind: EntryKind, entry: &LayoutEntry| PlannedItem {
        kind,
        source_rel: entry.source.clone(),
        source: source_root.join(&entry.source),
        destination: guides_dir.join(entry.destination()),
    };
    let items: Vec<PlannedItem> = layout
        .dirs
        .iter()
        .map(|e| to_item(EntryKind::Dir, e))
        .chain(layout.files.iter().map(|e| to_item(EntryKind::File, e)))
        .collect();

    check_overlap(&items)?;

    Ok(SyncPlan {
        source_root: source_root.to_path_buf(),
        target: target.to_path_buf(),
        guides_dir,
        items,
    })
}

/// Compare every destination with every source on real paths.
fn check_overlap(items: &[PlannedItem]) -> Result<()> {
    let sources = items
        .iter()
        .map(|i| io::resolve_existing(&i.source))
        .collect::<Result<Vec<_>>>()?;

    for item in items {
        let destination = io::resolve_write_target(&item.destination)?;
        if let Some(src) = sources.iter().find(|src| io::is_overlap(src, &destination)) {
            return Err(GuidesError::Overlap {
                source_path: src.clone(),
                destination,
            });
        }
    }
    Ok(())
}

/// Carry out `plan`, replacing each destination with a fresh copy of its source.
pub fn execute(plan: &SyncPlan, options: SyncOptions) -> Result<SyncReport> {
    let mut report = SyncReport {
        source_root: plan.source_root.clone(),
        target: plan.target.clone(),
        guides_dir: plan.guides_dir.clone(),
        dry_run: options.dry_run,
        items: Vec::with_capacity(plan.items.len()),
        warnings: Vec::new(),
    };

    if !options.dry_run {
        io::ensure_dir(&plan.guides_dir)?;
    }

    for item in &plan.items {
        let display = paths::display_relative(&item.destination, &plan.target);
        let present = match item.kind {
            EntryKind::Dir => item.source.is_dir(),
            EntryKind::File => item.source.is_file(),
        };

        if !present {
            let shown = match item.kind {
                EntryKind::Dir => format!("{}/", item.source_rel),
                EntryKind::File => item.source_rel.clone(),
            };
            tracing::info!(source = %item.source.display(), "guide source not found, skipping");
            report
                .warnings
                .push(format!("source not found, skipped: {shown}"));
            report.items.push(ItemOutcome {
                kind: item.kind,
                source: item.source.clone(),
                destination: item.destination.clone(),
                display,
                status: ItemStatus::Skipped,
                files: 0,
            });
            continue;
        }

        let existed = fs::symlink_metadata(&item.destination).is_ok();
        let (status, files) = if options.dry_run {
            let files = match item.kind {
                EntryKind::Dir => io::count_files(&item.source)?,
                EntryKind::File => 1,
            };
            (ItemStatus::Planned, files)
        } else {
            let files = match item.kind {
                EntryKind::Dir => {
                    io::remove_path_if_exists(&item.destination)?;
                    let warnings = &mut report.warnings;
                    io::copy_dir_recursive(&item.source, &item.destination, warnings)?
                }
                EntryKind::File => {
                    io::copy_file_atomic(&item.source, &item.destination)?;
                    1
                }
            };
            let status = if existed {
                ItemStatus::Replaced
            } else {
                ItemStatus::Created
            };
            (status, files)
        };

        tracing::debug!(
            destination = %item.destination.display(),
            status = %status,
            files,
            "synced guide entry"
        );
        report.items.push(ItemOutcome {
            kind: item.kind,
            source: item.source.clone(),
            destination: item.destination.clone(),
            display,
            status,
            files,
        });
    }

    Ok(report)
}

/// [`plan`] then [`execute`].
pub fn sync(
    source_root: &Path,
    target: &Path,
    layout: &GuideLayout,
    options: SyncOptions,
) -> Result<SyncReport> {
    let plan = plan(source_root, target, layout)?;
    execute(&plan, options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
