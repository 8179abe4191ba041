use crate::output::{print_json, print_report};
use crate::source::resolve_source;
use anyhow::Context;
use guides_core::{
    config::GuideLayout,
    paths,
    sync::{self, SyncOptions},
    target::validate_target,
};
use std::path::Path;

/// `copy-guides <target>` — replace `<target>/guides/` with the current guide sources.
///
/// The target is validated before anything else, so a bad argument never
/// touches the filesystem.
pub fn run(target: &Path, source: Option<&Path>, json: bool, dry_run: bool) -> anyhow::Result<()> {
    let target = validate_target(Some(target))?;
    let source_root = resolve_source(source);

    let layout = GuideLayout::load(&source_root).with_context(|| {
        format!(
            "failed to load {}",
            paths::layout_path(&source_root).display()
        )
    })?;
    let plan = sync::plan(&source_root, &target, &layout)?;

    if !json {
        println!("Copying guides into: {}", plan.guides_dir.display());
        println!("  source:  {}", plan.source_root.display());
        if dry_run {
            println!("  dry run: nothing will be written");
        }
    }

    let report = sync::execute(&plan, SyncOptions { dry_run })
        .with_context(|| format!("failed to sync guides into {}", plan.guides_dir.display()))?;

    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}
