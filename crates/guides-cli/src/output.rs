use guides_core::report::{EntryKind, ItemStatus, SyncReport};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Per-item status lines, warnings, and the closing summary.
pub fn print_report(report: &SyncReport) {
    for item in &report.items {
        if item.status == ItemStatus::Skipped {
            continue;
        }
        let label = match (item.status, item.kind) {
            (ItemStatus::Replaced, EntryKind::File) => "updated",
            (status, _) => status.as_str(),
        };
        match item.kind {
            EntryKind::Dir => println!("  {label}: {}/ ({} files)", item.display, item.files),
            EntryKind::File => println!("  {label}: {}", item.display),
        }
    }

    for warning in &report.warnings {
        println!("  warning: {warning}");
    }

    println!("\n{}", report.summary());
}
