//! Human-readable change reports on stdout.

use colored::{ColoredString, Colorize};
use tabled::{settings::Style, Table, Tabled};

use alertsync_core::Spec;
use alertsync_sync::{ApplyResult, ChangeSet};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "change")]
    change: &'static str,
    #[tabled(rename = "records")]
    records: usize,
}

/// Print the three change sets, the diff of every modified record, and a
/// summary table.
pub fn print_changes<S: Spec>(changes: &ChangeSet<S>, prefix: &str) {
    for duplicate in &changes.duplicates {
        println!(
            "{prefix}{} GUID {} appears more than once in {}; the last one wins",
            "warning:".yellow().bold(),
            duplicate.guid,
            duplicate.side
        );
    }

    print_section(prefix, "Added", &changes.added, "+".green());
    print_section(prefix, "Removed", &changes.removed, "-".red());

    println!("{prefix}{} ({}):", "Modified".bold(), changes.modified.len());
    for modified in &changes.modified {
        let spec = &modified.spec;
        println!("  {}  {}  {}", "~".yellow(), spec.guid(), spec.name());
        for line in modified.diff.lines() {
            println!("      {}", colorize_diff_line(line));
        }
    }

    let rows = vec![
        SummaryRow {
            change: "added",
            records: changes.added.len(),
        },
        SummaryRow {
            change: "removed",
            records: changes.removed.len(),
        },
        SummaryRow {
            change: "modified",
            records: changes.modified.len(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_section<S: Spec>(prefix: &str, title: &str, specs: &[S], marker: ColoredString) {
    println!("{prefix}{} ({}):", title.bold(), specs.len());
    for spec in specs {
        println!("  {marker}  {}  {}", spec.guid(), spec.name());
    }
}

fn colorize_diff_line(line: &str) -> String {
    if line.starts_with("+++") || line.starts_with("---") {
        line.bold().to_string()
    } else if line.starts_with('+') {
        line.green().to_string()
    } else if line.starts_with('-') {
        line.red().to_string()
    } else if line.starts_with("@@") {
        line.cyan().to_string()
    } else {
        line.to_string()
    }
}

/// Print what an apply actually did.
pub fn print_applied(results: &[ApplyResult]) {
    println!("{} {} change(s) applied", "✓".green().bold(), results.len());
    for result in results {
        let (marker, rows) = match result {
            ApplyResult::Added { .. } => ("+".green(), None),
            ApplyResult::Removed { rows, .. } => ("-".red(), Some(*rows)),
            ApplyResult::Modified { rows, .. } => ("~".yellow(), Some(*rows)),
        };
        match rows {
            None => println!("  {marker}  {}", result.guid()),
            Some(0) => println!(
                "  {marker}  {}  {}",
                result.guid(),
                "no stored row matched".dimmed()
            ),
            Some(n) => println!("  {marker}  {} ({n} row(s))", result.guid()),
        }
    }
}
