//! Human-readable rendering of status snapshots and migration reports.

use std::fmt::Write as _;

use dmseal_core::{MigrationReport, MigrationStatus};

/// Render a status snapshot as a short table
pub fn render_status(status: &MigrationStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Conversations:        {}", status.total_conversations);
    let _ = writeln!(out, "Messages:             {}", status.total_messages);
    let _ = writeln!(out, "  encrypted:          {}", status.encrypted_count);
    let _ = writeln!(out, "  plaintext:          {}", status.plaintext_count);

    if status.conversations_needing_migration.is_empty() {
        let _ = writeln!(out, "Nothing left to migrate.");
    } else {
        let _ = writeln!(
            out,
            "Needing migration:    {}",
            status.conversations_needing_migration.len()
        );
        for id in &status.conversations_needing_migration {
            let _ = writeln!(out, "  - {}", id);
        }
    }

    if !status.errors.is_empty() {
        let _ = writeln!(out, "Unreadable:           {}", status.errors.len());
        for failure in &status.errors {
            let _ = writeln!(out, "  - {}: {}", failure.id, failure.error);
        }
    }
    out
}

/// Render a migration report
pub fn render_report(report: &MigrationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Examined {} messages in {} ms",
        report.total, report.elapsed_ms
    );
    let _ = writeln!(out, "  encrypted:          {}", report.encrypted);
    let _ = writeln!(out, "  already encrypted:  {}", report.skipped);
    let _ = writeln!(out, "  failed:             {}", report.errors);

    for failure in &report.failures {
        let _ = writeln!(out, "  - {}: {}", failure.id, failure.error);
    }
    if report.cancelled {
        let _ = writeln!(out, "Cancelled before completion; run again to continue.");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmseal_core::migration::MigrationItemError;

    #[test]
    fn test_render_status_lists_pending_conversations() {
        let status = MigrationStatus {
            total_conversations: 2,
            total_messages: 10,
            encrypted_count: 7,
            plaintext_count: 3,
            conversations_needing_migration: vec!["conv-a".into()],
            errors: vec![],
        };

        let text = render_status(&status);
        assert!(text.contains("Messages:             10"));
        assert!(text.contains("  - conv-a"));
        assert!(!text.contains("Unreadable"));
    }

    #[test]
    fn test_render_status_nothing_to_do() {
        let text = render_status(&MigrationStatus::default());
        assert!(text.contains("Nothing left to migrate."));
    }

    #[test]
    fn test_render_report_with_failures() {
        let report = MigrationReport {
            total: 4,
            encrypted: 2,
            skipped: 1,
            errors: 1,
            failures: vec![MigrationItemError {
                id: "msg-3".into(),
                error: "Failed to write to storage: locked".into(),
            }],
            cancelled: true,
            started_at: 0,
            elapsed_ms: 12,
        };

        let text = render_report(&report);
        assert!(text.contains("Examined 4 messages in 12 ms"));
        assert!(text.contains("  - msg-3: Failed to write to storage: locked"));
        assert!(text.contains("Cancelled"));
    }
}
