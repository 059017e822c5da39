//! Single-threaded export pipeline: locate, extract, serialize.

use crate::config::ExportConfig;
use crate::diag::DiagnosticLog;
use crate::export;
use crate::extract;
use crate::locate::{self, Host};
use chrono::Utc;
use eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// The main entry point for the sequential export logic.
///
/// Files are read one at a time; per-file failures land in the diagnostic
/// log while directory-creation and write failures abort the run.
pub fn execute(config: &ExportConfig, host: &Host) -> Result<()> {
    let now = Utc::now();
    let mut log = DiagnosticLog::new();

    let located = locate::resolve_sessions_dir(
        config.sessions_dir.as_deref(),
        host,
        config.storage_root.as_deref(),
        now,
        &mut log,
    );

    let entries = match &located {
        Some((sessions_dir, workspace)) => {
            let spinner = scan_spinner(config.quiet);
            let entries = extract::extract_entries(sessions_dir, workspace, &mut log);
            spinner.finish_and_clear();
            entries
        }
        None => Vec::new(),
    };

    if config.verbose {
        for line in log.lines() {
            eprintln!("{line}");
        }
    }

    if entries.is_empty() {
        let report = export::write_diagnostics_report(&log, &config.out_dir, now)?;
        if !config.quiet {
            eprintln!(
                "No conversations exported. Diagnostics written to {}",
                report.display()
            );
        }
        return Ok(());
    }

    let path = export::write_export(&entries, &config.out_dir, config.format, now)?;
    if !config.quiet {
        eprintln!(
            "Done. {} entr{} exported to {}",
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" },
            path.display()
        );
    }
    Ok(())
}

fn scan_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        ProgressBar::hidden()
    } else {
        let s = ProgressBar::new_spinner();
        s.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        s.set_message("Scanning chat sessions...");
        s.enable_steady_tick(Duration::from_millis(80));
        s
    }
}
