//! Bounded-worker export pipeline.
//!
//! Session-file parsing fans out over a crossbeam channel. Each job carries
//! its enumeration index and results are re-sorted on collection, so entries
//! and the diagnostic trail come out identical to the sequential build.

use crate::config::ExportConfig;
use crate::diag::DiagnosticLog;
use crate::export;
use crate::extract::{self, ExportEntry};
use crate::locate::{self, Host};
use chrono::Utc;
use crossbeam_channel::{bounded, unbounded};
use eyre::Result;
use std::path::PathBuf;

/// The main entry point for the parallel export logic.
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

    let mut entries: Vec<ExportEntry> = Vec::new();
    if let Some((sessions_dir, workspace)) = &located {
        if !sessions_dir.is_dir() {
            log.record(format!(
                "Chat sessions directory does not exist: {}",
                sessions_dir.display()
            ));
        } else {
            let files = extract::list_session_files(sessions_dir);
            log.record(format!(
                "Found {} session file(s) in {}",
                files.len(),
                sessions_dir.display()
            ));

            let mut results = parse_files(files, workspace);
            results.sort_by_key(|(idx, _, _)| *idx);
            for (_, found, file_log) in results {
                entries.extend(found);
                log.extend(file_log);
            }
            log.record(format!("Total valid entries: {}", entries.len()));
        }
    }

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

/// Parse every file on a worker pool, tagging results with the original
/// enumeration index so the caller can restore file order.
fn parse_files(
    files: Vec<PathBuf>,
    workspace: &str,
) -> Vec<(usize, Vec<ExportEntry>, DiagnosticLog)> {
    let n_workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8);
    let (tx, rx) = bounded::<(usize, PathBuf)>(512);
    // Results are unbounded so workers never block behind the collector.
    let (result_tx, result_rx) = unbounded::<(usize, Vec<ExportEntry>, DiagnosticLog)>();

    std::thread::scope(|s| {
        for _ in 0..n_workers {
            let rx = rx.clone();
            let result_tx = result_tx.clone();
            s.spawn(move || {
                while let Ok((idx, path)) = rx.recv() {
                    let mut file_log = DiagnosticLog::new();
                    let found = extract::entries_from_file(&path, workspace, &mut file_log);
                    if result_tx.send((idx, found, file_log)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(rx);
        drop(result_tx);

        for job in files.into_iter().enumerate() {
            if tx.send(job).is_err() {
                break;
            }
        }
        drop(tx);

        result_rx.iter().collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn results_are_restored_to_enumeration_order() {
        let tmp = TempDir::new().unwrap();
        let mut files = Vec::new();
        for i in 0..20 {
            let path = tmp.path().join(format!("s{i}.json"));
            let json = format!(
                r#"{{"sessionId": "sess{i:04}-rest-of-id",
                    "requests": [{{"message": {{"text": "prompt number {i} padded out"}},
                                  "response": [{{"value": "response number {i} padded out"}}]}}]}}"#
            );
            fs::write(&path, json).unwrap();
            files.push(path);
        }

        let mut results = parse_files(files, "ws");
        results.sort_by_key(|(idx, _, _)| *idx);

        assert_eq!(results.len(), 20);
        for (i, (idx, entries, _)) in results.iter().enumerate() {
            assert_eq!(*idx, i);
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].content.session, format!("sess{i:04}"));
        }
    }
}
