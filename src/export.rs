//! Writing export files and diagnostic reports.
//!
//! Output is staged through a temp file in the target directory and renamed
//! into place, so a failed run never leaves a half-written export behind.

use crate::config::ExportFormat;
use crate::diag::DiagnosticLog;
use crate::extract::ExportEntry;
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const CSV_HEADER: &str = "Timestamp,File,Language,Prompt,Response";

/// Suggested next steps appended to every diagnostic report.
const REMEDIES: &[&str] = &[
    "Run from the workspace whose conversations you want to export, or pass --workspace",
    "Use Copilot Chat in that workspace first; only storage entries modified in the last 30 days are matched",
    "Pass --storage-root if VS Code keeps its data somewhere non-standard (portable mode, Insiders, remote)",
    "Pass --sessions-dir to point directly at a chatSessions directory and skip workspace detection",
];

/// Filesystem-safe ISO-8601-like timestamp: colons and periods become
/// hyphens, e.g. `2025-09-24T10-45-39`.
fn timestamp_stem(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// Write all entries to `<out_dir>/copilot_export_<timestamp>.<ext>` and
/// return the path. Directory creation and write failures are fatal to the
/// run.
pub fn write_export(
    entries: &[ExportEntry],
    out_dir: &Path,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let ext = match format {
        ExportFormat::Json => "json",
        ExportFormat::Csv => "csv",
    };
    let path = out_dir.join(format!("copilot_export_{}.{ext}", timestamp_stem(now)));

    let mut staging =
        NamedTempFile::new_in(out_dir).wrap_err("Failed to create staging file")?;
    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut staging, entries)
                .wrap_err("Failed to serialize entries")?;
            staging.write_all(b"\n").wrap_err("Failed to write export")?;
        }
        ExportFormat::Csv => {
            write_csv(&mut staging, entries).wrap_err("Failed to write CSV rows")?;
        }
    }
    staging.flush().wrap_err("Failed to flush export")?;
    staging
        .persist(&path)
        .map_err(|e| e.error)
        .wrap_err_with(|| format!("Failed to write export: {}", path.display()))?;
    Ok(path)
}

fn write_csv<W: Write>(writer: &mut W, entries: &[ExportEntry]) -> std::io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for entry in entries {
        let fields = [
            entry.content.date.as_str(),
            entry.content.session.as_str(),
            "",
            entry.content.human.as_str(),
            entry.content.copilot.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        writeln!(writer, "{}", row.join(","))?;
    }
    Ok(())
}

/// Double-quote a field, doubling any embedded quotes.
fn csv_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write the decision trail as a Markdown report, used when a run produced
/// zero entries. Returns the report path.
pub fn write_diagnostics_report(
    log: &DiagnosticLog,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .wrap_err_with(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let path = out_dir.join(format!(
        "copilot_export_diagnostics_{}.md",
        timestamp_stem(now)
    ));

    let mut report = String::from(
        "# Copilot export diagnostics\n\n\
         No conversations were exported. The run made the following decisions:\n\n",
    );
    for line in log.lines() {
        report.push_str("- ");
        report.push_str(line);
        report.push('\n');
    }
    report.push_str("\n## Suggestions\n\n");
    for remedy in REMEDIES {
        report.push_str("- ");
        report.push_str(remedy);
        report.push('\n');
    }

    let mut staging =
        NamedTempFile::new_in(out_dir).wrap_err("Failed to create staging file")?;
    staging
        .write_all(report.as_bytes())
        .wrap_err("Failed to write diagnostics report")?;
    staging
        .persist(&path)
        .map_err(|e| e.error)
        .wrap_err_with(|| format!("Failed to write diagnostics report: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::EntryContent;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry(human: &str, copilot: &str) -> ExportEntry {
        ExportEntry {
            key: "conversation-1".to_string(),
            content: EntryContent {
                session: "01234567".to_string(),
                date: "9/24/2025".to_string(),
                human: human.to_string(),
                copilot: copilot.to_string(),
            },
            workspace: "hash1234".to_string(),
            kind: "conversation".to_string(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 24, 10, 45, 39).unwrap()
    }

    #[test]
    fn json_export_round_trips() {
        let tmp = TempDir::new().unwrap();
        let entries = vec![entry("a question worth asking", "a useful answer")];
        let path =
            write_export(&entries, tmp.path(), ExportFormat::Json, fixed_now()).unwrap();

        assert_eq!(
            path.file_name().unwrap(),
            "copilot_export_2025-09-24T10-45-39.json"
        );
        let raw = fs::read_to_string(&path).unwrap();
        let parsed: Vec<ExportEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn json_export_uses_type_field_name() {
        let tmp = TempDir::new().unwrap();
        let path = write_export(
            &[entry("a question worth asking", "a useful answer")],
            tmp.path(),
            ExportFormat::Json,
            fixed_now(),
        )
        .unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"type\": \"conversation\""));
        assert!(!raw.contains("\"kind\""));
    }

    #[test]
    fn csv_export_quotes_every_field_and_doubles_quotes() {
        let tmp = TempDir::new().unwrap();
        let entries = vec![entry("say \"hello\", please", "line one\nline two")];
        let path =
            write_export(&entries, tmp.path(), ExportFormat::Csv, fixed_now()).unwrap();

        assert_eq!(
            path.file_name().unwrap(),
            "copilot_export_2025-09-24T10-45-39.csv"
        );
        let raw = fs::read_to_string(&path).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let body = &raw[CSV_HEADER.len() + 1..];
        assert!(body.starts_with("\"9/24/2025\",\"01234567\",\"\",\"say \"\"hello\"\", please\","));
        assert!(body.contains("line one\nline two"));
    }

    #[test]
    fn export_leaves_no_staging_file_behind() {
        let tmp = TempDir::new().unwrap();
        write_export(
            &[entry("a question worth asking", "a useful answer")],
            tmp.path(),
            ExportFormat::Json,
            fixed_now(),
        )
        .unwrap();
        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["copilot_export_2025-09-24T10-45-39.json"]);
    }

    #[test]
    fn diagnostics_report_lists_log_lines_and_remedies() {
        let tmp = TempDir::new().unwrap();
        let mut log = DiagnosticLog::new();
        log.record("Chat sessions directory does not exist: /tmp/nowhere");
        let path = write_diagnostics_report(&log, tmp.path(), fixed_now()).unwrap();

        assert_eq!(
            path.file_name().unwrap(),
            "copilot_export_diagnostics_2025-09-24T10-45-39.md"
        );
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("- Chat sessions directory does not exist: /tmp/nowhere"));
        assert!(raw.contains("## Suggestions"));
        assert!(raw.contains("--storage-root"));
    }
}
