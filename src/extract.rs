//! Reading session files and distilling export entries.
//!
//! Each file is handled independently: a file that cannot be read or parsed
//! is logged and skipped, never fatal to the run.

use crate::diag::DiagnosticLog;
use crate::normalize::normalize;
use crate::session::ChatSession;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Cleaned texts at or below this many characters carry no useful content;
/// the pair is dropped without an entry.
const MIN_TEXT_LEN: usize = 10;

/// Placeholder when a request has no usable assistant output.
const NO_RESPONSE: &str = "No response";

/// One exported request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    /// Per-session ordinal label, `conversation-{n}` with n starting at 1.
    pub key: String,
    pub content: EntryContent,
    /// Directory name of the storage entry the session came from.
    pub workspace: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryContent {
    /// First 8 characters of the session id.
    pub session: String,
    /// Calendar date the session was created, `M/D/YYYY`.
    pub date: String,
    pub human: String,
    pub copilot: String,
}

/// `.json` files directly under `dir`, in `read_dir` enumeration order.
/// Deliberately unsorted: candidate selection and entry output both follow
/// enumeration order.
pub fn list_session_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json") && p.is_file())
        .collect()
}

/// Extract entries from every session file under `sessions_dir`.
///
/// A missing directory and the final entry count are both recorded so an
/// empty run can explain itself.
pub fn extract_entries(
    sessions_dir: &Path,
    workspace: &str,
    log: &mut DiagnosticLog,
) -> Vec<ExportEntry> {
    if !sessions_dir.is_dir() {
        log.record(format!(
            "Chat sessions directory does not exist: {}",
            sessions_dir.display()
        ));
        return Vec::new();
    }

    let files = list_session_files(sessions_dir);
    log.record(format!(
        "Found {} session file(s) in {}",
        files.len(),
        sessions_dir.display()
    ));

    let mut entries = Vec::new();
    for file in &files {
        entries.extend(entries_from_file(file, workspace, log));
    }
    log.record(format!("Total valid entries: {}", entries.len()));
    entries
}

/// Extract entries from a single session file.
///
/// Read and parse failures are recorded and yield an empty list.
pub fn entries_from_file(
    path: &Path,
    workspace: &str,
    log: &mut DiagnosticLog,
) -> Vec<ExportEntry> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            log.record(format!("Failed to read {file_name}: {err}"));
            return Vec::new();
        }
    };
    let session: ChatSession = match serde_json::from_str(&raw) {
        Ok(session) => session,
        Err(err) => {
            log.record(format!("Failed to parse {file_name}: {err}"));
            return Vec::new();
        }
    };
    if session.requests.is_empty() {
        log.record(format!("{file_name}: no requests recorded"));
        return Vec::new();
    }

    let session_prefix: String = session.session_id.chars().take(8).collect();
    let date = session
        .creation_date
        .as_ref()
        .map_or_else(|| "unknown date".to_string(), |d| d.display_date());

    let mut entries = Vec::new();
    for (i, request) in session.requests.iter().enumerate() {
        let Some(text) = request.message.as_ref().and_then(|m| m.text.as_deref()) else {
            continue;
        };
        let human = normalize(text);
        let copilot = match request.response.joined_parts() {
            Some(joined) => normalize(&joined),
            None => NO_RESPONSE.to_string(),
        };
        if human.chars().count() <= MIN_TEXT_LEN || copilot.chars().count() <= MIN_TEXT_LEN {
            continue;
        }
        entries.push(ExportEntry {
            key: format!("conversation-{}", i + 1),
            content: EntryContent {
                session: session_prefix.clone(),
                date: date.clone(),
                human,
                copilot,
            },
            workspace: workspace.to_string(),
            kind: "conversation".to_string(),
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sessions_dir_with(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, json) in files {
            fs::write(tmp.path().join(name), json).unwrap();
        }
        tmp
    }

    const FULL_SESSION: &str = r#"{
        "sessionId": "0123456789abcdef",
        "creationDate": "2025-01-01T00:00:00Z",
        "requests": [{
            "message": {"text": "please explain this"},
            "response": [{"value": "a short answer"}]
        }]
    }"#;

    #[test]
    fn extracts_one_entry_from_full_session() {
        let tmp = sessions_dir_with(&[("a.json", FULL_SESSION)]);
        let mut log = DiagnosticLog::new();
        let entries = extract_entries(tmp.path(), "hash1234", &mut log);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.key, "conversation-1");
        assert_eq!(entry.content.session, "01234567");
        assert_eq!(entry.content.date, "1/1/2025");
        assert_eq!(entry.content.human, "please explain this");
        assert_eq!(entry.content.copilot, "a short answer");
        assert_eq!(entry.workspace, "hash1234");
        assert_eq!(entry.kind, "conversation");
        assert!(log.lines().iter().any(|l| l == "Total valid entries: 1"));
    }

    #[test]
    fn malformed_file_is_skipped_not_fatal() {
        let tmp = sessions_dir_with(&[("bad.json", "{ not json"), ("good.json", FULL_SESSION)]);
        let mut log = DiagnosticLog::new();
        let entries = extract_entries(tmp.path(), "ws", &mut log);

        assert_eq!(entries.len(), 1);
        assert!(log.lines().iter().any(|l| l.starts_with("Failed to parse bad.json")));
    }

    #[test]
    fn missing_directory_is_logged() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("chatSessions");
        let mut log = DiagnosticLog::new();
        let entries = extract_entries(&missing, "ws", &mut log);

        assert!(entries.is_empty());
        assert!(
            log.lines()
                .iter()
                .any(|l| l.contains("Chat sessions directory does not exist"))
        );
    }

    #[test]
    fn short_texts_produce_no_entry() {
        let json = r#"{
            "sessionId": "0123456789abcdef",
            "requests": [
                {"message": {"text": "short"}, "response": [{"value": "long enough answer"}]},
                {"message": {"text": "long enough prompt"}, "response": [{"value": "nope"}]}
            ]
        }"#;
        let tmp = sessions_dir_with(&[("s.json", json)]);
        let mut log = DiagnosticLog::new();
        let entries = extract_entries(tmp.path(), "ws", &mut log);
        assert!(entries.is_empty());
    }

    #[test]
    fn exactly_ten_characters_is_still_too_short() {
        let json = r#"{
            "sessionId": "0123456789abcdef",
            "requests": [{
                "message": {"text": "ten chars."},
                "response": [{"value": "a response long enough to pass"}]
            }]
        }"#;
        let tmp = sessions_dir_with(&[("s.json", json)]);
        let mut log = DiagnosticLog::new();
        assert!(extract_entries(tmp.path(), "ws", &mut log).is_empty());
    }

    #[test]
    fn missing_response_becomes_placeholder_entry() {
        let json = r#"{
            "sessionId": "0123456789abcdef",
            "requests": [{"message": {"text": "a prompt with no reply"}}]
        }"#;
        let tmp = sessions_dir_with(&[("s.json", json)]);
        let mut log = DiagnosticLog::new();
        let entries = extract_entries(tmp.path(), "ws", &mut log);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content.copilot, "No response");
    }

    #[test]
    fn entry_keys_follow_request_ordinals_past_skipped_requests() {
        let json = r#"{
            "sessionId": "0123456789abcdef",
            "requests": [
                {"response": [{"value": "reply without a message"}]},
                {"message": {"text": "the second request"}, "response": [{"value": "its long response"}]}
            ]
        }"#;
        let tmp = sessions_dir_with(&[("s.json", json)]);
        let mut log = DiagnosticLog::new();
        let entries = extract_entries(tmp.path(), "ws", &mut log);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "conversation-2");
    }

    #[test]
    fn markup_is_stripped_from_both_sides() {
        let json = r#"{
            "sessionId": "0123456789abcdef",
            "requests": [{
                "message": {"text": "what does `run()` **really** do"},
                "response": [{"value": "```rust\nit runs the thing\n```"}]
            }]
        }"#;
        let tmp = sessions_dir_with(&[("s.json", json)]);
        let mut log = DiagnosticLog::new();
        let entries = extract_entries(tmp.path(), "ws", &mut log);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content.human, "what does run() really do");
        assert_eq!(entries[0].content.copilot, "it runs the thing");
    }

    #[test]
    fn non_json_files_are_not_listed() {
        let tmp = sessions_dir_with(&[("a.json", FULL_SESSION), ("notes.txt", "x")]);
        assert_eq!(list_session_files(tmp.path()).len(), 1);
    }
}
