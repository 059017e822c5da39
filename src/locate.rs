//! Locating the active workspace's chat-session storage.
//!
//! VS Code keys workspace storage by an opaque hash, and the mapping from
//! workspace path to hash is not reproduced here. The locator instead scans
//! every candidate directory and takes the first one with recent session
//! activity. That approximation is part of the tool's observable behavior;
//! see [`select_candidate`] before "fixing" it.

use crate::diag::DiagnosticLog;
use crate::extract::list_session_files;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectory of a workspace-storage entry that holds session files.
const SESSION_CONTAINER: &str = "chatSessions";

/// How far back a session file's mtime may lie for its candidate to still
/// count as the active workspace.
const RECENT_WINDOW_DAYS: i64 = 30;

/// Host OS family, as far as storage layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Map `std::env::consts::OS` onto a storage layout. Unrecognized
    /// platforms get the Linux layout.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            _ => Self::Linux,
        }
    }
}

/// Everything the pipeline reads from the host environment. The binary fills
/// this from the real machine; tests construct it directly over temp dirs.
#[derive(Debug, Clone)]
pub struct Host {
    pub workspace_root: Option<PathBuf>,
    pub home: PathBuf,
    pub platform: Platform,
}

impl Host {
    /// Detect the real host. The active workspace defaults to the current
    /// directory when no override is given.
    pub fn detect(workspace_override: Option<PathBuf>) -> Self {
        Host {
            workspace_root: workspace_override.or_else(|| std::env::current_dir().ok()),
            home: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            platform: Platform::from_os(std::env::consts::OS),
        }
    }
}

/// Platform-specific root of VS Code's per-workspace storage. Pure; no I/O.
pub fn storage_root(platform: Platform, home: &Path) -> PathBuf {
    match platform {
        Platform::Windows => home.join("AppData/Roaming/Code/User/workspaceStorage"),
        Platform::MacOs => home.join("Library/Application Support/Code/User/workspaceStorage"),
        Platform::Linux => home.join(".config/Code/User/workspaceStorage"),
    }
}

/// One workspace-hash directory under the storage root, scored for selection.
/// Enumerated, examined, and discarded within a single locator call.
#[derive(Debug)]
pub struct Candidate {
    pub name: String,
    pub sessions_dir: PathBuf,
    pub file_count: usize,
    pub newest_mtime: Option<DateTime<Utc>>,
}

/// First candidate, in enumeration order, whose newest session file was
/// modified within the last [`RECENT_WINDOW_DAYS`] days.
///
/// Not a relevance match: ties go to whichever directory the filesystem
/// listed first, even if it belongs to a different workspace.
pub fn select_candidate(candidates: &[Candidate], now: DateTime<Utc>) -> Option<&Candidate> {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    candidates
        .iter()
        .find(|c| c.newest_mtime.is_some_and(|t| t > cutoff))
}

/// Resolve the sessions directory and workspace identifier for this run.
///
/// An explicit `--sessions-dir` bypasses the locator entirely; the workspace
/// identifier then falls back to the directory's parent name.
pub fn resolve_sessions_dir(
    sessions_dir_override: Option<&Path>,
    host: &Host,
    root_override: Option<&Path>,
    now: DateTime<Utc>,
    log: &mut DiagnosticLog,
) -> Option<(PathBuf, String)> {
    if let Some(dir) = sessions_dir_override {
        log.record(format!("Using sessions directory override: {}", dir.display()));
        let workspace = dir
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        return Some((dir.to_path_buf(), workspace));
    }
    locate_workspace_sessions(host, root_override, now, log)
}

/// Find the `chatSessions` directory belonging to the active workspace.
///
/// Returns the selected candidate's sessions path and directory name. Every
/// decision is appended to `log`, whether or not the lookup succeeds, so the
/// caller can report why nothing was found.
pub fn locate_workspace_sessions(
    host: &Host,
    root_override: Option<&Path>,
    now: DateTime<Utc>,
    log: &mut DiagnosticLog,
) -> Option<(PathBuf, String)> {
    let root = match root_override {
        Some(p) => {
            log.record(format!("Using storage root override: {}", p.display()));
            p.to_path_buf()
        }
        None => {
            let root = storage_root(host.platform, &host.home);
            log.record(format!("Workspace storage root: {}", root.display()));
            root
        }
    };

    match &host.workspace_root {
        Some(ws) => log.record(format!("Active workspace: {}", ws.display())),
        None => {
            log.record("No workspace open");
            return None;
        }
    }

    if !root.is_dir() {
        log.record(format!(
            "Workspace storage root does not exist: {}",
            root.display()
        ));
        return None;
    }

    let candidates = scan_candidates(&root, log);
    match select_candidate(&candidates, now) {
        Some(c) => {
            log.record(format!(
                "Selected candidate {}: newest of {} session file(s) modified within the last {} days",
                c.name, c.file_count, RECENT_WINDOW_DAYS
            ));
            Some((c.sessions_dir.clone(), c.name.clone()))
        }
        None => {
            log.record(format!(
                "No candidate with recent sessions among {} examined",
                candidates.len()
            ));
            None
        }
    }
}

/// Enumerate storage subdirectories that contain at least one session file,
/// in `read_dir` order.
fn scan_candidates(root: &Path, log: &mut DiagnosticLog) -> Vec<Candidate> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            log.record(format!(
                "Could not list storage root {}: {}",
                root.display(),
                err
            ));
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let sessions_dir = path.join(SESSION_CONTAINER);
        if !sessions_dir.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let files = list_session_files(&sessions_dir);
        if files.is_empty() {
            log.record(format!("Candidate {name}: no session files"));
            continue;
        }
        let newest_mtime = files
            .iter()
            .filter_map(|f| fs::metadata(f).ok())
            .filter_map(|m| m.modified().ok())
            .map(DateTime::<Utc>::from)
            .max();
        log.record(format!(
            "Candidate {name}: {} session file(s), last modified {}",
            files.len(),
            newest_mtime.map_or_else(|| "unknown".to_string(), |t| t.to_rfc3339()),
        ));
        candidates.push(Candidate {
            name,
            sessions_dir,
            file_count: files.len(),
            newest_mtime,
        });
    }
    candidates
}
