//! # copilot-chat-export
//!
//! A CLI tool that exports [GitHub Copilot](https://github.com/features/copilot)
//! chat conversations from VS Code's on-disk workspace storage to JSON or CSV.
//!
//! ## What it does
//!
//! The Copilot Chat extension records every conversation as a JSON session
//! file under VS Code's per-workspace storage area
//! (`.../Code/User/workspaceStorage/<hash>/chatSessions/`). This tool finds
//! the storage entry belonging to the active workspace, parses the session
//! files, strips markdown noise from the prompts and responses, and writes
//! the surviving request/response pairs to a timestamped export file.
//!
//! Session files are only ever **read** — your data is never modified.
//!
//! ## Workspace matching
//!
//! VS Code names storage entries with an opaque hash. Rather than reproduce
//! the hashing scheme, the tool picks the first entry with chat activity in
//! the last 30 days. When nothing matches, it writes a Markdown diagnostics
//! report explaining every decision it made instead of an export file.
//!
//! ## Usage
//!
//! ```sh
//! # Export the active workspace's conversations as JSON
//! copilot-chat-export ~/notes/copilot
//!
//! # CSV, with an explicit storage location
//! copilot-chat-export ~/notes/copilot --format csv --storage-root /path/to/workspaceStorage
//! ```
//!
//! Preferences can be persisted in `~/.config/copilot-chat-export/config.toml`.
//!
//! ## Compatibility
//!
//! Tracks the Copilot Chat extension's internal (undocumented) session
//! schema. Fields beyond the session id are treated as optional, and a file
//! that fails to parse is skipped with a diagnostic rather than failing the
//! run.

pub mod config;
pub mod diag;
pub mod export;
pub mod extract;
pub mod locate;
pub mod normalize;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod sequential;
pub mod session;
