use clap::Parser;
use copilot_chat_export::config::{self, ExportConfig, ExportFormat};
use copilot_chat_export::locate::Host;
use eyre::Result;
use std::path::PathBuf;

/// Export GitHub Copilot chat history from VS Code workspace storage.
/// Only reads the session files the Copilot Chat extension leaves on disk.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to write the export into.
    /// Defaults to <workspace>/copilot_exports if not set in config.
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Workspace root used to anchor storage matching.
    /// Defaults to the current directory.
    #[arg(long, value_name = "PATH")]
    workspace: Option<PathBuf>,

    /// Path to VS Code's workspaceStorage directory.
    /// Auto-detected per platform if omitted.
    #[arg(long, value_name = "PATH")]
    storage_root: Option<PathBuf>,

    /// Path to a chatSessions directory; skips workspace detection.
    #[arg(long, value_name = "PATH")]
    sessions_dir: Option<PathBuf>,

    /// Export format.
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/copilot-chat-export/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the full decision trail after the run.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress standard output (progress and summaries).
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load config file (CLI path > default path)
    let file_cfg = config::load_file_config(cli.config.as_deref())?;

    // 2. Detect the host (workspace flag > current directory)
    let host = Host::detect(cli.workspace);

    // 3. Resolve output_dir (CLI > Config > next to the workspace)
    let out_dir = cli.output_dir.or(file_cfg.output_dir).unwrap_or_else(|| {
        host.workspace_root
            .clone()
            .unwrap_or_else(|| host.home.clone())
            .join("copilot_exports")
    });

    // 4. Resolve format (CLI > Config > JSON)
    let format = cli.format.or(file_cfg.format).unwrap_or(ExportFormat::Json);

    // 5. Build the Export Config
    let config = ExportConfig {
        out_dir,
        format,
        storage_root: cli.storage_root.or(file_cfg.storage_root),
        sessions_dir: cli.sessions_dir,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    // 6. Run the Business Logic
    #[cfg(feature = "parallel")]
    return copilot_chat_export::parallel::execute(&config, &host);

    #[cfg(not(feature = "parallel"))]
    copilot_chat_export::sequential::execute(&config, &host)
}
