//! Command line surface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskboard_core::{SyncMode, TaskStatus};

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Assign and track tasks per user")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// SQLite database file (`:memory:` for a throwaway database).
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[arg(long, global = true, value_parser = parse_sync_mode)]
    pub sync_mode: Option<SyncMode>,

    /// Print machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an administrator account.
    Signup(Credentials),
    /// Sign in and start a 14-day session.
    Login(Credentials),
    /// Drop the stored session.
    Logout,
    /// Add a user record to the board.
    SeedUser {
        #[arg(long)]
        name: String,
    },
    /// Show the active list, or completed/deleted records with `--history`.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        history: bool,
    },
    /// Assign a task to a user.
    Assign {
        #[arg(long)]
        user: String,
        #[arg(long)]
        task: String,
        #[arg(long, default_value = "Pending", value_parser = parse_status)]
        status: TaskStatus,
    },
    /// Edit the task of a user; unspecified fields keep their value.
    Edit {
        #[arg(long)]
        user: String,
        #[arg(long)]
        task: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
    /// Clear a user's task and mark it completed.
    Complete {
        #[arg(long)]
        user: String,
    },
    /// Soft-delete a user's task.
    Delete {
        #[arg(long)]
        user: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct Credentials {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

fn parse_sync_mode(value: &str) -> Result<SyncMode, String> {
    value.parse()
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    let normalized = value.trim().to_ascii_lowercase().replace(['-', '_'], " ");
    TaskStatus::SELECTABLE
        .into_iter()
        .find(|status| status.as_str().to_ascii_lowercase() == normalized)
        .ok_or_else(|| {
            format!("unsupported status `{value}`; expected pending|in-progress|completed")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_parser_accepts_loose_spellings() {
        assert_eq!(parse_status("in-progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(parse_status("In Progress").unwrap(), TaskStatus::InProgress);
        assert_eq!(parse_status("COMPLETED").unwrap(), TaskStatus::Completed);
        assert!(parse_status("deleted").is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "taskboard",
            "list",
            "--history",
            "--sync-mode",
            "pull",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.global.sync_mode, Some(SyncMode::Pull));
        assert!(cli.global.json);
        assert!(matches!(cli.command, Command::List { history: true, .. }));
    }
}
