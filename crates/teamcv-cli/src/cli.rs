use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "teamcv")]
#[command(about = "Team resume builder - manage resumes, team members and exports")]
pub struct Cli {
    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List resumes, most recently updated first
    List {
        /// Number of resumes to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show resume details
    Show {
        /// Resume ID
        id: String,
    },

    /// Delete a resume
    Delete {
        /// Resume ID
        id: String,
    },

    /// Mark a resume as the one being worked on
    Select {
        /// Resume ID; omit to clear the selection
        id: Option<String>,
    },

    /// Write every resume to a backup file
    Export {
        /// Output path (defaults to resumes-backup-<date>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Append the resumes of a backup file
    Import {
        /// Backup file
        file: PathBuf,
    },

    /// Render a resume to a document description
    Render {
        /// Resume ID
        id: String,

        /// Output path (defaults to <Full_Name>_Resume.json)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print an indented outline instead of writing JSON
        #[arg(long)]
        outline: bool,
    },

    /// Manage team members
    Team {
        #[command(subcommand)]
        command: TeamCommands,
    },

    /// Inspect or reset the onboarding tour
    Onboarding {
        #[command(subcommand)]
        command: OnboardingCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum TeamCommands {
    /// List team members
    List,

    /// Show a team member and their linked resumes
    Show {
        /// Member ID
        id: String,
    },

    /// Add a team member
    Add {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Role or job title
        #[arg(short, long)]
        role: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Avatar image URL
        #[arg(short, long)]
        avatar: Option<String>,
    },

    /// Remove a team member
    Delete {
        /// Member ID
        id: String,
    },

    /// Link a resume to a team member
    Link {
        /// Member ID
        member: String,
        /// Resume ID
        resume: String,
    },

    /// Unlink a resume from a team member
    Unlink {
        /// Member ID
        member: String,
        /// Resume ID
        resume: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum OnboardingCommands {
    /// Show whether the tour has been completed
    Status,

    /// Forget tour completion so the welcome prompt shows again
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_team_add() {
        let cli = Cli::try_parse_from([
            "teamcv", "team", "add", "--name", "Ada", "--role", "Engineer", "--email", "ada@x.io",
        ])
        .unwrap();
        match cli.command {
            Commands::Team {
                command: TeamCommands::Add { name, avatar, .. },
            } => {
                assert_eq!(name, "Ada");
                assert_eq!(avatar, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_data_dir() {
        let cli = Cli::try_parse_from(["teamcv", "list", "--data-dir", "/tmp/cv"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/cv")));
    }
}
