use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `Skinsight` - structured aesthetic skin assessment from photos.
#[derive(Parser, Debug)]
#[command(name = "skinsight")]
#[command(version = "0.1.0")]
#[command(about = "Score skin photos on nine aesthetic parameters.", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of ~/.skinsight/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze images and append the result to a patient's history
    Analyze {
        /// Account name; also the scope holding the patient records
        #[arg(short, long)]
        user: String,

        /// Account password (falls back to SKINSIGHT_PASSWORD)
        #[arg(long)]
        password: Option<String>,

        /// Patient id in the user's records
        #[arg(short, long)]
        patient: String,

        /// Body zone shown in the photos
        #[arg(short, long)]
        zone: Option<String>,

        /// Attempt budget (1 - 10); defaults to `analysis.max_attempts`
        #[arg(short, long)]
        attempts: Option<u32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Image files, in order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Print a patient's analysis history
    History {
        #[arg(short, long)]
        user: String,

        /// Account password (falls back to SKINSIGHT_PASSWORD)
        #[arg(long)]
        password: Option<String>,

        #[arg(short, long)]
        patient: String,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        user_command: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user credential file
    Add {
        username: String,

        /// Password (falls back to SKINSIGHT_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
}
