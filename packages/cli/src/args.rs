use std::path::PathBuf;

use clap::{Parser, Subcommand};

use drivefs_http::DriveConfig;
use drivefs_tree_store::{PermissionRole, PermissionType, StoreConfig};

/// drivefs - a Google Drive folder as a flat key-value store
#[derive(Parser, Debug)]
#[command(name = "drivefs")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder link or folder id used as the root
    #[arg(long, env = "DRIVEFS_FOLDER", global = true)]
    pub folder: Option<String>,

    /// OAuth credentials file
    #[arg(
        long,
        env = "DRIVEFS_CREDENTIALS",
        default_value = "credentials.json",
        global = true
    )]
    pub credentials: PathBuf,

    /// Recursion depth below the root (unlimited when omitted)
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// Include names starting with '.'
    #[arg(long, global = true)]
    pub include_hidden: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all keys
    Ls,

    /// Print the content at a key
    Cat { path: String },

    /// Upload a local file to a key
    Put { path: String, file: PathBuf },

    /// Delete a key
    Rm { path: String },

    /// Share a key and print its link
    Share {
        path: String,

        #[arg(long = "type", default_value = "anyone")]
        permission_type: PermissionType,

        #[arg(long, default_value = "reader")]
        role: PermissionRole,
    },

    /// Download a publicly shared file
    Get {
        url: String,

        /// Write the content to this path
        #[arg(long, conflicts_with = "temp")]
        out: Option<PathBuf>,

        /// Write the content to a temporary file and print its path
        #[arg(long)]
        temp: bool,

        /// Cache downloads, in DIR or the user cache directory
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        cache: Option<Option<PathBuf>>,
    },
}

impl Args {
    /// Store configuration for commands that need the API.
    pub fn drive_config(&self) -> Option<DriveConfig> {
        let folder = self.folder.as_ref()?;
        let store = StoreConfig::new(folder.as_str())
            .with_max_depth(self.max_depth)
            .with_hidden(self.include_hidden);
        Some(DriveConfig::new(store).with_credentials_file(&self.credentials))
    }
}
