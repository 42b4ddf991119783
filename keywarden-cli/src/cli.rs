//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keywarden_core::{EntryField, ItemId};

/// `Keywarden` command-line interface for password stores
#[derive(Parser)]
#[command(name = "keywarden")]
#[command(author, version, about = "Keywarden password store command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "KEYWARDEN_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// The store a command operates on and how to unlock it
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Path to the store file
    pub file: PathBuf,

    /// Key file combined with the password
    #[arg(short, long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,

    /// Store password; prompted for when absent
    #[arg(long, env = "KEYWARDEN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Save a typed password in the system keyring once it opens the store
    #[arg(long)]
    pub remember: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new empty store
    #[command(about = "Create a new password store")]
    Init {
        #[command(flatten)]
        store: StoreArgs,

        /// Display name of the store (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List the contents of a group
    #[command(about = "List groups and entries of a store")]
    Ls {
        #[command(flatten)]
        store: StoreArgs,

        /// Group to list (defaults to the root group)
        #[arg(short, long, value_name = "ID")]
        group: Option<ItemId>,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Show an entry
    #[command(about = "Show the fields of an entry, or print a single field")]
    Show {
        #[command(flatten)]
        store: StoreArgs,

        /// Entry to show
        #[arg(value_name = "ENTRY_ID")]
        entry: ItemId,

        /// Print only this field, unmasked
        #[arg(short, long, value_enum)]
        field: Option<FieldArg>,
    },

    /// Add an entry
    #[command(about = "Add an entry to a store")]
    AddEntry {
        #[command(flatten)]
        store: StoreArgs,

        /// Entry title
        #[arg(short, long)]
        title: String,

        /// Username
        #[arg(short, long)]
        username: Option<String>,

        /// URL
        #[arg(long)]
        url: Option<String>,

        /// Notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Entry password; prompted for when absent
        #[arg(long, value_name = "PASSWORD")]
        entry_password: Option<String>,

        /// Group to add to (defaults to the root group)
        #[arg(short, long, value_name = "ID")]
        group: Option<ItemId>,
    },

    /// Add a group
    #[command(about = "Add a group to a store")]
    AddGroup {
        #[command(flatten)]
        store: StoreArgs,

        /// Group name
        name: String,

        /// Notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Group to add to (defaults to the root group)
        #[arg(short, long, value_name = "ID")]
        group: Option<ItemId>,
    },

    /// Save the store password in the system keyring
    #[command(about = "Remember the password of a store for automatic unlock")]
    Remember {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Remove the saved store password
    #[command(about = "Forget the saved password of a store")]
    Forget {
        /// Path to the store file
        file: PathBuf,
    },

    /// Show the state of the credential vault
    #[command(about = "Show credential vault and presence verification status")]
    VaultStatus,
}

/// Entry field selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldArg {
    /// Entry title
    Title,
    /// Login name
    Username,
    /// Password
    Password,
    /// Web address
    Url,
    /// Notes
    Notes,
}

impl From<FieldArg> for EntryField {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::Title => Self::Title,
            FieldArg::Username => Self::UserName,
            FieldArg::Password => Self::Password,
            FieldArg::Url => Self::Url,
            FieldArg::Notes => Self::Notes,
        }
    }
}

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON array
    Json,
}
