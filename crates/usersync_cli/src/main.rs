//! usersync CLI
//!
//! Command-line shell over the usersync engine and a JSON file store.
//!
//! # Commands
//!
//! - `sync` - Fetch every remote page and add unseen users
//! - `fetch` - Show the remote listing without storing it
//! - `list` - Filter, sort and page through local users
//! - `show` - Display one local user
//! - `add`, `edit`, `delete` - Local user maintenance
//!
//! Each invocation runs one command to completion on the main thread and
//! exits, so commands call the engine directly. `SyncWorker` is for
//! long-lived hosts that must not block while a sync runs.

mod client;
mod commands;

use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use usersync_engine::{SortKey, ViewQuery};
use usersync_protocol::{NewUser, UserPatch};

/// Keep a local user directory in sync with a remote user API.
#[derive(Parser)]
#[command(name = "usersync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the local user store
    #[arg(global = true, short, long, default_value = "users.json")]
    path: PathBuf,

    /// Base URL of the remote user API
    #[arg(global = true, short, long)]
    base_url: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every remote page and add users not yet stored
    Sync {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Fetch every remote page without storing anything
    Fetch {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List local users
    List {
        /// Name tokens that must all appear in the full name
        #[arg(short, long, default_value = "")]
        search: String,

        /// Sort key (name, id, date-added)
        #[arg(long, default_value = "id")]
        sort: SortKey,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,

        /// Users per page
        #[arg(long, default_value = "6")]
        page_size: NonZeroUsize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show one local user
    Show {
        /// User id
        id: u64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Add a local user
    Add {
        /// Given name
        #[arg(long)]
        first_name: String,

        /// Family name
        #[arg(long)]
        last_name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Avatar URI or path
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Edit fields of a local user
    Edit {
        /// User id
        id: u64,

        /// New given name
        #[arg(long)]
        first_name: Option<String>,

        /// New family name
        #[arg(long)]
        last_name: Option<String>,

        /// New email address
        #[arg(long)]
        email: Option<String>,

        /// New avatar URI or path
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Delete a local user
    Delete {
        /// User id
        id: u64,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let open = || commands::open_engine(&cli.path, cli.base_url.as_deref());

    match cli.command {
        Commands::Sync { format } => commands::sync::run(&open()?, &format)?,
        Commands::Fetch { format } => commands::fetch::run(&open()?, &format)?,
        Commands::List {
            search,
            sort,
            page,
            page_size,
            format,
        } => {
            let query = ViewQuery::new()
                .with_search(search)
                .with_sort(sort)
                .with_page(page)
                .with_page_size(page_size);
            commands::list::run(&open()?, &query, &format)?;
        }
        Commands::Show { id, format } => commands::show::run(&open()?, id, &format)?,
        Commands::Add {
            first_name,
            last_name,
            email,
            avatar,
        } => {
            let mut new_user = NewUser::new(email, first_name, last_name);
            new_user.avatar = avatar;
            commands::edit::add(&open()?, new_user)?;
        }
        Commands::Edit {
            id,
            first_name,
            last_name,
            email,
            avatar,
        } => {
            let patch = UserPatch {
                email,
                first_name,
                last_name,
                avatar,
            };
            commands::edit::edit(&open()?, id, patch)?;
        }
        Commands::Delete { id } => commands::edit::delete(&open()?, id)?,
        Commands::Version => {
            println!("usersync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("usersync engine default API {}", usersync_engine::DEFAULT_BASE_URL);
        }
    }

    Ok(())
}
