//! metaext - command-line access to extension metadata and the host API.
//!
//! Documents are printed to stdout as pretty JSON; logs go to stderr.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use metaext_core::config::MatchConfig;
use metaext_core::MetaExt;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "metaext")]
#[command(about = "Read and write metaext.json files and drive the Eagle host API")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Host user-data directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    user_data_dir: Option<PathBuf>,

    /// Library to use instead of the one open in the host
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Host API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Host API token (fetched from the host when omitted)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Application config scopes
    App {
        #[command(subcommand)]
        action: ScopeAction,
    },
    /// An item's metaext.json
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// Library-wide config
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
    /// Per-folder config in the library
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },
    /// Folder and tag-group lookup in the library's metadata.json
    Metadata {
        #[command(subcommand)]
        action: MetadataAction,
    },
    /// Score recent libraries against a name
    Scores { query: String },
    /// Switch the host to a library by name
    Switch {
        query: String,
        /// Require an exact basename match
        #[arg(long)]
        exact: bool,
        /// Minimum score for fuzzy matches
        #[arg(long, default_value_t = MatchConfig::DEFAULT_THRESHOLD)]
        threshold: f64,
    },
}

#[derive(Subcommand, Debug)]
enum ScopeAction {
    /// Print a scope (created if missing)
    Get {
        #[arg(long)]
        scope: Option<String>,
    },
    /// Set one key in a scope; VALUE is JSON, or a plain string
    Set {
        #[arg(long)]
        scope: Option<String>,
        key: String,
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum ItemAction {
    Show { item_file: PathBuf },
    Set {
        item_file: PathBuf,
        key: String,
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryAction {
    Show,
    Set { key: String, value: String },
    /// Print a tag's config
    Tag { tag_id: String },
}

#[derive(Subcommand, Debug)]
enum FolderAction {
    /// Ids of folders with a config section
    List,
    Get { folder_id: String },
    Set {
        folder_id: String,
        key: String,
        value: String,
    },
    Remove { folder_id: String },
}

#[derive(Subcommand, Debug)]
enum MetadataAction {
    Folder { folder_id: String },
    TagGroup { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut builder = MetaExt::builder();
    if let Some(dir) = args.user_data_dir {
        builder = builder.user_data_dir(dir);
    }
    if let Some(library) = args.library {
        builder = builder.library_path(library);
    }
    if let Some(url) = args.api_url {
        builder = builder.api_base_url(url);
    }
    if let Some(token) = args.token {
        builder = builder.api_token(token);
    }
    let ctx = builder.auto_create_dirs(true).build()?;
    debug!("{:?}", ctx);

    let output = commands::run(&ctx, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
