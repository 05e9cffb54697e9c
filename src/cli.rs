use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save a web page and extract its text
    Save {
        /// A url
        #[clap(allow_hyphen_values = true)]
        url: String,

        /// Your note about the page.
        /// Defaults to the page's meta description.
        #[clap(short, long)]
        description: Option<String>,

        /// Use this title instead of the page's
        #[clap(short, long)]
        title: Option<String>,

        /// Don't fetch the page at all
        #[clap(long, default_value = "false")]
        no_extract: bool,
    },
    /// Search saved links by relevance
    Search {
        /// Search terms
        #[clap(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Show at most this many results
        #[clap(short, long)]
        limit: Option<usize>,

        /// Print results as json
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// List saved links, newest first
    List {
        /// Only links not marked as read
        #[clap(short, long, default_value = "false")]
        unread: bool,

        /// Print results as json
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// Show a random saved link
    Random {
        /// Print result as json
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// Mark a link as read
    Read {
        #[clap(allow_hyphen_values = true)]
        url: String,

        /// Mark as unread instead
        #[clap(long, default_value = "false")]
        unread: bool,
    },
    /// Delete a saved link
    Delete {
        #[clap(allow_hyphen_values = true)]
        url: String,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
    /// Export all links as json
    Export {
        /// Output file
        #[clap(short, long, default_value = "dex_saved_links.json")]
        output: PathBuf,
    },
    /// Replace all links with the contents of an export
    Import {
        input: PathBuf,

        /// Auto confirm
        #[clap(short, long, default_value = "false")]
        yes: bool,
    },
    /// Read a page's title and description without saving it
    Refresh {
        #[clap(allow_hyphen_values = true)]
        url: String,
    },
}
