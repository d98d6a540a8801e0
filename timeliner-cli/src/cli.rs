use std::path::PathBuf;

use clap::{Parser, Subcommand};
use timeliner_api::BlockPosition;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "timeliner")]
#[command(about = "Edit timeline documents: rows of columns of styled text blocks")]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend base URL (overrides TIMELINER_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token for the backend (overrides TIMELINER_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Directory of the local store (overrides TIMELINER_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Work on the local document even when a backend is configured
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the documents on the backend
    List,

    /// Print a document as an outline
    Show {
        /// Document to show instead of the current one
        #[arg(long)]
        id: Option<String>,

        /// Print the raw grid JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an empty document and make it current
    New { name: String },

    /// Make a backend document current
    Open { id: String },

    /// Rename the current document
    Rename { name: String },

    /// Delete the current document (offline: reset it)
    Delete,

    /// Import an exported grid file as a new document
    Import { file: PathBuf },

    /// Write the current grid as a .cbo file
    Export {
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },

    /// Write a zip of per-column outlines
    ExportOutlines {
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },

    /// Edit the current document
    Edit {
        #[command(subcommand)]
        action: EditAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Insert an empty row (appended by default)
    AddRow {
        #[arg(long)]
        at: Option<usize>,
    },

    /// Insert an empty column in every row (appended by default)
    AddColumn {
        #[arg(long)]
        at: Option<usize>,
    },

    /// Insert a block; the column may be one past the last
    AddBlock {
        #[arg(long)]
        row: usize,
        #[arg(long)]
        column: usize,
        /// Position in the column (appended by default)
        #[arg(long)]
        index: Option<usize>,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        /// Hex color, #rgb or #rrggbb
        #[arg(long)]
        color: Option<String>,
    },

    /// Move a block, positions given as row,column,index
    MoveBlock {
        #[arg(long)]
        from: BlockPosition,
        #[arg(long)]
        to: BlockPosition,
    },

    /// Remove the block at row,column,index
    RemoveBlock {
        #[arg(long)]
        at: BlockPosition,
    },

    SetRowTitle {
        #[arg(long)]
        row: usize,
        title: String,
    },

    /// Indent the block at row,column,index
    Indent {
        #[arg(long)]
        at: BlockPosition,
    },

    /// Outdent the block at row,column,index
    Outdent {
        #[arg(long)]
        at: BlockPosition,
    },
}
