//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Tidy tree layout for story and dialogue trees
#[derive(Parser, Debug)]
#[command(name = "storytree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raise log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Extra config file, layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lay out a tree document and print node positions
    Layout {
        /// TOML tree document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,

        /// Also print screen coordinates
        #[arg(short, long)]
        screen: bool,

        /// Minimum width reserved per node
        #[arg(long)]
        node_size: Option<f64>,

        /// Extra gap between adjacent siblings
        #[arg(long)]
        sibling_distance: Option<f64>,

        /// Extra gap between neighbouring subtrees
        #[arg(long)]
        tree_distance: Option<f64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print the global config file path
    Path,
    /// Print a commented config template
    Template,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree with positions
    Tree,
    /// One row per node with extents
    Table,
}
