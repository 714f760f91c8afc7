//! CLI command definitions

use crate::infrastructure::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tagrender")]
#[command(about = "Render markup templates from tagged JSON/YAML data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a template against a data document
    Render {
        /// Markup template file
        #[arg(short, long)]
        template: PathBuf,

        /// JSON or YAML data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output file, or output directory with --iterate
        /// (default: output.<format> or output/)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (pdf, html)
        #[arg(short, long, default_value = "pdf")]
        format: OutputFormat,

        /// Only keep data visible under these tags (comma separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "iterate")]
        tags: Vec<String>,

        /// Render one document per tag found in the data
        #[arg(long)]
        iterate: bool,

        /// Config file (default: ./tagrender.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List every tag used in a data document
    Tags {
        /// JSON or YAML data file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// View or modify configuration
    Config {
        /// Config key to get or set
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// Show the effective configuration
        #[arg(short, long)]
        list: bool,

        /// Write a default tagrender.toml
        #[arg(long, conflicts_with_all = ["key", "list"])]
        init: bool,

        /// Directory holding tagrender.toml
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}
