// src/cli.rs
//! CLI definitions for quire
//!
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use quire::HrefMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(version)]
#[command(about = "Materialize EPUB publications as self-contained web publications", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a source EPUB from storage, materialize it and upload the result
    Process {
        /// Request body, e.g. '{"filename":"shelf/book.epub"}'
        #[arg(long, conflicts_with = "filename")]
        body: Option<String>,

        /// Source EPUB name in the source bucket
        #[arg(short, long)]
        filename: Option<String>,

        /// Parsed source manifest (Readium web publication JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Reference style for the generated manifest
        #[arg(long)]
        href_mode: Option<HrefMode>,
    },

    /// Materialize a local EPUB into a directory
    Local {
        /// Path to the EPUB archive
        epub: PathBuf,

        /// Parsed source manifest (Readium web publication JSON)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Public URL the output directory will be served from
        #[arg(long)]
        base_url: Option<String>,

        /// Reference style for the generated manifest
        #[arg(long)]
        href_mode: Option<HrefMode>,
    },

    /// Print the Content-Type an output path would be stored with
    ContentType {
        /// Output paths to resolve
        #[arg(required = true)]
        paths: Vec<String>,
    },
}
