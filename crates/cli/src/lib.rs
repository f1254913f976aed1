//! PinDrop CLI library: exposed for integration tests

pub mod api;
pub mod checkout;
pub mod commands;
pub mod history;
pub mod host;
pub mod logging;
pub mod progress;
pub mod session;

use clap::{Parser, Subcommand};
use pindrop_core::MediaKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pindrop")]
#[command(about = "Download Pinterest videos, images and GIFs", long_about = None)]
#[command(version = pindrop_core::VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL (overrides .pindrop.toml and PINDROP_API_BASE)
    #[arg(long, global = true)]
    pub api: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default .pindrop.toml
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<PathBuf>,
    },

    /// Look up the media behind a Pinterest URL
    Analyze {
        /// Pinterest or pin.it URL
        url: String,
    },

    /// Download the media behind one or more Pinterest URLs
    Download {
        /// Pinterest or pin.it URLs, downloaded in order
        #[arg(required = true)]
        urls: Vec<String>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the detected media kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Tick the ad countdown without waiting
        #[arg(long)]
        fast: bool,
    },

    /// Run a sequence of gated downloads without fetching anything
    Simulate {
        /// Media kinds, in order
        #[arg(value_enum, required = true)]
        kinds: Vec<KindArg>,

        /// Tick the ad countdown without waiting
        #[arg(long)]
        fast: bool,
    },

    /// Manage PinDrop Premium
    Premium {
        #[command(subcommand)]
        action: Option<commands::premium::PremiumAction>,
    },

    /// Show recent downloads
    History {
        /// Remove all entries
        #[arg(long)]
        clear: bool,

        /// Remove the entry with this timestamp
        #[arg(long)]
        remove: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum KindArg {
    Video,
    Image,
    Gif,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Video => MediaKind::Video,
            KindArg::Image => MediaKind::Image,
            KindArg::Gif => MediaKind::Gif,
        }
    }
}
