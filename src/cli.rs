//! Command-line interface definitions.
//!
//! A single build command; `--serve` switches to watch-and-serve mode.

use clap::Parser;
use std::path::PathBuf;

/// Identification string printed by `--about`.
pub const ABOUT: &str = "webcore v3 :3 - https://n3rdl0rd.xyz/webcore";

/// webcore static site builder
#[derive(Parser, Debug, Clone)]
#[command(version, about = "webcore build script", long_about = None)]
pub struct Cli {
    /// Serve the result, watch for changes and rebuild
    #[arg(long)]
    pub serve: bool,

    /// Port for the development server
    #[arg(long)]
    pub port: Option<u16>,

    /// Print information about webcore
    #[arg(long)]
    pub about: bool,

    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name, relative to the project root
    #[arg(short = 'C', long, default_value = "webcore.toml")]
    pub config: PathBuf,
}
