//! webcore - a static site generator for Jinja templates and markdown posts.

mod build;
mod cli;
mod config;
mod content;
mod context;
mod error;
mod render;
mod serve;
mod utils;
mod watch;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::{ABOUT, Cli};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.about {
        println!("{ABOUT}");
    }

    let config: &'static SiteConfig = Box::leak(Box::new(SiteConfig::load(&cli)?));

    if cli.serve {
        watch::watch_and_serve(config)
    } else {
        build_site(config).map(|_| ())
    }
}
