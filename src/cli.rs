use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "autoprune",
    about = "Keep watched directories within their retention limits",
    version
)]
pub struct Cli {
    /// JSON config listing the directories to watch
    #[arg(default_value = "config.json")]
    pub config: PathBuf,

    /// Run a single scan cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Log what would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}
