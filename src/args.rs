use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "urlinspect",
    about = "Check URLs against a denylist and keep a history of what was inspected",
    version,
    long_about = None
)]
pub struct Args {
    /// URLs to inspect, in order
    pub urls: Vec<String>,

    /// JSON history file
    #[arg(short, long, default_value = "urls.json")]
    pub store: PathBuf,

    /// Plaintext log of blocked URLs
    #[arg(short, long, default_value = "Blocked.txt")]
    pub blocked_log: PathBuf,

    /// Path to custom denylist file
    #[arg(short, long)]
    pub denylist: Option<PathBuf>,

    /// Append history as JSON Lines instead of rewriting a JSON array
    #[arg(long)]
    pub jsonl: bool,

    /// Render output as an HTML fragment to this file
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Element id of the HTML output container
    #[arg(long, default_value = "output")]
    pub container: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Initialize denylist.txt with the default denylist
    #[arg(long)]
    pub init: bool,
}
