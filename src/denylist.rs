use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

// Include default denylist at compile time
const DEFAULT_DENYLIST_BYTES: &[u8] = include_bytes!("../default_denylist.txt");

pub const DEFAULT_DENYLIST_FILE: &str = "denylist.txt";

/// Exact, case-sensitive URL matching; hosts are not parsed.
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    entries: HashSet<String>,
}

impl Denylist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// The denylist shipped with the binary.
    pub fn embedded() -> Result<Self> {
        let content = std::str::from_utf8(DEFAULT_DENYLIST_BYTES)
            .context("Failed to decode embedded default denylist")?;
        Ok(Self::new(parse_entries(content)))
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entries(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_denylist(denylist_path: Option<&Path>) -> Result<Denylist> {
    load_denylist_from(denylist_path, Path::new(DEFAULT_DENYLIST_FILE))
}

fn load_denylist_from(denylist_path: Option<&Path>, default_file: &Path) -> Result<Denylist> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "denylist_loading",
        "Starting denylist loading"
    );

    let mut denylist = Denylist::default();

    if let Some(path) = denylist_path {
        info!(action = "load", component = "denylist_file", file_path = ?path, "Loading denylist from specified file");
        if !path.exists() {
            anyhow::bail!("Denylist file not found: {:?}", path);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read denylist file {:?}", path))?;
        denylist = Denylist::new(parse_entries(&content));
        info!(action = "loaded", component = "denylist_file", entry_count = denylist.len(), file_path = ?path, "Loaded denylist from file");
    } else {
        if default_file.exists() {
            info!(action = "load", component = "default_denylist_file", file_path = ?default_file, "Loading denylist from default file");
            let content = fs::read_to_string(default_file)?;
            denylist = Denylist::new(parse_entries(&content));
            info!(action = "loaded", component = "default_denylist_file", entry_count = denylist.len(), file_path = ?default_file, "Loaded denylist from default file");
        }

        if denylist.is_empty() {
            info!(
                action = "load",
                component = "embedded_denylist",
                "Using embedded default denylist"
            );
            denylist = Denylist::embedded()?;
        }
    }

    info!(
        action = "complete",
        component = "denylist_loading",
        entry_count = denylist.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Denylist ready"
    );
    Ok(denylist)
}

pub fn init_default_denylist() -> Result<()> {
    init_denylist_at(Path::new(DEFAULT_DENYLIST_FILE))
}

fn init_denylist_at(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first if you want to reinitialize.",
            path.display()
        );
    }

    let default_content = std::str::from_utf8(DEFAULT_DENYLIST_BYTES)
        .context("Failed to decode embedded default denylist")?;

    fs::write(path, default_content)?;
    println!("Created {} with default denylist", path.display());

    Ok(())
}
