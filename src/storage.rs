use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::url_check::SearchParamMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    Blocked,
    Unblocked,
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlStatus::Blocked => f.write_str("blocked"),
            UrlStatus::Unblocked => f.write_str("unblocked"),
        }
    }
}

/// `Absent` is written as the string `"None"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSearchParams", into = "RawSearchParams")]
pub enum SearchParams {
    Parsed(SearchParamMap),
    Absent,
}

impl From<Option<SearchParamMap>> for SearchParams {
    fn from(params: Option<SearchParamMap>) -> Self {
        match params {
            Some(map) => SearchParams::Parsed(map),
            None => SearchParams::Absent,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawSearchParams {
    Map(SearchParamMap),
    Marker(String),
}

impl From<RawSearchParams> for SearchParams {
    fn from(raw: RawSearchParams) -> Self {
        match raw {
            RawSearchParams::Map(map) => SearchParams::Parsed(map),
            RawSearchParams::Marker(_) => SearchParams::Absent,
        }
    }
}

impl From<SearchParams> for RawSearchParams {
    fn from(params: SearchParams) -> Self {
        match params {
            SearchParams::Parsed(map) => RawSearchParams::Map(map),
            SearchParams::Absent => RawSearchParams::Marker("None".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub url: String,
    pub status: UrlStatus,
    pub search_params: SearchParams,
    pub visited_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFormat {
    /// The whole history is one JSON array, rewritten on every append.
    #[default]
    JsonArray,
    /// One JSON record per line, appended.
    JsonLines,
}

/// No locking: concurrent writers to a `JsonArray` file can lose records.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    format: HistoryFormat,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, format: HistoryFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &UrlRecord) -> Result<()> {
        match self.format {
            HistoryFormat::JsonArray => {
                let mut entries = self.load_entries();
                entries.push(serde_json::to_value(record)?);
                let serialized = serde_json::to_string_pretty(&entries)?;
                fs::write(&self.path, serialized)
                    .with_context(|| format!("Failed to write history file {:?}", self.path))?;
            }
            HistoryFormat::JsonLines => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .with_context(|| format!("Failed to open history file {:?}", self.path))?;
                let line = format!("{}\n", serde_json::to_string(record)?);
                file.write_all(line.as_bytes())?;
            }
        }

        info!(action = "append", component = "history_store", url = %record.url, status = %record.status, file_path = ?self.path, "Saved URL record");
        Ok(())
    }

    /// Every entry currently on disk. Unreadable or corrupt history reads as empty.
    pub fn load_entries(&self) -> Vec<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(action = "read", component = "history_store", file_path = ?self.path, error = %e, "History file unreadable, starting empty");
                return Vec::new();
            }
        };

        match self.format {
            HistoryFormat::JsonArray => {
                if content.trim().is_empty() {
                    return Vec::new();
                }
                match serde_json::from_str::<Vec<Value>>(&content) {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(action = "parse", component = "history_store", file_path = ?self.path, error = %e, "History file corrupt, starting empty");
                        Vec::new()
                    }
                }
            }
            HistoryFormat::JsonLines => content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .filter_map(|(line_num, line)| match serde_json::from_str(line) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(action = "parse", component = "history_store", line_number = line_num + 1, error = %e, "Skipping corrupt history line");
                        None
                    }
                })
                .collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn records(&self) -> Vec<UrlRecord> {
        self.load_entries()
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect()
    }
}

/// Append-only plaintext log with one line per blocked URL.
#[derive(Debug, Clone)]
pub struct BlockedLog {
    path: PathBuf,
}

impl BlockedLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name shown to users.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn append(&self, url: &str, timestamp: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open blocked log {:?}", self.path))?;
        let line = format!("{}\n", blocked_line(url, timestamp));
        file.write_all(line.as_bytes())?;

        info!(action = "append", component = "blocked_log", url = url, file_path = ?self.path, "Saved blocked URL");
        Ok(())
    }
}

pub fn blocked_line(url: &str, timestamp: &str) -> String {
    format!("Blocked URL: {} at {}", url, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(url: &str, status: UrlStatus, search_params: SearchParams) -> UrlRecord {
        UrlRecord {
            url: url.to_string(),
            status,
            search_params,
            visited_at: "2024-05-01T12:30:00.123Z".to_string(),
        }
    }

    #[test]
    fn test_record_json_shape() -> Result<()> {
        let mut params = SearchParamMap::new();
        params.insert("x".to_string(), "5".to_string());
        let value = serde_json::to_value(record(
            "http://example.com/?x=5",
            UrlStatus::Unblocked,
            SearchParams::Parsed(params),
        ))?;

        assert_eq!(value["url"], "http://example.com/?x=5");
        assert_eq!(value["status"], "unblocked");
        assert_eq!(value["searchParams"]["x"], "5");
        assert_eq!(value["visitedAt"], "2024-05-01T12:30:00.123Z");
        Ok(())
    }

    #[test]
    fn test_history_file_key_order() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("urls.json"), HistoryFormat::JsonArray);
        fs::write(store.path(), r#"[{"zeta": 1, "alpha": 2}]"#)?;

        let mut params = SearchParamMap::new();
        params.insert("b".to_string(), "3".to_string());
        params.insert("a".to_string(), "1".to_string());
        store.append(&record(
            "http://example.com/?b=2&a=1&b=3",
            UrlStatus::Unblocked,
            SearchParams::Parsed(params),
        ))?;

        let content = fs::read_to_string(store.path())?;
        let pos = |needle: &str| content.find(needle).unwrap();
        assert!(pos("\"zeta\"") < pos("\"alpha\""));
        assert!(pos("\"url\"") < pos("\"status\""));
        assert!(pos("\"status\"") < pos("\"searchParams\""));
        assert!(pos("\"searchParams\"") < pos("\"visitedAt\""));
        assert!(pos("\"b\": \"3\"") < pos("\"a\": \"1\""));
        Ok(())
    }

    #[test]
    fn test_absent_params_serialize_as_none_string() -> Result<()> {
        let value = serde_json::to_value(record(
            "example.com/?a=1",
            UrlStatus::Unblocked,
            SearchParams::Absent,
        ))?;
        assert_eq!(value["searchParams"], "None");

        let back: UrlRecord = serde_json::from_value(value)?;
        assert_eq!(back.search_params, SearchParams::Absent);
        Ok(())
    }

    #[test]
    fn test_json_array_append_creates_and_grows() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("urls.json"), HistoryFormat::JsonArray);

        store.append(&record("http://blocked.com", UrlStatus::Blocked, SearchParams::Parsed(SearchParamMap::new())))?;
        store.append(&record("http://example.com", UrlStatus::Unblocked, SearchParams::Parsed(SearchParamMap::new())))?;

        let content = fs::read_to_string(store.path())?;
        assert!(content.starts_with("[\n  {"));

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "http://blocked.com");
        assert_eq!(records[1].status, UrlStatus::Unblocked);
        Ok(())
    }

    #[test]
    fn test_corrupt_or_empty_history_treated_as_empty() -> Result<()> {
        let dir = TempDir::new()?;
        for initial in ["", "   \n", "{not json", "{\"an\": \"object\"}"] {
            let path = dir.path().join("urls.json");
            fs::write(&path, initial)?;
            let store = HistoryStore::new(&path, HistoryFormat::JsonArray);
            assert!(store.load_entries().is_empty());

            store.append(&record("http://example.com", UrlStatus::Unblocked, SearchParams::Absent))?;
            let entries: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path)?)?;
            assert_eq!(entries.len(), 1);
        }
        Ok(())
    }

    #[test]
    fn test_foreign_entries_are_kept() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("urls.json");
        fs::write(&path, r#"[{"note": "hand written"}]"#)?;

        let store = HistoryStore::new(&path, HistoryFormat::JsonArray);
        store.append(&record("http://example.com", UrlStatus::Unblocked, SearchParams::Absent))?;

        let entries = store.load_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["note"], "hand written");
        assert_eq!(store.records().len(), 1);
        Ok(())
    }

    #[test]
    fn test_json_lines_appends_one_line_per_record() -> Result<()> {
        let dir = TempDir::new()?;
        let store = HistoryStore::new(dir.path().join("urls.jsonl"), HistoryFormat::JsonLines);

        store.append(&record("http://a.example", UrlStatus::Unblocked, SearchParams::Absent))?;
        store.append(&record("http://blocked.com", UrlStatus::Blocked, SearchParams::Absent))?;

        let content = fs::read_to_string(store.path())?;
        assert_eq!(content.lines().count(), 2);
        let records = store.records();
        assert_eq!(records[1].url, "http://blocked.com");
        Ok(())
    }

    #[test]
    fn test_concurrent_appends_keep_lines_whole() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("Blocked.txt");

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let log = BlockedLog::new(&path);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.append(&format!("http://w{}-{}.example", worker, i), "2024-05-01T12:30:00.000Z")
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(&path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|line| line.starts_with("Blocked URL: http://w")
            && line.ends_with(" at 2024-05-01T12:30:00.000Z")));
        Ok(())
    }

    #[test]
    fn test_blocked_log_appends_lines() -> Result<()> {
        let dir = TempDir::new()?;
        let log = BlockedLog::new(dir.path().join("Blocked.txt"));
        assert_eq!(log.display_name(), "Blocked.txt");

        log.append("http://blocked.com", "2024-05-01T12:30:00.123Z")?;
        log.append("http://tiktok.com", "2024-05-01T12:31:00.000Z")?;

        let content = fs::read_to_string(log.path())?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Blocked URL: http://blocked.com at 2024-05-01T12:30:00.123Z",
                "Blocked URL: http://tiktok.com at 2024-05-01T12:31:00.000Z",
            ]
        );
        Ok(())
    }
}
