use chrono::Utc;
use std::time::Instant;
use tracing::{error, info};

use crate::denylist::Denylist;
use crate::output::{OutputSink, Style};
use crate::stats::{InspectionCounters, Outcome};
use crate::storage::{BlockedLog, HistoryStore, SearchParams, UrlRecord, UrlStatus};
use crate::url_check;
use crate::utils::iso_timestamp;

pub struct Inspector<'a> {
    denylist: &'a Denylist,
    history: &'a HistoryStore,
    blocked_log: &'a BlockedLog,
}

impl<'a> Inspector<'a> {
    pub fn new(
        denylist: &'a Denylist,
        history: &'a HistoryStore,
        blocked_log: &'a BlockedLog,
    ) -> Self {
        Self {
            denylist,
            history,
            blocked_log,
        }
    }

    pub fn inspect_url(
        &self,
        url: &str,
        counters: &mut InspectionCounters,
        sink: &mut dyn OutputSink,
    ) -> Outcome {
        if !url_check::is_valid_url(url) {
            info!(action = "reject", component = "inspector", url = url, "Invalid URL");
            sink.record("The URL is invalid. Please enter a valid URL.", Style::Red);
            return Outcome::Invalid;
        }

        let search_params = url_check::extract_search_params(url);

        if self.denylist.contains(url) {
            let count = counters.record_blocked();
            self.save_record(url, UrlStatus::Blocked, search_params.into(), sink);
            sink.record(
                &format!("The URL is blocked! Block count: {}", count),
                Style::BoldRed,
            );
            self.save_blocked(url, sink);
            return Outcome::Blocked;
        }

        if let Some(params) = search_params.as_ref().filter(|p| !p.is_empty()) {
            sink.record("Search Parameters:", Style::Green);
            for (key, value) in params {
                sink.record(&format!("{}: {}", key, value), Style::Blue);
            }
        }

        let count = counters.record_unblocked(url);
        self.save_record(url, UrlStatus::Unblocked, search_params.clone().into(), sink);
        sink.record(
            &format!("URL is valid and unblocked! Unblock count: {}", count),
            Style::Green,
        );

        Outcome::Unblocked { search_params }
    }

    /// Inspect every URL in order, then print the summary.
    pub fn run_batch<I, S>(&self, urls: I, sink: &mut dyn OutputSink) -> InspectionCounters
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let start_time = Instant::now();
        info!(action = "start", component = "batch", "Starting URL inspection");

        let mut counters = InspectionCounters::new();
        for url in urls {
            self.inspect_url(url.as_ref(), &mut counters, sink);
        }

        print_summary(&counters, sink);

        info!(
            action = "complete",
            component = "batch",
            blocked = counters.blocked,
            unblocked = counters.unblocked,
            duration_ms = start_time.elapsed().as_millis(),
            "URL inspection completed"
        );
        counters
    }

    fn save_record(
        &self,
        url: &str,
        status: UrlStatus,
        search_params: SearchParams,
        sink: &mut dyn OutputSink,
    ) {
        let record = UrlRecord {
            url: url.to_string(),
            status,
            search_params,
            visited_at: iso_timestamp(Utc::now()),
        };

        match self.history.append(&record) {
            Ok(()) => sink.record(
                &format!("Saved URL: {} with status: {}", url, status),
                Style::Blue,
            ),
            Err(e) => {
                error!(action = "append", component = "history_store", url = url, error = %e, "Failed to save URL record")
            }
        }
    }

    fn save_blocked(&self, url: &str, sink: &mut dyn OutputSink) {
        match self.blocked_log.append(url, &iso_timestamp(Utc::now())) {
            Ok(()) => sink.record(
                &format!(
                    "Blocked URL saved to {}: {}",
                    self.blocked_log.display_name(),
                    url
                ),
                Style::Red,
            ),
            Err(e) => {
                error!(action = "append", component = "blocked_log", url = url, error = %e, "Failed to save blocked URL")
            }
        }
    }
}

pub fn print_summary(counters: &InspectionCounters, sink: &mut dyn OutputSink) {
    sink.record("\nFinal Counts:", Style::Plain);
    sink.record(&format!("Blocked URLs: {}", counters.blocked), Style::Red);
    sink.record(&format!("Unblocked URLs: {}", counters.unblocked), Style::Green);
    sink.record(
        &format!("Unblocked URL List: {}", counters.unblocked_urls.join(", ")),
        Style::Blue,
    );
}
