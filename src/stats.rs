use crate::url_check::SearchParamMap;

/// Running totals for one batch of inspections.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InspectionCounters {
    pub blocked: u32,
    pub unblocked: u32,
    pub unblocked_urls: Vec<String>,
}

impl InspectionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_blocked(&mut self) -> u32 {
        self.blocked += 1;
        self.blocked
    }

    pub fn record_unblocked(&mut self, url: &str) -> u32 {
        self.unblocked += 1;
        self.unblocked_urls.push(url.to_string());
        self.unblocked
    }
}

/// What happened to a single inspected URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Invalid,
    Blocked,
    Unblocked {
        search_params: Option<SearchParamMap>,
    },
}
