pub mod args;
pub mod cli;
pub mod denylist;
pub mod inspector;
pub mod output;
pub mod stats;
pub mod storage;
pub mod url_check;
pub mod utils;

pub use args::Args;
pub use denylist::{init_default_denylist, load_denylist, Denylist};
pub use inspector::{print_summary, Inspector};
pub use output::{paint, BufferSink, HtmlSink, OutputSink, Style, TerminalSink};
pub use stats::{InspectionCounters, Outcome};
pub use storage::{BlockedLog, HistoryFormat, HistoryStore, SearchParams, UrlRecord, UrlStatus};
pub use url_check::SearchParamMap;
