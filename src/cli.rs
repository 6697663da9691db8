use anyhow::{Context, Result};
use std::fs;

use crate::denylist::{init_default_denylist, load_denylist};
use crate::inspector::Inspector;
use crate::output::{HtmlSink, OutputSink, Style};
use crate::storage::{BlockedLog, HistoryFormat, HistoryStore};
use crate::utils::validate_args;
use crate::Args;

pub const USAGE: [&str; 2] = [
    "Please provide arguments. Usage:",
    "urlinspect <url1> <url2> ...",
];

/// Runs one invocation and returns the process exit status.
pub fn run(args: &Args, sink: &mut dyn OutputSink) -> Result<i32> {
    if args.init {
        init_default_denylist()?;
        return Ok(0);
    }

    if args.urls.is_empty() {
        for line in USAGE {
            sink.record(line, Style::Plain);
        }
        return Ok(1);
    }

    validate_args(args)?;

    let denylist = load_denylist(args.denylist.as_deref())?;
    let format = if args.jsonl {
        HistoryFormat::JsonLines
    } else {
        HistoryFormat::JsonArray
    };
    let history = HistoryStore::new(&args.store, format);
    let blocked_log = BlockedLog::new(&args.blocked_log);
    let inspector = Inspector::new(&denylist, &history, &blocked_log);

    match &args.html {
        Some(html_path) => {
            let mut html_sink = HtmlSink::new(Some(args.container.clone()), sink);
            inspector.run_batch(&args.urls, &mut html_sink);
            if let Some(html) = html_sink.render() {
                fs::write(html_path, html)
                    .with_context(|| format!("Failed to write HTML output to {:?}", html_path))?;
            }
        }
        None => {
            inspector.run_batch(&args.urls, sink);
        }
    }

    Ok(0)
}
