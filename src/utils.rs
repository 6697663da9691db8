use chrono::{DateTime, SecondsFormat, Utc};
use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        )))
        .with_writer(std::io::stderr)
        .init();
}

/// UTC timestamp with millisecond precision, e.g. `2024-05-01T12:30:00.123Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if args.container.trim().is_empty() {
        anyhow::bail!("--container must not be empty");
    }

    if args.store == args.blocked_log {
        anyhow::bail!("--store and --blocked-log must be different files");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use chrono::TimeZone;
    use clap::Parser;

    #[test]
    fn test_iso_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn test_validate_args() {
        let ok = Args::parse_from(["urlinspect", "http://example.com"]);
        assert!(validate_args(&ok).is_ok());

        let empty_container =
            Args::parse_from(["urlinspect", "--container", " ", "http://example.com"]);
        assert!(validate_args(&empty_container).is_err());

        let same_file = Args::parse_from([
            "urlinspect",
            "--store",
            "log.txt",
            "--blocked-log",
            "log.txt",
            "http://example.com",
        ]);
        assert!(validate_args(&same_file).is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["urlinspect", "http://a.example", "http://b.example"]);
        assert_eq!(args.urls, vec!["http://a.example", "http://b.example"]);
        assert_eq!(args.store.to_str(), Some("urls.json"));
        assert_eq!(args.blocked_log.to_str(), Some("Blocked.txt"));
        assert_eq!(args.container, "output");
        assert!(!args.jsonl);
        assert!(args.html.is_none());
    }
}
