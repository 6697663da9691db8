use indexmap::IndexMap;
use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;
use url::Url;

/// Query parameters in first-seen key order.
pub type SearchParamMap = IndexMap<String, String>;

const MAX_URL_LENGTH: usize = 2083;
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

static TLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([a-zA-Z\u{00a1}-\u{00a8}\u{00aa}-\u{d7ff}\u{f900}-\u{fdcf}\u{fdf0}-\u{ffef}]{2,}|[xX][nN][a-zA-Z0-9-]{2,})$",
    )
    .expect("tld pattern is valid")
});

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9\u{00a1}-\u{d7ff}\u{e000}-\u{ffff}-]+$").expect("label pattern is valid")
});

/// Returns true when `input` is a well-formed web URL.
///
/// Accepts `http`, `https` and `ftp` URLs. The scheme may be omitted
/// (`example.com/page` is valid) but protocol-relative input (`//example.com`)
/// is not. The host must be an IP address or a domain with a real TLD.
pub fn is_valid_url(input: &str) -> bool {
    if input.is_empty() || input.len() > MAX_URL_LENGTH {
        return false;
    }
    if input.chars().any(char::is_whitespace) || input.starts_with("mailto:") {
        return false;
    }

    let without_fragment = input.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();

    let rest = match without_query.split_once("://") {
        Some((scheme, rest)) => {
            if !ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
                return false;
            }
            rest
        }
        None => {
            if without_query.starts_with("//") {
                return false;
            }
            without_query
        }
    };

    let authority = rest.split('/').next().unwrap_or_default();
    if authority.is_empty() {
        return false;
    }

    let host_port = match authority.split_once('@') {
        Some((userinfo, host_port)) => {
            if !is_valid_userinfo(userinfo) {
                return false;
            }
            host_port
        }
        None => authority,
    };

    let (host, port) = match split_host_port(host_port) {
        Some(parts) => parts,
        None => return false,
    };

    if let Some(port) = port.filter(|p| !p.is_empty()) {
        if !port.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match port.parse::<u32>() {
            Ok(p) if (1..=65535).contains(&p) => {}
            _ => return false,
        }
    }

    if let Some(v6) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return v6.parse::<Ipv6Addr>().is_ok();
    }

    host.parse::<Ipv4Addr>().is_ok() || is_fqdn(host)
}

fn is_valid_userinfo(userinfo: &str) -> bool {
    if userinfo.is_empty() {
        return false;
    }
    let mut parts = userinfo.split(':');
    let user = parts.next().unwrap_or_default();
    let password = parts.next();
    if parts.next().is_some() {
        return false;
    }
    !(user.is_empty() && password == Some(""))
}

fn split_host_port(host_port: &str) -> Option<(&str, Option<&str>)> {
    if host_port.starts_with('[') {
        let end = host_port.find(']')?;
        let (host, tail) = host_port.split_at(end + 1);
        return match tail.strip_prefix(':') {
            Some(port) => Some((host, Some(port))),
            None if tail.is_empty() => Some((host, None)),
            None => None,
        };
    }

    match host_port.split_once(':') {
        Some((host, port)) if !port.contains(':') => Some((host, Some(port))),
        Some(_) => None,
        None => Some((host_port, None)),
    }
}

fn is_fqdn(host: &str) -> bool {
    if host.is_empty() || host.ends_with('.') {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let tld = labels[labels.len() - 1];
    if !TLD_RE.is_match(tld) {
        return false;
    }

    labels.iter().all(|label| {
        label.len() <= 63
            && LABEL_RE.is_match(label)
            && !label.starts_with('-')
            && !label.ends_with('-')
            && !label.chars().any(is_fullwidth)
    })
}

fn is_fullwidth(c: char) -> bool {
    ('\u{ff01}'..='\u{ff5e}').contains(&c)
}

/// `None` when the strict URL parser rejects the input. A repeated key keeps
/// its first position and takes the last value.
pub fn extract_search_params(input: &str) -> Option<SearchParamMap> {
    let parsed = Url::parse(input).ok()?;
    let mut params = SearchParamMap::new();
    for (key, value) in parsed.query_pairs() {
        params.insert(key.into_owned(), value.into_owned());
    }
    Some(params)
}
