//! Netscape `cookies.txt` support.
//!
//! Browser extensions and most download tools export session cookies in the
//! Mozilla/Netscape format: one cookie per line, seven tab-separated fields
//! (`domain`, `include_subdomains`, `path`, `secure`, `expires`, `name`,
//! `value`). Lines starting with `#` are comments, except for the
//! `#HttpOnly_` domain prefix.

use std::path::Path;

use chrono::Utc;
use tracing::debug;

use crate::extractor::error::ExtractorError;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetscapeCookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Unix seconds; `None` for session cookies.
    pub expires: Option<i64>,
    pub name: String,
    pub value: String,
}

impl NetscapeCookie {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires.is_some_and(|expires| expires < now)
    }

    /// Whether the cookie would be sent to `host`.
    pub fn matches_host(&self, host: &str) -> bool {
        domain_matches(
            host,
            &self.domain,
            self.include_subdomains || self.domain.starts_with('.'),
        )
    }

    fn parse_line(line: &str) -> Option<Self> {
        let (line, http_only) = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => (rest, true),
            None if line.starts_with('#') => return None,
            None => (line, false),
        };

        let fields: Vec<&str> = line.split('\t').collect();
        // values may legitimately be empty, so a trailing tab still makes seven fields
        let [domain, include_subdomains, path, secure, expires, name, value] = fields[..] else {
            return None;
        };

        let expires = match expires.trim().parse::<i64>() {
            Ok(0) => None,
            Ok(ts) => Some(ts),
            Err(_) => return None,
        };

        Some(Self {
            domain: domain.to_string(),
            include_subdomains: include_subdomains.eq_ignore_ascii_case("TRUE"),
            path: path.to_string(),
            secure: secure.eq_ignore_ascii_case("TRUE"),
            http_only,
            expires,
            name: name.to_string(),
            value: value.trim_end_matches('\r').to_string(),
        })
    }
}

/// Whether `host` is `domain` itself or, with `include_subdomains`, one of its subdomains.
///
/// A leading dot on `domain` is ignored; comparison is case-insensitive.
pub fn domain_matches(host: &str, domain: &str, include_subdomains: bool) -> bool {
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    let host = host.to_ascii_lowercase();
    host == domain || (include_subdomains && host.ends_with(&format!(".{domain}")))
}

/// Parses cookie file content, dropping malformed lines and cookies expired at `now`.
pub fn parse_netscape_cookies(content: &str, now: i64) -> Vec<NetscapeCookie> {
    content
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let cookie = NetscapeCookie::parse_line(line);
            if cookie.is_none() && !line.starts_with('#') {
                debug!("Skipping malformed cookie line");
            }
            cookie
        })
        .filter(|cookie| !cookie.is_expired(now))
        .collect()
}

pub fn load_netscape_cookies(path: &Path) -> Result<Vec<NetscapeCookie>, ExtractorError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ExtractorError::CookieFileError(format!("cannot read {}: {e}", path.display()))
    })?;

    let cookies = parse_netscape_cookies(&content, Utc::now().timestamp());
    debug!("Loaded {} cookies from {}", cookies.len(), path.display());
    Ok(cookies)
}

/// Renders the cookies that apply to `host` as a `Cookie` header value.
pub fn cookie_header_for_host(cookies: &[NetscapeCookie], host: &str) -> Option<String> {
    let header = cookies
        .iter()
        .filter(|c| c.matches_host(host) && !c.value.is_empty())
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ");

    (!header.is_empty()).then_some(header)
}
