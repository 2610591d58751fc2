//! Deeplink syntax checks shared by every import path and the API server.

use url::Url;

/// Returns `true` if `link` is a syntactically valid URI or Android intent string.
///
/// Intent strings must carry an `#Intent;` fragment terminated by `end`.
/// URIs must have a scheme plus either a host (`https://x.org`, `app://open`)
/// or an opaque path (`tel:123`, `mailto:a@b.c`).
pub fn is_valid_deeplink(link: &str) -> bool {
    if link.is_empty() || link.chars().any(char::is_whitespace) {
        return false;
    }

    if link.starts_with("intent:") {
        return link.contains("#Intent;") && link.trim_end_matches(';').ends_with("end");
    }

    match Url::parse(link) {
        Ok(url) => {
            let has_host = url.host_str().is_some_and(|h| !h.is_empty());
            let has_path = !url.path().is_empty() && url.path() != "/";
            !url.scheme().is_empty() && (has_host || has_path)
        }
        Err(_) => false,
    }
}

/// Canonicalizes a raw token taken from an import source.
///
/// Strips whitespace and wrapping quotes or angle brackets. A bare host such as
/// `a.com` or `www.example.org/path` gains an `https://` prefix; everything
/// else is returned trimmed.
pub fn normalize_link(raw: &str) -> String {
    let mut link = raw.trim();
    loop {
        let stripped = strip_wrapping(link);
        if stripped.len() == link.len() {
            break;
        }
        link = stripped.trim();
    }

    if link.is_empty() || link.starts_with("intent:") || Url::parse(link).is_ok() {
        return link.to_string();
    }

    if looks_like_host(link) {
        return format!("https://{}", link);
    }

    link.to_string()
}

fn strip_wrapping(s: &str) -> &str {
    for (open, close) in [('"', '"'), ('\'', '\''), ('<', '>')] {
        if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn looks_like_host(s: &str) -> bool {
    let host = s.split(['/', '?', '#']).next().unwrap_or("");
    let host = host.split(':').next().unwrap_or("");
    host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}
