//! Host extraction and the main-domain heuristic used for whitelist and
//! category comparisons.

use url::Url;

/// The pieces of a URL the classifier cares about, lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// Network location, including an explicit non-default port.
    pub full_host: String,
    /// Path plus `?query` when a query is present.
    pub path_query: String,
}

/// Split a URL into host and path+query. Strings that do not parse as
/// absolute URLs (no scheme, bare words) yield an empty host with the whole
/// string treated as path, so downstream matching still sees the text.
pub fn split_url(url: &str) -> UrlParts {
    match Url::parse(url) {
        Ok(parsed) => {
            let mut full_host = parsed.host_str().unwrap_or("").to_lowercase();
            if let Some(port) = parsed.port() {
                full_host.push(':');
                full_host.push_str(&port.to_string());
            }
            let mut path_query = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                path_query.push('?');
                path_query.push_str(query);
            }
            UrlParts {
                full_host,
                path_query: path_query.to_lowercase(),
            }
        }
        Err(_) => UrlParts {
            full_host: String::new(),
            path_query: url.to_lowercase(),
        },
    }
}

/// Reduce a host to a registrable-domain-like suffix.
///
/// With more than two labels, a second-to-last label from a small set of
/// second-level suffix hints followed by a 2-character country code keeps
/// three labels (`example.com.au`); otherwise two. This is a heuristic, not
/// a public-suffix-list lookup.
pub fn main_domain(host: &str) -> String {
    if host.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() > 2 {
        let second_last = parts[parts.len() - 2].to_lowercase();
        let last = parts[parts.len() - 1];
        let is_sld_hint = matches!(
            second_last.as_str(),
            "com" | "co" | "org" | "net" | "gov" | "edu" | "ac"
        );
        if is_sld_hint && last.len() == 2 {
            return parts[parts.len() - 3..].join(".").to_lowercase();
        }
        return parts[parts.len() - 2..].join(".").to_lowercase();
    }
    host.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{main_domain, split_url};

    #[test]
    fn splits_host_and_path_query() {
        let parts = split_url("https://Docs.Google.com/document/d/abc?usp=Sharing");
        assert_eq!(parts.full_host, "docs.google.com");
        assert_eq!(parts.path_query, "/document/d/abc?usp=sharing");
    }

    #[test]
    fn keeps_explicit_port() {
        let parts = split_url("http://192.168.1.10:8443/admin");
        assert_eq!(parts.full_host, "192.168.1.10:8443");
    }

    #[test]
    fn schemeless_string_becomes_path_only() {
        let parts = split_url("just some text");
        assert_eq!(parts.full_host, "");
        assert_eq!(parts.path_query, "just some text");
    }

    #[test]
    fn two_labels_pass_through() {
        assert_eq!(main_domain("Google.com"), "google.com");
        assert_eq!(main_domain("localhost"), "localhost");
    }

    #[test]
    fn second_level_suffix_keeps_three_labels() {
        assert_eq!(main_domain("www.example.com.au"), "example.com.au");
        assert_eq!(main_domain("portal.education.gov.uk"), "education.gov.uk");
    }

    #[test]
    fn deep_subdomains_reduce_to_two_labels() {
        assert_eq!(main_domain("a.b.c.example.org"), "example.org");
        assert_eq!(main_domain("drive.google.com"), "google.com");
    }

    #[test]
    fn empty_host_yields_empty_domain() {
        assert_eq!(main_domain(""), "");
    }

    #[test]
    fn main_domain_is_suffix_of_host() {
        for host in ["news.bbc.co.uk", "teams.microsoft.com", "example.com"] {
            let main = main_domain(host);
            assert!(host.to_lowercase().ends_with(&main));
        }
    }
}
