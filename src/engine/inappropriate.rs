//! Inappropriate-content detection, gated so that work, infrastructure, and
//! whitelisted traffic is never flagged no matter what the URL contains.

use super::categorize::decode_url;
use super::{Category, EngineConfig};

pub(crate) fn detect(
    cfg: &EngineConfig,
    url: &str,
    category: &Category,
    full_host: &str,
    main_domain: &str,
) -> (bool, Option<String>) {
    if url.is_empty() {
        return (false, None);
    }
    if matches!(category, Category::Work | Category::InfrastructureInternal) {
        return (false, None);
    }
    if cfg.whitelist_domains.contains(main_domain) {
        return (false, None);
    }
    if cfg.whitelist_patterns.iter().any(|p| p.is_match(full_host)) {
        return (false, None);
    }

    let url_lower = decode_url(url).to_lowercase();
    for rule in &cfg.inappropriate_rules {
        if rule.matcher.is_match(&url_lower) {
            return (true, Some(rule.keyword.clone()));
        }
    }
    (false, None)
}
