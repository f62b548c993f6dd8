//! The categorization pipeline: custom overrides, whitelist handling, work
//! keywords, then the ordered category tables. First match wins; nothing
//! matching falls out as `other`.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use super::{Category, EngineConfig, RuleEntry, domain};

/// Percent-decode a URL; undecodable bytes keep the raw string.
pub(crate) fn decode_url(url: &str) -> Cow<'_, str> {
    match percent_decode_str(url).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(url),
    }
}

pub(crate) fn categorize(cfg: &EngineConfig, url: &str) -> Category {
    if url.is_empty() {
        return Category::Other;
    }

    let decoded = decode_url(url);
    let url_lower = decoded.to_lowercase();
    let parts = domain::split_url(&decoded);
    let main = domain::main_domain(&parts.full_host);

    // 1. Custom overrides, longest keyword first.
    for rule in &cfg.custom_rules {
        if rule.matcher.is_match(&url_lower) {
            return rule.category.clone();
        }
    }

    // 2. Whitelisted hosts: a work keyword anywhere in host or path wins;
    // a regex whitelist match is infrastructure. A host whitelisted only by
    // the domain set with no work keyword falls through to the tables.
    let set_whitelisted = cfg.whitelist_domains.contains(main.as_str());
    let pattern_whitelisted = !set_whitelisted
        && cfg
            .whitelist_patterns
            .iter()
            .any(|p| p.is_match(&parts.full_host));
    if set_whitelisted || pattern_whitelisted {
        for keyword in &cfg.work_keywords {
            if parts.full_host.contains(keyword.as_str())
                || parts.path_query.contains(keyword.as_str())
            {
                return Category::Work;
            }
        }
        if cfg
            .whitelist_patterns
            .iter()
            .any(|p| p.is_match(&parts.full_host))
        {
            return Category::InfrastructureInternal;
        }
    }

    // 3. Work keywords against the whole decoded URL, longest first.
    for rule in &cfg.work_keyword_rules {
        if rule.matcher.is_match(&url_lower) {
            return Category::Work;
        }
    }

    // 4. Ordered category tables.
    for table in &cfg.category_tables {
        for entry in &table.entries {
            match entry {
                RuleEntry::Anchored(pattern) => {
                    if pattern.is_match(&parts.full_host) {
                        return table.category.clone();
                    }
                }
                RuleEntry::Literal(literal) => {
                    if parts.full_host.contains(literal.as_str()) {
                        return table.category.clone();
                    }
                    if table.check_path && parts.path_query.contains(literal.as_str()) {
                        return table.category.clone();
                    }
                }
            }
        }
    }

    Category::Other
}
