use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::engine::schedule::WorkDay;

/// One ordered category table: entries wrapped in `^...$` are anchored
/// regexes matched against the full host, the rest are literal substrings.
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryRules {
    pub name: String,
    pub entries: Vec<String>,
}

/// The static rule tables driving classification. All entries are expected
/// lowercase; the engine does not normalize them again.
#[derive(Debug, Deserialize, Clone)]
pub struct Rules {
    pub whitelist_domains: Vec<String>,
    pub whitelist_patterns: Vec<String>,
    pub categories: Vec<CategoryRules>,
    pub inappropriate_keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedRules {
    pub rules: Rules,
    pub rules_hash: String,
}

/// Load rule tables from `path`, or the embedded defaults when `None`.
/// The SHA-256 of the raw bytes is recorded in output metadata.
pub fn load_rules(path: Option<&Path>) -> Result<LoadedRules> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p)?
    } else {
        include_bytes!("../config/rules.yml").to_vec()
    };

    let rules: Rules = serde_yaml::from_slice(&bytes)?;
    let rules_hash = hash_bytes(&bytes);

    Ok(LoadedRules { rules, rules_hash })
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Normalize a comma-separated day list into a deduplicated, calendar-ordered
/// set. Accepts the short abbreviations and common aliases (MON, TUE, ...);
/// unrecognized entries are warned about and dropped.
pub fn normalize_work_days(raw: &str) -> Vec<WorkDay> {
    let mut days = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim().to_ascii_uppercase();
        if entry.is_empty() {
            continue;
        }
        let day = match entry.as_str() {
            "M" | "MON" => Some(WorkDay::Mon),
            "T" | "TU" | "TUE" => Some(WorkDay::Tue),
            "W" | "WED" => Some(WorkDay::Wed),
            "TH" | "THU" => Some(WorkDay::Thu),
            "F" | "FRI" => Some(WorkDay::Fri),
            "SA" | "SAT" => Some(WorkDay::Sat),
            "SU" | "SUN" => Some(WorkDay::Sun),
            _ => None,
        };
        match day {
            Some(day) if !days.contains(&day) => days.push(day),
            Some(_) => {}
            None => warn!("work day '{entry}' not recognized"),
        }
    }
    days.sort();
    days
}

/// Lowercase and trim a keyword list, dropping empties.
pub fn normalize_keywords(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

static CUSTOM_CATEGORY_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\(([^)]+)\)$").expect("custom category grammar"));

/// Parse the `"keyword1(categoryA),keyword two(categoryB)"` override grammar
/// into a keyword -> category map. Malformed items are warned about and
/// skipped rather than failing the run.
pub fn parse_custom_categories(raw: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for item in raw.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        match CUSTOM_CATEGORY_ITEM.captures(item) {
            Some(caps) => {
                let keyword = caps[1].trim().to_lowercase();
                let category = caps[2].trim().to_lowercase();
                if keyword.is_empty() || category.is_empty() {
                    warn!("could not parse custom category item '{item}'; skipping");
                } else {
                    map.insert(keyword, category);
                }
            }
            None => warn!("custom category item '{item}' not in 'keyword(category)' format; skipping"),
        }
    }
    map
}
