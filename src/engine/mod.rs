//! # Classification engine
//!
//! Pure, total per-visit classification: every method returns a sentinel
//! (`Other`, `None`, `false`) instead of an error, so a single malformed row
//! can never abort a run. All rule tables and keyword matchers are compiled
//! once into an immutable [`EngineConfig`]; classifying a row holds no state,
//! so rows may be processed concurrently against one config without locks.

pub mod categorize;
pub mod domain;
pub mod inappropriate;
pub mod schedule;
pub mod timestamp;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use regex::Regex;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::config::Rules;
use schedule::{Schedule, WorkDay};

/// A behavioral category label. Operator-supplied overrides introduce
/// [`Category::Custom`] labels beyond the built-in set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Work,
    InfrastructureInternal,
    Adult,
    Streaming,
    Shopping,
    Gaming,
    SocialMedia,
    News,
    Other,
    Custom(String),
}

impl Category {
    /// Map a lowercase label to a category; unknown labels become custom.
    pub fn from_label(label: &str) -> Self {
        match label {
            "work" => Category::Work,
            "infrastructure_internal" => Category::InfrastructureInternal,
            "adult" => Category::Adult,
            "streaming" => Category::Streaming,
            "shopping" => Category::Shopping,
            "gaming" => Category::Gaming,
            "social_media" => Category::SocialMedia,
            "news" => Category::News,
            "other" => Category::Other,
            other => Category::Custom(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Work => "work",
            Category::InfrastructureInternal => "infrastructure_internal",
            Category::Adult => "adult",
            Category::Streaming => "streaming",
            Category::Shopping => "shopping",
            Category::Gaming => "gaming",
            Category::SocialMedia => "social_media",
            Category::News => "news",
            Category::Other => "other",
            Category::Custom(label) => label,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Per-visit classification output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub category: Category,
    pub inappropriate: bool,
    pub inappropriate_reason: Option<String>,
    pub work_hours: bool,
}

/// Operator-supplied configuration, normalized (lowercase, trimmed) by the
/// CLI layer before it reaches the engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub start_time: String,
    pub end_time: String,
    pub work_days: Vec<WorkDay>,
    pub work_keywords: Vec<String>,
    pub custom_categories: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum EngineBuildError {
    #[error("invalid pattern '{pattern}' in {table}: {source}")]
    InvalidPattern {
        table: String,
        pattern: String,
        source: regex::Error,
    },
}

/// A keyword with its compiled word-boundary matcher.
#[derive(Debug)]
pub(crate) struct KeywordRule {
    pub keyword: String,
    pub matcher: Regex,
}

#[derive(Debug)]
pub(crate) struct CustomRule {
    pub matcher: Regex,
    pub category: Category,
}

/// One entry of a category table: a literal substring, or a `^...$` pattern
/// anchored against the full host.
#[derive(Debug)]
pub(crate) enum RuleEntry {
    Literal(String),
    Anchored(Regex),
}

#[derive(Debug)]
pub(crate) struct CategoryTable {
    pub category: Category,
    /// Literal entries also match inside path+query for most categories;
    /// infrastructure and adult tables match hosts only.
    pub check_path: bool,
    pub entries: Vec<RuleEntry>,
}

/// Immutable engine configuration, built once per run.
#[derive(Debug)]
pub struct EngineConfig {
    pub(crate) custom_rules: Vec<CustomRule>,
    pub(crate) work_keywords: Vec<String>,
    pub(crate) work_keyword_rules: Vec<KeywordRule>,
    pub(crate) whitelist_domains: HashSet<String>,
    pub(crate) whitelist_patterns: Vec<Regex>,
    pub(crate) category_tables: Vec<CategoryTable>,
    pub(crate) inappropriate_rules: Vec<KeywordRule>,
    schedule: Schedule,
    zone: Tz,
}

/// The zone visits are localized to: eastern Australia with historical DST
/// rules, falling back to the DST-free fixed-offset zone if the primary
/// lookup ever fails.
pub fn local_zone() -> Tz {
    "Australia/Sydney"
        .parse()
        .unwrap_or(chrono_tz::Australia::Brisbane)
}

/// Case-insensitive word-boundary matcher: the keyword must be delimited by
/// start/end of input or a non-word character (underscore counts as a
/// delimiter).
fn boundary_matcher(keyword: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|[\W_]){}(?:$|[\W_])",
        regex::escape(keyword)
    ))
}

impl EngineConfig {
    pub fn new(rules: &Rules, options: EngineOptions) -> Result<Self, EngineBuildError> {
        let invalid = |table: &str, pattern: &str, source: regex::Error| {
            EngineBuildError::InvalidPattern {
                table: table.to_string(),
                pattern: pattern.to_string(),
                source,
            }
        };

        // Custom overrides are tested longest keyword first.
        let mut custom_entries: Vec<(&String, &String)> =
            options.custom_categories.iter().collect();
        custom_entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        let mut custom_rules = Vec::with_capacity(custom_entries.len());
        for (keyword, label) in custom_entries {
            let matcher =
                boundary_matcher(keyword).map_err(|e| invalid("custom_categories", keyword, e))?;
            custom_rules.push(CustomRule {
                matcher,
                category: Category::from_label(label),
            });
        }

        let mut sorted_keywords = options.work_keywords.clone();
        sorted_keywords.sort_by(|a, b| b.len().cmp(&a.len()));
        let mut work_keyword_rules = Vec::with_capacity(sorted_keywords.len());
        for keyword in sorted_keywords {
            let matcher =
                boundary_matcher(&keyword).map_err(|e| invalid("work_keywords", &keyword, e))?;
            work_keyword_rules.push(KeywordRule { keyword, matcher });
        }

        let whitelist_domains: HashSet<String> = rules.whitelist_domains.iter().cloned().collect();
        let mut whitelist_patterns = Vec::with_capacity(rules.whitelist_patterns.len());
        for pattern in &rules.whitelist_patterns {
            whitelist_patterns
                .push(Regex::new(pattern).map_err(|e| invalid("whitelist_patterns", pattern, e))?);
        }

        let mut category_tables = Vec::with_capacity(rules.categories.len());
        for table in &rules.categories {
            let mut entries = Vec::with_capacity(table.entries.len());
            for entry in &table.entries {
                if entry.starts_with('^') && entry.ends_with('$') {
                    entries.push(RuleEntry::Anchored(
                        Regex::new(entry).map_err(|e| invalid(&table.name, entry, e))?,
                    ));
                } else {
                    entries.push(RuleEntry::Literal(entry.clone()));
                }
            }
            category_tables.push(CategoryTable {
                category: Category::from_label(&table.name),
                check_path: !matches!(table.name.as_str(), "infrastructure_internal" | "adult"),
                entries,
            });
        }

        let mut inappropriate_rules = Vec::with_capacity(rules.inappropriate_keywords.len());
        for keyword in &rules.inappropriate_keywords {
            let matcher = boundary_matcher(keyword)
                .map_err(|e| invalid("inappropriate_keywords", keyword, e))?;
            inappropriate_rules.push(KeywordRule {
                keyword: keyword.clone(),
                matcher,
            });
        }

        Ok(Self {
            custom_rules,
            work_keywords: options.work_keywords,
            work_keyword_rules,
            whitelist_domains,
            whitelist_patterns,
            category_tables,
            inappropriate_rules,
            schedule: Schedule::new(&options.start_time, &options.end_time, &options.work_days),
            zone: local_zone(),
        })
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// False when the configured start/end times failed to parse; the caller
    /// should surface that once to the operator.
    pub fn schedule_is_valid(&self) -> bool {
        self.schedule.is_valid()
    }

    /// Normalize a raw vendor timestamp into a localized instant.
    pub fn normalize_timestamp(&self, raw: &str) -> Option<DateTime<Tz>> {
        timestamp::normalize(raw, self.zone)
    }

    /// Assign exactly one category; total over all input strings.
    pub fn categorize(&self, url: &str) -> Category {
        categorize::categorize(self, url)
    }

    /// Flag inappropriate content, gated by category and whitelist.
    pub fn is_inappropriate(
        &self,
        url: &str,
        category: &Category,
        full_host: &str,
        main_domain: &str,
    ) -> (bool, Option<String>) {
        inappropriate::detect(self, url, category, full_host, main_domain)
    }

    /// Whether the instant falls inside the configured work schedule.
    /// Absent instants are never in work hours.
    pub fn is_work_hours(&self, instant: Option<&DateTime<Tz>>) -> bool {
        match instant {
            Some(instant) => self.schedule.contains(instant),
            None => false,
        }
    }

    /// Full per-visit classification; pure function of (input, config).
    pub fn classify_visit(
        &self,
        url: &str,
        visited_at: Option<&DateTime<Tz>>,
    ) -> ClassificationResult {
        let category = self.categorize(url);
        let parts = domain::split_url(url);
        let main = domain::main_domain(&parts.full_host);
        let (inappropriate, inappropriate_reason) =
            self.is_inappropriate(url, &category, &parts.full_host, &main);
        ClassificationResult {
            work_hours: self.is_work_hours(visited_at),
            category,
            inappropriate,
            inappropriate_reason,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Category, EngineBuildError, EngineConfig, EngineOptions};
    use crate::config::{Rules, load_rules};
    use std::collections::BTreeMap;

    pub(crate) fn default_rules() -> Rules {
        load_rules(None).expect("embedded rules").rules
    }

    pub(crate) fn options() -> EngineOptions {
        EngineOptions {
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            work_days: vec![
                crate::engine::schedule::WorkDay::Mon,
                crate::engine::schedule::WorkDay::Tue,
                crate::engine::schedule::WorkDay::Wed,
                crate::engine::schedule::WorkDay::Thu,
                crate::engine::schedule::WorkDay::Fri,
            ],
            work_keywords: Vec::new(),
            custom_categories: BTreeMap::new(),
        }
    }

    #[test]
    fn builds_from_embedded_rules() {
        let engine = EngineConfig::new(&default_rules(), options()).expect("engine");
        assert!(engine.schedule_is_valid());
        assert_eq!(engine.category_tables.len(), 7);
        assert_eq!(
            engine.category_tables[0].category,
            Category::InfrastructureInternal
        );
        assert!(!engine.category_tables[0].check_path);
        assert!(engine.category_tables[2].check_path);
    }

    #[test]
    fn category_labels_round_trip() {
        for label in [
            "work",
            "infrastructure_internal",
            "adult",
            "streaming",
            "shopping",
            "gaming",
            "social_media",
            "news",
            "other",
        ] {
            assert_eq!(Category::from_label(label).label(), label);
        }
        assert_eq!(Category::from_label("auto"), Category::Custom("auto".to_string()));
    }

    #[test]
    fn rejects_invalid_rule_pattern() {
        let mut rules = default_rules();
        rules.whitelist_patterns.push("(".to_string());
        let err = EngineConfig::new(&rules, options()).expect_err("should fail");
        assert!(matches!(err, EngineBuildError::InvalidPattern { .. }));
    }
}
