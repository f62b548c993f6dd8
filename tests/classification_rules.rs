//! End-to-end rule semantics through the public library API: category
//! precedence, whitelist gating, and the inappropriate detector working
//! together on realistic URLs.

use std::collections::BTreeMap;

use histoscan::config::{self, load_rules};
use histoscan::engine::{Category, EngineConfig, EngineOptions};

fn engine_with(keywords: &[&str], customs: &[(&str, &str)]) -> EngineConfig {
    let rules = load_rules(None).expect("embedded rules").rules;
    let options = EngineOptions {
        start_time: "09:00".to_string(),
        end_time: "17:00".to_string(),
        work_days: config::normalize_work_days("M,T,W,Th,F"),
        work_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        custom_categories: customs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    };
    EngineConfig::new(&rules, options).expect("engine")
}

#[test]
fn custom_overrides_beat_every_other_rule() {
    let engine = engine_with(&["youtube"], &[("youtube", "training")]);
    // youtube is a work keyword AND a streaming table entry; the custom
    // override still wins.
    assert_eq!(
        engine.categorize("https://www.youtube.com/watch?v=abc"),
        Category::Custom("training".to_string())
    );
}

#[test]
fn work_keywords_beat_category_tables() {
    let engine = engine_with(&["youtube"], &[]);
    assert_eq!(
        engine.categorize("https://www.youtube.com/watch?v=abc"),
        Category::Work
    );
}

#[test]
fn whitelist_regex_hit_is_infrastructure() {
    let engine = engine_with(&[], &[]);
    assert_eq!(
        engine.categorize("https://www.servicesaustralia.gov.au/centrelink"),
        Category::InfrastructureInternal
    );
}

#[test]
fn whitelisted_host_with_work_keyword_is_work() {
    // A whitelisted-by-pattern host containing a work keyword goes to work,
    // not infrastructure.
    let engine = engine_with(&["payroll"], &[]);
    assert_eq!(
        engine.categorize("https://payroll.tax.gov.au/lodge"),
        Category::Work
    );
}

#[test]
fn set_whitelisted_host_falls_through_to_tables() {
    let engine = engine_with(&[], &[]);
    // github.com is in the whitelist set but no pattern matches it, so it
    // keeps descending and lands in other.
    assert_eq!(engine.categorize("https://github.com/rust-lang/rust"), Category::Other);
}

#[test]
fn category_table_order_is_authoritative() {
    let engine = engine_with(&[], &[]);
    assert_eq!(engine.categorize("http://10.0.0.1/admin"), Category::InfrastructureInternal);
    assert_eq!(
        engine.categorize("https://www.twitch.tv/somechannel"),
        Category::Streaming
    );
    assert_eq!(
        engine.categorize("https://www.ebay.com.au/itm/12345"),
        Category::Shopping
    );
    assert_eq!(
        engine.categorize("https://store.steampowered.com/app/400"),
        Category::Gaming
    );
    assert_eq!(
        engine.categorize("https://www.facebook.com/groups/test"),
        Category::SocialMedia
    );
    assert_eq!(engine.categorize("https://www.smh.com.au/politics"), Category::News);
}

#[test]
fn unmatched_urls_are_other() {
    let engine = engine_with(&[], &[]);
    assert_eq!(engine.categorize("https://example.com/about"), Category::Other);
    assert_eq!(engine.categorize(""), Category::Other);
    assert_eq!(engine.categorize("not a url at all"), Category::Other);
}

#[test]
fn classify_visit_combines_all_verdicts() {
    let engine = engine_with(&[], &[]);
    // Friday 2022-10-14 11:00 in eastern Australia.
    let when = engine.normalize_timestamp("13310179200000000");
    assert!(when.is_some());

    let verdict = engine.classify_visit("https://www.sportsbet.com.au/horse-racing", when.as_ref());
    assert!(verdict.inappropriate);
    assert!(verdict.inappropriate_reason.is_some());
    assert!(verdict.work_hours);

    let verdict = engine.classify_visit("https://www.google.com/search?q=poker", when.as_ref());
    assert!(!verdict.inappropriate);

    let verdict = engine.classify_visit("https://example.com/", None);
    assert!(!verdict.work_hours);
}

#[test]
fn percent_encoded_keywords_are_decoded_before_matching() {
    let engine = engine_with(&[], &[]);
    let verdict = engine.classify_visit("https://example.com/%63%61%73%69%6e%6f/lobby", None);
    assert!(verdict.inappropriate);
}
