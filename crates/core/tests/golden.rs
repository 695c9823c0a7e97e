// ABOUTME: Golden tests comparing page extraction against expected JSON fixtures.
// ABOUTME: Each fixture pairs an HTML snapshot with the PageExtraction it should produce.

use docsearch_core::{Config, PageExtraction, PageExtractor, SelectorCache};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;

fn fixture_path(relative: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), relative)
}

/// Load the site configuration shared by the golden fixtures.
fn load_config() -> Config {
    let path = fixture_path("docs_site.json");
    let json = fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e));
    Config::from_json_str(&json).unwrap()
}

/// Load an expected extraction from the fixtures directory.
fn load_expected(name: &str) -> Value {
    let path = fixture_path(&format!("{}.json", name));
    let json = fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e));
    serde_json::from_str(&json).unwrap()
}

/// Load an HTML snapshot from the fixtures directory.
fn load_html(name: &str) -> String {
    let path = fixture_path(&format!("html/{}.html", name));
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
}

fn run_golden_test(name: &str, url: &str) -> PageExtraction {
    let config = load_config();
    let cache = SelectorCache::new();
    cache.precompile(config.all_selectors()).unwrap();

    let page = PageExtractor::new(&config, &cache)
        .extract_html(Some(url), &load_html(name))
        .unwrap();
    assert_eq!(serde_json::to_value(&page).unwrap(), load_expected(name));
    page
}

#[test]
fn golden_test_guide() {
    let page = run_golden_test("guide", "https://docs.example.com/guides/start");
    // Excluded subtrees never leak into any level.
    for level in &page.levels {
        let text = level.text.as_deref().unwrap_or_default();
        assert!(!text.contains("cookies"));
        assert!(!text.contains("Edit this page"));
        assert!(!text.contains("Home / Guides"));
    }
}

#[test]
fn golden_test_api() {
    run_golden_test("api", "https://docs.example.com/api/connect");
}

#[test]
fn unmatched_url_uses_default_set_and_level_defaults() {
    let config = load_config();
    let cache = SelectorCache::new();
    let page = PageExtractor::new(&config, &cache)
        .extract_html(
            Some("https://elsewhere.example.org/"),
            "<article><h1>Other</h1><p>Body.</p></article>",
        )
        .unwrap();
    assert_eq!(page.selectors_key, "default");
    assert_eq!(page.text("lvl0"), Some("Documentation"));
    assert_eq!(page.text("lvl1"), Some("Other"));
    assert_eq!(page.text("lvl2"), None);
    assert_eq!(page.text("content"), Some("Body"));
}

#[test]
fn intro_scenario() {
    let config =
        Config::from_json_str(r#"{ "selectors": { "lvl0": ".title", "content": "p" } }"#).unwrap();
    let page = PageExtractor::with_global_cache(&config)
        .extract_html(None, r#"<h1 class="title"> Intro </h1><p>Hello</p><p>  </p>"#)
        .unwrap();
    assert_eq!(page.text("lvl0"), Some("Intro"));
    assert_eq!(page.text("content"), Some("Hello"));
    assert_eq!(page.levels[0].weight, 100);
    assert_eq!(page.levels[1].weight, 0);
}

#[test]
fn config_errors_surface_before_extraction() {
    let err = Config::from_json_str(
        r#"{ "start_urls": [{ "url": "/x/", "selectors_key": "x" }],
             "selectors": { "content": "p" } }"#,
    )
    .unwrap_err();
    assert!(err.is_configuration());

    let err = Config::from_json_str(r#"{ "selectors": { "content": "p > > a" } }"#).unwrap_err();
    assert!(err.is_selector_syntax());
}
