// ABOUTME: Site configuration model: start URL patterns, named selector sets, exclusions, strip rules.
// ABOUTME: Deserializes the JSON config format with serde and validates it into immutable typed structs.

//! Crawl configuration.
//!
//! The JSON format is permissive in the ways site configs are in practice:
//!
//! - a `start_urls` entry may be a bare pattern string or an object with a
//!   `selectors_key`;
//! - `selectors` may be a single flat set (wrapped as `"default"`) or a map
//!   of named sets;
//! - a level may be a plain CSS string or an object with overrides;
//! - `min_indexed_level` may be a single level or a per-key map, and levels
//!   may be given as integers or `lvlN` names.
//!
//! Everything is validated at load time. The resulting [`Config`] is
//! immutable and can be shared freely.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, ScraperError};
use crate::selector::CompiledQuery;
use crate::weight::level_number;

/// Key of the selector set used when no start URL pattern matches.
pub const DEFAULT_SELECTORS_KEY: &str = "default";

/// Key of the `min_indexed_level` entry used when a selectors key has none.
pub const DEFAULT_MIN_LEVEL_KEY: &str = "default";

/// Level name every selector set must define.
pub const CONTENT_LEVEL: &str = "content";

const EXCLUDE_KEY: &str = "exclude";

/// A start URL pattern and the selector set it maps to.
#[derive(Debug, Clone)]
pub struct StartUrl {
    /// Pattern source as written in the config.
    pub url: String,
    /// Compiled pattern; matched with a search, not a full match.
    pub pattern: Regex,
    pub selectors_key: String,
}

/// Selector and text rules for one level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorEntry {
    pub selector: String,
    /// Overrides the global strip set when present.
    pub strip_chars: Option<String>,
    /// Used when the level yields no text.
    pub default_value: Option<String>,
}

impl SelectorEntry {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Default::default()
        }
    }
}

/// A named set of level selectors plus the exclusions applied before extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSet {
    pub levels: BTreeMap<String, SelectorEntry>,
    pub exclude: Vec<String>,
}

impl SelectorSet {
    /// Looks up the entry for a level.
    pub fn get(&self, level: &str) -> Option<&SelectorEntry> {
        self.levels.get(level)
    }
}

/// Minimum indexed level per selectors key, always carrying a default entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinIndexedLevels {
    levels: HashMap<String, String>,
}

impl MinIndexedLevels {
    /// Creates a table whose default entry is `default_level`.
    pub fn new(default_level: impl Into<String>) -> Self {
        let mut levels = HashMap::new();
        levels.insert(DEFAULT_MIN_LEVEL_KEY.to_string(), default_level.into());
        Self { levels }
    }

    /// Sets the level for a selectors key.
    pub fn with(mut self, key: impl Into<String>, level: impl Into<String>) -> Self {
        self.levels.insert(key.into(), level.into());
        self
    }

    /// The level configured for exactly this key, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.levels.get(key).map(String::as_str)
    }

    /// The level of the default entry.
    pub fn default_level(&self) -> &str {
        self.levels
            .get(DEFAULT_MIN_LEVEL_KEY)
            .map(String::as_str)
            .unwrap_or("lvl0")
    }
}

impl Default for MinIndexedLevels {
    fn default() -> Self {
        Self::new("lvl0")
    }
}

/// Validated, read-only crawl configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Ordered by precedence: the first match wins.
    pub start_urls: Vec<StartUrl>,
    pub selectors: HashMap<String, SelectorSet>,
    /// Exclusions applied to every page before the set's own.
    pub selectors_exclude: Vec<String>,
    pub min_indexed_level: MinIndexedLevels,
    /// Global strip set for levels without an override.
    pub strip_chars: Option<String>,
}

impl Config {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ScraperError::configuration("<config>", "parse", Some(e.into())))?;
        Self::from_value(value)
    }

    /// Validates an already-parsed JSON configuration.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| ScraperError::configuration("<config>", "parse", Some(e.into())))?;
        let config = raw.into_config()?;
        config.validate()?;
        Ok(config)
    }

    /// Every selector string the configuration references, exclusions included.
    pub fn all_selectors(&self) -> impl Iterator<Item = &str> + '_ {
        let global = self.selectors_exclude.iter().map(String::as_str);
        let sets = self.selectors.values().flat_map(|set| {
            set.levels
                .values()
                .map(|entry| entry.selector.as_str())
                .chain(set.exclude.iter().map(String::as_str))
        });
        global.chain(sets)
    }

    /// Checks cross-references and compiles every selector.
    pub fn validate(&self) -> Result<()> {
        if self.selectors.is_empty() {
            return Err(ScraperError::configuration(
                "selectors",
                "validate",
                Some(anyhow::anyhow!("no selector sets defined")),
            ));
        }

        for start_url in &self.start_urls {
            if !self.selectors.contains_key(&start_url.selectors_key) {
                return Err(ScraperError::configuration(
                    &start_url.selectors_key,
                    "validate",
                    Some(anyhow::anyhow!(
                        "start url {:?} refers to an undefined selector set",
                        start_url.url
                    )),
                ));
            }
        }

        for (key, set) in &self.selectors {
            if set.get(CONTENT_LEVEL).is_none() {
                return Err(ScraperError::configuration(
                    key,
                    "validate",
                    Some(anyhow::anyhow!("selector set has no {:?} level", CONTENT_LEVEL)),
                ));
            }
        }

        for selector in self.all_selectors() {
            CompiledQuery::compile(selector)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    start_urls: Vec<RawStartUrl>,
    #[serde(default)]
    selectors: serde_json::Map<String, Value>,
    #[serde(default)]
    selectors_exclude: Vec<String>,
    #[serde(default)]
    min_indexed_level: Option<RawMinLevel>,
    #[serde(default)]
    strip_chars: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStartUrl {
    Pattern(String),
    Entry {
        url: String,
        #[serde(default)]
        selectors_key: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Number(u32),
    Name(String),
}

impl RawLevel {
    fn into_name(self) -> Result<String> {
        match self {
            RawLevel::Number(n) => Ok(format!("lvl{}", n)),
            RawLevel::Name(name) if level_number(&name).is_some() => Ok(name),
            RawLevel::Name(name) => Err(ScraperError::configuration(
                name,
                "min_indexed_level",
                Some(anyhow::anyhow!("expected an integer or a lvlN name")),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMinLevel {
    Single(RawLevel),
    PerKey(HashMap<String, RawLevel>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Css(String),
    Full {
        selector: String,
        #[serde(default)]
        strip_chars: Option<String>,
        #[serde(default)]
        default_value: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },
}

impl RawEntry {
    fn into_entry(self, subject: String) -> Result<SelectorEntry> {
        match self {
            RawEntry::Css(selector) => Ok(SelectorEntry::new(selector)),
            RawEntry::Full {
                kind: Some(kind), ..
            } if kind != "css" => Err(ScraperError::configuration(
                subject,
                "selectors",
                Some(anyhow::anyhow!("unsupported selector type {:?}", kind)),
            )),
            RawEntry::Full {
                selector,
                strip_chars,
                default_value,
                ..
            } => Ok(SelectorEntry {
                selector,
                strip_chars,
                default_value,
            }),
        }
    }
}

impl RawConfig {
    fn into_config(self) -> Result<Config> {
        let mut start_urls = Vec::with_capacity(self.start_urls.len());
        for raw in self.start_urls {
            let (url, selectors_key) = match raw {
                RawStartUrl::Pattern(url) => (url, None),
                RawStartUrl::Entry { url, selectors_key } => (url, selectors_key),
            };
            let pattern = Regex::new(&url)
                .map_err(|e| ScraperError::configuration(&url, "start_urls", Some(e.into())))?;
            start_urls.push(StartUrl {
                url,
                pattern,
                selectors_key: selectors_key
                    .unwrap_or_else(|| DEFAULT_SELECTORS_KEY.to_string()),
            });
        }

        let selectors = if is_flat_set(&self.selectors) {
            let set = parse_set(DEFAULT_SELECTORS_KEY, self.selectors)?;
            HashMap::from([(DEFAULT_SELECTORS_KEY.to_string(), set)])
        } else {
            let mut sets = HashMap::with_capacity(self.selectors.len());
            for (key, value) in self.selectors {
                let Value::Object(map) = value else {
                    return Err(ScraperError::configuration(
                        key,
                        "selectors",
                        Some(anyhow::anyhow!("selector set must be an object")),
                    ));
                };
                let set = parse_set(&key, map)?;
                sets.insert(key, set);
            }
            sets
        };

        let min_indexed_level = match self.min_indexed_level {
            None => MinIndexedLevels::default(),
            Some(RawMinLevel::Single(level)) => MinIndexedLevels::new(level.into_name()?),
            Some(RawMinLevel::PerKey(map)) => {
                let mut levels = MinIndexedLevels::default();
                for (key, level) in map {
                    levels = levels.with(key, level.into_name()?);
                }
                levels
            }
        };

        Ok(Config {
            start_urls,
            selectors,
            selectors_exclude: self.selectors_exclude,
            min_indexed_level,
            strip_chars: self.strip_chars,
        })
    }
}

/// A flat set names levels directly instead of naming sets.
fn is_flat_set(selectors: &serde_json::Map<String, Value>) -> bool {
    selectors
        .keys()
        .any(|key| key == CONTENT_LEVEL || level_number(key).is_some())
}

fn parse_set(key: &str, map: serde_json::Map<String, Value>) -> Result<SelectorSet> {
    let mut set = SelectorSet::default();
    for (level, value) in map {
        if level == EXCLUDE_KEY {
            set.exclude = serde_json::from_value(value).map_err(|e| {
                ScraperError::configuration(key, "selectors.exclude", Some(e.into()))
            })?;
            continue;
        }
        let subject = format!("{}.{}", key, level);
        let raw: RawEntry = serde_json::from_value(value).map_err(|e| {
            ScraperError::configuration(subject.clone(), "selectors", Some(e.into()))
        })?;
        set.levels.insert(level, raw.into_entry(subject)?);
    }
    Ok(set)
}
