//! Transvision deep links for diagnostic messages
//!
//! Each message produced by the quality checks names a string somewhere in
//! its text. The annotator classifies the message by shape, extracts that
//! string id (the "key") and the locale, builds a Transvision search URL and
//! wraps the key in an anchor.
//!
//! Shapes are tried in a fixed priority order:
//! 1. `LOCALE (compare-locales TYPE): DESCRIPTION for KEY`
//! 2. `LOCALE - ... empty: KEY` (also `shortcuts: ` and `variables: `)
//! 3. `LOCALE - DESCRIPTION (KEY)`
//!
//! Global invariants enforced:
//! - Pure function of the message and the link configuration
//! - Never panics; unrecognized input degrades to escaped, unlinked text
//! - Removing the anchor tags and unescaping the fragment yields the input

use crate::html::html_escape;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::form_urlencoded;

pub const DEFAULT_BASE_URL: &str = "https://transvision.flod.org/";
pub const DEFAULT_REPO: &str = "gecko_strings";
pub const DEFAULT_SOURCE_LOCALE: &str = "en-US";

/// Separator between the locale code and the rest of a check message
const LOCALE_SEPARATOR: &str = " - ";

/// Markers used by the view-based checks, in priority order
const KEYWORD_MARKERS: &[&str] = &["empty: ", "shortcuts: ", "variables: "];

const COMPARE_LOCALES_MARKER: &str = "compare-locales";

/// Fixed parameters of the external search tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub base_url: String,
    pub repo: String,
    pub source_locale: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            repo: DEFAULT_REPO.to_string(),
            source_locale: DEFAULT_SOURCE_LOCALE.to_string(),
        }
    }
}

/// Which rule recognized a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageShape {
    CompareLocales,
    Keyword,
    Parenthesized,
    Unrecognized,
}

impl MessageShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageShape::CompareLocales => "compare_locales",
            MessageShape::Keyword => "keyword",
            MessageShape::Parenthesized => "parenthesized",
            MessageShape::Unrecognized => "unrecognized",
        }
    }
}

/// Result of annotating a single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub shape: MessageShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Escaped message with the key wrapped in an anchor (when found)
    pub html: String,
}

impl Annotation {
    fn unlinked(message: &str) -> Self {
        Annotation {
            shape: MessageShape::Unrecognized,
            locale: None,
            key: None,
            url: None,
            html: html_escape(message),
        }
    }

    /// True when the fragment carries an anchor
    pub fn is_linked(&self) -> bool {
        match (&self.key, &self.url) {
            (Some(key), Some(_)) => !key.is_empty() && self.html.contains("<a href="),
            _ => false,
        }
    }
}

/// Locale and key found by a rule. `key` is `None` when the rule claimed the
/// message but could not locate a key in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Extraction<'a> {
    locale: &'a str,
    key: Option<&'a str>,
}

struct Rule {
    shape: MessageShape,
    matches: fn(&str) -> bool,
    extract: for<'a> fn(&'a str) -> Extraction<'a>,
}

/// First matching rule wins
const RULES: &[Rule] = &[
    Rule {
        shape: MessageShape::CompareLocales,
        matches: is_compare_locales,
        extract: extract_compare_locales,
    },
    Rule {
        shape: MessageShape::Keyword,
        matches: is_keyword,
        extract: extract_keyword,
    },
    Rule {
        shape: MessageShape::Parenthesized,
        matches: is_parenthesized,
        extract: extract_parenthesized,
    },
];

/// Builds Transvision links for check messages
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    config: LinkConfig,
}

impl Annotator {
    pub fn new(config: LinkConfig) -> Self {
        Annotator { config }
    }

    /// Annotate a message, returning the search URL and an HTML fragment
    pub fn annotate(&self, message: &str) -> Annotation {
        let Some(rule) = RULES.iter().find(|rule| (rule.matches)(message)) else {
            return Annotation::unlinked(message);
        };
        let extraction = (rule.extract)(message);

        let Some(key) = extraction.key else {
            return Annotation {
                shape: rule.shape,
                locale: Some(extraction.locale.to_string()),
                key: None,
                url: None,
                html: html_escape(message),
            };
        };

        let url = self.search_url(extraction.locale, key);
        let html = link_first_occurrence(message, key, &url);

        Annotation {
            shape: rule.shape,
            locale: Some(extraction.locale.to_string()),
            key: Some(key.to_string()),
            url: Some(url),
            html,
        }
    }

    /// Transvision entity search URL for `key` in `locale`
    pub fn search_url(&self, locale: &str, key: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("repo", &self.config.repo)
            .append_pair("sourcelocale", &self.config.source_locale)
            .append_pair("search_type", "entities")
            .append_pair("locale", locale)
            .append_pair("recherche", key)
            .finish();

        let base = &self.config.base_url;
        let joiner = if base.contains('?') { '&' } else { '?' };
        format!("{base}{joiner}{query}")
    }
}

fn compare_locales_key_re() -> &'static Regex {
    static KEY_RE: OnceLock<Regex> = OnceLock::new();
    KEY_RE.get_or_init(|| Regex::new(r" for (.*)\n?\z").unwrap())
}

fn is_compare_locales(message: &str) -> bool {
    message.contains(COMPARE_LOCALES_MARKER)
}

fn extract_compare_locales(message: &str) -> Extraction<'_> {
    let locale = message.split_once(' ').map_or(message, |(head, _)| head);
    let key = compare_locales_key_re()
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    Extraction { locale, key }
}

/// Locale prefix: everything before the first separator, or the whole message
fn locale_prefix(message: &str) -> &str {
    message
        .split_once(LOCALE_SEPARATOR)
        .map_or(message, |(locale, _)| locale)
}

/// Byte offset where the key starts, if a marker follows the locale separator
fn keyword_key_start(message: &str) -> Option<usize> {
    let sep = message.find(LOCALE_SEPARATOR)?;
    let tail_start = sep + LOCALE_SEPARATOR.len();
    let tail = &message[tail_start..];
    KEYWORD_MARKERS.iter().find_map(|marker| {
        tail.find(marker)
            .map(|pos| tail_start + pos + marker.len())
    })
}

fn is_keyword(message: &str) -> bool {
    keyword_key_start(message).is_some()
}

fn extract_keyword(message: &str) -> Extraction<'_> {
    Extraction {
        locale: locale_prefix(message),
        key: keyword_key_start(message).map(|start| &message[start..]),
    }
}

/// Text between the last `(` and the closing `)` that ends the message
fn parenthesized_key(message: &str) -> Option<&str> {
    let inner = message.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    Some(&inner[open + 1..])
}

fn is_parenthesized(message: &str) -> bool {
    parenthesized_key(message).is_some()
}

fn extract_parenthesized(message: &str) -> Extraction<'_> {
    Extraction {
        locale: locale_prefix(message),
        key: parenthesized_key(message),
    }
}

/// Escape `message`, wrapping the first occurrence of `key` in an anchor.
/// Empty or missing keys leave the message unlinked.
fn link_first_occurrence(message: &str, key: &str, url: &str) -> String {
    if key.is_empty() {
        return html_escape(message);
    }
    let Some(pos) = message.find(key) else {
        return html_escape(message);
    };

    let before = &message[..pos];
    let after = &message[pos + key.len()..];
    format!(
        r#"{before}<a href="{href}">{text}</a>{after}"#,
        before = html_escape(before),
        href = html_escape(url),
        text = html_escape(key),
        after = html_escape(after),
    )
}
