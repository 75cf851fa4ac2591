//! Attribute surface and the configuration resolver.
//!
//! The host hands the widget a snapshot of its declarative attributes
//! (`src`, `key`, `auto-refresh`, ...). [`resolve`] turns that snapshot into an
//! immutable [`WidgetConfig`] once per attach. Resolution is a pure function:
//! no I/O, no logging, no defaults guessed for malformed input.

use crate::model::error::ConfigError;
use crate::model::Strategy;
use std::collections::BTreeMap;
use std::time::Duration;

/// Source used when the `src` attribute is absent.
pub const DEFAULT_SOURCE_URL: &str = "https://catfact.ninja/fact";
/// Response key used when the `key` attribute is absent.
pub const DEFAULT_RESPONSE_KEY: &str = "fact";
/// Refresh interval used when `refresh-interval` is absent.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

/// Source URL, pull endpoint or event stream.
pub const ATTR_SRC: &str = "src";
/// Response field holding the fact.
pub const ATTR_KEY: &str = "key";
/// Loading placeholder toggle.
pub const ATTR_SHOW_LOADING: &str = "show-loading";
/// Recurring pull toggle.
pub const ATTR_AUTO_REFRESH: &str = "auto-refresh";
/// Timer period in milliseconds.
pub const ATTR_REFRESH_INTERVAL: &str = "refresh-interval";
/// Stop control toggle.
pub const ATTR_SHOW_STOP_BUTTON: &str = "show-stop-button";
/// Push strategy toggle.
pub const ATTR_SSE: &str = "sse";
/// Card background.
pub const ATTR_COLOR: &str = "color";

/// Snapshot of attribute name to raw string value.
///
/// Absent attributes are simply not in the map. Names are stored as given;
/// the resolver only looks up the lowercase names above.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    values: BTreeMap<String, String>,
}

impl AttributeMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(name, value)` pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.set(name, value);
        }
        map
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    /// Raw value of an attribute, `None` when absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether an attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Whether no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of `self`; attributes in `other` win.
    pub fn merged_with(mut self, other: &AttributeMap) -> Self {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
        self
    }

    /// Attributes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse a `name=value` assignment as used by `--attr`.
///
/// A bare `name` (no `=`) is a present attribute with an empty value,
/// the way a boolean attribute is written in markup.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name.trim(), value),
        None => (raw.trim(), ""),
    };
    if name.is_empty() {
        return Err(format!("attribute assignment {raw:?} has an empty name"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Immutable per-attach configuration of a fact card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Where facts are acquired from.
    pub source_url: String,
    /// Pull response field displayed as the fact.
    pub response_key: String,
    /// Show the loading placeholder while acquiring.
    pub show_loading_indicator: bool,
    /// Re-acquire on a timer (pull only).
    pub auto_refresh_enabled: bool,
    /// Always > 0.
    pub refresh_interval_ms: u64,
    /// Stop control requested; only rendered with a timer.
    pub show_stop_control: bool,
    /// Use the push subscription instead of pulls.
    pub push_mode_enabled: bool,
    /// Cosmetic pass-through from the `color` attribute.
    pub color: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            response_key: DEFAULT_RESPONSE_KEY.to_string(),
            show_loading_indicator: false,
            auto_refresh_enabled: false,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            show_stop_control: true,
            push_mode_enabled: false,
            color: None,
        }
    }
}

impl WidgetConfig {
    /// Acquisition strategy.
    pub fn strategy(&self) -> Strategy {
        Strategy::from_push_mode(self.push_mode_enabled)
    }

    /// Timer period.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Interval of the recurring pull timer, if one is armed at attach.
    ///
    /// Push mode ignores auto-refresh entirely.
    pub fn timer_interval(&self) -> Option<Duration> {
        match self.strategy() {
            Strategy::Pull if self.auto_refresh_enabled => Some(self.refresh_interval()),
            _ => None,
        }
    }

    /// Whether the stop control is part of the card.
    pub fn renders_stop_control(&self) -> bool {
        self.timer_interval().is_some() && self.show_stop_control
    }

    /// Whether the manual trigger (the `button-title` slot) is part of the card.
    ///
    /// Independent of strategy: under push it still performs one pull.
    pub fn renders_manual_trigger(&self) -> bool {
        !self.auto_refresh_enabled
    }
}

/// Resolve an attribute snapshot into a [`WidgetConfig`].
///
/// # Rules
///
/// - `src`, `key`: taken verbatim, defaults otherwise
/// - `show-loading`, `auto-refresh`: true only for the exact value `"true"`
/// - `show-stop-button`: true unless exactly `"false"`
/// - `sse`: true when present and not `"false"`/`"0"` (an empty value counts as present)
/// - `refresh-interval`: positive integer milliseconds, surrounding whitespace allowed
/// - `color`: passed through
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRefreshInterval`] when `refresh-interval` is present
/// but not a positive integer, regardless of whether auto-refresh is enabled.
pub fn resolve(attributes: &AttributeMap) -> Result<WidgetConfig, ConfigError> {
    let defaults = WidgetConfig::default();

    let refresh_interval_ms = match attributes.get(ATTR_REFRESH_INTERVAL) {
        Some(raw) => parse_interval(raw)?,
        None => defaults.refresh_interval_ms,
    };

    Ok(WidgetConfig {
        source_url: attributes
            .get(ATTR_SRC)
            .map(str::to_string)
            .unwrap_or(defaults.source_url),
        response_key: attributes
            .get(ATTR_KEY)
            .map(str::to_string)
            .unwrap_or(defaults.response_key),
        show_loading_indicator: is_exactly_true(attributes.get(ATTR_SHOW_LOADING)),
        auto_refresh_enabled: is_exactly_true(attributes.get(ATTR_AUTO_REFRESH)),
        refresh_interval_ms,
        show_stop_control: attributes.get(ATTR_SHOW_STOP_BUTTON) != Some("false"),
        push_mode_enabled: is_truthy(attributes.get(ATTR_SSE)),
        color: attributes.get(ATTR_COLOR).map(str::to_string),
    })
}

fn is_exactly_true(value: Option<&str>) -> bool {
    value == Some("true")
}

fn is_truthy(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let v = v.trim();
            !v.eq_ignore_ascii_case("false") && v != "0"
        }
        None => false,
    }
}

fn parse_interval(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidRefreshInterval {
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
