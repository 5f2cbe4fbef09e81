//! Navigation targets: the addressable part of a URL
//!
//! In hash mode the route lives in the fragment (`#/devices?tab=2`), in
//! history mode it is the URL path itself.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::normalize_path;

/// How locations are encoded in the address bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Route is the URL fragment: `https://host/#/devices`
    #[default]
    Hash,
    /// Route is the URL path: `https://host/devices`
    History,
}

/// A parsed navigation target
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Canonical route path, always starting with `/`
    pub path: String,
    /// Decoded query parameters
    pub query: BTreeMap<String, String>,
}

impl Location {
    /// Creates a location for a path with no query
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()).into_owned(),
            query: BTreeMap::new(),
        }
    }

    /// Adds a query parameter (builder style)
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Parses an address according to the history mode
    ///
    /// Accepts full URLs, bare fragments and bare paths.
    ///
    /// # Examples
    ///
    /// ```
    /// use devroute_router::{HistoryMode, Location};
    ///
    /// let loc = Location::parse("https://collector.local/#/devices?tab=2", HistoryMode::Hash);
    /// assert_eq!(loc.path, "/devices");
    /// assert_eq!(loc.query.get("tab").map(String::as_str), Some("2"));
    ///
    /// // An empty fragment is the root
    /// assert_eq!(Location::parse("#", HistoryMode::Hash).path, "/");
    ///
    /// let loc = Location::parse("/newdevice#ignored", HistoryMode::History);
    /// assert_eq!(loc.path, "/newdevice");
    /// ```
    pub fn parse(input: &str, mode: HistoryMode) -> Self {
        let target = match mode {
            HistoryMode::Hash => match input.split_once('#') {
                Some((_, fragment)) => fragment,
                // A URL without a fragment addresses the root
                None if input.contains("://") => "",
                None => input,
            },
            HistoryMode::History => {
                let without_fragment = input.split('#').next().unwrap_or("");
                strip_origin(without_fragment)
            }
        };

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, BTreeMap::new()),
        };

        Self {
            path: normalize_path(path).into_owned(),
            query,
        }
    }

    /// Formats the location as an href for the given mode
    ///
    /// ```
    /// use devroute_router::{HistoryMode, Location};
    ///
    /// let loc = Location::new("/devices").with_query("q", "core router");
    /// assert_eq!(loc.href(HistoryMode::Hash), "#/devices?q=core%20router");
    /// assert_eq!(loc.href(HistoryMode::History), "/devices?q=core%20router");
    /// ```
    pub fn href(&self, mode: HistoryMode) -> String {
        let prefix = match mode {
            HistoryMode::Hash => "#",
            HistoryMode::History => "",
        };

        if self.query.is_empty() {
            return format!("{}{}", prefix, self.path);
        }

        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}{}?{}", prefix, self.path, query)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href(HistoryMode::History))
    }
}

/// Drops `scheme://host` from an absolute URL, leaving the path
fn strip_origin(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/"),
        None => url,
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Percent-decodes a URL component, treating `+` as a space
///
/// Malformed encodings are kept verbatim.
pub(crate) fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hash_fragment() {
        let loc = Location::parse("#/devices", HistoryMode::Hash);
        assert_eq!(loc.path, "/devices");
        assert!(loc.query.is_empty());
    }

    #[test]
    fn test_parse_hash_without_marker_uses_input() {
        assert_eq!(Location::parse("/newdevice", HistoryMode::Hash).path, "/newdevice");
        assert_eq!(Location::parse("", HistoryMode::Hash).path, "/");
    }

    #[test]
    fn test_parse_hash_from_full_url() {
        let loc = Location::parse("http://localhost:8080/index.html#/newdevice/", HistoryMode::Hash);
        assert_eq!(loc.path, "/newdevice");
    }

    #[test]
    fn test_parse_hash_from_url_without_fragment() {
        assert_eq!(Location::parse("http://host/app", HistoryMode::Hash).path, "/");

        let loc = Location::parse("https://collector.local/index.html?x=1", HistoryMode::Hash);
        assert_eq!(loc.path, "/");
        assert!(loc.query.is_empty());
    }

    #[test]
    fn test_parse_history_strips_origin() {
        let loc = Location::parse("https://example.com/devices?x=1#top", HistoryMode::History);
        assert_eq!(loc.path, "/devices");
        assert_eq!(loc.query.get("x").map(String::as_str), Some("1"));

        assert_eq!(Location::parse("https://example.com", HistoryMode::History).path, "/");
    }

    #[test]
    fn test_query_decoding() {
        let loc = Location::parse("#/devices?name=core%2Drtr+1&flag", HistoryMode::Hash);
        assert_eq!(loc.query.get("name").map(String::as_str), Some("core-rtr 1"));
        assert_eq!(loc.query.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_malformed_encoding_kept() {
        assert_eq!(decode_component("%zz"), "%zz");
    }

    #[test]
    fn test_href_round_trip() {
        let loc = Location::new("/devices").with_query("tab", "stats");
        let href = loc.href(HistoryMode::Hash);
        assert_eq!(href, "#/devices?tab=stats");
        assert_eq!(Location::parse(&href, HistoryMode::Hash), loc);
    }
}
