//! Route patterns: parsing, matching and URL generation
//!
//! A pattern is the effective path of a route entry split into typed
//! segments. Supported segment syntax:
//!
//! - `devices` static text
//! - `:id` required parameter
//! - `:id?` optional parameter
//! - `*rest` catch-all (one or more remaining segments)

use std::fmt;

use crate::path::segments;
use crate::Params;

/// A single typed segment of a route pattern
///
/// # Examples
///
/// ```
/// use devroute_router::route::pattern::{classify_segment, PatternSegment};
///
/// assert!(matches!(classify_segment("devices"), PatternSegment::Static(_)));
/// assert!(matches!(classify_segment(":id"), PatternSegment::Required(_)));
/// assert!(matches!(classify_segment(":id?"), PatternSegment::Optional(_)));
/// assert!(matches!(classify_segment("*rest"), PatternSegment::CatchAll(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    Static(String),
    Required(String),
    Optional(String),
    CatchAll(String),
}

impl fmt::Display for PatternSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSegment::Static(s) => write!(f, "{}", s),
            PatternSegment::Required(name) => write!(f, ":{}", name),
            PatternSegment::Optional(name) => write!(f, ":{}?", name),
            PatternSegment::CatchAll(name) => write!(f, "*{}", name),
        }
    }
}

/// Classifies one path segment (pure function)
pub fn classify_segment(segment: &str) -> PatternSegment {
    if let Some(name) = segment.strip_prefix('*') {
        return PatternSegment::CatchAll(name.to_string());
    }

    match segment.strip_prefix(':') {
        Some(param) => match param.strip_suffix('?') {
            Some(name) => PatternSegment::Optional(name.to_string()),
            None => PatternSegment::Required(param.to_string()),
        },
        None => PatternSegment::Static(segment.to_string()),
    }
}

/// A parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<PatternSegment>,
}

impl Pattern {
    /// Parses a canonical effective path such as `/devices/:id`
    pub fn parse(path: &str) -> Self {
        let segments: Vec<PatternSegment> = segments(path).into_iter().map(classify_segment).collect();
        let raw = if segments.is_empty() {
            "/".to_string()
        } else {
            segments
                .iter()
                .map(|s| format!("/{}", s))
                .collect::<String>()
        };

        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Names of all parameters, in pattern order
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|seg| match seg {
                PatternSegment::Static(_) => None,
                PatternSegment::Required(n) | PatternSegment::Optional(n) | PatternSegment::CatchAll(n) => {
                    Some(n.as_str())
                }
            })
            .collect()
    }

    pub fn has_catch_all(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, PatternSegment::CatchAll(_)))
    }

    /// Matching priority (lower = tried first)
    ///
    /// Static patterns come first, then patterns with parameters (optional
    /// parameters after required ones), then catch-all patterns.
    pub fn priority(&self) -> usize {
        if self.has_catch_all() {
            return 1000 + self.segments.len();
        }

        self.segments
            .iter()
            .map(|seg| match seg {
                PatternSegment::Static(_) => 0,
                PatternSegment::Required(_) => 10,
                PatternSegment::Optional(_) => 11,
                PatternSegment::CatchAll(_) => 0,
            })
            .sum()
    }

    /// Matches a canonical path against this pattern
    ///
    /// Returns the extracted (percent-decoded) parameters on success.
    ///
    /// # Examples
    ///
    /// ```
    /// use devroute_router::route::pattern::Pattern;
    ///
    /// let pattern = Pattern::parse("/devices/:id");
    /// let params = pattern.matches("/devices/core%2D1", false).unwrap();
    /// assert_eq!(params.get("id").map(String::as_str), Some("core-1"));
    ///
    /// assert!(pattern.matches("/devices", false).is_none());
    /// assert!(pattern.matches("/DEVICES/x", true).is_some());
    /// ```
    pub fn matches(&self, path: &str, case_insensitive: bool) -> Option<Params> {
        let path_segments = segments(path);
        match_segments(&self.segments, &path_segments, Params::new(), case_insensitive)
    }

    /// Builds a concrete path by substituting parameters
    ///
    /// Returns `Err(param)` naming the first missing required parameter.
    ///
    /// ```
    /// use devroute_router::route::pattern::Pattern;
    /// use devroute_router::Params;
    ///
    /// let pattern = Pattern::parse("/devices/:id/:tab?");
    /// let mut params = Params::new();
    /// params.insert("id".to_string(), "r1".to_string());
    /// assert_eq!(pattern.generate(&params).unwrap(), "/devices/r1");
    ///
    /// assert_eq!(pattern.generate(&Params::new()).unwrap_err(), "id");
    /// ```
    pub fn generate(&self, params: &Params) -> Result<String, String> {
        let mut parts = Vec::with_capacity(self.segments.len());

        for seg in &self.segments {
            match seg {
                PatternSegment::Static(s) => parts.push(s.clone()),
                PatternSegment::Required(name) | PatternSegment::CatchAll(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty()).ok_or_else(|| name.clone())?;
                    parts.push(encode_value(value));
                }
                PatternSegment::Optional(name) => {
                    if let Some(value) = params.get(name).filter(|v| !v.is_empty()) {
                        parts.push(encode_value(value));
                    }
                }
            }
        }

        if parts.is_empty() {
            Ok("/".to_string())
        } else {
            Ok(format!("/{}", parts.join("/")))
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn segment_eq(pattern: &str, actual: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        pattern.eq_ignore_ascii_case(actual)
    } else {
        pattern == actual
    }
}

fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Encodes a parameter value, keeping `/` separators of catch-all values
fn encode_value(value: &str) -> String {
    value
        .split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Walks pattern and path segments simultaneously (tail recursive)
fn match_segments(
    pattern: &[PatternSegment],
    path: &[&str],
    mut params: Params,
    case_insensitive: bool,
) -> Option<Params> {
    let Some((seg, rest)) = pattern.split_first() else {
        return path.is_empty().then_some(params);
    };

    match seg {
        PatternSegment::CatchAll(name) => {
            if path.is_empty() {
                return None;
            }
            let joined = path.iter().map(|s| decode_segment(s)).collect::<Vec<_>>().join("/");
            params.insert(name.clone(), joined);
            Some(params)
        }
        PatternSegment::Optional(name) => {
            let Some((first, remaining)) = path.split_first() else {
                return match_segments(rest, path, params, case_insensitive);
            };

            // Prefer binding the segment, fall back to leaving the parameter out
            let mut consumed = params.clone();
            consumed.insert(name.clone(), decode_segment(first));
            match_segments(rest, remaining, consumed, case_insensitive)
                .or_else(|| match_segments(rest, path, params, case_insensitive))
        }
        PatternSegment::Required(name) => {
            let (first, remaining) = path.split_first()?;
            params.insert(name.clone(), decode_segment(first));
            match_segments(rest, remaining, params, case_insensitive)
        }
        PatternSegment::Static(expected) => {
            let (first, remaining) = path.split_first()?;
            if !segment_eq(expected, first, case_insensitive) {
                return None;
            }
            match_segments(rest, remaining, params, case_insensitive)
        }
    }
}
