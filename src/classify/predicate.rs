//! Tool-name matching.
//!
//! Provider-executed tools are recognised by name as a fallback when events
//! or persisted parts lack an explicit flag. This is a heuristic: a local tool
//! named `web_search_helper` matches `web_search` too.

use std::fmt;

use regex::Regex;

use crate::config::DEFAULT_PROVIDER_TOOL;
use crate::error::Result;

/// Prefix selecting regex syntax in [`ToolNamePredicate::parse`].
pub const REGEX_PREFIX: &str = "re:";

#[derive(Debug, Clone)]
enum Matcher {
    Contains(String),
    Pattern(Regex),
}

/// Matches tool names against a substring or a regular expression.
#[derive(Debug, Clone)]
pub struct ToolNamePredicate {
    matcher: Matcher,
}

impl ToolNamePredicate {
    /// Match names containing `needle`.
    pub fn contains(needle: impl Into<String>) -> Self {
        Self {
            matcher: Matcher::Contains(needle.into()),
        }
    }

    /// Match names against a regular expression.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self {
            matcher: Matcher::Pattern(Regex::new(pattern)?),
        })
    }

    /// `re:<pattern>` selects a regex, anything else is a substring.
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.strip_prefix(REGEX_PREFIX) {
            Some(pattern) => Self::regex(pattern),
            None => Ok(Self::contains(spec)),
        }
    }

    pub fn matches(&self, tool_name: &str) -> bool {
        match &self.matcher {
            Matcher::Contains(needle) => tool_name.contains(needle.as_str()),
            Matcher::Pattern(re) => re.is_match(tool_name),
        }
    }
}

impl Default for ToolNamePredicate {
    fn default() -> Self {
        Self::contains(DEFAULT_PROVIDER_TOOL)
    }
}

impl fmt::Display for ToolNamePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matcher {
            Matcher::Contains(needle) => write!(f, "contains '{needle}'"),
            Matcher::Pattern(re) => write!(f, "matches /{}/", re.as_str()),
        }
    }
}
