//! UI filter chips and search boxes

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::errors::PanelError;
use crate::records::{AgentStatus, LogLevel, SessionStatus, SkillCategory};

/// A status/category chip: `ALL` or exactly one value of a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter<T> {
    All,
    Only(T),
}

impl<T> Default for StatusFilter<T> {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl<T: PartialEq> StatusFilter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr<Err = String>> FromStr for StatusFilter<T> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for StatusFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.pad("ALL"),
            StatusFilter::Only(value) => value.fmt(f),
        }
    }
}

impl<T: fmt::Display> Serialize for StatusFilter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a query parameter into a chip; absent means `ALL`
pub fn parse_chip<T>(field: &str, raw: Option<&str>) -> Result<StatusFilter<T>, PanelError>
where
    T: FromStr<Err = String>,
{
    match raw {
        None => Ok(StatusFilter::All),
        Some(value) => value.parse().map_err(|_| PanelError::InvalidFilter {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Case-insensitive substring search; blank input matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    needle: Option<String>,
}

impl SearchFilter {
    pub fn new(raw: Option<&str>) -> Self {
        let needle = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Self { needle }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_none()
    }

    /// True when any of `haystacks` contains the needle
    pub fn matches<'a, I>(&self, haystacks: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        match &self.needle {
            None => true,
            Some(needle) => haystacks
                .into_iter()
                .any(|h| h.to_lowercase().contains(needle.as_str())),
        }
    }
}

impl Serialize for SearchFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.needle.serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentFilter {
    pub status: StatusFilter<AgentStatus>,
    pub search: SearchFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionFilter {
    pub status: StatusFilter<SessionStatus>,
    pub search: SearchFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillFilter {
    pub category: StatusFilter<SkillCategory>,
    pub enabled_only: bool,
    pub search: SearchFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogFilter {
    /// Exact level chip
    pub level: StatusFilter<LogLevel>,
    /// Drop everything less severe than this
    pub min_level: Option<LogLevel>,
    /// Exact source tag, case-insensitive
    pub source: Option<String>,
    pub search: SearchFilter,
    /// Keep only the last N matching lines
    pub tail: Option<usize>,
}
