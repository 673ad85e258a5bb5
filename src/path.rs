//! Dotted paths with numeric index and wildcard segments.
//!
//! `profile.addresses.0.street` addresses a concrete location;
//! `profile.addresses.*.street` is a schema pattern standing for every
//! element currently present in `profile.addresses`.

use crate::error::PathSyntaxError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The wildcard marker as it appears in path text.
pub const WILDCARD: &str = "*";

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Field(String),
    Index(usize),
    Wildcard,
}

impl Segment {
    fn parse(text: &str) -> Segment {
        if text == WILDCARD {
            return Segment::Wildcard;
        }
        // Only canonical decimal forms are indices so that display round-trips.
        let canonical = !text.is_empty()
            && text.bytes().all(|b| b.is_ascii_digit())
            && (text == "0" || !text.starts_with('0'));
        match text.parse::<usize>() {
            Ok(i) if canonical => Segment::Index(i),
            _ => Segment::Field(text.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Index(i) => write!(f, "{}", i),
            Segment::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// An ordered sequence of segments. The empty path is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root() -> Self {
        Path::default()
    }

    /// Parses dot-separated path text.
    ///
    /// The empty string is the root path. Empty segments (`a..b`, a leading or
    /// trailing dot) are rejected.
    pub fn parse(text: &str) -> Result<Path, PathSyntaxError> {
        if text.is_empty() {
            return Ok(Path::root());
        }
        let mut segments = Vec::new();
        for (i, part) in text.split('.').enumerate() {
            if part.is_empty() {
                return Err(PathSyntaxError {
                    path: text.to_string(),
                    reason: format!("empty segment at position {}", i),
                });
            }
            segments.push(Segment::parse(part));
        }
        Ok(Path { segments })
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Path { segments }
    }

    /// The first `depth` segments.
    pub fn prefix(&self, depth: usize) -> Path {
        Path {
            segments: self.segments[..depth.min(self.segments.len())].to_vec(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn is_concrete(&self) -> bool {
        !self.segments.contains(&Segment::Wildcard)
    }

    pub fn wildcard_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| **s == Segment::Wildcard)
            .count()
    }

    pub fn child(&self, segment: Segment) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Path { segments }
    }

    pub fn field(&self, name: &str) -> Path {
        self.child(Segment::Field(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Path {
        self.child(Segment::Index(index))
    }

    /// True when `prefix` equals this path or is one of its ancestors.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Replaces wildcards left to right with `indices`.
    ///
    /// Returns `None` when the path has more wildcards than indices supplied.
    /// Extra indices are ignored.
    pub fn bind(&self, indices: &[usize]) -> Option<Path> {
        let mut bound = indices.iter();
        let mut segments = Vec::with_capacity(self.segments.len());
        for seg in &self.segments {
            match seg {
                Segment::Wildcard => segments.push(Segment::Index(*bound.next()?)),
                other => segments.push(other.clone()),
            }
        }
        Some(Path { segments })
    }

    /// Treats `self` as a pattern: wildcards match any index, everything else
    /// must be equal.
    pub fn matches(&self, concrete: &Path) -> bool {
        self.segments.len() == concrete.segments.len()
            && self
                .segments
                .iter()
                .zip(&concrete.segments)
                .all(|(p, c)| match (p, c) {
                    (Segment::Wildcard, Segment::Index(_)) => true,
                    _ => p == c,
                })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Path::parse(&text).map_err(serde::de::Error::custom)
    }
}
