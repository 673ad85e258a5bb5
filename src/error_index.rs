//! Path-keyed store of failure messages from the latest validation pass.

use crate::engine::Failure;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered multi-map from concrete path text to failure messages.
///
/// Paths keep the order in which they first failed; messages keep the order
/// their rules ran in, so `first` is the first failure for the path in the
/// pass that produced it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorIndex {
    entries: Vec<(String, Vec<String>)>,
}

impl ErrorIndex {
    pub fn new() -> Self {
        ErrorIndex::default()
    }

    pub fn from_failures(failures: impl IntoIterator<Item = Failure>) -> Self {
        let mut index = ErrorIndex::new();
        index.extend(failures);
        index
    }

    /// Discards everything and rebuilds from `failures`.
    pub fn replace(&mut self, failures: impl IntoIterator<Item = Failure>) {
        *self = ErrorIndex::from_failures(failures);
    }

    /// Forgets `prefix`, then records the failures at or below it. Failures
    /// outside `prefix` are ignored.
    pub fn merge_scoped(&mut self, prefix: &str, failures: impl IntoIterator<Item = Failure>) {
        self.forget(prefix);
        self.extend(
            failures
                .into_iter()
                .filter(|f| is_under(&f.path.to_string(), prefix)),
        );
    }

    /// Drops exactly `paths` (nested paths are kept), then records
    /// `failures`.
    pub fn refresh<'a>(
        &mut self,
        paths: impl IntoIterator<Item = &'a str>,
        failures: impl IntoIterator<Item = Failure>,
    ) {
        for path in paths {
            self.entries.retain(|(p, _)| p != path);
        }
        self.extend(failures);
    }

    fn extend(&mut self, failures: impl IntoIterator<Item = Failure>) {
        for failure in failures {
            self.push(failure.path.to_string(), failure.message);
        }
    }

    fn push(&mut self, path: String, message: String) {
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((path, vec![message])),
        }
    }

    pub fn has(&self, path: &str) -> bool {
        self.entries.iter().any(|(p, _)| p == path)
    }

    pub fn first(&self, path: &str) -> Option<&str> {
        self.all(path).first().map(String::as_str)
    }

    /// All messages for exactly `path`; empty when it has none.
    pub fn all(&self, path: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, m)| m.as_slice())
            .unwrap_or_default()
    }

    /// Removes `prefix` and every path nested under it. The empty prefix
    /// clears the index.
    pub fn forget(&mut self, prefix: &str) {
        self.entries.retain(|(p, _)| !is_under(p, prefix));
    }

    /// True when `prefix` or anything nested under it has a failure.
    pub fn has_under(&self, prefix: &str) -> bool {
        self.entries.iter().any(|(p, _)| is_under(p, prefix))
    }

    /// Number of paths with failures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages across all paths.
    pub fn count(&self) -> usize {
        self.entries.iter().map(|(_, m)| m.len()).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(p, m)| (p.as_str(), m.as_slice()))
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

impl Serialize for ErrorIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, messages) in &self.entries {
            map.serialize_entry(path, messages)?;
        }
        map.end()
    }
}

impl FromIterator<Failure> for ErrorIndex {
    fn from_iter<I: IntoIterator<Item = Failure>>(iter: I) -> Self {
        ErrorIndex::from_failures(iter)
    }
}
