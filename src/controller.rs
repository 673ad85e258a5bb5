//! The form controller: single owner of form data and its error index.
//!
//! Every event runs to completion and publishes a new [`FormState`]; the data
//! and the errors in one state always belong together. A rejected event leaves
//! the previous state in place.

use crate::accessor;
use crate::config::FormConfig;
use crate::engine::{self, Failure};
use crate::error::{FormError, InvalidPathError, SchemaError};
use crate::error_index::ErrorIndex;
use crate::node::Node;
use crate::path::{Path, Segment};
use crate::schema::RuleSchema;
use std::sync::Arc;

/// One published (data, errors) pair.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub data: Node,
    pub errors: Arc<ErrorIndex>,
    /// Incremented on every published change.
    pub revision: u64,
}

/// Owns form data and errors and applies mutation events to them.
#[derive(Clone, Debug)]
pub struct FormController {
    schema: RuleSchema,
    config: FormConfig,
    state: FormState,
}

impl FormController {
    pub fn new(data: impl Into<Node>, schema: RuleSchema) -> Self {
        FormController::with_config(data, schema, FormConfig::default())
    }

    pub fn with_config(data: impl Into<Node>, schema: RuleSchema, config: FormConfig) -> Self {
        FormController {
            schema,
            config,
            state: FormState {
                data: data.into(),
                errors: Arc::default(),
                revision: 0,
            },
        }
    }

    // ─── Read API ───────────────────────────────────────────────────────────

    pub fn data(&self) -> &Node {
        &self.state.data
    }

    pub fn errors(&self) -> &ErrorIndex {
        &self.state.errors
    }

    /// Cheap handle on the current published state.
    pub fn state(&self) -> FormState {
        self.state.clone()
    }

    pub fn revision(&self) -> u64 {
        self.state.revision
    }

    pub fn schema(&self) -> &RuleSchema {
        &self.schema
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Value at `path`, if present.
    pub fn value(&self, path: &str) -> Option<&Node> {
        accessor::get_str(&self.state.data, path)
    }

    // ─── Events ─────────────────────────────────────────────────────────────

    /// Writes `value` at `path`.
    pub fn change(&mut self, path: &str, value: impl Into<Node>) -> Result<(), FormError> {
        let target = parse(path)?;
        let data = accessor::set(&self.state.data, &target, value.into())
            .inspect_err(|e| tracing::warn!(path, error = %e, "rejected change"))?;
        self.commit_write(data, &target, None)
    }

    /// Reports that the field at `path` lost focus.
    pub fn blur(&mut self, path: &str) -> Result<(), FormError> {
        if self.config.validates_on_blur() {
            self.validate_path(path)?;
        }
        Ok(())
    }

    /// Appends `item` to the sequence at `list_path` and returns its index.
    pub fn add_list_item(&mut self, list_path: &str, item: impl Into<Node>) -> Result<usize, FormError> {
        let target = parse(list_path)?;
        let item = item.into();
        let (data, index) = accessor::update_sequence(&self.state.data, &target, |items| {
            items.push(item);
            items.len() - 1
        })
        .inspect_err(|e| tracing::warn!(path = list_path, error = %e, "rejected list append"))?;
        self.commit_write(data, &target, None)?;
        Ok(index)
    }

    /// Removes the last element of the sequence at `list_path` and forgets
    /// every error recorded under the removed index.
    ///
    /// Returns the removed element, or `None` when the list was empty, null,
    /// or absent.
    pub fn remove_list_item(&mut self, list_path: &str) -> Result<Option<Node>, FormError> {
        let target = parse(list_path)?;
        let (data, removed) = accessor::pop(&self.state.data, &target)
            .inspect_err(|e| tracing::warn!(path = list_path, error = %e, "rejected list removal"))?;
        let Some(removed) = removed else {
            return Ok(None);
        };

        // The popped element was the last one, so its index is the new length.
        let index = accessor::get(&data, &target)
            .and_then(Node::as_array)
            .map_or(0, <[Node]>::len);
        let stale = target.child(Segment::Index(index)).to_string();
        let mut errors = (*self.state.errors).clone();
        errors.forget(&stale);
        tracing::debug!(path = list_path, index, "removed list item");

        self.commit_write(data, &target, Some(errors))?;
        Ok(Some(removed))
    }

    /// Adds `item` to the sequence at `path` when `present` and missing, or
    /// removes it when `!present` and found. Returns whether anything changed.
    pub fn toggle_set_membership(
        &mut self,
        path: &str,
        item: impl Into<Node>,
        present: bool,
    ) -> Result<bool, FormError> {
        let target = parse(path)?;
        let item = item.into();

        let position = match accessor::get(&self.state.data, &target) {
            None | Some(Node::Null) => None,
            Some(Node::Array(items)) => items.iter().position(|v| v.loosely_equals(&item)),
            Some(other) => {
                return Err(FormError::InvalidPath(InvalidPathError::NotASequence {
                    path: path.to_string(),
                    found: other.kind(),
                }));
            }
        };

        let (data, ()) = match (present, position) {
            (true, None) => accessor::update_sequence(&self.state.data, &target, |items| {
                items.push(item)
            })?,
            (false, Some(i)) => accessor::update_sequence(&self.state.data, &target, |items| {
                items.remove(i);
            })?,
            _ => return Ok(false),
        };
        self.commit_write(data, &target, None)?;
        Ok(true)
    }

    /// Runs the full schema against the current data and replaces the error
    /// index. Returns `true` when nothing failed.
    pub fn validate(&mut self) -> Result<bool, SchemaError> {
        let failures = engine::run(&self.schema, &self.state.data)?;
        let errors = ErrorIndex::from_failures(failures);
        let valid = errors.is_empty();
        tracing::debug!(failed_paths = errors.len(), valid, "validated form");
        self.publish(self.state.data.clone(), Some(errors));
        Ok(valid)
    }

    /// Re-validates `path` and everything below it, plus rules elsewhere that
    /// reference it, leaving other errors untouched. Returns `true` when
    /// nothing at or below `path` failed.
    pub fn validate_path(&mut self, path: &str) -> Result<bool, FormError> {
        let target = parse(path)?;
        let errors = self.scoped_errors(&self.state.data, &target, &self.state.errors)?;
        let valid = !errors.has_under(&target.to_string());
        self.publish(self.state.data.clone(), Some(errors));
        Ok(valid)
    }

    /// Swaps in new data and clears all errors.
    pub fn replace_data(&mut self, data: impl Into<Node>) {
        self.publish(data.into(), Some(ErrorIndex::new()));
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    /// Publishes a write, running a scoped pass first in change mode. Nothing
    /// is published if that pass fails on the schema.
    fn commit_write(
        &mut self,
        data: Node,
        target: &Path,
        errors: Option<ErrorIndex>,
    ) -> Result<(), FormError> {
        let errors = if self.config.validates_on_change() {
            let base = errors.unwrap_or_else(|| (*self.state.errors).clone());
            Some(self.scoped_errors(&data, target, &base)?)
        } else {
            errors
        };
        self.publish(data, errors);
        Ok(())
    }

    fn scoped_errors(
        &self,
        data: &Node,
        scope: &Path,
        base: &ErrorIndex,
    ) -> Result<ErrorIndex, SchemaError> {
        let resolved = engine::expand(&self.schema, data)?.scoped(scope);
        let failures = engine::evaluate(&resolved, data);
        let (inside, dependents): (Vec<Failure>, Vec<Failure>) =
            failures.into_iter().partition(|f| f.path.starts_with(scope));
        let dependent_paths: Vec<String> = resolved
            .paths()
            .filter(|p| !p.starts_with(scope))
            .map(Path::to_string)
            .collect();
        tracing::trace!(
            scope = %scope,
            dependents = dependent_paths.len(),
            "scoped validation pass"
        );

        let mut errors = base.clone();
        errors.merge_scoped(&scope.to_string(), inside);
        errors.refresh(dependent_paths.iter().map(String::as_str), dependents);
        Ok(errors)
    }

    fn publish(&mut self, data: Node, errors: Option<ErrorIndex>) {
        let errors = match errors {
            Some(e) => Arc::new(e),
            None => Arc::clone(&self.state.errors),
        };
        self.state = FormState {
            data,
            errors,
            revision: self.state.revision + 1,
        };
    }
}

fn parse(path: &str) -> Result<Path, FormError> {
    Ok(Path::parse(path)?)
}
