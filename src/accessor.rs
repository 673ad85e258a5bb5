//! Read, write, and clone snapshot trees by [`Path`].
//!
//! Reads never fail: a missing segment, or one that indexes into the wrong
//! kind of node, resolves to `None`. Writes return a new root and leave the
//! input untouched; only the containers along the written path are copied.

use crate::error::InvalidPathError;
use crate::node::{Map, Node};
use crate::path::{Path, Segment};
use std::sync::Arc;

/// Returns the node at `path`, or `None` when any segment fails to resolve.
///
/// An index segment against a mapping looks up its decimal key. Wildcard
/// segments never resolve.
pub fn get<'a>(root: &'a Node, path: &Path) -> Option<&'a Node> {
    path.segments()
        .iter()
        .try_fold(root, |node, seg| match (node, seg) {
            (Node::Object(map), Segment::Field(name)) => map.get(name),
            (Node::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
            (Node::Array(items), Segment::Index(i)) => items.get(*i),
            _ => None,
        })
}

/// Like [`get`], parsing `path` first. Malformed path text resolves to `None`.
pub fn get_str<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    Path::parse(path).ok().and_then(|p| get(root, &p))
}

/// Returns a snapshot equal to `root` except that `path` holds `value`.
///
/// Missing intermediate segments create a sequence when the following segment
/// is an index and a mapping otherwise; `null` intermediates count as missing.
/// Writing index `len` of a sequence appends.
pub fn set(root: &Node, path: &Path, value: Node) -> Result<Node, InvalidPathError> {
    let (next, ()) = update(root, path, |slot| {
        *slot = value;
        Ok(())
    })?;
    Ok(next)
}

/// Copies the spine down to `path` (creating it as [`set`] does) and hands
/// the slot there to `edit`. The input snapshot is never modified, even when
/// `edit` fails.
pub fn update<R, F>(root: &Node, path: &Path, edit: F) -> Result<(Node, R), InvalidPathError>
where
    F: FnOnce(&mut Node) -> Result<R, InvalidPathError>,
{
    if !path.is_concrete() {
        return Err(InvalidPathError::Wildcard {
            path: path.to_string(),
        });
    }
    let mut next = root.clone();
    let slot = slot_mut(&mut next, path, 0)?;
    let out = edit(slot)?;
    Ok((next, out))
}

fn slot_mut<'a>(
    node: &'a mut Node,
    path: &Path,
    depth: usize,
) -> Result<&'a mut Node, InvalidPathError> {
    let Some(seg) = path.segments().get(depth) else {
        return Ok(node);
    };

    if node.is_null() {
        *node = match seg {
            Segment::Index(_) => Node::array(Vec::new()),
            _ => Node::object(Map::new()),
        };
    }

    let child = match (node, seg) {
        (Node::Object(map), seg) => Arc::make_mut(map).entry(seg.to_string()).or_default(),
        (Node::Array(items), Segment::Index(i)) => {
            let items = Arc::make_mut(items);
            if *i > items.len() {
                return Err(InvalidPathError::Sparse {
                    path: path.prefix(depth).to_string(),
                    index: *i,
                    len: items.len(),
                });
            }
            if *i == items.len() {
                items.push(Node::Null);
            }
            &mut items[*i]
        }
        (Node::Array(_), seg) => {
            return Err(InvalidPathError::FieldOnSequence {
                path: path.prefix(depth).to_string(),
                segment: seg.to_string(),
            });
        }
        (_, seg) => {
            return Err(InvalidPathError::NotAContainer {
                path: path.prefix(depth).to_string(),
                segment: seg.to_string(),
            });
        }
    };
    slot_mut(child, path, depth + 1)
}

/// Deep, sharing-free copy of `root`.
pub fn clone_deep(root: &Node) -> Node {
    match root {
        Node::Array(items) => Node::array(items.iter().map(clone_deep).collect()),
        Node::Object(map) => Node::object(
            map.iter()
                .map(|(k, v)| (k.clone(), clone_deep(v)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Edits the sequence at `path`. An absent or `null` slot becomes an empty
/// sequence first.
pub fn update_sequence<R, F>(root: &Node, path: &Path, edit: F) -> Result<(Node, R), InvalidPathError>
where
    F: FnOnce(&mut Vec<Node>) -> R,
{
    update(root, path, |slot| {
        if slot.is_null() {
            *slot = Node::array(Vec::new());
        }
        match slot {
            Node::Array(items) => Ok(edit(Arc::make_mut(items))),
            other => Err(InvalidPathError::NotASequence {
                path: path.to_string(),
                found: other.kind(),
            }),
        }
    })
}

/// Appends `item` to the sequence at `path`, creating the sequence if absent.
pub fn push(root: &Node, path: &Path, item: Node) -> Result<Node, InvalidPathError> {
    let (next, ()) = update_sequence(root, path, |items| items.push(item))?;
    Ok(next)
}

/// Removes the last element of the sequence at `path`.
///
/// An absent path, `null`, or an empty sequence yields the input unchanged and
/// `None`.
pub fn pop(root: &Node, path: &Path) -> Result<(Node, Option<Node>), InvalidPathError> {
    match get(root, path) {
        None | Some(Node::Null) => return Ok((root.clone(), None)),
        Some(Node::Array(items)) if items.is_empty() => return Ok((root.clone(), None)),
        Some(Node::Array(_)) => {}
        Some(other) => {
            return Err(InvalidPathError::NotASequence {
                path: path.to_string(),
                found: other.kind(),
            });
        }
    }
    update_sequence(root, path, |items| items.pop())
}
