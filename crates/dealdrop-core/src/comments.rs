// ── Nested discussion threads ──
//
// Comments are kept in an id-keyed arena with child lists, so replies can
// be inserted, edited, and removed without recursive ownership.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Comment, CommentId};

#[derive(Debug, Clone)]
struct Node {
    comment: Comment,
    children: Vec<CommentId>,
}

/// A discussion thread for one deal.
#[derive(Debug, Clone, Default)]
pub struct CommentTree {
    nodes: IndexMap<CommentId, Node>,
    roots: Vec<CommentId>,
}

/// One row of a depth-first walk.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadEntry<'a> {
    pub depth: usize,
    pub comment: &'a Comment,
}

impl CommentTree {
    /// Build a tree from a flat list. Comments whose parent is unknown
    /// (or whose parent chain loops back to them) become roots. Sibling
    /// order follows input order.
    pub fn from_comments(comments: impl IntoIterator<Item = Comment>) -> Self {
        let mut tree = Self::default();
        for comment in comments {
            tree.nodes.insert(
                comment.id.clone(),
                Node {
                    comment,
                    children: Vec::new(),
                },
            );
        }

        let ids: Vec<CommentId> = tree.nodes.keys().cloned().collect();
        for id in ids {
            let parent = tree
                .nodes
                .get(&id)
                .and_then(|n| n.comment.parent_id.clone())
                .filter(|p| tree.nodes.contains_key(p) && !tree.leads_to(p, &id));

            match parent {
                Some(parent) => {
                    if let Some(node) = tree.nodes.get_mut(&parent) {
                        node.children.push(id);
                    }
                }
                None => {
                    if let Some(node) = tree.nodes.get_mut(&id) {
                        node.comment.parent_id = None;
                    }
                    tree.roots.push(id);
                }
            }
        }
        tree
    }

    /// Whether walking up from `start` reaches `target`.
    fn leads_to(&self, start: &CommentId, target: &CommentId) -> bool {
        let mut current = Some(start);
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == target => return true,
                Some(id) => {
                    current = self
                        .nodes
                        .get(id)
                        .and_then(|n| n.comment.parent_id.as_ref());
                }
                None => return false,
            }
        }
        // A loop above `start` that never reaches `target`; its members
        // are broken when they are placed themselves.
        false
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &CommentId) -> Option<&Comment> {
        self.nodes.get(id).map(|n| &n.comment)
    }

    /// Direct replies to a comment, in thread order.
    pub fn replies(&self, id: &CommentId) -> Vec<&Comment> {
        self.nodes
            .get(id)
            .map(|n| n.children.iter().filter_map(|c| self.get(c)).collect())
            .unwrap_or_default()
    }

    /// Add a comment. Replies go last under their parent; an unknown
    /// parent is an error.
    pub fn insert(&mut self, comment: Comment) -> Result<(), CoreError> {
        if self.nodes.contains_key(&comment.id) {
            return Err(CoreError::validation(format!(
                "comment {} already exists",
                comment.id
            )));
        }
        match &comment.parent_id {
            Some(parent) => {
                let node = self
                    .nodes
                    .get_mut(parent)
                    .ok_or_else(|| CoreError::not_found("Comment", parent.as_str()))?;
                node.children.push(comment.id.clone());
            }
            None => self.roots.push(comment.id.clone()),
        }
        self.nodes.insert(
            comment.id.clone(),
            Node {
                comment,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Replace a comment's body.
    pub fn edit(&mut self, id: &CommentId, body: impl Into<String>) -> Result<(), CoreError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("Comment", id.as_str()))?;
        node.comment.body = body.into();
        Ok(())
    }

    /// Remove a comment and all of its replies; returns what was removed,
    /// parent first.
    pub fn remove(&mut self, id: &CommentId) -> Result<Vec<Comment>, CoreError> {
        let parent = self
            .nodes
            .get(id)
            .ok_or_else(|| CoreError::not_found("Comment", id.as_str()))?
            .comment
            .parent_id
            .clone();

        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(node) => node.children.retain(|c| c != id),
            None => self.roots.retain(|c| c != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.shift_remove(&next) {
                stack.extend(node.children.into_iter().rev());
                removed.push(node.comment);
            }
        }
        Ok(removed)
    }

    /// Depth-first, pre-order walk. Roots have depth 0.
    pub fn walk(&self) -> Vec<ThreadEntry<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, &CommentId)> =
            self.roots.iter().rev().map(|id| (0, id)).collect();
        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(ThreadEntry {
                depth,
                comment: &node.comment,
            });
            stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn c(id: &str, parent: Option<&str>) -> Comment {
        Comment::new(id, parent.map(CommentId::new), format!("body {id}"))
    }

    fn shape(tree: &CommentTree) -> Vec<(usize, String)> {
        tree.walk()
            .into_iter()
            .map(|e| (e.depth, e.comment.id.to_string()))
            .collect()
    }

    #[test]
    fn builds_nested_thread_in_input_order() {
        let tree = CommentTree::from_comments(vec![
            c("a", None),
            c("b", None),
            c("a2", Some("a")),
            c("a1", Some("a")),
            c("a1x", Some("a1")),
        ]);
        assert_eq!(
            shape(&tree),
            vec![
                (0, "a".into()),
                (1, "a2".into()),
                (1, "a1".into()),
                (2, "a1x".into()),
                (0, "b".into()),
            ]
        );
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn orphans_and_cycles_become_roots() {
        let tree = CommentTree::from_comments(vec![
            c("orphan", Some("gone")),
            c("x", Some("y")),
            c("y", Some("x")),
        ]);
        let roots = tree.walk().iter().filter(|e| e.depth == 0).count();
        assert_eq!(roots, 2);
        assert_eq!(tree.walk().len(), 3);
        assert_eq!(tree.get(&CommentId::new("orphan")).and_then(|c| c.parent_id.clone()), None);
    }

    #[test]
    fn comment_above_a_cycle_keeps_its_parent() {
        // a -> b -> c -> b: only b and c form the loop.
        let tree = CommentTree::from_comments(vec![
            c("a", Some("b")),
            c("b", Some("c")),
            c("c", Some("b")),
        ]);
        assert_eq!(
            shape(&tree),
            vec![(0, "b".into()), (1, "a".into()), (1, "c".into())]
        );
        assert_eq!(
            tree.get(&CommentId::new("a")).and_then(|c| c.parent_id.clone()),
            Some(CommentId::new("b"))
        );
    }

    #[test]
    fn insert_reply_requires_known_parent() {
        let mut tree = CommentTree::from_comments(vec![c("a", None)]);
        tree.insert(c("r", Some("a"))).expect("reply");
        assert_eq!(tree.replies(&CommentId::new("a")).len(), 1);

        let err = tree.insert(c("lost", Some("nope"))).expect_err("unknown parent");
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(tree.insert(c("a", None)).is_err());
    }

    #[test]
    fn remove_takes_the_subtree() {
        let mut tree = CommentTree::from_comments(vec![
            c("a", None),
            c("a1", Some("a")),
            c("a1x", Some("a1")),
            c("b", None),
        ]);
        let removed = tree.remove(&CommentId::new("a1")).expect("remove");
        let ids: Vec<_> = removed.iter().map(|c| c.id.to_string()).collect();
        assert_eq!(ids, vec!["a1", "a1x"]);
        assert_eq!(shape(&tree), vec![(0, "a".into()), (0, "b".into())]);
        assert!(tree.remove(&CommentId::new("a1")).is_err());
    }

    #[test]
    fn edit_changes_body_only() {
        let mut tree = CommentTree::from_comments(vec![c("a", None)]);
        tree.edit(&CommentId::new("a"), "updated").expect("edit");
        assert_eq!(tree.get(&CommentId::new("a")).map(|c| c.body.as_str()), Some("updated"));
    }
}
