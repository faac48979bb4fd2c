// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Thin shim over a tree-sitter concrete syntax tree (spec §4.1).
//!
//! [`CstNode`] never owns data: it borrows a `tree_sitter::Node` from the
//! parse tree, and callers pass the source bytes separately wherever text
//! needs to be sliced out. This keeps the adapter language-neutral: a
//! [`cpg_translate`](../cpg_translate/index.html) language visitor only ever
//! sees `kind()` strings and generic child-access operations, never a
//! generated grammar type.

use cpg_core::range::{Point, Range};

/// A borrowed view over one node in a parsed tree.
#[derive(Clone, Copy)]
pub struct CstNode<'tree> {
    inner: tree_sitter::Node<'tree>,
}

impl<'tree> CstNode<'tree> {
    pub fn root(tree: &'tree tree_sitter::Tree) -> Self {
        CstNode {
            inner: tree.root_node(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    pub fn named(&self) -> bool {
        self.inner.is_named()
    }

    pub fn child_count(&self) -> usize {
        self.inner.child_count()
    }

    pub fn child(&self, i: usize) -> Option<CstNode<'tree>> {
        self.inner.child(i).map(|inner| CstNode { inner })
    }

    pub fn named_child(&self, i: usize) -> Option<CstNode<'tree>> {
        self.inner.named_child(i).map(|inner| CstNode { inner })
    }

    pub fn named_child_count(&self) -> usize {
        self.inner.named_child_count()
    }

    pub fn field_child(&self, field_name: &str) -> Option<CstNode<'tree>> {
        self.inner
            .child_by_field_name(field_name)
            .map(|inner| CstNode { inner })
    }

    /// All direct named children whose kind equals `kind`.
    pub fn children_of_kind(&self, kind: &str) -> Vec<CstNode<'tree>> {
        let mut out = Vec::new();
        for i in 0..self.named_child_count() {
            if let Some(child) = self.named_child(i) {
                if child.kind() == kind {
                    out.push(child);
                }
            }
        }
        out
    }

    /// Depth-first search for the first descendant (including self) whose
    /// kind equals `kind`.
    pub fn subtree_first_of_kind(&self, kind: &str) -> Option<CstNode<'tree>> {
        if self.kind() == kind {
            return Some(*self);
        }
        for i in 0..self.child_count() {
            if let Some(child) = self.child(i) {
                if let Some(found) = child.subtree_first_of_kind(kind) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All direct named children, in order.
    pub fn named_children(&self) -> Vec<CstNode<'tree>> {
        (0..self.named_child_count())
            .filter_map(|i| self.named_child(i))
            .collect()
    }

    pub fn byte_range(&self) -> (usize, usize) {
        (self.inner.start_byte(), self.inner.end_byte())
    }

    /// Slice the node's text out of `source`. Returns an empty string if the
    /// byte range is not valid UTF-8 (can happen across certain multi-byte
    /// boundaries in malformed input); callers never abort on this.
    pub fn text<'a>(&self, source: &'a [u8]) -> &'a str {
        let (start, end) = self.byte_range();
        std::str::from_utf8(&source[start..end]).unwrap_or_default()
    }

    pub fn position(&self) -> Range {
        let start = self.inner.start_position();
        let end = self.inner.end_position();
        Range::new(
            Point::new(start.row as u32, start.column as u32),
            Point::new(end.row as u32, end.column as u32),
        )
    }

    pub fn has_error(&self) -> bool {
        self.inner.has_error()
    }
}

/// Parse `source` with `language`, returning `None` on a degenerate parse
/// (no root, or tree-sitter internal failure) per spec §7 `ParseDegenerate`.
pub fn parse(language: tree_sitter::Language, source: &[u8]) -> Option<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&language).ok()?;
    parser.parse(source, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_a_python_tree() {
        let tree = parse(tree_sitter_python::LANGUAGE.into(), b"def f(x):\n    return x\n").unwrap();
        let root = CstNode::root(&tree);
        assert_eq!(root.kind(), "module");
        let func = root.subtree_first_of_kind("function_definition").unwrap();
        let name = func.field_child("name").unwrap();
        assert_eq!(name.text(b"def f(x):\n    return x\n"), "f");
    }
}
