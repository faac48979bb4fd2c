//! The lexical scope stack (spec §3, §4.3).
//!
//! A [`Scope`] is never persisted; it only exists while a file is being
//! translated. Its `not_contained` set replaces what would otherwise be a
//! callback-based "attach this child once you know its real parent" — the
//! pop rule in [`ScopeStack::pop`] is total and deterministic.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use cpg_core::NodeId;

/// A name bound in some scope: the node it resolves to, plus the nested
/// `a.b.c` field chain hanging off of it. Shared via `Rc<RefCell<_>>` so
/// that resolving `a.b` twice extends the *same* field tree rather than
/// forking it (spec §8: "ResolveNameChain applied twice yields the same
/// terminal Field node id").
#[derive(Clone)]
pub struct Symbol {
    pub node: NodeId,
    pub fields: HashMap<String, Rc<RefCell<Symbol>>>,
}

pub type SymbolRef = Rc<RefCell<Symbol>>;

impl Symbol {
    pub fn new(node: NodeId) -> SymbolRef {
        Rc::new(RefCell::new(Symbol {
            node,
            fields: HashMap::new(),
        }))
    }
}

pub struct Scope {
    symbols: HashMap<String, SymbolRef>,
    rhs_vars: Option<HashSet<NodeId>>,
    not_contained: Vec<NodeId>,
}

impl Scope {
    fn new(rhs: bool) -> Self {
        Scope {
            symbols: HashMap::new(),
            rhs_vars: if rhs { Some(HashSet::new()) } else { None },
            not_contained: Vec::new(),
        }
    }

    pub fn is_rhs_capturing(&self) -> bool {
        self.rhs_vars.is_some()
    }

    /// Record `id` as an RHS participant, if this scope is RHS-capturing.
    /// A no-op otherwise, so callers never need to check first.
    pub fn capture_rhs(&mut self, id: NodeId) {
        if let Some(set) = &mut self.rhs_vars {
            set.insert(id);
        }
    }
}

pub struct ScopeStack {
    stack: Vec<Scope>,
}

impl ScopeStack {
    /// A fresh stack with one global scope for the file (spec §4.3:
    /// "bottom = global scope for that file").
    pub fn new() -> Self {
        ScopeStack {
            stack: vec![Scope::new(false)],
        }
    }

    pub fn push(&mut self, rhs: bool) {
        self.stack.push(Scope::new(rhs));
    }

    /// Pop the current scope. If `closing_parent` is given, every
    /// not-yet-parented id becomes a CONTAINS child of it (the caller emits
    /// those edges); otherwise they transfer to the new top scope's
    /// `not_contained`. Returns the popped scope's RHS set (empty if it
    /// wasn't RHS-capturing) and its not-yet-parented ids when there's no
    /// closing parent to hand them to directly.
    pub fn pop(&mut self, closing_parent: Option<NodeId>) -> (HashSet<NodeId>, Vec<NodeId>) {
        let popped = self.stack.pop().expect("scope underflow");
        let rhs_vars = popped.rhs_vars.unwrap_or_default();
        match closing_parent {
            Some(_) => (rhs_vars, popped.not_contained),
            None => {
                if let Some(parent) = self.stack.last_mut() {
                    parent.not_contained.extend(popped.not_contained);
                    (rhs_vars, Vec::new())
                } else {
                    (rhs_vars, popped.not_contained)
                }
            }
        }
    }

    fn current_mut(&mut self) -> &mut Scope {
        self.stack.last_mut().expect("scope underflow")
    }

    pub fn mark_not_contained(&mut self, id: NodeId) {
        self.current_mut().not_contained.push(id);
    }

    /// Remove `id` from every frame's `not_contained` list. Called whenever
    /// an explicit CONTAINS edge is emitted so a later pop never hands the
    /// same id a second CONTAINS parent (spec §3: CONTAINS is a forest).
    /// `id` may have bubbled up through one or more closing-parent-less pops
    /// since it was created, so every frame is checked rather than just the
    /// top one.
    pub fn mark_contained(&mut self, id: NodeId) {
        for scope in &mut self.stack {
            scope.not_contained.retain(|&pending| pending != id);
        }
    }

    pub fn capture_rhs(&mut self, id: NodeId) {
        self.current_mut().capture_rhs(id);
    }

    pub fn current_is_rhs_capturing(&self) -> bool {
        self.stack.last().map(Scope::is_rhs_capturing).unwrap_or(false)
    }

    /// Bind `name` to a fresh symbol wrapping `node` in the *current* scope,
    /// overwriting any existing binding for that name in this scope only
    /// (shadowing, not mutation of an outer binding).
    pub fn bind(&mut self, name: &str, node: NodeId) -> SymbolRef {
        let symbol = Symbol::new(node);
        self.current_mut().symbols.insert(name.to_string(), symbol.clone());
        symbol
    }

    /// Walk the scope chain from innermost to outermost looking for `name`.
    pub fn resolve(&self, name: &str) -> Option<SymbolRef> {
        self.stack
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name).cloned())
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut stack = ScopeStack::new();
        stack.bind("x", NodeId::new(1, 1));
        stack.push(false);
        stack.bind("x", NodeId::new(1, 2));
        assert_eq!(stack.resolve("x").unwrap().borrow().node, NodeId::new(1, 2));
        stack.pop(None);
        assert_eq!(stack.resolve("x").unwrap().borrow().node, NodeId::new(1, 1));
    }

    #[test]
    fn not_contained_transfers_to_parent_without_closing_parent() {
        let mut stack = ScopeStack::new();
        stack.push(false);
        stack.mark_not_contained(NodeId::new(1, 5));
        let (_, leftover) = stack.pop(None);
        assert!(leftover.is_empty());
        // it moved to the parent scope, not lost
        let (_, leftover_root) = stack.pop(Some(NodeId::new(1, 99)));
        assert_eq!(leftover_root, vec![NodeId::new(1, 5)]);
    }

    #[test]
    fn not_contained_returned_directly_with_closing_parent() {
        let mut stack = ScopeStack::new();
        stack.push(false);
        stack.mark_not_contained(NodeId::new(1, 5));
        let (_, leftover) = stack.pop(Some(NodeId::new(1, 10)));
        assert_eq!(leftover, vec![NodeId::new(1, 5)]);
    }
}
