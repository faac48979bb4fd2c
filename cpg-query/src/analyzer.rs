//! Graph-shaped read operations (spec §4.6) that the flat Reader can't
//! express in one edge hop: call graphs, data-flow reachability, field
//! accessor classification, inheritance trees, and blast-radius impact.
//!
//! Every traversal checks `cancel` between record iterations, per the
//! concurrency model: long-running queries over a large graph must be
//! abortable without waiting for the whole walk to finish.

use std::collections::{HashSet, VecDeque};

use cpg_core::{CancellationFlag, NodeId};
use cpg_store::GraphReadModel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// One hop of a call-graph walk: `caller` reaches `callee` at `depth` hops
/// from the root (root itself is depth 0, not included in `edges`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallEdge {
    pub caller: NodeId,
    pub callee: NodeId,
    pub depth: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallGraph {
    pub edges: Vec<CallEdge>,
    /// Set once the walk hit `max_depth` with more frontier left to visit.
    pub truncated: bool,
}

pub struct Analyzer<'a, R: GraphReadModel> {
    store: &'a R,
}

impl<'a, R: GraphReadModel> Analyzer<'a, R> {
    pub fn new(store: &'a R) -> Self {
        Analyzer { store }
    }

    /// Walks `CALLS_FUNCTION` out to `max_depth` hops. `direction` picks
    /// which edge end is the "caller": `Outgoing` follows `root` calling
    /// others (callees), `Incoming` follows others calling `root`
    /// (callers), `Both` follows either at every hop.
    pub fn call_graph(
        &self,
        root: NodeId,
        direction: Direction,
        max_depth: u32,
        cancel: &dyn CancellationFlag,
    ) -> cpg_core::Result<CallGraph> {
        let mut edges = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(root);
        let mut frontier = VecDeque::new();
        frontier.push_back((root, 0u32));
        let mut truncated = false;

        while let Some((node, depth)) = frontier.pop_front() {
            cancel.check("call_graph:frontier")?;
            if depth >= max_depth {
                if direction != Direction::Incoming && !self.store.outgoing(node, "CALLS_FUNCTION").is_empty() {
                    truncated = true;
                }
                if direction != Direction::Outgoing && !self.store.incoming(node, "CALLS_FUNCTION").is_empty() {
                    truncated = true;
                }
                continue;
            }
            if direction != Direction::Incoming {
                for edge in self.store.outgoing(node, "CALLS_FUNCTION") {
                    cancel.check("call_graph:outgoing")?;
                    edges.push(CallEdge { caller: node, callee: edge.to, depth: depth + 1 });
                    if visited.insert(edge.to) {
                        frontier.push_back((edge.to, depth + 1));
                    }
                }
            }
            if direction != Direction::Outgoing {
                for edge in self.store.incoming(node, "CALLS_FUNCTION") {
                    cancel.check("call_graph:incoming")?;
                    edges.push(CallEdge { caller: edge.from, callee: node, depth: depth + 1 });
                    if visited.insert(edge.from) {
                        frontier.push_back((edge.from, depth + 1));
                    }
                }
            }
        }

        Ok(CallGraph { edges, truncated })
    }

    /// Nodes that read data flowing out of `root` (`DATA_FLOW` edges whose
    /// `from` is `root` or, when `include_indirect`, any transitive sink).
    pub fn data_dependents(
        &self,
        root: NodeId,
        include_indirect: bool,
        cancel: &dyn CancellationFlag,
    ) -> cpg_core::Result<Vec<NodeId>> {
        self.data_flow_reachable(root, true, include_indirect, cancel)
    }

    /// Nodes whose data flows into `root` (`DATA_FLOW` edges whose `to` is
    /// `root`, optionally followed transitively upstream).
    pub fn data_sources(
        &self,
        root: NodeId,
        include_indirect: bool,
        cancel: &dyn CancellationFlag,
    ) -> cpg_core::Result<Vec<NodeId>> {
        self.data_flow_reachable(root, false, include_indirect, cancel)
    }

    fn data_flow_reachable(
        &self,
        root: NodeId,
        forward: bool,
        include_indirect: bool,
        cancel: &dyn CancellationFlag,
    ) -> cpg_core::Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(root);
        let mut frontier = vec![root];
        let mut depth = 0u32;

        loop {
            let mut next = Vec::new();
            for node in &frontier {
                cancel.check("data_flow:frontier")?;
                let edges = if forward { self.store.outgoing(*node, "DATA_FLOW") } else { self.store.incoming(*node, "DATA_FLOW") };
                for edge in edges {
                    let neighbor = if forward { edge.to } else { edge.from };
                    if visited.insert(neighbor) {
                        out.push(neighbor);
                        next.push(neighbor);
                    }
                }
            }
            depth += 1;
            if next.is_empty() || (depth >= 1 && !include_indirect) {
                break;
            }
            frontier = next;
        }
        Ok(out)
    }

    /// Methods and free functions that read or write a field, found by
    /// walking `DATA_FLOW` edges touching the field and then climbing
    /// `CONTAINS` to the nearest enclosing function.
    pub fn field_accessors(&self, field_id: NodeId, cancel: &dyn CancellationFlag) -> cpg_core::Result<FieldAccessors> {
        let mut writers: Vec<NodeId> = Vec::new();
        let mut readers: Vec<NodeId> = Vec::new();

        for edge in self.store.incoming(field_id, "DATA_FLOW") {
            cancel.check("field_accessors:writers")?;
            if let Some(func) = self.enclosing_function(edge.from) {
                writers.push(func);
            }
        }
        for edge in self.store.outgoing(field_id, "DATA_FLOW") {
            cancel.check("field_accessors:readers")?;
            if let Some(func) = self.enclosing_function(edge.to) {
                readers.push(func);
            }
        }

        Ok(FieldAccessors {
            readers: tally(readers),
            writers: tally(writers),
        })
    }

    /// Walks `CONTAINS` parentage (via `scope_id`) up from `node` until it
    /// lands on a `Function`. `None` when the node isn't contained in one
    /// (e.g. a top-level variable).
    fn enclosing_function(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        let mut guard = 0;
        loop {
            guard += 1;
            if guard > 4096 {
                return None;
            }
            let n = self.store.node(current)?;
            if n.node_type == cpg_core::NodeType::Function {
                return Some(current);
            }
            if !n.scope_id.is_valid() || n.scope_id == current {
                return None;
            }
            current = n.scope_id;
        }
    }

    /// `INHERITS` walk. `Ancestors` follows the edge forward from `root`
    /// (root's own superclasses, at negative depth in the spec's framing);
    /// `Descendants` follows it backward (subclasses).
    pub fn inheritance_tree(&self, root: NodeId, direction: InheritanceDirection, cancel: &dyn CancellationFlag) -> cpg_core::Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(root);
        let mut frontier = vec![root];
        while let Some(node) = frontier.pop() {
            cancel.check("inheritance_tree:frontier")?;
            let edges = match direction {
                InheritanceDirection::Ancestors => self.store.outgoing(node, "INHERITS"),
                InheritanceDirection::Descendants => self.store.incoming(node, "INHERITS"),
            };
            for edge in edges {
                let neighbor = match direction {
                    InheritanceDirection::Ancestors => edge.to,
                    InheritanceDirection::Descendants => edge.from,
                };
                if visited.insert(neighbor) {
                    out.push(neighbor);
                    frontier.push(neighbor);
                }
            }
        }
        Ok(out)
    }

    /// Blast radius of changing `root`: the union of everything that
    /// (transitively) calls it and everything its data flows into.
    pub fn impact(&self, root: NodeId, cancel: &dyn CancellationFlag) -> cpg_core::Result<Vec<NodeId>> {
        let callers = self.call_graph(root, Direction::Incoming, u32::MAX, cancel)?;
        let dependents = self.data_dependents(root, true, cancel)?;

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for edge in callers.edges {
            if seen.insert(edge.caller) {
                out.push(edge.caller);
            }
        }
        for id in dependents {
            if seen.insert(id) {
                out.push(id);
            }
        }
        Ok(out)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InheritanceDirection {
    Ancestors,
    Descendants,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldAccessors {
    pub readers: Vec<(NodeId, u32)>,
    pub writers: Vec<(NodeId, u32)>,
}

fn tally(ids: Vec<NodeId>) -> Vec<(NodeId, u32)> {
    let mut counts: Vec<(NodeId, u32)> = Vec::new();
    for id in ids {
        if let Some(entry) = counts.iter_mut().find(|(n, _)| *n == id) {
            entry.1 += 1;
        } else {
            counts.push((id, 1));
        }
    }
    counts
}
