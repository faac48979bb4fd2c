//! Edge labels and their optional metadata (spec §3 edge table).

use crate::id::NodeId;

/// The relationship taxonomy. `position` and `condition` are carried inline
/// on the variants that need them rather than in a side metadata map, since
/// every occurrence of these labels in the translator supplies them at
/// construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeLabel {
    Contains,
    HasField,
    Body,
    FunctionArg { position: u32 },
    FunctionCallArg { position: u32 },
    Returns,
    CallsFunction,
    DataFlow,
    Inherits,
    This,
    Branch { position: u32, condition: NodeId },
    Imports,
    Alias,
    Annotation,
}

impl EdgeLabel {
    pub fn name(self) -> &'static str {
        match self {
            EdgeLabel::Contains => "CONTAINS",
            EdgeLabel::HasField => "HAS_FIELD",
            EdgeLabel::Body => "BODY",
            EdgeLabel::FunctionArg { .. } => "FUNCTION_ARG",
            EdgeLabel::FunctionCallArg { .. } => "FUNCTION_CALL_ARG",
            EdgeLabel::Returns => "RETURNS",
            EdgeLabel::CallsFunction => "CALLS_FUNCTION",
            EdgeLabel::DataFlow => "DATA_FLOW",
            EdgeLabel::Inherits => "INHERITS",
            EdgeLabel::This => "THIS",
            EdgeLabel::Branch { .. } => "BRANCH",
            EdgeLabel::Imports => "IMPORTS",
            EdgeLabel::Alias => "ALIAS",
            EdgeLabel::Annotation => "ANNOTATION",
        }
    }

    pub fn position(self) -> Option<u32> {
        match self {
            EdgeLabel::FunctionArg { position }
            | EdgeLabel::FunctionCallArg { position }
            | EdgeLabel::Branch { position, .. } => Some(position),
            _ => None,
        }
    }
}

/// A directed, labelled edge between two persisted (or about-to-be
/// persisted) nodes, scoped to the file that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub label: EdgeLabel,
    pub from: NodeId,
    pub to: NodeId,
    pub file_id: u32,
}

impl Edge {
    pub fn new(label: EdgeLabel, from: NodeId, to: NodeId, file_id: u32) -> Self {
        Edge {
            label,
            from,
            to,
            file_id,
        }
    }

    /// The key MERGE semantics are keyed on (spec §3: "duplicate creations
    /// are idempotent").
    pub fn merge_key(&self) -> (&'static str, NodeId, NodeId) {
        (self.label.name(), self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;

    #[test]
    fn merge_key_ignores_position_and_condition() {
        let a = Edge::new(
            EdgeLabel::Branch {
                position: 0,
                condition: NodeId::new(1, 1),
            },
            NodeId::new(1, 2),
            NodeId::new(1, 3),
            1,
        );
        let b = Edge::new(
            EdgeLabel::Branch {
                position: 0,
                condition: NodeId::new(1, 9),
            },
            NodeId::new(1, 2),
            NodeId::new(1, 3),
            1,
        );
        assert_eq!(a.merge_key(), b.merge_key());
    }
}
