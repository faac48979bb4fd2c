use cpg_core::{Edge, EdgeLabel, Metadata, NeverCancel, NodeId, NodeType};
use cpg_query::{Analyzer, Direction};
use pretty_assertions::assert_eq;

use crate::support::{node, store_with};

#[test]
fn outgoing_call_graph_truncates_past_max_depth() {
    let a = NodeId::new(1, 1);
    let b = NodeId::new(1, 2);
    let c = NodeId::new(1, 3);
    let d = NodeId::new(1, 4);

    let nodes = vec![
        node(1, 1, NodeType::Function, "a", NodeId::new(1, 1), Metadata::new()),
        node(1, 2, NodeType::Function, "b", NodeId::new(1, 2), Metadata::new()),
        node(1, 3, NodeType::Function, "c", NodeId::new(1, 3), Metadata::new()),
        node(1, 4, NodeType::Function, "d", NodeId::new(1, 4), Metadata::new()),
    ];
    let edges = vec![
        Edge::new(EdgeLabel::CallsFunction, a, b, 1),
        Edge::new(EdgeLabel::CallsFunction, b, c, 1),
        Edge::new(EdgeLabel::CallsFunction, c, d, 1),
    ];
    let store = store_with(nodes, edges);

    let analyzer = Analyzer::new(&store);
    let graph = analyzer.call_graph(a, Direction::Outgoing, 2, &NeverCancel).unwrap();

    assert!(graph.truncated, "the walk should stop at depth 2 with c->d still unexplored");
    assert_eq!(graph.edges.len(), 2);
    assert!(graph.edges.iter().any(|e| e.caller == a && e.callee == b && e.depth == 1));
    assert!(graph.edges.iter().any(|e| e.caller == b && e.callee == c && e.depth == 2));
    assert!(!graph.edges.iter().any(|e| e.callee == d), "d is beyond the depth bound");
}
