use cpg_core::{Edge, EdgeLabel, Metadata, NeverCancel, NodeId, NodeType};
use cpg_query::Analyzer;
use pretty_assertions::assert_eq;

use crate::support::{node, store_with};

#[test]
fn readers_and_writers_are_classified_by_data_flow_direction() {
    let field_x = NodeId::new(1, 1);
    let read_x = NodeId::new(1, 2);
    let write_x = NodeId::new(1, 3);

    let nodes = vec![
        node(1, 1, NodeType::Field, "x", NodeId::new(1, 1), Metadata::new()),
        node(1, 2, NodeType::Function, "readX", NodeId::new(1, 1), Metadata::new()),
        node(1, 3, NodeType::Function, "writeX", NodeId::new(1, 1), Metadata::new()),
    ];
    let edges = vec![
        // readX pulls the field's value: DATA_FLOW x -> readX.
        Edge::new(EdgeLabel::DataFlow, field_x, read_x, 1),
        // writeX assigns into the field: DATA_FLOW writeX -> x.
        Edge::new(EdgeLabel::DataFlow, write_x, field_x, 1),
    ];
    let store = store_with(nodes, edges);

    let analyzer = Analyzer::new(&store);
    let accessors = analyzer.field_accessors(field_x, &NeverCancel).unwrap();

    assert_eq!(accessors.readers.len(), 1);
    assert_eq!(accessors.readers[0].0, read_x);
    assert_eq!(accessors.readers[0].1, 1);

    assert_eq!(accessors.writers.len(), 1);
    assert_eq!(accessors.writers[0].0, write_x);
    assert_eq!(accessors.writers[0].1, 1);
}
