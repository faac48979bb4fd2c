use cpg_core::{EdgeLabel, NodeType};
use cpg_store::GraphReadModel;
use pretty_assertions::assert_eq;

use crate::support::{nodes_of_type, only_named, outgoing, translate};

const SOURCE: &[u8] = b"package p\n\ntype Foo struct {\n\tX int\n}\n\nfunc (f Foo) Bar(y int) int {\n\treturn f.X + y\n}\n";

#[test]
fn struct_and_out_of_line_method_wire_receiver_and_fields() {
    let store = translate("p.go", SOURCE);

    let file_scope = &nodes_of_type(&store, NodeType::FileScope)[0];
    assert_eq!(file_scope.metadata.get("path").and_then(|v| v.as_str()), Some("p.go"));

    let module_scope = only_named(&store, NodeType::ModuleScope, "p");
    assert_eq!(
        outgoing(&store, file_scope.id, EdgeLabel::Contains.name())
            .iter()
            .filter(|e| e.to == module_scope.id)
            .count(),
        1
    );

    let foo = only_named(&store, NodeType::Class, "Foo");
    let bar = only_named(&store, NodeType::Function, "Bar");

    let foo_has_field: Vec<_> = outgoing(&store, foo.id, EdgeLabel::HasField.name());
    assert!(foo_has_field.iter().any(|e| e.to == bar.id), "Foo should HAS_FIELD its method Bar");

    let foo_fields = nodes_of_type(&store, NodeType::Variable);
    let struct_field_x = foo_fields
        .iter()
        .find(|n| n.name == "X" && foo_has_field.iter().any(|e| e.to == n.id))
        .expect("struct field X attached to Foo via HAS_FIELD");
    assert_eq!(struct_field_x.scope_id, foo.id);

    let foo_contains = outgoing(&store, foo.id, EdgeLabel::Contains.name());
    assert!(foo_contains.iter().any(|e| e.to == bar.id), "Foo should CONTAIN its method Bar");

    let bar_args = outgoing(&store, bar.id, EdgeLabel::FunctionArg { position: 0 }.name());
    assert_eq!(bar_args.len(), 1);
    let y = store.node(bar_args[0].to).expect("param y node");
    assert_eq!(y.name, "y");

    // The receiver `f` is bound inside Bar's body and carries a THIS edge to Foo.
    let this_edges = nodes_of_type(&store, NodeType::Variable)
        .into_iter()
        .filter(|n| n.name == "f")
        .find(|n| !outgoing(&store, n.id, EdgeLabel::This.name()).is_empty())
        .expect("receiver f with a THIS edge");
    let this_edge = outgoing(&store, this_edges.id, EdgeLabel::This.name());
    assert_eq!(this_edge[0].to, foo.id);

    // `return f.X + y` collapses into a fake __ret_value__ variable fed by
    // DATA_FLOW from the receiver, the selector's field, and the param.
    let ret_value = nodes_of_type(&store, NodeType::Variable)
        .into_iter()
        .find(|n| n.name.starts_with("__ret_value__"))
        .expect("synthesised return value variable");
    assert_eq!(ret_value.metadata.get("return").and_then(|v| v.as_bool()), Some(true));

    let sources: Vec<_> = crate::support::incoming(&store, ret_value.id, EdgeLabel::DataFlow.name())
        .into_iter()
        .map(|e| e.from)
        .collect();
    assert!(sources.contains(&this_edges.id), "return value should flow from receiver f");
    assert!(sources.contains(&y.id), "return value should flow from param y");
}
