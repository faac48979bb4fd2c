use cpg_core::{EdgeLabel, NodeType};
use pretty_assertions::assert_eq;

use crate::support::{incoming, nodes_of_type, only_named, translate};

const SOURCE: &[u8] = b"const x = a.b().c();\n";

#[test]
fn dynamic_member_base_call_chain_keeps_both_calls() {
    let store = translate("chain.js", SOURCE);

    let calls = nodes_of_type(&store, NodeType::FunctionCall);
    assert_eq!(calls.len(), 2, "both a.b() and .c() should be translated as FunctionCall nodes");

    for call in &calls {
        assert!(
            crate::support::outgoing(&store, call.id, EdgeLabel::CallsFunction.name()).is_empty(),
            "neither call resolves to a known Function, so neither should carry CALLS_FUNCTION"
        );
    }

    let outer = calls.iter().find(|c| c.name == "c").expect("outer call named after its property");
    assert!(calls.iter().any(|c| c.name == "a.b"), "inner call keeps its dotted callee name");

    let x = only_named(&store, NodeType::Variable, "x");
    let sources: Vec<_> = incoming(&store, x.id, EdgeLabel::DataFlow.name()).into_iter().map(|e| e.from).collect();
    assert!(sources.contains(&outer.id), "x should receive its value via DATA_FLOW straight from the outer call");
}
