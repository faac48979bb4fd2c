use cpg_core::{EdgeLabel, NodeId, NodeType};
use cpg_store::GraphReadModel;
use pretty_assertions::assert_eq;

use crate::support::{incoming, nodes_of_type, outgoing, translate};

const SOURCE: &[u8] = b"if x:\n    pass\nelif y:\n    pass\nelse:\n    pass\n";

fn branch_condition(label: EdgeLabel) -> NodeId {
    match label {
        EdgeLabel::Branch { condition, .. } => condition,
        _ => panic!("expected a BRANCH label"),
    }
}

fn branch_position(label: EdgeLabel) -> u32 {
    label.position().expect("BRANCH edges carry a position")
}

#[test]
fn if_elif_else_produces_three_positioned_branches() {
    let store = translate("cond.py", SOURCE);

    let conditionals = nodes_of_type(&store, NodeType::Conditional);
    assert_eq!(conditionals.len(), 1);
    let cond_id = conditionals[0].id;

    let mut branches = outgoing(&store, cond_id, EdgeLabel::Branch { position: 0, condition: NodeId::new(0, 0) }.name());
    branches.sort_by_key(|e| branch_position(e.label));
    assert_eq!(branches.len(), 3, "if + elif + else should each be a BRANCH edge");

    for (i, branch) in branches.iter().enumerate() {
        assert_eq!(branch_position(branch.label), i as u32);
        let block = store.node(branch.to).expect("branch target block");
        assert_eq!(block.node_type, NodeType::Block);
        assert_eq!(
            incoming(&store, branch.to, EdgeLabel::Contains.name()).len(),
            1,
            "a branch block must have exactly one CONTAINS parent, not also the enclosing scope"
        );
    }

    let x_condition = branch_condition(branches[0].label);
    assert!(x_condition.is_valid());
    assert_eq!(store.node(x_condition).unwrap().name, "x");
    assert_eq!(
        incoming(&store, x_condition, EdgeLabel::Contains.name()).len(),
        1,
        "the if-condition must have exactly one CONTAINS parent"
    );

    let y_condition = branch_condition(branches[1].label);
    assert!(y_condition.is_valid());
    assert_eq!(store.node(y_condition).unwrap().name, "y");
    assert_eq!(
        incoming(&store, y_condition, EdgeLabel::Contains.name()).len(),
        1,
        "the elif-condition must have exactly one CONTAINS parent"
    );

    let else_condition = branch_condition(branches[2].label);
    assert!(!else_condition.is_valid(), "a bare else has no condition");
}
