//! Typed CRUD (spec §4.5): one constructor per node type, each validating
//! `node.node_type` before writing. A mismatch is a programmer error
//! (`CpgError::InvalidNodeType`), never a retryable condition.

use cpg_core::{CpgError, GraphSink, Node, NodeId, NodeType, Result};

macro_rules! typed_create {
    ($name:ident, $variant:ident) => {
        /// Validates `node.node_type == NodeType::$variant` then writes.
        pub fn $name(sink: &mut (impl GraphSink + ?Sized), node: Node) -> Result<()> {
            if node.node_type != NodeType::$variant {
                return Err(CpgError::InvalidNodeType {
                    expected: NodeType::$variant,
                    id: node.id,
                });
            }
            sink.create_node(node)
        }
    };
}

typed_create!(create_file_scope, FileScope);
typed_create!(create_module_scope, ModuleScope);
typed_create!(create_block, Block);
typed_create!(create_class, Class);
typed_create!(create_function, Function);
typed_create!(create_function_call, FunctionCall);
typed_create!(create_field, Field);
typed_create!(create_variable, Variable);
typed_create!(create_expression, Expression);
typed_create!(create_conditional, Conditional);
typed_create!(create_loop, Loop);
typed_create!(create_import, Import);

/// Read a node and assert it carries the expected type label. Spec §4.5:
/// "reads by id and type label".
pub fn read_typed(sink: &(impl GraphSink + ?Sized), id: NodeId, expected: NodeType) -> Result<Option<Node>> {
    match sink.read_node(id) {
        Some(n) if n.node_type == expected => Ok(Some(n)),
        Some(n) => Err(CpgError::InvalidNodeType { expected, id: n.id }),
        None => Ok(None),
    }
}
