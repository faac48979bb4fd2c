//! TypeScript language visitor (spec §4.4): reuses the JavaScript visitor's
//! statement/expression dispatch for the shared ECMAScript core and only
//! adds `interface_declaration`, which becomes a fieldless `Class` (methods
//! on an interface are signatures, not bodies to descend into).

use cpg_core::{GraphSink, NodeId, Result};
use cpg_tree_adapter::CstNode;

use crate::translator::Translator;
use crate::visitors::javascript;

pub fn language() -> tree_sitter::Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

pub fn translate_module<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    root: CstNode<'_>,
    source: &[u8],
    scope: NodeId,
) -> Result<()> {
    for stmt in root.named_children() {
        translate_statement(tr, stmt, scope, source)?;
    }
    Ok(())
}

fn translate_statement<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "interface_declaration" => translate_interface(tr, node, scope, source),
        "class_declaration" => javascript::translate_class(tr, node, scope, source),
        _ => javascript::translate_statement(tr, node, scope, source),
    }
}

fn translate_interface<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let fields: Vec<(String, cpg_core::Range)> = node
        .field_child("body")
        .map(|body| {
            body.named_children()
                .into_iter()
                .filter_map(|member| member.field_child("name"))
                .map(|n| (n.text(source).to_string(), n.position()))
                .collect()
        })
        .unwrap_or_default();
    tr.create_class(scope, &name, node.position(), &fields, Vec::new(), false)
}
