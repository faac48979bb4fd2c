//! Go language visitor (spec §4.4): `tree-sitter-go` walker. Method
//! receivers map to [`Translator::create_receiver`]; struct field lists
//! become `Class` fields; `short_var_declaration` and `assignment_statement`
//! both funnel through [`Translator::handle_assignment`].

use cpg_core::{GraphSink, NodeId, Range, Result, INVALID};
use cpg_tree_adapter::CstNode;

use crate::translator::{Cb, Translator};

pub fn language() -> tree_sitter::Language {
    tree_sitter_go::LANGUAGE.into()
}

pub fn translate_module<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    root: CstNode<'_>,
    source: &[u8],
    scope: NodeId,
) -> Result<()> {
    for decl in root.named_children() {
        translate_top_level(tr, decl, scope, source)?;
    }
    Ok(())
}

fn translate_top_level<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "function_declaration" => translate_function(tr, node, scope, source),
        "method_declaration" => translate_method(tr, node, scope, source),
        "type_declaration" => {
            for spec in node.children_of_kind("type_spec") {
                translate_type_spec(tr, spec, scope, source)?;
            }
            Ok(INVALID)
        }
        "import_declaration" => translate_import_decl(tr, node, scope, source),
        _ => translate_statement(tr, node, scope, source),
    }
}

fn params_of(node: CstNode<'_>, source: &[u8]) -> Vec<(String, Range)> {
    let mut out = Vec::new();
    if let Some(list) = node.field_child("parameters") {
        for param in list.children_of_kind("parameter_declaration") {
            if let Some(name) = param.field_child("name") {
                out.push((name.text(source).to_string(), name.position()));
            }
        }
    }
    out
}

fn translate_function<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let params = params_of(node, source);
    let body = node.field_child("body").map(|body_node| {
        Box::new(move |tr: &mut Translator<'_, S>, func_id: NodeId| {
            tr.translate_block(func_id, body_node.position(), |tr, block_id| {
                for stmt in body_node.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }) as Cb<'_, S>
    });
    let func_id = tr.create_function(scope, &name, node.position(), &params, body, false)?;
    tr.set_visibility(func_id, exported_visibility(&name))?;
    Ok(func_id)
}

/// Go has no visibility keyword: an identifier starting with an uppercase
/// letter is exported from its package, everything else is package-private.
fn exported_visibility(name: &str) -> &'static str {
    if name.chars().next().is_some_and(|c| c.is_uppercase()) {
        "public"
    } else {
        "private"
    }
}

fn translate_method<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let params = params_of(node, source);

    let receiver = node.field_child("receiver").and_then(|r| r.children_of_kind("parameter_declaration").into_iter().next());
    let receiver_name = receiver.and_then(|r| r.field_child("name")).map(|n| n.text(source).to_string());
    let receiver_type_name = receiver
        .and_then(|r| r.field_child("type"))
        .map(|t| t.subtree_first_of_kind("type_identifier").unwrap_or(t))
        .map(|t| t.text(source).to_string());

    let class_id = match &receiver_type_name {
        Some(type_name) => tr.fake_class_for(scope, type_name, node.position())?,
        None => INVALID,
    };

    let body = node.field_child("body").map(|body_node| {
        Box::new(move |tr: &mut Translator<'_, S>, func_id: NodeId| {
            if let Some(recv) = &receiver_name {
                if class_id.is_valid() {
                    tr.create_receiver(func_id, class_id, recv, node.position())?;
                }
            }
            tr.translate_block(func_id, body_node.position(), |tr, block_id| {
                for stmt in body_node.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }) as Cb<'_, S>
    });
    // A method declared outside its struct's body (Go's syntax) is attached
    // to its class explicitly rather than through `create_class`'s own
    // `methods` list; `open_scope`/`close_scope` keep it from also leaking
    // into the module-level CONTAINS leftover.
    let parent_scope = if class_id.is_valid() { class_id } else { scope };
    tr.open_scope();
    let func_id = tr.create_function(parent_scope, &name, node.position(), &params, body, false)?;
    tr.set_visibility(func_id, exported_visibility(&name))?;
    if class_id.is_valid() {
        tr.close_scope(class_id)?;
        tr.attach_member(class_id, func_id)?;
    } else {
        tr.close_scope(scope)?;
    }
    Ok(func_id)
}

fn translate_type_spec<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let fields: Vec<(String, Range)> = node
        .field_child("type")
        .filter(|t| t.kind() == "struct_type")
        .and_then(|t| t.subtree_first_of_kind("field_declaration_list"))
        .map(|list| {
            list.children_of_kind("field_declaration")
                .into_iter()
                .filter_map(|f| f.field_child("name"))
                .map(|n| (n.text(source).to_string(), n.position()))
                .collect()
        })
        .unwrap_or_default();
    let class_id = tr.create_class(scope, &name, node.position(), &fields, Vec::new(), false)?;
    tr.set_visibility(class_id, exported_visibility(&name))?;
    Ok(class_id)
}

fn translate_import_decl<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let mut last = INVALID;
    for spec in node.children_of_kind("import_spec") {
        let path_node = spec.field_child("path");
        let path = path_node.map(|p| p.text(source).trim_matches('"').to_string()).unwrap_or_default();
        let alias = spec.field_child("name").map(|n| n.text(source).to_string());
        let display = alias.unwrap_or_else(|| path.rsplit('/').next().unwrap_or(&path).to_string());
        last = tr.create_import(scope, &display, &path, spec.position())?;
    }
    Ok(last)
}

fn translate_statement<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "if_statement" => translate_if(tr, node, scope, source),
        "for_statement" => translate_for(tr, node, scope, source),
        "expression_switch_statement" | "type_switch_statement" => translate_switch(tr, node, scope, source),
        "short_var_declaration" | "assignment_statement" => translate_assignment(tr, node, scope, source),
        "return_statement" => {
            let rhs = node.named_child(0).map(|expr| {
                Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                    translate_expression(tr, expr, scope, source)
                }) as Cb<'_, S>
            });
            tr.handle_return(scope, node.position(), rhs)
        }
        "call_expression" | "selector_expression" | "identifier" => translate_expression(tr, node, scope, source),
        "expression_statement" => {
            if let Some(expr) = node.named_child(0) {
                translate_expression(tr, expr, scope, source)
            } else {
                Ok(INVALID)
            }
        }
        _ => {
            let mut last = INVALID;
            for child in node.named_children() {
                last = translate_statement(tr, child, scope, source)?;
            }
            Ok(last)
        }
    }
}

fn translate_if<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let mut conditions: Vec<Option<Cb<'_, S>>> = Vec::new();
    let mut branches: Vec<Cb<'_, S>> = Vec::new();

    if let Some(cond) = node.field_child("condition") {
        conditions.push(Some(Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
            translate_expression(tr, cond, scope, source)
        })));
    } else {
        conditions.push(None);
    }
    if let Some(cons) = node.field_child("consequence") {
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            tr.translate_block(cond_id, cons.position(), |tr, block_id| {
                for stmt in cons.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }));
    }
    if let Some(alt) = node.field_child("alternative") {
        if alt.kind() == "if_statement" {
            // `else if` chain: recurse, folding its own conditions/branches
            // into this one so the whole chain is a single Conditional node.
            return translate_if_chain(tr, node, conditions, branches, alt, scope, source);
        }
        conditions.push(None);
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            tr.translate_block(cond_id, alt.position(), |tr, block_id| {
                for stmt in alt.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }));
    }
    tr.handle_conditional(scope, node.position(), conditions, branches)
}

fn translate_if_chain<'a, S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'a>,
    mut conditions: Vec<Option<Cb<'a, S>>>,
    mut branches: Vec<Cb<'a, S>>,
    mut alt: CstNode<'a>,
    scope: NodeId,
    source: &'a [u8],
) -> Result<NodeId> {
    loop {
        if let Some(cond) = alt.field_child("condition") {
            conditions.push(Some(Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                translate_expression(tr, cond, scope, source)
            })));
        } else {
            conditions.push(None);
        }
        if let Some(cons) = alt.field_child("consequence") {
            branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
                tr.translate_block(cond_id, cons.position(), |tr, block_id| {
                    for stmt in cons.named_children() {
                        translate_statement(tr, stmt, block_id, source)?;
                    }
                    Ok(())
                })
            }));
        }
        match alt.field_child("alternative") {
            Some(next) if next.kind() == "if_statement" => alt = next,
            Some(last_else) => {
                conditions.push(None);
                branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
                    tr.translate_block(cond_id, last_else.position(), |tr, block_id| {
                        for stmt in last_else.named_children() {
                            translate_statement(tr, stmt, block_id, source)?;
                        }
                        Ok(())
                    })
                }));
                break;
            }
            None => break,
        }
    }
    tr.handle_conditional(scope, node.position(), conditions, branches)
}

fn translate_for<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let condition: Option<Cb<'_, S>> = node.field_child("condition").map(|cond| {
        Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| translate_expression(tr, cond, scope, source))
            as Cb<'_, S>
    });
    let body_node = node.field_child("body");
    let body: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, loop_id: NodeId| {
        tr.translate_block(loop_id, node.position(), |tr, block_id| {
            if let Some(body_node) = body_node {
                for stmt in body_node.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
            }
            Ok(())
        })
    });
    tr.handle_loop(scope, node.position(), None, condition, body)
}

fn translate_switch<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let mut conditions: Vec<Option<Cb<'_, S>>> = Vec::new();
    let mut branches: Vec<Cb<'_, S>> = Vec::new();
    for case in node.children_of_kind("expression_case").into_iter().chain(node.children_of_kind("default_case")) {
        let guard = case.named_child(0).filter(|_| case.kind() == "expression_case");
        conditions.push(guard.map(|g| {
            Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| translate_expression(tr, g, scope, source))
                as Cb<'_, S>
        }));
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            tr.translate_block(cond_id, case.position(), |tr, block_id| {
                for stmt in case.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }));
    }
    tr.handle_conditional(scope, node.position(), conditions, branches)
}

fn translate_assignment<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let Some(left) = node.field_child("left") else {
        return Ok(INVALID);
    };
    let Some(right) = node.field_child("right") else {
        return Ok(INVALID);
    };
    let first_left = left.named_child(0).unwrap_or(left);
    let first_right = right.named_child(0).unwrap_or(right);
    let lhs: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
        translate_expression(tr, first_left, scope, source)
    });
    let rhs: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
        translate_expression(tr, first_right, scope, source)
    });
    tr.handle_assignment(scope, node.position(), lhs, rhs)
}

fn translate_expression<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "identifier" => tr.handle_identifier(node.text(source), scope, node.position()),
        "selector_expression" => {
            let chain = flatten_selector(node, source);
            tr.resolve_name_chain(&chain, scope, node.position())
        }
        "call_expression" => {
            let (callee_id, callee_name) = match node.field_child("function") {
                Some(f) if f.kind() == "identifier" => {
                    let id = tr.handle_identifier(f.text(source), scope, f.position())?;
                    (id, f.text(source).to_string())
                }
                Some(f) if f.kind() == "selector_expression" => {
                    let chain = flatten_selector(f, source);
                    let id = tr.resolve_name_chain(&chain, scope, f.position())?;
                    (id, chain.join("."))
                }
                _ => (INVALID, String::new()),
            };
            let args: Vec<Cb<'_, S>> = node
                .field_child("arguments")
                .map(|a| {
                    a.named_children()
                        .into_iter()
                        .map(|arg| {
                            Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                                translate_expression(tr, arg, scope, source)
                            }) as Cb<'_, S>
                        })
                        .collect()
                })
                .unwrap_or_default();
            tr.handle_call(scope, callee_id, &callee_name, node.position(), args)
        }
        _ => {
            let mut last = INVALID;
            for child in node.named_children() {
                last = translate_expression(tr, child, scope, source)?;
            }
            Ok(last)
        }
    }
}

fn flatten_selector(node: CstNode<'_>, source: &[u8]) -> Vec<String> {
    let mut trailing = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "selector_expression" => {
                let field = current.field_child("field").map(|n| n.text(source).to_string()).unwrap_or_default();
                trailing.push(field);
                match current.field_child("operand") {
                    Some(obj) => current = obj,
                    None => break,
                }
            }
            "identifier" => {
                trailing.push(current.text(source).to_string());
                break;
            }
            _ => break,
        }
    }
    trailing.reverse();
    trailing
}
