//! Java language visitor (spec §4.4): `tree-sitter-java` walker.

use cpg_core::{GraphSink, NodeId, Range, Result, INVALID};
use cpg_tree_adapter::CstNode;

use crate::translator::{Cb, Translator};

pub fn language() -> tree_sitter::Language {
    tree_sitter_java::LANGUAGE.into()
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
        "class_declaration" | "interface_declaration" => translate_class(tr, node, scope, source),
        "import_declaration" => translate_import(tr, node, scope, source),
        _ => Ok(INVALID),
    }
}

fn translate_class<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let mut methods: Vec<Cb<'_, S>> = Vec::new();
    let mut fields = Vec::new();
    if let Some(body) = node.field_child("body") {
        for member in body.named_children() {
            match member.kind() {
                "method_declaration" | "constructor_declaration" => {
                    methods.push(Box::new(move |tr: &mut Translator<'_, S>, class_id: NodeId| {
                        translate_method(tr, member, class_id, source)
                    }));
                }
                "field_declaration" => {
                    for decl in member.children_of_kind("variable_declarator") {
                        if let Some(field_name) = decl.field_child("name") {
                            fields.push((field_name.text(source).to_string(), field_name.position()));
                        }
                    }
                }
                "class_declaration" => {
                    translate_class(tr, member, scope, source)?;
                }
                _ => {}
            }
        }
    }
    let class_id = tr.create_class(scope, &name, node.position(), &fields, methods, false)?;
    if let Some(visibility) = java_visibility(node) {
        tr.set_visibility(class_id, visibility)?;
    }
    if let Some(superclass) = node.field_child("superclass") {
        if let Some(ty) = superclass.subtree_first_of_kind("type_identifier") {
            let parent = match tr.class_by_name(ty.text(source)) {
                Some(id) => id,
                None => tr.fake_class_for(scope, ty.text(source), ty.position())?,
            };
            tr.create_inherits(class_id, parent)?;
        }
    }
    if let Some(interfaces) = node.field_child("interfaces") {
        for ty in interfaces.named_children() {
            if let Some(ty_id) = ty.subtree_first_of_kind("type_identifier") {
                let parent = match tr.class_by_name(ty_id.text(source)) {
                    Some(id) => id,
                    None => tr.fake_class_for(scope, ty_id.text(source), ty_id.position())?,
                };
                tr.create_inherits(class_id, parent)?;
            }
        }
    }
    Ok(class_id)
}

fn translate_method<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    class_id: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let params: Vec<(String, Range)> = node
        .field_child("parameters")
        .map(|p| {
            p.children_of_kind("formal_parameter")
                .into_iter()
                .filter_map(|param| param.field_child("name"))
                .map(|n| (n.text(source).to_string(), n.position()))
                .collect()
        })
        .unwrap_or_default();
    let body = node.field_child("body").map(|body_node| {
        Box::new(move |tr: &mut Translator<'_, S>, func_id: NodeId| {
            tr.create_receiver(func_id, class_id, "this", node.position())?;
            tr.translate_block(func_id, body_node.position(), |tr, block_id| {
                for stmt in body_node.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }) as Cb<'_, S>
    });
    let func_id = tr.create_function(class_id, &name, node.position(), &params, body, false)?;
    if let Some(visibility) = java_visibility(node) {
        tr.set_visibility(func_id, visibility)?;
    }
    Ok(func_id)
}

/// Reads the explicit `public`/`private`/`protected` keyword off a
/// declaration's `modifiers` child, if present. These are anonymous tokens
/// in the grammar, so they're found by raw child index rather than
/// `named_children`.
fn java_visibility(node: CstNode<'_>) -> Option<&'static str> {
    let modifiers = node.field_child("modifiers")?;
    for i in 0..modifiers.child_count() {
        let Some(child) = modifiers.child(i) else { continue };
        match child.kind() {
            "public" => return Some("public"),
            "private" => return Some("private"),
            "protected" => return Some("protected"),
            _ => {}
        }
    }
    None
}

fn translate_import<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let Some(path_node) = node.named_child(0) else {
        return Ok(INVALID);
    };
    let path = path_node.text(source).to_string();
    let display = path.rsplit('.').next().unwrap_or(&path).to_string();
    tr.create_import(scope, &display, &path, node.position())
}

fn translate_statement<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "if_statement" => translate_if(tr, node, scope, source),
        "while_statement" => translate_while(tr, node, scope, source),
        "for_statement" | "enhanced_for_statement" => translate_for(tr, node, scope, source),
        "try_statement" => translate_try(tr, node, scope, source),
        "local_variable_declaration" => translate_var_decl(tr, node, scope, source),
        "return_statement" => {
            let rhs = node.named_child(0).map(|expr| {
                Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                    translate_expression(tr, expr, scope, source)
                }) as Cb<'_, S>
            });
            tr.handle_return(scope, node.position(), rhs)
        }
        "expression_statement" => {
            if let Some(expr) = node.named_child(0) {
                translate_expression(tr, expr, scope, source)
            } else {
                Ok(INVALID)
            }
        }
        "block" => tr.translate_block(scope, node.position(), |tr, block_id| {
            for stmt in node.named_children() {
                translate_statement(tr, stmt, block_id, source)?;
            }
            Ok(())
        }),
        "class_declaration" => translate_class(tr, node, scope, source),
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
            translate_statement(tr, cons, cond_id, source)
        }));
    }
    if let Some(alt) = node.field_child("alternative") {
        conditions.push(None);
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            translate_statement(tr, alt, cond_id, source)
        }));
    }
    tr.handle_conditional(scope, node.position(), conditions, branches)
}

fn translate_while<S: GraphSink + ?Sized>(
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
    let body: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, loop_id: NodeId| match body_node {
        Some(b) => translate_statement(tr, b, loop_id, source),
        None => Ok(INVALID),
    });
    tr.handle_loop(scope, node.position(), None, condition, body)
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
    let body: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, loop_id: NodeId| match body_node {
        Some(b) => translate_statement(tr, b, loop_id, source),
        None => Ok(INVALID),
    });
    tr.handle_loop(scope, node.position(), None, condition, body)
}

fn translate_try<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let mut conditions: Vec<Option<Cb<'_, S>>> = Vec::new();
    let mut branches: Vec<Cb<'_, S>> = Vec::new();
    if let Some(body) = node.field_child("body") {
        conditions.push(None);
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            translate_statement(tr, body, cond_id, source)
        }));
    }
    for clause in node.children_of_kind("catch_clause") {
        conditions.push(None);
        if let Some(body) = clause.field_child("body") {
            branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
                translate_statement(tr, body, cond_id, source)
            }));
        }
    }
    if let Some(finally) = node.children_of_kind("finally_clause").into_iter().next() {
        conditions.push(None);
        if let Some(body) = finally.field_child("body") {
            branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
                translate_statement(tr, body, cond_id, source)
            }));
        }
    }
    tr.handle_conditional(scope, node.position(), conditions, branches)
}

fn translate_var_decl<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let mut last = INVALID;
    for decl in node.children_of_kind("variable_declarator") {
        let Some(name) = decl.field_child("name") else { continue };
        match decl.field_child("value") {
            Some(value) => {
                let lhs: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                    translate_expression(tr, name, scope, source)
                });
                let rhs: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                    translate_expression(tr, value, scope, source)
                });
                last = tr.handle_assignment(scope, decl.position(), lhs, rhs)?;
            }
            None => {
                last = tr.handle_identifier(name.text(source), scope, name.position())?;
            }
        }
    }
    Ok(last)
}

fn translate_expression<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "identifier" | "this" => tr.handle_identifier(node.text(source), scope, node.position()),
        "field_access" => {
            let chain = flatten_field_access(node, source);
            tr.resolve_name_chain(&chain, scope, node.position())
        }
        "array_access" => {
            let mut chain = match node.field_child("array") {
                Some(v) if v.kind() == "identifier" => vec![v.text(source).to_string()],
                Some(v) if v.kind() == "field_access" => flatten_field_access(v, source),
                _ => Vec::new(),
            };
            chain.push(String::new());
            tr.resolve_name_chain(&chain, scope, node.position())
        }
        "assignment_expression" => {
            let Some(left) = node.field_child("left") else { return Ok(INVALID) };
            let Some(right) = node.field_child("right") else { return Ok(INVALID) };
            let lhs: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                translate_expression(tr, left, scope, source)
            });
            let rhs: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                translate_expression(tr, right, scope, source)
            });
            tr.handle_assignment(scope, node.position(), lhs, rhs)
        }
        "method_invocation" => {
            let callee_name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
            let callee_id = match node.field_child("object") {
                Some(obj) if obj.kind() == "identifier" => tr.handle_identifier(obj.text(source), scope, obj.position())?,
                Some(obj) if obj.kind() == "field_access" => {
                    let chain = flatten_field_access(obj, source);
                    tr.resolve_name_chain(&chain, scope, obj.position())?
                }
                _ => tr.handle_identifier(&callee_name, scope, node.position())?,
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
        "object_creation_expression" => {
            let type_name = node
                .field_child("type")
                .map(|t| t.text(source).to_string())
                .unwrap_or_default();
            let callee_id = tr.class_by_name(&type_name).unwrap_or(INVALID);
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
            tr.handle_call(scope, callee_id, &type_name, node.position(), args)
        }
        "lambda_expression" => {
            let params: Vec<(String, Range)> = match node.named_child(0) {
                Some(p) if p.kind() == "identifier" => vec![(p.text(source).to_string(), p.position())],
                Some(p) => p
                    .children_of_kind("formal_parameter")
                    .into_iter()
                    .filter_map(|f| f.field_child("name"))
                    .map(|n| (n.text(source).to_string(), n.position()))
                    .collect(),
                None => Vec::new(),
            };
            let body_node = node.field_child("body");
            let body = body_node.map(|b| {
                Box::new(move |tr: &mut Translator<'_, S>, func_id: NodeId| {
                    tr.translate_block(func_id, b.position(), |tr, block_id| {
                        if b.kind() == "block" {
                            for stmt in b.named_children() {
                                translate_statement(tr, stmt, block_id, source)?;
                            }
                        } else {
                            translate_expression(tr, b, block_id, source)?;
                        }
                        Ok(())
                    })
                }) as Cb<'_, S>
            });
            tr.create_function(scope, "", node.position(), &params, body, true)
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

fn flatten_field_access(node: CstNode<'_>, source: &[u8]) -> Vec<String> {
    let mut trailing = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "field_access" => {
                let field = current.field_child("field").map(|n| n.text(source).to_string()).unwrap_or_default();
                trailing.push(field);
                match current.field_child("object") {
                    Some(obj) => current = obj,
                    None => break,
                }
            }
            "identifier" | "this" => {
                trailing.push(current.text(source).to_string());
                break;
            }
            _ => break,
        }
    }
    trailing.reverse();
    trailing
}
