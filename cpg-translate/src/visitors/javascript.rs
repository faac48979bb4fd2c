//! JavaScript language visitor (spec §4.4): `tree-sitter-javascript` walker.
//! Shared by the TypeScript visitor, which reuses [`translate_statement`]
//! and [`translate_expression`] for the core ECMAScript grammar and only
//! adds handling for TypeScript-only declaration kinds.

use cpg_core::{GraphSink, Metadata, NodeId, Range, Result, INVALID};
use cpg_tree_adapter::CstNode;

use crate::translator::{Cb, Translator};

pub fn language() -> tree_sitter::Language {
    tree_sitter_javascript::LANGUAGE.into()
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

pub(crate) fn translate_statement<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => translate_function(tr, node, scope, source),
        "class_declaration" => translate_class(tr, node, scope, source),
        "if_statement" => translate_if(tr, node, scope, source),
        "while_statement" => translate_while(tr, node, scope, source),
        "for_statement" | "for_in_statement" => translate_for(tr, node, scope, source),
        "switch_statement" => translate_switch(tr, node, scope, source),
        "try_statement" => translate_try(tr, node, scope, source),
        "variable_declaration" | "lexical_declaration" => translate_var_decl(tr, node, scope, source),
        "return_statement" => {
            let rhs = node.named_child(0).map(|expr| {
                Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                    translate_expression(tr, expr, scope, source)
                }) as Cb<'_, S>
            });
            tr.handle_return(scope, node.position(), rhs)
        }
        "import_statement" => translate_import(tr, node, scope, source),
        "export_statement" => {
            let Some(decl) = node.field_child("declaration") else {
                return Ok(INVALID);
            };
            let id = translate_statement(tr, decl, scope, source)?;
            tr.set_visibility(id, "export")?;
            Ok(id)
        }
        "expression_statement" => {
            if let Some(expr) = node.named_child(0) {
                translate_expression(tr, expr, scope, source)
            } else {
                Ok(INVALID)
            }
        }
        "statement_block" => tr.translate_block(scope, node.position(), |tr, block_id| {
            for stmt in node.named_children() {
                translate_statement(tr, stmt, block_id, source)?;
            }
            Ok(())
        }),
        _ => {
            let mut last = INVALID;
            for child in node.named_children() {
                last = translate_statement(tr, child, scope, source)?;
            }
            Ok(last)
        }
    }
}

fn params_of(node: CstNode<'_>, source: &[u8]) -> Vec<(String, Range)> {
    node.field_child("parameters")
        .map(|p| {
            p.named_children()
                .into_iter()
                .filter_map(|param| {
                    let ident = if param.kind() == "identifier" {
                        Some(param)
                    } else {
                        param.field_child("pattern").or_else(|| param.field_child("left"))
                    };
                    ident.map(|id| (id.text(source).to_string(), id.position()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn translate_function<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let anonymous = name.is_empty();
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
    tr.create_function(scope, &name, node.position(), &params, body, anonymous)
}

pub(crate) fn translate_class<S: GraphSink + ?Sized>(
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
                "method_definition" => {
                    methods.push(Box::new(move |tr: &mut Translator<'_, S>, class_id: NodeId| {
                        translate_method(tr, member, class_id, source)
                    }));
                }
                "field_definition" | "public_field_definition" => {
                    if let Some(prop) = member.field_child("property") {
                        fields.push((prop.text(source).to_string(), prop.position()));
                    }
                }
                _ => {}
            }
        }
    }
    let class_id = tr.create_class(scope, &name, node.position(), &fields, methods, false)?;
    if let Some(heritage) = node.field_child("superclass") {
        if heritage.kind() == "identifier" {
            let parent = match tr.class_by_name(heritage.text(source)) {
                Some(id) => id,
                None => tr.fake_class_for(scope, heritage.text(source), heritage.position())?,
            };
            tr.create_inherits(class_id, parent)?;
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
    let params = params_of(node, source);
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
    tr.create_function(class_id, &name, node.position(), &params, body, false)
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
    let body: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, loop_id: NodeId| {
        match body_node {
            Some(b) => translate_statement(tr, b, loop_id, source),
            None => Ok(INVALID),
        }
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
    let right = node.field_child("right");
    let iterable: Option<Cb<'_, S>> = right.map(|r| {
        Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| translate_expression(tr, r, scope, source))
            as Cb<'_, S>
    });
    let body_node = node.field_child("body");
    let body: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, loop_id: NodeId| match body_node {
        Some(b) => translate_statement(tr, b, loop_id, source),
        None => Ok(INVALID),
    });
    if condition.is_some() {
        tr.handle_loop(scope, node.position(), None, condition, body)
    } else {
        tr.handle_loop(scope, node.position(), iterable, None, body)
    }
}

fn translate_switch<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let mut conditions: Vec<Option<Cb<'_, S>>> = Vec::new();
    let mut branches: Vec<Cb<'_, S>> = Vec::new();
    let body = node.field_child("body");
    let cases = body.map(|b| b.named_children()).unwrap_or_default();
    for case in cases {
        let guard = case.field_child("value");
        conditions.push(guard.map(|g| {
            Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| translate_expression(tr, g, scope, source))
                as Cb<'_, S>
        }));
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            tr.translate_block(cond_id, case.position(), |tr, block_id| {
                for stmt in case.named_children() {
                    if stmt.kind() != "value" {
                        translate_statement(tr, stmt, block_id, source)?;
                    }
                }
                Ok(())
            })
        }));
    }
    tr.handle_conditional(scope, node.position(), conditions, branches)
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
    if let Some(handler) = node.field_child("handler") {
        conditions.push(None);
        if let Some(body) = handler.field_child("body") {
            branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
                translate_statement(tr, body, cond_id, source)
            }));
        }
    }
    if let Some(finalizer) = node.field_child("finalizer") {
        conditions.push(None);
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            translate_statement(tr, finalizer, cond_id, source)
        }));
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

fn translate_import<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let path = node.field_child("source").map(|s| s.text(source).trim_matches('"').trim_matches('\'').to_string()).unwrap_or_default();
    let mut last = INVALID;
    let mut imported_any = false;
    if let Some(clause) = node.field_child("import_clause") {
        for spec in clause.named_children() {
            match spec.kind() {
                "identifier" => {
                    last = tr.create_import(scope, spec.text(source), &path, spec.position())?;
                    imported_any = true;
                }
                "named_imports" => {
                    for import_spec in spec.named_children() {
                        if let Some(name) = import_spec.field_child("name").or_else(|| Some(import_spec)) {
                            let alias = import_spec.field_child("alias").unwrap_or(name);
                            last = tr.create_import(scope, alias.text(source), &path, import_spec.position())?;
                            imported_any = true;
                        }
                    }
                }
                _ => {}
            }
        }
    }
    if !imported_any {
        last = tr.create_import(scope, &path, &path, node.position())?;
    }
    Ok(last)
}

pub(crate) fn translate_expression<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    match node.kind() {
        "identifier" | "this" => tr.handle_identifier(node.text(source), scope, node.position()),
        "member_expression" => {
            let chain = flatten_member(node, source);
            tr.resolve_name_chain(&chain, scope, node.position())
        }
        "subscript_expression" => {
            let mut chain = match node.field_child("object") {
                Some(v) if v.kind() == "identifier" => vec![v.text(source).to_string()],
                Some(v) if v.kind() == "member_expression" => flatten_member(v, source),
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
        "call_expression" | "new_expression" => {
            let (callee_id, callee_name) = match node.field_child("function").or_else(|| node.field_child("constructor")) {
                Some(f) if f.kind() == "identifier" => {
                    let id = tr.handle_identifier(f.text(source), scope, f.position())?;
                    (id, f.text(source).to_string())
                }
                Some(f) if f.kind() == "member_expression" && member_base_is_dynamic(f) => {
                    let property = f.field_child("property").map(|p| p.text(source).to_string()).unwrap_or_default();
                    let object = f.field_child("object");
                    let id = tr.handle_rhs_with_fake_variable(
                        "__fn__",
                        scope,
                        f.position(),
                        Metadata::new(),
                        Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| match object {
                            Some(obj) => translate_expression(tr, obj, scope, source),
                            None => Ok(INVALID),
                        }),
                    )?;
                    (id, property)
                }
                Some(f) if f.kind() == "member_expression" => {
                    let chain = flatten_member(f, source);
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
        "arrow_function" => {
            let params = params_of(node, source);
            let body_node = node.field_child("body");
            let body = body_node.map(|b| {
                Box::new(move |tr: &mut Translator<'_, S>, func_id: NodeId| {
                    if b.kind() == "statement_block" {
                        tr.translate_block(func_id, b.position(), |tr, block_id| {
                            for stmt in b.named_children() {
                                translate_statement(tr, stmt, block_id, source)?;
                            }
                            Ok(())
                        })
                    } else {
                        tr.translate_block(func_id, b.position(), |tr, block_id| {
                            translate_expression(tr, b, block_id, source).map(|_| ())
                        })
                    }
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

/// True when a member expression's base doesn't bottom out at a plain
/// identifier/`this` chain — e.g. `a.b().c`, whose object is itself a call.
/// `flatten_member`'s walk would silently drop that call on the floor, so
/// callers that need the base evaluated (a call's callee) must check this
/// first and fall back to evaluating the base as a general expression.
fn member_base_is_dynamic(node: CstNode<'_>) -> bool {
    let mut current = node;
    loop {
        match current.field_child("object") {
            Some(obj) if obj.kind() == "member_expression" => current = obj,
            Some(obj) => return !matches!(obj.kind(), "identifier" | "this"),
            None => return true,
        }
    }
}

fn flatten_member(node: CstNode<'_>, source: &[u8]) -> Vec<String> {
    let mut trailing = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "member_expression" => {
                let prop = current.field_child("property").map(|n| n.text(source).to_string()).unwrap_or_default();
                trailing.push(prop);
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
