//! Python language visitor (spec §4.4): walks a `tree-sitter-python` parse
//! tree, funnelling everything through [`Translator`]'s canonical
//! constructions. Unknown statement and expression kinds recurse into their
//! named children rather than aborting, so a construct this visitor doesn't
//! understand yet never hides the declarations nested inside it.

use cpg_core::{GraphSink, NodeId, Result, INVALID};
use cpg_tree_adapter::CstNode;

use crate::translator::{Cb, Translator};

pub fn language() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
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
        "function_definition" => translate_function(tr, node, scope, source),
        "class_definition" => translate_class(tr, node, scope, source),
        "if_statement" => translate_if(tr, node, scope, source),
        "while_statement" => translate_while(tr, node, scope, source),
        "for_statement" => translate_for(tr, node, scope, source),
        "try_statement" => translate_try(tr, node, scope, source),
        "assignment" => translate_assignment(tr, node, scope, source),
        "expression_statement" => {
            if let Some(expr) = node.named_child(0) {
                translate_statement(tr, expr, scope, source)
            } else {
                Ok(INVALID)
            }
        }
        "return_statement" => {
            let rhs = node.named_child(0).map(|expr| {
                Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| {
                    translate_expression(tr, expr, scope, source)
                }) as Cb<'_, S>
            });
            tr.handle_return(scope, node.position(), rhs)
        }
        "import_statement" | "import_from_statement" => translate_import(tr, node, scope, source),
        _ => translate_expression(tr, node, scope, source),
    }
}

fn translate_function<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let params: Vec<(String, cpg_core::Range)> = node
        .field_child("parameters")
        .map(|p| {
            p.named_children()
                .iter()
                .filter_map(|param| {
                    let ident = if param.kind() == "identifier" {
                        Some(*param)
                    } else {
                        param.field_child("name")
                    };
                    ident.map(|id| (id.text(source).to_string(), id.position()))
                })
                .collect()
        })
        .unwrap_or_default();
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
    tr.set_visibility(func_id, python_visibility(&name))?;
    Ok(func_id)
}

/// Python has no visibility keyword; a leading underscore is the
/// conventional signal for "not part of the public interface".
fn python_visibility(name: &str) -> &'static str {
    if name.starts_with('_') {
        "private"
    } else {
        "public"
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
    if let Some(body) = node.field_child("body") {
        for member in body.named_children() {
            if member.kind() == "function_definition" {
                methods.push(Box::new(move |tr: &mut Translator<'_, S>, class_id: NodeId| {
                    translate_method(tr, member, class_id, source)
                }));
            }
        }
    }
    let class_id = tr.create_class(scope, &name, node.position(), &[], methods, false)?;
    tr.set_visibility(class_id, python_visibility(&name))?;
    if let Some(bases) = node.field_child("superclasses") {
        for base in bases.named_children() {
            if base.kind() == "identifier" {
                if let Some(parent_id) = tr.class_by_name(base.text(source)) {
                    tr.create_inherits(class_id, parent_id)?;
                } else {
                    let placeholder = tr.fake_class_for(scope, base.text(source), base.position())?;
                    tr.create_inherits(class_id, placeholder)?;
                }
            }
        }
    }
    Ok(class_id)
}

/// A method is a function whose first parameter (`self`) becomes the
/// receiver instead of an ordinary argument.
fn translate_method<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    class_id: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let name = node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
    let all_params = node.field_child("parameters");
    let mut receiver_name = None;
    let params: Vec<(String, cpg_core::Range)> = all_params
        .map(|p| {
            let mut out = Vec::new();
            for (i, param) in p.named_children().iter().enumerate() {
                let ident = if param.kind() == "identifier" {
                    Some(*param)
                } else {
                    param.field_child("name")
                };
                let Some(id) = ident else { continue };
                if i == 0 {
                    receiver_name = Some(id.text(source).to_string());
                    continue;
                }
                out.push((id.text(source).to_string(), id.position()));
            }
            out
        })
        .unwrap_or_default();
    let body = node.field_child("body");
    let body_cb = body.map(|body_node| {
        Box::new(move |tr: &mut Translator<'_, S>, func_id: NodeId| {
            if let Some(recv) = &receiver_name {
                tr.create_receiver(func_id, class_id, recv, node.position())?;
            }
            tr.translate_block(func_id, body_node.position(), |tr, block_id| {
                for stmt in body_node.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }) as Cb<'_, S>
    });
    let func_id = tr.create_function(class_id, &name, node.position(), &params, body_cb, false)?;
    tr.set_visibility(func_id, python_visibility(&name))?;
    Ok(func_id)
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
    for alt in node.children_of_kind("elif_clause") {
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
    }
    for alt in node.children_of_kind("else_clause") {
        conditions.push(None);
        if let Some(body) = alt.field_child("body") {
            branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
                tr.translate_block(cond_id, body.position(), |tr, block_id| {
                    for stmt in body.named_children() {
                        translate_statement(tr, stmt, block_id, source)?;
                    }
                    Ok(())
                })
            }));
        }
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

fn translate_for<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let iterable: Option<Cb<'_, S>> = node.field_child("right").map(|rhs| {
        Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| translate_expression(tr, rhs, scope, source))
            as Cb<'_, S>
    });
    let left = node.field_child("left");
    let body_node = node.field_child("body");
    let body: Cb<'_, S> = Box::new(move |tr: &mut Translator<'_, S>, loop_id: NodeId| {
        tr.translate_block(loop_id, node.position(), |tr, block_id| {
            if let Some(left) = left {
                translate_expression(tr, left, block_id, source)?;
            }
            if let Some(body_node) = body_node {
                for stmt in body_node.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
            }
            Ok(())
        })
    });
    tr.handle_loop(scope, node.position(), iterable, None, body)
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
            tr.translate_block(cond_id, body.position(), |tr, block_id| {
                for stmt in body.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }));
    }
    for clause in node.children_of_kind("except_clause") {
        conditions.push(None);
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            tr.translate_block(cond_id, clause.position(), |tr, block_id| {
                for stmt in clause.named_children() {
                    translate_statement(tr, stmt, block_id, source)?;
                }
                Ok(())
            })
        }));
    }
    for clause in node.children_of_kind("finally_clause") {
        conditions.push(None);
        branches.push(Box::new(move |tr: &mut Translator<'_, S>, cond_id: NodeId| {
            tr.translate_block(cond_id, clause.position(), |tr, block_id| {
                for stmt in clause.named_children() {
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
        return translate_expression(tr, left, scope, source);
    };
    let lhs: Cb<'_, S> =
        Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| translate_expression(tr, left, scope, source));
    let rhs: Cb<'_, S> =
        Box::new(move |tr: &mut Translator<'_, S>, scope: NodeId| translate_expression(tr, right, scope, source));
    tr.handle_assignment(scope, node.position(), lhs, rhs)
}

/// `import a.b`, `import a.b as c`, and `from a.b import c as d` all land
/// here. `from`-imports carry their module name as its own named child of
/// the statement (alongside each imported name), not just as a field, so it
/// is skipped explicitly rather than matched as an import in its own right;
/// it also becomes the dotted prefix every sibling import path is built on.
fn translate_import<S: GraphSink + ?Sized>(
    tr: &mut Translator<'_, S>,
    node: CstNode<'_>,
    scope: NodeId,
    source: &[u8],
) -> Result<NodeId> {
    let module = node.field_child("module_name");
    let module_prefix = module.filter(|_| node.kind() == "import_from_statement").map(|n| n.text(source).to_string());
    let module_range = module.map(|n| n.byte_range());

    let mut last = INVALID;
    for name_node in node.named_children() {
        if Some(name_node.byte_range()) == module_range {
            continue;
        }
        let (display, target) = match name_node.kind() {
            "dotted_name" => (name_node.text(source).to_string(), name_node.text(source).to_string()),
            "aliased_import" => {
                let target = name_node.field_child("name").map(|n| n.text(source).to_string()).unwrap_or_default();
                let alias = name_node.field_child("alias").map(|n| n.text(source).to_string()).unwrap_or_else(|| target.clone());
                (alias, target)
            }
            "identifier" => (name_node.text(source).to_string(), name_node.text(source).to_string()),
            _ => continue,
        };
        let path = match &module_prefix {
            Some(prefix) => format!("{prefix}.{target}"),
            None => target,
        };
        last = tr.create_import(scope, &display, &path, name_node.position())?;
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
        "identifier" => tr.handle_identifier(node.text(source), scope, node.position()),
        "attribute" => {
            let chain = flatten_attribute(node, source);
            tr.resolve_name_chain(&chain, scope, node.position())
        }
        "subscript" => {
            let mut chain = match node.field_child("value") {
                Some(v) if v.kind() == "identifier" => vec![v.text(source).to_string()],
                Some(v) if v.kind() == "attribute" => flatten_attribute(v, source),
                _ => Vec::new(),
            };
            chain.push(String::new());
            tr.resolve_name_chain(&chain, scope, node.position())
        }
        "call" => {
            let (callee_id, callee_name) = match node.field_child("function") {
                Some(f) if f.kind() == "identifier" => {
                    let id = tr.handle_identifier(f.text(source), scope, f.position())?;
                    (id, f.text(source).to_string())
                }
                Some(f) if f.kind() == "attribute" => {
                    let chain = flatten_attribute(f, source);
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
        "assignment" => translate_assignment(tr, node, scope, source),
        _ => {
            // Fall through: recurse into named children so a call or
            // identifier nested in an expression we don't specifically
            // model (boolean operators, comprehensions, f-strings...)
            // still gets visited.
            let mut last = INVALID;
            for child in node.named_children() {
                last = translate_expression(tr, child, scope, source)?;
            }
            Ok(last)
        }
    }
}

fn flatten_attribute(node: CstNode<'_>, source: &[u8]) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = node;
    let mut trailing = Vec::new();
    loop {
        match current.kind() {
            "attribute" => {
                let attr = current.field_child("attribute").map(|n| n.text(source).to_string()).unwrap_or_default();
                trailing.push(attr);
                match current.field_child("object") {
                    Some(obj) => current = obj,
                    None => break,
                }
            }
            "identifier" => {
                parts.push(current.text(source).to_string());
                break;
            }
            _ => break,
        }
    }
    trailing.reverse();
    parts.extend(trailing);
    parts
}
