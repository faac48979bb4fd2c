//! Optional JSON export of a file's graph fragment, for debugging and
//! visualization tooling (spec's supplemented "Graph JSON export" feature,
//! grounded in the teacher's `visualization`/`json` features). This is a
//! dump, not a queryable path — the typed CRUD and read-model traits remain
//! the only supported programmatic access.

use cpg_core::{Node, Edge, MetaValue};
use serde_json::{json, Value};

pub fn nodes_to_json(nodes: &[Node]) -> Value {
    Value::Array(
        nodes
            .iter()
            .map(|n| {
                let metadata: serde_json::Map<String, Value> = n
                    .metadata
                    .iter()
                    .map(|(k, v)| {
                        let value = match v {
                            MetaValue::Str(s) => Value::String(s.clone()),
                            MetaValue::Int(i) => json!(i),
                            MetaValue::Bool(b) => Value::Bool(*b),
                            MetaValue::Node(id) => json!(id.as_i64()),
                        };
                        (k.clone(), value)
                    })
                    .collect();
                json!({
                    "id": n.id.as_i64(),
                    "type": n.node_type.label(),
                    "file_id": n.file_id,
                    "name": n.name,
                    "range": n.range.to_string(),
                    "version": n.version,
                    "scope_id": n.scope_id.as_i64(),
                    "metadata": metadata,
                })
            })
            .collect(),
    )
}

pub fn edges_to_json(edges: &[Edge]) -> Value {
    Value::Array(
        edges
            .iter()
            .map(|e| {
                json!({
                    "label": e.label.name(),
                    "from": e.from.as_i64(),
                    "to": e.to.as_i64(),
                    "position": e.label.position(),
                })
            })
            .collect(),
    )
}
