//! SQLite-backed reference implementation of [`Backend`] and
//! [`GraphDriver`]. Modeled on the teacher's `SQLiteWriter`: a versioned
//! schema, WAL journaling, and `INSERT ... ON CONFLICT DO UPDATE` standing in
//! for MERGE.
//!
//! Node metadata is kept in a single JSON column rather than exploded into
//! dynamic SQL columns per key — SQLite has no notion of "add this column if
//! it doesn't already exist" that's pleasant to use from a single prepared
//! statement, and the first-class/`md_`-prefix split from spec §3 still
//! applies *within* that JSON document (see [`encode_metadata`]).

use std::collections::HashMap;
use std::path::Path;

use cpg_core::{CpgError, Edge, EdgeLabel, Metadata, MetaValue, Node, NodeId, NodeType, Point, Range, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::backend::{Backend, ReadBackend};
use crate::driver::{GraphDriver, Row, Scalar};

const VERSION: i64 = 1;

const SCHEMA: &str = r#"
    CREATE TABLE metadata (version INTEGER NOT NULL) STRICT;
    CREATE TABLE nodes (
        id        INTEGER PRIMARY KEY,
        label     TEXT NOT NULL,
        file_id   INTEGER NOT NULL,
        name      TEXT NOT NULL,
        start_line INTEGER NOT NULL,
        start_col  INTEGER NOT NULL,
        end_line   INTEGER NOT NULL,
        end_col    INTEGER NOT NULL,
        version    INTEGER NOT NULL,
        scope_id   INTEGER NOT NULL,
        properties TEXT NOT NULL
    ) STRICT;
    CREATE TABLE edges (
        from_id   INTEGER NOT NULL,
        to_id     INTEGER NOT NULL,
        label     TEXT NOT NULL,
        position  INTEGER,
        condition INTEGER,
        file_id   INTEGER NOT NULL,
        PRIMARY KEY (from_id, to_id, label)
    ) STRICT;
"#;

const INDEXES: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_nodes_file ON nodes(file_id);
    CREATE INDEX IF NOT EXISTS idx_nodes_label ON nodes(label);
    CREATE INDEX IF NOT EXISTS idx_edges_from_label ON edges(from_id, label);
    CREATE INDEX IF NOT EXISTS idx_edges_to_label ON edges(to_id, label);
"#;

const PRAGMAS: &str = r#"
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = false;
"#;

fn driver_error(context: &str, source: rusqlite::Error) -> CpgError {
    CpgError::Driver {
        context: context.to_string(),
        source: anyhow::Error::new(source),
    }
}

pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| driver_error("open_in_memory", e))?;
        Self::init(conn)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let is_new = !path.as_ref().exists();
        let conn = Connection::open(path).map_err(|e| driver_error("open", e))?;
        conn.execute_batch(PRAGMAS).map_err(|e| driver_error("pragmas", e))?;
        if is_new {
            Self::init(conn)
        } else {
            check_version(&conn)?;
            conn.execute_batch(INDEXES).map_err(|e| driver_error("indexes", e))?;
            Ok(SqliteBackend { conn })
        }
    }

    fn init(mut conn: Connection) -> Result<Self> {
        let tx = conn.transaction().map_err(|e| driver_error("begin init", e))?;
        tx.execute_batch(SCHEMA).map_err(|e| driver_error("create schema", e))?;
        tx.execute("INSERT INTO metadata (version) VALUES (?1)", params![VERSION])
            .map_err(|e| driver_error("seed version", e))?;
        tx.commit().map_err(|e| driver_error("commit init", e))?;
        conn.execute_batch(INDEXES).map_err(|e| driver_error("indexes", e))?;
        Ok(SqliteBackend { conn })
    }
}

fn check_version(conn: &Connection) -> Result<()> {
    let version: i64 = conn
        .query_row("SELECT version FROM metadata", [], |r| r.get(0))
        .map_err(|e| driver_error("check version", e))?;
    if version != VERSION {
        return Err(CpgError::Driver {
            context: "schema version".to_string(),
            source: anyhow::anyhow!("unsupported database version {version}"),
        });
    }
    Ok(())
}

/// Encode metadata to a JSON object, applying the first-class/`md_`-prefix
/// split on every key (spec §4.5 "Metadata persistence rule").
fn encode_metadata(metadata: &Metadata) -> String {
    let mut obj = serde_json::Map::new();
    for (key, value) in metadata.iter() {
        let column = cpg_core::storage_column(key);
        let json_value = match value {
            MetaValue::Str(s) => serde_json::Value::String(s.clone()),
            MetaValue::Int(i) => serde_json::Value::Number((*i).into()),
            MetaValue::Bool(b) => serde_json::Value::Bool(*b),
            MetaValue::Node(id) => serde_json::Value::Number(id.as_i64().into()),
        };
        obj.insert(column, json_value);
    }
    serde_json::Value::Object(obj).to_string()
}

fn decode_metadata(raw: &str) -> Metadata {
    let mut metadata = Metadata::new();
    let Ok(serde_json::Value::Object(obj)) = serde_json::from_str(raw) else {
        return metadata;
    };
    for (column, value) in obj {
        let key = column.strip_prefix("md_").unwrap_or(&column).to_string();
        let is_md = column.starts_with("md_");
        // First-class keys round-trip through their declared scalar kind;
        // md_-prefixed keys are always read back as strings since we don't
        // know their original type without a schema.
        let meta_value = match value {
            serde_json::Value::Bool(b) => MetaValue::Bool(b),
            serde_json::Value::Number(n) if !is_md && (key == "fake" || key == "is_fake") => {
                MetaValue::Bool(n.as_i64().map(|i| i != 0).unwrap_or(false))
            }
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(MetaValue::Int)
                .unwrap_or_else(|| MetaValue::Str(n.to_string())),
            serde_json::Value::String(s) => MetaValue::Str(s),
            _ => continue,
        };
        metadata.set(key, meta_value);
    }
    metadata
}

fn node_to_row(node: &Node) -> (i64, String, i64, String, i64, i64, i64, i64, i64, i64, String) {
    (
        node.id.as_i64(),
        node.node_type.label().to_string(),
        node.file_id as i64,
        node.name.clone(),
        node.range.start.line as i64,
        node.range.start.column as i64,
        node.range.end.line as i64,
        node.range.end.column as i64,
        node.version as i64,
        node.scope_id.as_i64(),
        encode_metadata(&node.metadata),
    )
}

fn row_to_node(row: &rusqlite::Row) -> rusqlite::Result<Node> {
    let id: i64 = row.get(0)?;
    let label: String = row.get(1)?;
    let file_id: i64 = row.get(2)?;
    let name: String = row.get(3)?;
    let start_line: i64 = row.get(4)?;
    let start_col: i64 = row.get(5)?;
    let end_line: i64 = row.get(6)?;
    let end_col: i64 = row.get(7)?;
    let version: i64 = row.get(8)?;
    let scope_id: i64 = row.get(9)?;
    let properties: String = row.get(10)?;
    let node_type = label_to_type(&label).unwrap_or(NodeType::Expression);
    let mut node = Node::new(
        NodeId::from_i64(id),
        node_type,
        file_id as u32,
        name,
        Range::new(
            Point::new(start_line as u32, start_col as u32),
            Point::new(end_line as u32, end_col as u32),
        ),
        version as u64,
        NodeId::from_i64(scope_id),
    );
    node.metadata = decode_metadata(&properties);
    Ok(node)
}

fn label_to_type(label: &str) -> Option<NodeType> {
    Some(match label {
        "FileScope" => NodeType::FileScope,
        "ModuleScope" => NodeType::ModuleScope,
        "Block" => NodeType::Block,
        "Class" => NodeType::Class,
        "Function" => NodeType::Function,
        "FunctionCall" => NodeType::FunctionCall,
        "Field" => NodeType::Field,
        "Variable" => NodeType::Variable,
        "Expression" => NodeType::Expression,
        "Conditional" => NodeType::Conditional,
        "Loop" => NodeType::Loop,
        "Import" => NodeType::Import,
        "FileNumber" => NodeType::FileNumber,
        _ => return None,
    })
}

impl Backend for SqliteBackend {
    fn write_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        // Group by label so each bulk MERGE only ever targets one logical
        // node kind at a time (spec §4.5: "one UNWIND-style bulk MERGE per
        // label"). With a single `nodes` table the SQL is identical across
        // labels, but grouping keeps the write batches small and cache
        // friendly for any one caller's flush.
        let mut by_label: HashMap<&str, Vec<&Node>> = HashMap::new();
        for node in nodes {
            by_label.entry(node.node_type.label()).or_default().push(node);
        }
        let tx = self.conn.transaction().map_err(|e| driver_error("begin write_nodes", e))?;
        for group in by_label.values() {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO nodes (id, label, file_id, name, start_line, start_col, end_line, end_col, version, scope_id, properties)
                     VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
                     ON CONFLICT(id) DO UPDATE SET
                        label=excluded.label, file_id=excluded.file_id, name=excluded.name,
                        start_line=excluded.start_line, start_col=excluded.start_col,
                        end_line=excluded.end_line, end_col=excluded.end_col,
                        version=excluded.version, scope_id=excluded.scope_id,
                        properties=excluded.properties",
                )
                .map_err(|e| driver_error("prepare write_nodes", e))?;
            for node in group {
                let row = node_to_row(node);
                stmt.execute(params![
                    row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7, row.8, row.9, row.10
                ])
                .map_err(|e| driver_error("write node", e))?;
            }
        }
        drop(by_label);
        tx.commit().map_err(|e| driver_error("commit write_nodes", e))?;
        Ok(())
    }

    fn write_edges(&mut self, edges: &[Edge]) -> Result<()> {
        if edges.is_empty() {
            return Ok(());
        }
        let mut by_label: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for edge in edges {
            by_label.entry(edge.label.name()).or_default().push(edge);
        }
        let tx = self.conn.transaction().map_err(|e| driver_error("begin write_edges", e))?;
        for group in by_label.values() {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO edges (from_id, to_id, label, position, condition, file_id)
                     VALUES (?1,?2,?3,?4,?5,?6)
                     ON CONFLICT(from_id, to_id, label) DO NOTHING",
                )
                .map_err(|e| driver_error("prepare write_edges", e))?;
            for edge in group {
                let position = edge.label.position().map(|p| p as i64);
                let condition = match edge.label {
                    EdgeLabel::Branch { condition, .. } if condition.is_valid() => {
                        Some(condition.as_i64())
                    }
                    _ => None,
                };
                stmt.execute(params![
                    edge.from.as_i64(),
                    edge.to.as_i64(),
                    edge.label.name(),
                    position,
                    condition,
                    edge.file_id as i64,
                ])
                .map_err(|e| driver_error("write edge", e))?;
            }
        }
        drop(by_label);
        tx.commit().map_err(|e| driver_error("commit write_edges", e))?;
        Ok(())
    }

    fn get_node(&self, id: NodeId) -> Option<Node> {
        self.conn
            .query_row(
                "SELECT id,label,file_id,name,start_line,start_col,end_line,end_col,version,scope_id,properties
                 FROM nodes WHERE id = ?1",
                params![id.as_i64()],
                row_to_node,
            )
            .optional()
            .ok()
            .flatten()
    }

    fn patch_node_metadata(&mut self, id: NodeId, patch: &Metadata) -> Result<()> {
        let Some(mut node) = self.get_node(id) else {
            return Ok(());
        };
        node.metadata.merge(patch.clone());
        self.write_nodes(std::slice::from_ref(&node))
    }

    fn delete_node(&mut self, id: NodeId) -> Result<()> {
        self.conn
            .execute("DELETE FROM edges WHERE from_id = ?1 OR to_id = ?1", params![id.as_i64()])
            .map_err(|e| driver_error("delete edges for node", e))?;
        self.conn
            .execute("DELETE FROM nodes WHERE id = ?1", params![id.as_i64()])
            .map_err(|e| driver_error("delete node", e))?;
        Ok(())
    }
}

impl ReadBackend for SqliteBackend {
    fn nodes_in_file(&self, file_id: u32) -> Vec<Node> {
        self.query_nodes(
            "SELECT id,label,file_id,name,start_line,start_col,end_line,end_col,version,scope_id,properties
             FROM nodes WHERE file_id = ?1",
            params![file_id as i64],
        )
    }

    fn nodes_of_type(&self, node_type: NodeType) -> Vec<Node> {
        self.query_nodes(
            "SELECT id,label,file_id,name,start_line,start_col,end_line,end_col,version,scope_id,properties
             FROM nodes WHERE label = ?1",
            params![node_type.label()],
        )
    }

    fn outgoing(&self, from: NodeId, label_name: &str) -> Vec<Edge> {
        self.query_edges(
            "SELECT from_id,to_id,label,position,condition,file_id FROM edges WHERE from_id = ?1 AND label = ?2",
            params![from.as_i64(), label_name],
        )
    }

    fn incoming(&self, to: NodeId, label_name: &str) -> Vec<Edge> {
        self.query_edges(
            "SELECT from_id,to_id,label,position,condition,file_id FROM edges WHERE to_id = ?1 AND label = ?2",
            params![to.as_i64(), label_name],
        )
    }
}

impl SqliteBackend {
    fn query_nodes(&self, sql: &str, params: impl rusqlite::Params) -> Vec<Node> {
        let Ok(mut stmt) = self.conn.prepare(sql) else {
            return Vec::new();
        };
        let Ok(rows) = stmt.query_map(params, row_to_node) else {
            return Vec::new();
        };
        rows.filter_map(|r| r.ok()).collect()
    }

    fn query_edges(&self, sql: &str, params: impl rusqlite::Params) -> Vec<Edge> {
        let Ok(mut stmt) = self.conn.prepare(sql) else {
            return Vec::new();
        };
        let rows = stmt.query_map(params, |row| {
            let from_id: i64 = row.get(0)?;
            let to_id: i64 = row.get(1)?;
            let label: String = row.get(2)?;
            let position: Option<i64> = row.get(3)?;
            let condition: Option<i64> = row.get(4)?;
            let file_id: i64 = row.get(5)?;
            Ok((from_id, to_id, label, position, condition, file_id))
        });
        let Ok(rows) = rows else {
            return Vec::new();
        };
        rows.filter_map(|r| r.ok())
            .filter_map(|(from_id, to_id, label, position, condition, file_id)| {
                let label = build_label(&label, position, condition)?;
                Some(Edge::new(
                    label,
                    NodeId::from_i64(from_id),
                    NodeId::from_i64(to_id),
                    file_id as u32,
                ))
            })
            .collect()
    }

    /// Raw SQL passthrough implementing the `execute_cypher`/
    /// `execute_cypher_write` escape hatch from spec §6. There is no Cypher
    /// engine behind this backend, so the query text is literal SQL.
    pub fn execute_raw(&self, sql: &str) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| driver_error("prepare raw", e))?;
        let column_count = stmt.column_count();
        let column_names: Vec<String> = (0..column_count)
            .map(|i| stmt.column_name(i).unwrap_or("?").to_string())
            .collect();
        let rows = stmt
            .query_map([], |row| {
                let mut map = Row::new();
                for (i, name) in column_names.iter().enumerate() {
                    let value = match row.get_ref(i)? {
                        rusqlite::types::ValueRef::Null => Scalar::Null,
                        rusqlite::types::ValueRef::Integer(n) => Scalar::Int(n),
                        rusqlite::types::ValueRef::Real(f) => Scalar::Float(f),
                        rusqlite::types::ValueRef::Text(t) => {
                            Scalar::Str(String::from_utf8_lossy(t).to_string())
                        }
                        rusqlite::types::ValueRef::Blob(_) => Scalar::Null,
                    };
                    map.insert(name.clone(), value);
                }
                Ok(map)
            })
            .map_err(|e| driver_error("query raw", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| driver_error("collect raw", e))
    }
}

fn build_label(name: &str, position: Option<i64>, condition: Option<i64>) -> Option<EdgeLabel> {
    Some(match name {
        "CONTAINS" => EdgeLabel::Contains,
        "HAS_FIELD" => EdgeLabel::HasField,
        "BODY" => EdgeLabel::Body,
        "FUNCTION_ARG" => EdgeLabel::FunctionArg {
            position: position.unwrap_or(0) as u32,
        },
        "FUNCTION_CALL_ARG" => EdgeLabel::FunctionCallArg {
            position: position.unwrap_or(0) as u32,
        },
        "RETURNS" => EdgeLabel::Returns,
        "CALLS_FUNCTION" => EdgeLabel::CallsFunction,
        "DATA_FLOW" => EdgeLabel::DataFlow,
        "INHERITS" => EdgeLabel::Inherits,
        "THIS" => EdgeLabel::This,
        "BRANCH" => EdgeLabel::Branch {
            position: position.unwrap_or(0) as u32,
            condition: condition.map(NodeId::from_i64).unwrap_or_default(),
        },
        "IMPORTS" => EdgeLabel::Imports,
        "ALIAS" => EdgeLabel::Alias,
        "ANNOTATION" => EdgeLabel::Annotation,
        _ => return None,
    })
}

impl GraphDriver for SqliteBackend {
    fn execute_write(&mut self, query: &str, _params: &[(&str, Scalar)]) -> Result<Vec<Row>> {
        self.execute_raw(query)
    }

    fn execute_read(&self, query: &str, _params: &[(&str, Scalar)]) -> Result<Vec<Row>> {
        self.execute_raw(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpg_core::NodeType;

    fn sample_node(id: u32) -> Node {
        let mut node = Node::new(
            NodeId::new(1, id),
            NodeType::Variable,
            1,
            "x",
            Range::default(),
            1,
            NodeId::new(1, 1),
        );
        node.metadata.set("language", "go");
        node
    }

    #[test]
    fn writes_and_reads_back_a_node() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.write_nodes(&[sample_node(2)]).unwrap();
        let read = backend.get_node(NodeId::new(1, 2)).unwrap();
        assert_eq!(read.name, "x");
        assert_eq!(read.metadata.get("language").unwrap().as_str(), Some("go"));
    }

    #[test]
    fn edge_merge_is_idempotent() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.write_nodes(&[sample_node(2), sample_node(3)]).unwrap();
        let edge = Edge::new(EdgeLabel::Contains, NodeId::new(1, 2), NodeId::new(1, 3), 1);
        backend.write_edges(&[edge, edge]).unwrap();
        assert_eq!(backend.outgoing(NodeId::new(1, 2), "CONTAINS").len(), 1);
    }
}
