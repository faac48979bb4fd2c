//! The node data model (spec §3) and its schema labels (spec §6).

use std::collections::BTreeMap;

use crate::id::NodeId;
use crate::range::Range;

/// Closed sum type for node kinds. Dispatch is by typed constructor wrappers
/// in `cpg-translate`, never by an inheritance hierarchy (spec §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    FileScope,
    ModuleScope,
    Block,
    Class,
    Function,
    FunctionCall,
    Field,
    Variable,
    Expression,
    Conditional,
    Loop,
    Import,
    FileNumber,
}

impl NodeType {
    /// The graph store label this node type is persisted under.
    pub fn label(self) -> &'static str {
        match self {
            NodeType::FileScope => "FileScope",
            NodeType::ModuleScope => "ModuleScope",
            NodeType::Block => "Block",
            NodeType::Class => "Class",
            NodeType::Function => "Function",
            NodeType::FunctionCall => "FunctionCall",
            NodeType::Field => "Field",
            NodeType::Variable => "Variable",
            NodeType::Expression => "Expression",
            NodeType::Conditional => "Conditional",
            NodeType::Loop => "Loop",
            NodeType::Import => "Import",
            NodeType::FileNumber => "FileNumber",
        }
    }
}

/// A metadata scalar. Lists are intentionally not modeled: the source spec
/// only requires string/int/bool/node-id scalars for first-class keys and
/// free-form extras.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Node(NodeId),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            MetaValue::Node(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Str(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Str(s)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Int(i)
    }
}

impl From<NodeId> for MetaValue {
    fn from(id: NodeId) -> Self {
        MetaValue::Node(id)
    }
}

/// First-class metadata keys (spec §3): stored as top-level properties by
/// the store for indexing. Every other key is persisted with an `md_`
/// prefix.
pub const FIRST_CLASS_KEYS: &[&str] = &[
    "fake",
    "nameID",
    "return",
    "repo",
    "path",
    "language",
    "importPath",
    "is_fake",
    "modified",
    "condition",
    "init",
    "type",
    "visibility",
];

pub fn is_first_class(key: &str) -> bool {
    FIRST_CLASS_KEYS.contains(&key)
}

/// The property-bag column name a key is persisted under.
pub fn storage_column(key: &str) -> String {
    if is_first_class(key) {
        key.to_string()
    } else {
        format!("md_{key}")
    }
}

/// A node's free-form metadata. Ordered so that store writes and test
/// fixtures are deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
    pub fn new() -> Self {
        Metadata(BTreeMap::new())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.0.iter()
    }

    pub fn merge(&mut self, other: Metadata) {
        for (k, v) in other.0 {
            self.0.insert(k, v);
        }
    }
}

/// One vertex in the property graph (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub file_id: u32,
    pub name: String,
    pub range: Range,
    pub version: u64,
    pub scope_id: NodeId,
    pub metadata: Metadata,
}

impl Node {
    pub fn new(
        id: NodeId,
        node_type: NodeType,
        file_id: u32,
        name: impl Into<String>,
        range: Range,
        version: u64,
        scope_id: NodeId,
    ) -> Self {
        Node {
            id,
            node_type,
            file_id,
            name: name.into(),
            range,
            version,
            scope_id,
            metadata: Metadata::new(),
        }
    }

    /// A `Variable` marked `fake=true` is a translator-synthesised
    /// intermediate (spec §3, §4.3 item 6).
    pub fn is_fake(&self) -> bool {
        matches!(self.metadata.get("fake"), Some(MetaValue::Bool(true)))
    }

    pub fn is_fake_class(&self) -> bool {
        self.node_type == NodeType::Class
            && matches!(self.metadata.get("is_fake"), Some(MetaValue::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_class_keys_are_unprefixed() {
        assert_eq!(storage_column("repo"), "repo");
        assert_eq!(storage_column("custom_thing"), "md_custom_thing");
    }

    #[test]
    fn metadata_merge_overwrites_by_key() {
        let mut a = Metadata::new();
        a.set("language", "go");
        let mut b = Metadata::new();
        b.set("language", "python");
        a.merge(b);
        assert_eq!(a.get("language").unwrap().as_str(), Some("python"));
    }
}
