//! Reader filter predicates (spec §4.6): exact/substring name, path,
//! file-id, class-id, visibility, an `is_method` tri-state, plus pagination.
//! Stateless — built fresh per call, never retained across queries.

use cpg_core::{Node, NodeId};

#[derive(Clone, Debug)]
pub enum NameMatch {
    Exact(String),
    Contains(String),
}

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatch::Exact(s) => name == s,
            NameMatch::Contains(s) => name.contains(s.as_str()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub name: Option<NameMatch>,
    pub path: Option<String>,
    pub file_id: Option<u32>,
    pub class_id: Option<NodeId>,
    pub visibility: Option<String>,
    pub is_method: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_exact(mut self, name: impl Into<String>) -> Self {
        self.name = Some(NameMatch::Exact(name.into()));
        self
    }

    pub fn name_contains(mut self, substring: impl Into<String>) -> Self {
        self.name = Some(NameMatch::Contains(substring.into()));
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn file_id(mut self, file_id: u32) -> Self {
        self.file_id = Some(file_id);
        self
    }

    pub fn class_id(mut self, class_id: NodeId) -> Self {
        self.class_id = Some(class_id);
        self
    }

    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    pub fn is_method(mut self, is_method: bool) -> Self {
        self.is_method = Some(is_method);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Every predicate this struct can check without consulting the store:
    /// name, file-id, visibility, and (given the caller already resolved
    /// `path` to a file id) path. `class_id`/`is_method` need edge lookups
    /// and are applied by the Reader after this passes.
    pub(crate) fn accepts(&self, node: &Node, path_file_id: Option<u32>) -> bool {
        if let Some(m) = &self.name {
            if !m.matches(&node.name) {
                return false;
            }
        }
        if let Some(fid) = self.file_id {
            if node.file_id != fid {
                return false;
            }
        }
        if self.path.is_some() && path_file_id != Some(node.file_id) {
            return false;
        }
        if let Some(vis) = &self.visibility {
            if node.metadata.get("visibility").and_then(|v| v.as_str()) != Some(vis.as_str()) {
                return false;
            }
        }
        true
    }
}

pub(crate) fn paginate(mut nodes: Vec<Node>, filter: &Filter) -> Vec<Node> {
    if let Some(offset) = filter.offset {
        if offset >= nodes.len() {
            return Vec::new();
        }
        nodes.drain(..offset);
    }
    if let Some(limit) = filter.limit {
        nodes.truncate(limit);
    }
    nodes
}
