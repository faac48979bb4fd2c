//! The Reader (spec §4.6): three stateless tiers over a read model —
//! `CodeReader` (cross-repo), `RepoReader`, `FileReader`. None of them cache
//! anything except a `FileReader`'s lazily-resolved file id.

use cpg_core::{Node, NodeId, NodeType};
use cpg_store::GraphReadModel;

use crate::filter::{paginate, Filter};

fn repo_of(node: &Node) -> Option<&str> {
    node.metadata.get("repo").and_then(|v| v.as_str())
}

fn path_of(node: &Node) -> Option<&str> {
    node.metadata.get("path").and_then(|v| v.as_str())
}

pub struct CodeReader<'a, R: GraphReadModel> {
    store: &'a R,
}

impl<'a, R: GraphReadModel> CodeReader<'a, R> {
    pub fn new(store: &'a R) -> Self {
        CodeReader { store }
    }

    pub fn list_repos(&self) -> Vec<String> {
        let mut repos: Vec<String> = self
            .store
            .nodes_of_type(NodeType::FileScope)
            .into_iter()
            .filter_map(|n| repo_of(&n).map(str::to_string))
            .collect();
        repos.sort();
        repos.dedup();
        repos
    }

    pub fn repo(&self, name: &str) -> RepoReader<'a, R> {
        RepoReader {
            store: self.store,
            repo: name.to_string(),
        }
    }
}

pub struct RepoReader<'a, R: GraphReadModel> {
    store: &'a R,
    repo: String,
}

impl<'a, R: GraphReadModel> RepoReader<'a, R> {
    fn file_scopes(&self) -> Vec<Node> {
        self.store
            .nodes_of_type(NodeType::FileScope)
            .into_iter()
            .filter(|n| repo_of(n) == Some(self.repo.as_str()))
            .collect()
    }

    fn file_ids(&self) -> Vec<u32> {
        self.file_scopes().into_iter().map(|n| n.file_id).collect()
    }

    fn resolve_path(&self, path: &str) -> Option<u32> {
        self.file_scopes().into_iter().find(|n| path_of(n) == Some(path)).map(|n| n.file_id)
    }

    pub fn list_files(&self) -> Vec<Node> {
        self.file_scopes()
    }

    pub fn find_files(&self, filter: &Filter) -> Vec<Node> {
        let path_fid = filter.path.as_deref().and_then(|p| self.resolve_path(p));
        let matched: Vec<Node> = self.file_scopes().into_iter().filter(|n| filter.accepts(n, path_fid)).collect();
        paginate(matched, filter)
    }

    pub fn get_file(&self, id: NodeId) -> Option<Node> {
        self.store.node(id).filter(|n| n.node_type == NodeType::FileScope && repo_of(n) == Some(self.repo.as_str()))
    }

    pub fn get_file_by_path(&self, path: &str) -> Option<Node> {
        self.file_scopes().into_iter().find(|n| path_of(n) == Some(path))
    }

    pub fn file(&self, path: &str) -> Option<FileReader<'a, R>> {
        self.get_file_by_path(path).map(|fs| FileReader::for_file_id(self.store, fs.file_id))
    }

    pub fn file_by_id(&self, id: NodeId) -> Option<FileReader<'a, R>> {
        self.get_file(id).map(|fs| FileReader::for_file_id(self.store, fs.file_id))
    }

    fn of_type_in_repo(&self, node_type: NodeType) -> Vec<Node> {
        let ids = self.file_ids();
        self.store.nodes_of_type(node_type).into_iter().filter(|n| ids.contains(&n.file_id)).collect()
    }

    fn is_method(&self, node: &Node) -> bool {
        !self.store.incoming(node.id, "HAS_FIELD").is_empty()
    }

    fn find_functions_impl(&self, filter: &Filter, want_method: Option<bool>) -> Vec<Node> {
        let path_fid = filter.path.as_deref().and_then(|p| self.resolve_path(p));
        let matched: Vec<Node> = self
            .of_type_in_repo(NodeType::Function)
            .into_iter()
            .filter(|n| filter.accepts(n, path_fid))
            .filter(|n| filter.is_method.map(|want| self.is_method(n) == want).unwrap_or(true))
            .filter(|n| want_method.map(|want| self.is_method(n) == want).unwrap_or(true))
            .filter(|n| filter.class_id.map(|cid| self.get_method_class(n.id).map(|c| c.id) == Some(cid)).unwrap_or(true))
            .collect();
        paginate(matched, filter)
    }

    pub fn list_classes(&self) -> Vec<Node> {
        self.of_type_in_repo(NodeType::Class)
    }

    pub fn find_classes(&self, filter: &Filter) -> Vec<Node> {
        let path_fid = filter.path.as_deref().and_then(|p| self.resolve_path(p));
        let matched: Vec<Node> = self.of_type_in_repo(NodeType::Class).into_iter().filter(|n| filter.accepts(n, path_fid)).collect();
        paginate(matched, filter)
    }

    pub fn list_methods(&self) -> Vec<Node> {
        self.find_functions_impl(&Filter::new(), Some(true))
    }

    pub fn find_methods(&self, filter: &Filter) -> Vec<Node> {
        self.find_functions_impl(filter, Some(true))
    }

    pub fn list_functions(&self) -> Vec<Node> {
        self.find_functions_impl(&Filter::new(), Some(false))
    }

    pub fn find_functions(&self, filter: &Filter) -> Vec<Node> {
        self.find_functions_impl(filter, Some(false))
    }

    pub fn find_fields(&self, filter: &Filter) -> Vec<Node> {
        let path_fid = filter.path.as_deref().and_then(|p| self.resolve_path(p));
        let matched: Vec<Node> = self
            .of_type_in_repo(NodeType::Variable)
            .into_iter()
            .filter(|n| !self.store.incoming(n.id, "HAS_FIELD").is_empty())
            .filter(|n| filter.accepts(n, path_fid))
            .collect();
        paginate(matched, filter)
    }

    pub fn get_class(&self, id: NodeId) -> Option<Node> {
        self.store.node(id).filter(|n| n.node_type == NodeType::Class)
    }

    pub fn get_class_full(&self, id: NodeId, opts: ClassLoadOptions) -> Option<ClassFull> {
        let class = self.get_class(id)?;
        let methods = if opts.load_methods { self.get_class_methods(id) } else { Vec::new() };
        let fields = if opts.load_fields { self.get_class_fields(id) } else { Vec::new() };
        Some(ClassFull { class, methods, fields })
    }

    pub fn get_method(&self, id: NodeId) -> Option<Node> {
        self.store.node(id).filter(|n| n.node_type == NodeType::Function)
    }

    pub fn get_class_methods(&self, class_id: NodeId) -> Vec<Node> {
        self.store
            .outgoing(class_id, "HAS_FIELD")
            .into_iter()
            .filter_map(|e| self.store.node(e.to))
            .filter(|n| n.node_type == NodeType::Function)
            .collect()
    }

    pub fn get_class_fields(&self, class_id: NodeId) -> Vec<Node> {
        self.store
            .outgoing(class_id, "HAS_FIELD")
            .into_iter()
            .filter_map(|e| self.store.node(e.to))
            .filter(|n| n.node_type != NodeType::Function)
            .collect()
    }

    pub fn get_method_class(&self, method_id: NodeId) -> Option<Node> {
        self.store
            .incoming(method_id, "HAS_FIELD")
            .into_iter()
            .filter_map(|e| self.store.node(e.from))
            .find(|n| n.node_type == NodeType::Class)
    }
}

pub struct FileReader<'a, R: GraphReadModel> {
    store: &'a R,
    file_id: u32,
}

impl<'a, R: GraphReadModel> FileReader<'a, R> {
    fn for_file_id(store: &'a R, file_id: u32) -> Self {
        FileReader { store, file_id }
    }

    fn is_method(&self, node: &Node) -> bool {
        !self.store.incoming(node.id, "HAS_FIELD").is_empty()
    }

    fn of_type(&self, node_type: NodeType) -> Vec<Node> {
        self.store.nodes_in_file(self.file_id).into_iter().filter(|n| n.node_type == node_type).collect()
    }

    pub fn list_classes(&self) -> Vec<Node> {
        self.of_type(NodeType::Class)
    }

    pub fn find_classes(&self, filter: &Filter) -> Vec<Node> {
        paginate(self.of_type(NodeType::Class).into_iter().filter(|n| filter.accepts(n, None)).collect(), filter)
    }

    pub fn list_methods(&self) -> Vec<Node> {
        self.of_type(NodeType::Function).into_iter().filter(|n| self.is_method(n)).collect()
    }

    pub fn find_methods(&self, filter: &Filter) -> Vec<Node> {
        let matched = self
            .of_type(NodeType::Function)
            .into_iter()
            .filter(|n| self.is_method(n))
            .filter(|n| filter.accepts(n, None))
            .collect();
        paginate(matched, filter)
    }

    pub fn list_functions(&self) -> Vec<Node> {
        self.of_type(NodeType::Function).into_iter().filter(|n| !self.is_method(n)).collect()
    }

    pub fn find_functions(&self, filter: &Filter) -> Vec<Node> {
        let matched = self
            .of_type(NodeType::Function)
            .into_iter()
            .filter(|n| !self.is_method(n))
            .filter(|n| filter.accepts(n, None))
            .collect();
        paginate(matched, filter)
    }

    pub fn find_fields(&self, filter: &Filter) -> Vec<Node> {
        let matched = self
            .of_type(NodeType::Variable)
            .into_iter()
            .filter(|n| !self.store.incoming(n.id, "HAS_FIELD").is_empty())
            .filter(|n| filter.accepts(n, None))
            .collect();
        paginate(matched, filter)
    }

    pub fn get_class(&self, id: NodeId) -> Option<Node> {
        self.store.node(id).filter(|n| n.node_type == NodeType::Class && n.file_id == self.file_id)
    }

    pub fn get_method(&self, id: NodeId) -> Option<Node> {
        self.store.node(id).filter(|n| n.node_type == NodeType::Function && n.file_id == self.file_id)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ClassLoadOptions {
    pub load_methods: bool,
    pub load_fields: bool,
}

#[derive(Clone, Debug)]
pub struct ClassFull {
    pub class: Node,
    pub methods: Vec<Node>,
    pub fields: Vec<Node>,
}
