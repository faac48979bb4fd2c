// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! The Query Facade (spec §4.6): a read-only `Reader` for point lookups and
//! filtered scans, and an `Analyzer` for graph-shaped traversal queries.
//! Both borrow a [`cpg_store::GraphReadModel`] and hold no state of their
//! own beyond that borrow.

pub mod analyzer;
pub mod filter;
pub mod reader;

pub use analyzer::{Analyzer, CallEdge, CallGraph, Direction, FieldAccessors, InheritanceDirection};
pub use filter::{Filter, NameMatch};
pub use reader::{ClassFull, ClassLoadOptions, CodeReader, FileReader, RepoReader};

#[cfg(test)]
mod tests {
    use super::*;
    use cpg_core::{Edge, EdgeLabel, GraphSink, Metadata, Node, NodeId, NodeType, NeverCancel, Range};
    use cpg_store::MemoryGraphStore;

    fn node(file: u32, seq: u32, node_type: NodeType, name: &str, scope: NodeId, metadata: Metadata) -> Node {
        let mut n = Node::new(NodeId::new(file, seq), node_type, file, name, Range::default(), 1, scope);
        n.metadata = metadata;
        n
    }

    /// One repo, one file: `Greeter` class with field `name` and method
    /// `greet`, which calls a free function `format_greeting`.
    fn populated_store() -> (MemoryGraphStore, NodeId, NodeId, NodeId, NodeId) {
        let mut store = MemoryGraphStore::new_in_memory();
        store.begin_file(1);

        let mut file_meta = Metadata::new();
        file_meta.set("repo", "acme");
        file_meta.set("path", "greeter.py");
        let file_scope = node(1, 1, NodeType::FileScope, "greeter.py", NodeId::new(1, 1), file_meta);

        let class = node(1, 2, NodeType::Class, "Greeter", file_scope.id, Metadata::new());

        let field = node(1, 3, NodeType::Variable, "name", class.id, Metadata::new());

        let mut method_meta = Metadata::new();
        method_meta.set("visibility", "public");
        let method = node(1, 4, NodeType::Function, "greet", class.id, method_meta);

        let mut func_meta = Metadata::new();
        func_meta.set("visibility", "private");
        let free_func = node(1, 5, NodeType::Function, "format_greeting", file_scope.id, func_meta);

        for n in [&file_scope, &class, &field, &method, &free_func] {
            store.create_node(n.clone()).unwrap();
        }
        store.create_edge(Edge::new(EdgeLabel::Contains, file_scope.id, class.id, 1)).unwrap();
        store.create_edge(Edge::new(EdgeLabel::Contains, file_scope.id, free_func.id, 1)).unwrap();
        store.create_edge(Edge::new(EdgeLabel::Contains, class.id, field.id, 1)).unwrap();
        store.create_edge(Edge::new(EdgeLabel::HasField, class.id, field.id, 1)).unwrap();
        store.create_edge(Edge::new(EdgeLabel::Contains, class.id, method.id, 1)).unwrap();
        store.create_edge(Edge::new(EdgeLabel::HasField, class.id, method.id, 1)).unwrap();
        store.create_edge(Edge::new(EdgeLabel::CallsFunction, method.id, free_func.id, 1)).unwrap();
        store.create_edge(Edge::new(EdgeLabel::DataFlow, field.id, method.id, 1)).unwrap();
        store.end_file(1).unwrap();

        (store, class.id, field.id, method.id, free_func.id)
    }

    #[test]
    fn repo_reader_finds_class_and_members() {
        let (store, class_id, field_id, method_id, _) = populated_store();
        let reader = CodeReader::new(&store);
        assert_eq!(reader.list_repos(), vec!["acme".to_string()]);

        let repo = reader.repo("acme");
        let classes = repo.list_classes();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id, class_id);

        let methods = repo.get_class_methods(class_id);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].id, method_id);

        let fields = repo.get_class_fields(class_id);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].id, field_id);

        let owner = repo.get_method_class(method_id).unwrap();
        assert_eq!(owner.id, class_id);
    }

    #[test]
    fn repo_reader_distinguishes_methods_from_free_functions() {
        let (store, _, _, method_id, free_func_id) = populated_store();
        let repo = CodeReader::new(&store).repo("acme");

        let methods = repo.list_methods();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].id, method_id);

        let functions = repo.list_functions();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].id, free_func_id);
    }

    #[test]
    fn filter_by_visibility_narrows_results() {
        let (store, _, _, method_id, _) = populated_store();
        let repo = CodeReader::new(&store).repo("acme");

        let public_methods = repo.find_methods(&Filter::new().visibility("public"));
        assert_eq!(public_methods.len(), 1);
        assert_eq!(public_methods[0].id, method_id);

        let private_methods = repo.find_methods(&Filter::new().visibility("private"));
        assert!(private_methods.is_empty());
    }

    #[test]
    fn file_reader_scopes_to_single_file() {
        let (store, class_id, _, _, _) = populated_store();
        let repo = CodeReader::new(&store).repo("acme");
        let file = repo.file("greeter.py").unwrap();
        assert_eq!(file.list_classes().len(), 1);
        assert_eq!(file.list_classes()[0].id, class_id);
    }

    #[test]
    fn call_graph_follows_calls_function_outgoing() {
        let (store, _, _, method_id, free_func_id) = populated_store();
        let analyzer = Analyzer::new(&store);
        let graph = analyzer.call_graph(method_id, Direction::Outgoing, 5, &NeverCancel).unwrap();
        assert!(!graph.truncated);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].callee, free_func_id);
    }

    #[test]
    fn call_graph_reports_truncation_at_depth_zero() {
        let (store, _, _, method_id, _) = populated_store();
        let analyzer = Analyzer::new(&store);
        let graph = analyzer.call_graph(method_id, Direction::Outgoing, 0, &NeverCancel).unwrap();
        assert!(graph.truncated);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn data_dependents_follow_data_flow_forward() {
        let (store, _, field_id, method_id, _) = populated_store();
        let analyzer = Analyzer::new(&store);
        let dependents = analyzer.data_dependents(field_id, false, &NeverCancel).unwrap();
        assert_eq!(dependents, vec![method_id]);
    }

    #[test]
    fn field_accessors_resolves_to_enclosing_method() {
        let (store, _, field_id, method_id, _) = populated_store();
        let analyzer = Analyzer::new(&store);
        let accessors = analyzer.field_accessors(field_id, &NeverCancel).unwrap();
        assert_eq!(accessors.readers, vec![(method_id, 1)]);
        assert!(accessors.writers.is_empty());
    }

    #[test]
    fn impact_unions_callers_and_dependents() {
        let (store, _, field_id, method_id, _) = populated_store();
        let analyzer = Analyzer::new(&store);
        let impacted = analyzer.impact(field_id, &NeverCancel).unwrap();
        assert_eq!(impacted, vec![method_id]);
    }
}
