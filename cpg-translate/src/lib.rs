// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

//! Single-pass translation from a concrete syntax tree to a code property
//! graph (spec §4.3, §4.4, §6).
//!
//! [`driver::translate_file`] is the crate's one public entry point for most
//! callers: given a language-neutral file identity plus its bytes, it parses,
//! walks, and flushes one file's graph fragment through a
//! [`cpg_core::GraphSink`]. [`Translator`] and the `visitors` module are
//! exposed for embedders that want to drive translation node-by-node (tests,
//! alternative file drivers).

pub mod driver;
pub mod scope;
pub mod translator;
pub mod visitors;

pub use driver::{translate_file, Language};
pub use translator::Translator;

#[cfg(test)]
mod tests {
    use cpg_core::{GraphSink, NeverCancel, NodeType};
    use cpg_store::MemoryGraphStore;

    use super::*;

    #[test]
    fn translates_a_python_function_and_call() {
        let mut store = MemoryGraphStore::new_in_memory();
        let source = b"def greet(name):\n    print(name)\n    return name\n";
        translate_file(&mut store, "repo", "greet.py", 1, 1, source, 0, &NeverCancel).unwrap();

        let functions = functions_named(&store, "greet");
        assert_eq!(functions.len(), 1);
        assert!(store.read_node(functions[0]).is_some());

        let calls = nodes_of_type(&store, NodeType::FunctionCall);
        assert!(calls.iter().any(|n| n.name == "print"));
    }

    #[test]
    fn translates_a_go_struct_and_method() {
        let mut store = MemoryGraphStore::new_in_memory();
        let source = b"package main\n\ntype Greeter struct {\n\tName string\n}\n\nfunc (g *Greeter) Greet() string {\n\treturn g.Name\n}\n";
        translate_file(&mut store, "repo", "greeter.go", 1, 1, source, 0, &NeverCancel).unwrap();

        let classes = nodes_of_type(&store, NodeType::Class);
        assert!(classes.iter().any(|n| n.name == "Greeter" && !n.is_fake_class()));
    }

    #[test]
    fn unsupported_extension_is_skipped_not_errored() {
        let mut store = MemoryGraphStore::new_in_memory();
        let result = translate_file(&mut store, "repo", "README.md", 1, 1, b"# hi", 0, &NeverCancel);
        assert!(result.is_ok());
    }

    fn functions_named(store: &MemoryGraphStore, name: &str) -> Vec<cpg_core::NodeId> {
        nodes_of_type(store, NodeType::Function)
            .into_iter()
            .filter(|n| n.name == name)
            .map(|n| n.id)
            .collect()
    }

    fn nodes_of_type(store: &MemoryGraphStore, node_type: NodeType) -> Vec<cpg_core::Node> {
        use cpg_store::GraphReadModel;
        store.nodes_of_type(node_type)
    }
}
