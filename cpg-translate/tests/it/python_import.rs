use cpg_core::NodeType;
use pretty_assertions::assert_eq;

use crate::support::{only_named, translate};

const SOURCE: &[u8] = b"from a.b import c as d\n";

#[test]
fn from_import_with_alias_carries_dotted_path() {
    let store = translate("mod.py", SOURCE);

    let import = only_named(&store, NodeType::Import, "d");
    assert_eq!(import.metadata.get("importPath").and_then(|v| v.as_str()), Some("a.b.c"));

    let module_scope = only_named(&store, NodeType::ModuleScope, "mod");
    assert_eq!(import.scope_id, module_scope.id);

    let contains = crate::support::outgoing(&store, module_scope.id, cpg_core::EdgeLabel::Contains.name());
    assert!(contains.iter().any(|e| e.to == import.id), "module scope should CONTAIN the import");
}
