//! The translator core (spec §4.3): the twelve canonical node/edge
//! constructions every language visitor funnels through. A visitor never
//! calls [`cpg_core::GraphSink`] directly — only these methods, so the
//! scope-stack bookkeeping and not-yet-parented tracking stay in one place.

use std::collections::HashMap;

use cpg_core::{
    Edge, EdgeLabel, GraphSink, Metadata, Node, NodeId, NodeType, Range, Result, INVALID,
};
use cpg_store::typed;

use crate::scope::ScopeStack;

/// A closure a visitor hands back to the translator to keep descending into
/// its own language's concrete syntax tree, without the translator ever
/// seeing a CST node type. Boxed because visitors build `Vec`s of these for
/// ordered children (class methods, conditional branches, call arguments).
pub type Cb<'cb, S> = Box<dyn FnOnce(&mut Translator<'_, S>, NodeId) -> Result<NodeId> + 'cb>;

/// Drives construction of one file's graph fragment. Owns the file-local
/// sequence allocator and scope stack; holds a mutable borrow of the sink for
/// its entire lifetime, matching the "one translator per file" lifecycle the
/// driver enforces (spec §4.3, §5 "single-pass, one open file at a time").
pub struct Translator<'a, S: GraphSink + ?Sized> {
    sink: &'a mut S,
    file_id: u32,
    version: u64,
    seq: cpg_core::SeqAllocator,
    scopes: ScopeStack,
    synth_seq: u32,
    /// Non-fake classes seen so far in this file, by name, for the fake-class
    /// resolution pass (spec §4.3 "Fake class resolution").
    classes_by_name: HashMap<String, NodeId>,
    fake_classes: Vec<NodeId>,
    fake_names: HashMap<NodeId, String>,
    /// Mirror of every edge emitted this file, so the fake-class pass can
    /// find a fake's children without depending on the store having already
    /// flushed them (it hasn't — resolution runs before `end_file`).
    local_edges: Vec<Edge>,
}

impl<'a, S: GraphSink + ?Sized> Translator<'a, S> {
    pub fn new(sink: &'a mut S, file_id: u32, version: u64) -> Self {
        sink.begin_file(file_id);
        Translator {
            sink,
            file_id,
            version,
            seq: cpg_core::SeqAllocator::new(file_id),
            scopes: ScopeStack::new(),
            synth_seq: 0,
            classes_by_name: HashMap::new(),
            fake_classes: Vec::new(),
            fake_names: HashMap::new(),
            local_edges: Vec::new(),
        }
    }

    pub fn file_id(&self) -> u32 {
        self.file_id
    }

    fn alloc(&mut self) -> NodeId {
        self.seq.alloc()
    }

    fn next_synth_id(&mut self) -> u32 {
        self.synth_seq += 1;
        self.synth_seq
    }

    fn write_typed(&mut self, node: Node) -> Result<()> {
        match node.node_type {
            NodeType::FileScope => typed::create_file_scope(self.sink, node),
            NodeType::ModuleScope => typed::create_module_scope(self.sink, node),
            NodeType::Block => typed::create_block(self.sink, node),
            NodeType::Class => typed::create_class(self.sink, node),
            NodeType::Function => typed::create_function(self.sink, node),
            NodeType::FunctionCall => typed::create_function_call(self.sink, node),
            NodeType::Field => typed::create_field(self.sink, node),
            NodeType::Variable => typed::create_variable(self.sink, node),
            NodeType::Expression => typed::create_expression(self.sink, node),
            NodeType::Conditional => typed::create_conditional(self.sink, node),
            NodeType::Loop => typed::create_loop(self.sink, node),
            NodeType::Import => typed::create_import(self.sink, node),
            NodeType::FileNumber => self.sink.create_node(node),
        }
    }

    /// Allocate, persist and mark-not-contained a node in one step. Every
    /// canonical construction below goes through this so that "every created
    /// id ends up parented by the end of the file" holds without each
    /// construction having to remember to call `mark_not_contained` itself.
    fn new_node(
        &mut self,
        node_type: NodeType,
        name: &str,
        range: Range,
        scope_id: NodeId,
        metadata: Metadata,
    ) -> Result<NodeId> {
        let id = self.alloc();
        let mut node = Node::new(id, node_type, self.file_id, name, range, self.version, scope_id);
        node.metadata = metadata;
        self.write_typed(node)?;
        self.scopes.mark_not_contained(id);
        Ok(id)
    }

    /// Emit an edge, skipping silently if either endpoint is the invalid id
    /// (spec §4.3 item 7: "both null-id cases simply abort the edge"). A
    /// CONTAINS edge also marks `to` as contained in the scope stack, so a
    /// node that is explicitly attached here (a conditional's branch, a
    /// loop's body, an import) never also receives a second CONTAINS parent
    /// when its enclosing scope pops its `not_contained` leftovers.
    fn edge(&mut self, label: EdgeLabel, from: NodeId, to: NodeId) -> Result<()> {
        if from.is_invalid() || to.is_invalid() {
            return Ok(());
        }
        if let EdgeLabel::Contains = label {
            self.scopes.mark_contained(to);
        }
        let edge = Edge::new(label, from, to, self.file_id);
        self.local_edges.push(edge);
        self.sink.create_edge(edge)
    }

    // ---- File-level scaffolding (not one of the twelve, but shares the
    // same id/scope machinery) ----------------------------------------

    pub fn create_file_scope(
        &mut self,
        repo: &str,
        path: &str,
        language: &str,
        modified: i64,
        range: Range,
    ) -> Result<NodeId> {
        let mut metadata = Metadata::new();
        metadata.set("repo", repo.to_string());
        metadata.set("path", path.to_string());
        metadata.set("language", language.to_string());
        metadata.set("modified", modified);
        let id = self.alloc();
        // A FileScope is the root of its own CONTAINS forest: it is its own
        // scope_id, there being no enclosing lexical container.
        let mut node = Node::new(id, NodeType::FileScope, self.file_id, path, range, self.version, id);
        node.metadata = metadata;
        self.write_typed(node)?;
        Ok(id)
    }

    pub fn create_module_scope(&mut self, file_scope: NodeId, name: &str, range: Range) -> Result<NodeId> {
        let id = self.new_node(NodeType::ModuleScope, name, range, file_scope, Metadata::new())?;
        self.edge(EdgeLabel::Contains, file_scope, id)?;
        Ok(id)
    }

    /// Open the lexical frame that will own every top-level declaration the
    /// visitor produces. Must be called once, right after
    /// [`Translator::create_module_scope`], so the module scope's own
    /// not-contained marking (from its own `new_node` call) stays in the
    /// frame below this one and never loops back onto itself.
    pub fn begin_module(&mut self) {
        self.scopes.push(false);
    }

    /// Close the top-level frame opened by [`Translator::begin_module`]:
    /// every top-level function, class, import, and statement the visitor
    /// created becomes a CONTAINS child of `module_scope`.
    pub fn end_module(&mut self, module_scope: NodeId) -> Result<()> {
        let (_, leftover) = self.scopes.pop(Some(module_scope));
        for child in leftover {
            self.edge(EdgeLabel::Contains, module_scope, child)?;
        }
        Ok(())
    }

    // ---- The twelve canonical constructions (spec §4.3) ---------------

    /// 1. Function. An empty, non-anonymous name aborts with no node
    /// created. Pushes a fresh scope for parameters and body; pops with
    /// itself as the closing parent so every not-yet-parented descendant
    /// (params, body block, and anything the visitor created but never
    /// explicitly wired) attaches here.
    pub fn create_function<'cb>(
        &mut self,
        scope: NodeId,
        name: &str,
        range: Range,
        params: &[(String, Range)],
        body: Option<Cb<'cb, S>>,
        anonymous: bool,
    ) -> Result<NodeId> {
        if name.is_empty() && !anonymous {
            return Ok(INVALID);
        }
        let func_id = self.new_node(NodeType::Function, name, range, scope, Metadata::new())?;
        self.scopes.push(false);
        for (i, (pname, prange)) in params.iter().enumerate() {
            let var_id = self.new_node(NodeType::Variable, pname, *prange, func_id, Metadata::new())?;
            self.scopes.bind(pname, var_id);
            self.edge(EdgeLabel::Contains, func_id, var_id)?;
            self.edge(EdgeLabel::FunctionArg { position: i as u32 }, func_id, var_id)?;
        }
        if let Some(body_cb) = body {
            let body_id = body_cb(self, func_id)?;
            self.edge(EdgeLabel::Contains, func_id, body_id)?;
            self.edge(EdgeLabel::Body, func_id, body_id)?;
        }
        let (_, leftover) = self.scopes.pop(Some(func_id));
        for child in leftover {
            self.edge(EdgeLabel::Contains, func_id, child)?;
        }
        Ok(func_id)
    }

    /// 2. Class. `is_fake` marks a placeholder created because a method
    /// referenced a receiver type not yet seen in this file; it is queued
    /// for the post-file resolution pass instead of registered by name.
    pub fn create_class<'cb>(
        &mut self,
        scope: NodeId,
        name: &str,
        range: Range,
        fields: &[(String, Range)],
        methods: Vec<Cb<'cb, S>>,
        is_fake: bool,
    ) -> Result<NodeId> {
        if name.is_empty() {
            return Ok(INVALID);
        }
        let mut metadata = Metadata::new();
        if is_fake {
            metadata.set("is_fake", true);
        }
        let class_id = self.new_node(NodeType::Class, name, range, scope, metadata)?;
        if is_fake {
            self.fake_classes.push(class_id);
            self.fake_names.insert(class_id, name.to_string());
        } else {
            self.classes_by_name.insert(name.to_string(), class_id);
        }
        self.scopes.push(false);
        for (fname, frange) in fields {
            let field_id = self.new_node(NodeType::Variable, fname, *frange, class_id, Metadata::new())?;
            self.scopes.bind(fname, field_id);
            self.edge(EdgeLabel::Contains, class_id, field_id)?;
            self.edge(EdgeLabel::HasField, class_id, field_id)?;
        }
        for method_cb in methods {
            let method_id = method_cb(self, class_id)?;
            self.edge(EdgeLabel::Contains, class_id, method_id)?;
            self.edge(EdgeLabel::HasField, class_id, method_id)?;
        }
        let (_, leftover) = self.scopes.pop(Some(class_id));
        for child in leftover {
            self.edge(EdgeLabel::Contains, class_id, child)?;
        }
        Ok(class_id)
    }

    /// 3. Block. `children` runs with the block's id as current scope;
    /// individual statements parent themselves via their own constructions,
    /// so this only needs to collect leftovers on pop.
    pub fn translate_block(
        &mut self,
        scope: NodeId,
        range: Range,
        children: impl FnOnce(&mut Self, NodeId) -> Result<()>,
    ) -> Result<NodeId> {
        let block_id = self.new_node(NodeType::Block, "", range, scope, Metadata::new())?;
        self.scopes.push(false);
        children(self, block_id)?;
        let (_, leftover) = self.scopes.pop(Some(block_id));
        for child in leftover {
            self.edge(EdgeLabel::Contains, block_id, child)?;
        }
        Ok(block_id)
    }

    /// 4. Identifier reference. Resolves against the scope chain; creates a
    /// fresh `Variable` on a miss (first write to a name is also its
    /// declaration, absent an explicit declaration construction). Always
    /// participates in RHS capture of the nearest RHS-capturing scope.
    pub fn handle_identifier(&mut self, name: &str, scope: NodeId, range: Range) -> Result<NodeId> {
        if let Some(sym) = self.scopes.resolve(name) {
            let id = sym.borrow().node;
            self.scopes.capture_rhs(id);
            return Ok(id);
        }
        let id = self.new_node(NodeType::Variable, name, range, scope, Metadata::new())?;
        self.scopes.bind(name, id);
        self.scopes.capture_rhs(id);
        Ok(id)
    }

    /// 5. Name-chain resolution (`a.b.c`). Walks/extends a `Symbol`'s shared
    /// field tree so that resolving the same chain twice yields the same
    /// terminal `Field` id. Empty-named components (indexed/computed
    /// accesses) synthesise a fake `Variable` instead of a `Field`.
    pub fn resolve_name_chain(&mut self, components: &[String], scope: NodeId, range: Range) -> Result<NodeId> {
        if components.is_empty() {
            return Ok(INVALID);
        }
        let mut current = match self.scopes.resolve(&components[0]) {
            Some(sym) => sym,
            None => {
                let id = self.new_node(NodeType::Variable, &components[0], range, scope, Metadata::new())?;
                self.scopes.bind(&components[0], id)
            }
        };
        self.scopes.capture_rhs(current.borrow().node);

        for component in &components[1..] {
            let existing = current.borrow().fields.get(component).cloned();
            let next = match existing {
                Some(sym) => sym,
                None => {
                    let parent_node = current.borrow().node;
                    let (field_name, fake) = if component.is_empty() {
                        (format!("__idx_{}__", self.next_synth_id()), true)
                    } else {
                        (component.clone(), false)
                    };
                    let mut metadata = Metadata::new();
                    if fake {
                        metadata.set("fake", true);
                    }
                    let node_type = if fake { NodeType::Variable } else { NodeType::Field };
                    let field_id = self.new_node(node_type, &field_name, range, scope, metadata)?;
                    self.edge(EdgeLabel::HasField, parent_node, field_id)?;
                    let sym = crate::scope::Symbol::new(field_id);
                    current.borrow_mut().fields.insert(component.clone(), sym.clone());
                    sym
                }
            };
            self.scopes.capture_rhs(next.borrow().node);
            current = next;
        }
        let result = current.borrow().node;
        Ok(result)
    }

    /// 6. RHS evaluation behind a fake variable. Pushes an RHS-capturing
    /// scope, runs `rhs`, then either passes the single captured id straight
    /// through or synthesises a fake `Variable` fed by a `DATA_FLOW` edge
    /// from every captured source (spec §3, §8: assignments from a method
    /// chain collapse every intermediate read into one fake sink).
    pub fn handle_rhs_with_fake_variable<'cb>(
        &mut self,
        prefix: &str,
        scope: NodeId,
        range: Range,
        metadata: Metadata,
        rhs: Cb<'cb, S>,
    ) -> Result<NodeId> {
        self.scopes.push(true);
        let raw_id = rhs(self, scope)?;
        let (rhs_vars, _leftover) = self.scopes.pop(None);

        if rhs_vars.len() == 1 && rhs_vars.contains(&raw_id) {
            return Ok(raw_id);
        }

        let synth_name = format!("{prefix}_{}", self.next_synth_id());
        let mut full_metadata = metadata;
        full_metadata.set("fake", true);
        let synth_id = self.new_node(NodeType::Variable, &synth_name, range, scope, full_metadata)?;
        for var in &rhs_vars {
            self.edge(EdgeLabel::DataFlow, *var, synth_id)?;
        }
        Ok(synth_id)
    }

    /// 7. Assignment. `lhs` runs outside RHS capture (it names a sink, not a
    /// source); `rhs` funnels through item 6. Both null-id cases (an
    /// unresolved LHS, or an RHS that produced nothing) abort the edge, not
    /// the whole statement.
    pub fn handle_assignment<'cb>(
        &mut self,
        scope: NodeId,
        range: Range,
        lhs: Cb<'cb, S>,
        rhs: Cb<'cb, S>,
    ) -> Result<NodeId> {
        let lhs_id = lhs(self, scope)?;
        let rhs_id = self.handle_rhs_with_fake_variable("__rhs__", scope, range, Metadata::new(), rhs)?;
        self.edge(EdgeLabel::DataFlow, rhs_id, lhs_id)?;
        Ok(lhs_id)
    }

    /// 8. Conditional (if/elif/else, switch/case, match). `conditions[i]`
    /// is `None` for a branch with no guard (a bare `else`, a `default`
    /// case); `branches[i]` always runs. `BRANCH` carries both the ordinal
    /// position and the resolved condition id (possibly invalid).
    pub fn handle_conditional<'cb>(
        &mut self,
        scope: NodeId,
        range: Range,
        conditions: Vec<Option<Cb<'cb, S>>>,
        branches: Vec<Cb<'cb, S>>,
    ) -> Result<NodeId> {
        let cond_id = self.new_node(NodeType::Conditional, "", range, scope, Metadata::new())?;
        let mut condition_ids = Vec::with_capacity(conditions.len());
        for cond_cb in conditions {
            let id = match cond_cb {
                Some(cb) => self.handle_rhs_with_fake_variable("__cond__", cond_id, range, Metadata::new(), cb)?,
                None => INVALID,
            };
            if id.is_valid() {
                self.edge(EdgeLabel::Contains, cond_id, id)?;
            }
            condition_ids.push(id);
        }
        for (i, branch_cb) in branches.into_iter().enumerate() {
            let branch_id = branch_cb(self, cond_id)?;
            self.edge(EdgeLabel::Contains, cond_id, branch_id)?;
            let condition = condition_ids.get(i).copied().unwrap_or(INVALID);
            self.edge(
                EdgeLabel::Branch {
                    position: i as u32,
                    condition,
                },
                cond_id,
                branch_id,
            )?;
        }
        Ok(cond_id)
    }

    /// 9. Loop (for/while/foreach/range). `init` and `condition` are
    /// optional RHS evaluations recorded in the `Loop` node's metadata
    /// rather than via a dedicated edge, since neither has a natural
    /// CONTAINS-child role distinct from the body.
    pub fn handle_loop<'cb>(
        &mut self,
        scope: NodeId,
        range: Range,
        init: Option<Cb<'cb, S>>,
        condition: Option<Cb<'cb, S>>,
        body: Cb<'cb, S>,
    ) -> Result<NodeId> {
        let loop_id = self.new_node(NodeType::Loop, "", range, scope, Metadata::new())?;
        let init_id = match init {
            Some(cb) => self.handle_rhs_with_fake_variable("__init__", loop_id, range, Metadata::new(), cb)?,
            None => INVALID,
        };
        let cond_id = match condition {
            Some(cb) => self.handle_rhs_with_fake_variable("__cond__", loop_id, range, Metadata::new(), cb)?,
            None => INVALID,
        };
        let body_id = body(self, loop_id)?;
        self.edge(EdgeLabel::Contains, loop_id, init_id)?;
        self.edge(EdgeLabel::Contains, loop_id, cond_id)?;
        self.edge(EdgeLabel::Contains, loop_id, body_id)?;
        self.edge(EdgeLabel::Body, loop_id, body_id)?;

        let mut metadata = Metadata::new();
        metadata.set("condition", cond_id);
        metadata.set("init", init_id);
        self.sink.update_node_metadata(loop_id, metadata)?;
        Ok(loop_id)
    }

    /// 10. Function call. `callee` is whatever symbol the visitor already
    /// resolved for the callee expression (a `Function`, or anything else if
    /// resolution failed or the target is dynamic); `CALLS_FUNCTION` is only
    /// emitted when that symbol is actually a `Function` node, matching the
    /// decision to let unresolved calls simply not appear in the call graph
    /// rather than dangle.
    pub fn handle_call<'cb>(
        &mut self,
        scope: NodeId,
        callee: NodeId,
        callee_name: &str,
        range: Range,
        args: Vec<Cb<'cb, S>>,
    ) -> Result<NodeId> {
        let mut metadata = Metadata::new();
        metadata.set("nameID", callee_name.to_string());
        let call_id = self.new_node(NodeType::FunctionCall, callee_name, range, scope, metadata)?;
        for (i, arg_cb) in args.into_iter().enumerate() {
            let arg_id = self.handle_rhs_with_fake_variable(
                &format!("__arg_{i}__"),
                call_id,
                range,
                Metadata::new(),
                arg_cb,
            )?;
            self.edge(EdgeLabel::FunctionCallArg { position: i as u32 }, call_id, arg_id)?;
        }
        self.scopes.capture_rhs(call_id);
        if callee.is_valid() && self.sink.read_node(callee).map(|n| n.node_type) == Some(NodeType::Function) {
            self.edge(EdgeLabel::CallsFunction, call_id, callee)?;
        }
        Ok(call_id)
    }

    /// 11. Return statement. A bare `return` with no expression produces no
    /// node. Otherwise routes through the fake-variable RHS machinery with
    /// `return = true` stamped so a `Function`'s return sites can be found
    /// by metadata filter without a dedicated edge.
    pub fn handle_return<'cb>(&mut self, scope: NodeId, range: Range, rhs: Option<Cb<'cb, S>>) -> Result<NodeId> {
        match rhs {
            Some(cb) => {
                let mut metadata = Metadata::new();
                metadata.set("return", true);
                self.handle_rhs_with_fake_variable("__ret_value__", scope, range, metadata, cb)
            }
            None => Ok(INVALID),
        }
    }

    /// 12. Receiver / `this`. Must be called from inside the owning method's
    /// body callback (i.e. while that method's scope is still pushed), since
    /// `create_function` pops its scope before returning.
    pub fn create_receiver(
        &mut self,
        method_scope: NodeId,
        class_id: NodeId,
        receiver_name: &str,
        range: Range,
    ) -> Result<NodeId> {
        if receiver_name.is_empty() {
            return Ok(INVALID);
        }
        let recv_id = self.new_node(NodeType::Variable, receiver_name, range, method_scope, Metadata::new())?;
        self.scopes.bind(receiver_name, recv_id);
        self.edge(EdgeLabel::This, recv_id, class_id)?;
        Ok(recv_id)
    }

    // ---- Supporting constructions used by visitors but outside the
    // twelve canonical ones -------------------------------------------

    pub fn create_import(&mut self, scope: NodeId, name: &str, import_path: &str, range: Range) -> Result<NodeId> {
        let mut metadata = Metadata::new();
        metadata.set("importPath", import_path.to_string());
        let import_id = self.new_node(NodeType::Import, name, range, scope, metadata)?;
        self.scopes.bind(name, import_id);
        self.edge(EdgeLabel::Imports, scope, import_id)?;
        self.edge(EdgeLabel::Contains, scope, import_id)?;
        Ok(import_id)
    }

    pub fn create_inherits(&mut self, class_id: NodeId, parent_class: NodeId) -> Result<()> {
        self.edge(EdgeLabel::Inherits, class_id, parent_class)
    }

    pub fn create_alias(&mut self, alias_id: NodeId, target_id: NodeId) -> Result<()> {
        self.edge(EdgeLabel::Alias, alias_id, target_id)
    }

    pub fn create_annotation(&mut self, target_id: NodeId, annotation_id: NodeId) -> Result<()> {
        self.edge(EdgeLabel::Annotation, target_id, annotation_id)
    }

    /// Best-effort visibility tag (spec §3 Open Question: populated only
    /// when a visitor can read an explicit keyword; unresolved cases leave
    /// the key unset rather than guessing).
    pub fn set_visibility(&mut self, id: NodeId, visibility: &str) -> Result<()> {
        if !id.is_valid() {
            return Ok(());
        }
        let mut metadata = Metadata::new();
        metadata.set("visibility", visibility.to_string());
        self.sink.update_node_metadata(id, metadata)
    }

    pub fn create_returns_edge(&mut self, function_id: NodeId, return_value: NodeId) -> Result<()> {
        self.edge(EdgeLabel::Returns, function_id, return_value)
    }

    /// Open a fresh lexical frame for a visitor construction that doesn't
    /// fit one of the twelve canonical patterns (Go's out-of-line methods,
    /// whose owning class is looked up rather than built inline). Pair with
    /// [`Translator::close_scope`].
    pub fn open_scope(&mut self) {
        self.scopes.push(false);
    }

    pub fn close_scope(&mut self, closing_parent: NodeId) -> Result<()> {
        let (_, leftover) = self.scopes.pop(Some(closing_parent));
        for child in leftover {
            self.edge(EdgeLabel::Contains, closing_parent, child)?;
        }
        Ok(())
    }

    /// Parent an externally-constructed member (a method built outside
    /// [`Translator::create_class`]'s own `methods` callback list) onto its
    /// class with the same CONTAINS+HAS_FIELD pair inline members get.
    pub fn attach_member(&mut self, class_id: NodeId, member_id: NodeId) -> Result<()> {
        self.edge(EdgeLabel::Contains, class_id, member_id)?;
        self.edge(EdgeLabel::HasField, class_id, member_id)
    }

    /// Register a placeholder `Class` for a receiver type not yet seen in
    /// this file. Returns the fake class's id; call sites look it up again
    /// (or create a fresh one) the same way a real lookup would.
    pub fn fake_class_for(&mut self, scope: NodeId, name: &str, range: Range) -> Result<NodeId> {
        if let Some(&id) = self.classes_by_name.get(name) {
            return Ok(id);
        }
        self.create_class(scope, name, range, &[], Vec::new(), true)
    }

    pub fn class_by_name(&self, name: &str) -> Option<NodeId> {
        self.classes_by_name.get(name).copied()
    }

    /// Fake-class resolution (spec §4.3, run once per file before
    /// `end_file`): any fake `Class` whose name was later seen for real has
    /// its CONTAINS children re-parented onto the real class, then is
    /// deleted so no file ends up with both a fake and a real `Class` of
    /// the same name.
    pub fn resolve_fake_classes(&mut self) -> Result<()> {
        let fakes = std::mem::take(&mut self.fake_classes);
        for fake_id in fakes {
            let Some(name) = self.fake_names.remove(&fake_id) else {
                continue;
            };
            let Some(&real_id) = self.classes_by_name.get(&name) else {
                continue;
            };
            let children: Vec<NodeId> = self
                .local_edges
                .iter()
                .filter(|e| e.from == fake_id && e.label.name() == "CONTAINS")
                .map(|e| e.to)
                .collect();
            for child in children {
                self.edge(EdgeLabel::Contains, real_id, child)?;
            }
            self.sink.delete_node(fake_id)?;
        }
        Ok(())
    }

    /// Finish the file: run fake-class resolution, then flush the sink's
    /// buffer. No further constructions may be made through this translator
    /// afterwards.
    pub fn finish(mut self) -> Result<()> {
        self.resolve_fake_classes()?;
        self.sink.end_file(self.file_id)
    }
}
