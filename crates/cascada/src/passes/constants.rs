//! Constant definition collection and reference substitution.
//!
//! [`CollectConstants`] records each definition's name -> value-node-list
//! binding and removes the definition node from the tree (it has no CSS
//! output); the detached value nodes stay alive in the arena and serve as
//! the template every reference is deep-copied from.
//!
//! [`ReplaceConstants`] then rewrites bare identifier references that
//! match a known constant name - in declaration values, function-call
//! arguments, mixin-call arguments, and for-loop bounds - to copies of
//! the bound values. References are resolved in document order: a
//! definition can use constants defined above it.

use indexmap::IndexMap;

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Name -> bound value nodes (detached, owned by the arena).
#[derive(Debug, Default)]
pub struct ConstantBindings {
    bindings: IndexMap<String, Vec<NodeId>>,
}

impl ConstantBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any earlier binding (the last definition
    /// wins).
    pub fn define(&mut self, name: impl Into<String>, values: Vec<NodeId>) {
        self.bindings.insert(name.into(), values);
    }

    /// The values bound to `name`.
    pub fn get(&self, name: &str) -> Option<&[NodeId]> {
        self.bindings.get(name).map(Vec::as_slice)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no names are bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Whether an identifier reads as an intended constant reference
/// (`BG_COLOR`), as opposed to an ordinary CSS keyword (`red`).
pub(crate) fn is_constant_like(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Rewrite one value node against `bindings`.
///
/// Returns `Some(replacements)` when the node itself is a bound reference
/// (the caller splices the copies into its place); returns `None` when
/// the node stays, though references nested inside it have been rewritten
/// in place.
fn rewrite_value(tree: &mut Tree, node: NodeId, bindings: &ConstantBindings) -> Option<Vec<NodeId>> {
    match tree.kind(node) {
        NodeKind::Literal { value } => {
            let name = value.clone();
            let bound = bindings.get(&name)?.to_vec();
            Some(bound.iter().map(|&v| tree.deep_copy(v)).collect())
        }
        NodeKind::FunctionCall { .. } | NodeKind::Composite { .. } => {
            let children = tree.children(node).to_vec();
            let mut changed = false;
            let mut rebuilt = Vec::with_capacity(children.len());
            for child in children {
                match rewrite_value(tree, child, bindings) {
                    Some(replacements) => {
                        changed = true;
                        rebuilt.extend(replacements);
                    }
                    None => rebuilt.push(child),
                }
            }
            if changed {
                tree.rebuild_children(node, 0, rebuilt);
            }
            None
        }
        _ => None,
    }
}

/// Report every unresolved constant-like literal in a value subtree.
fn report_unresolved(tree: &Tree, node: NodeId, errors: &mut ErrorManager) {
    match tree.kind(node) {
        NodeKind::Literal { value } if is_constant_like(value) => {
            errors.report(
                Diagnostic::error(format!("undefined constant `{value}`"))
                    .with_code(ErrorCode::E202)
                    .with_label_opt(tree.location(node), "referenced here")
                    .with_help("define it with `@def` or allow undefined constants"),
            );
        }
        NodeKind::FunctionCall { .. } | NodeKind::Composite { .. } => {
            for &child in tree.children(node) {
                report_unresolved(tree, child, errors);
            }
        }
        _ => {}
    }
}

/// Collects `@def` bindings and removes the definition nodes.
pub struct CollectConstants;

impl CollectConstants {
    pub fn run(tree: &mut Tree, _errors: &mut ErrorManager, bindings: &mut ConstantBindings) {
        let mut visitor = CollectVisitor { bindings };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct CollectVisitor<'b> {
    bindings: &'b mut ConstantBindings,
}

impl Visitor for CollectVisitor<'_> {
    fn enter_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let NodeKind::Definition { name } = ctl.tree().kind(id) else {
            return true;
        };
        let name = name.clone();

        // Expand already-known constants inside the recorded values, so a
        // definition can build on the ones above it.
        let tree = ctl.tree_mut();
        let values = tree.children(id).to_vec();
        let mut recorded = Vec::with_capacity(values.len());
        for value in values {
            match rewrite_value(tree, value, self.bindings) {
                Some(replacements) => recorded.extend(replacements),
                None => recorded.push(value),
            }
        }
        self.bindings.define(name, recorded);
        ctl.remove_current(id);
        true
    }
}

/// Substitutes collected constants into the tree.
pub struct ReplaceConstants;

impl ReplaceConstants {
    pub fn run(
        tree: &mut Tree,
        errors: &mut ErrorManager,
        bindings: &ConstantBindings,
        allow_undefined: bool,
    ) {
        let mut visitor = ReplaceVisitor {
            bindings,
            errors,
            allow_undefined,
            mixin_depth: 0,
        };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct ReplaceVisitor<'b, 'e> {
    bindings: &'b ConstantBindings,
    errors: &'e mut ErrorManager,
    allow_undefined: bool,
    /// Inside a mixin definition, bare upper-case literals are formal
    /// parameters, not missing constants.
    mixin_depth: usize,
}

impl ReplaceVisitor<'_, '_> {
    /// Rewrite the children of `parent` from `keep` on, then report
    /// whatever constant-like names are left.
    fn rewrite_slots(&mut self, tree: &mut Tree, parent: NodeId, keep: usize) {
        let children = tree.children(parent).to_vec();
        let mut changed = false;
        let mut rebuilt = children[..keep.min(children.len())].to_vec();
        for &child in &children[keep.min(children.len())..] {
            match rewrite_value(tree, child, self.bindings) {
                Some(replacements) => {
                    changed = true;
                    rebuilt.extend(replacements);
                }
                None => rebuilt.push(child),
            }
        }
        if changed {
            tree.rebuild_children(parent, 0, rebuilt);
        }
        if !self.allow_undefined && self.mixin_depth == 0 {
            for &child in &tree.children(parent).to_vec()[keep.min(tree.children(parent).len())..] {
                report_unresolved(tree, child, self.errors);
            }
        }
    }
}

impl Visitor for ReplaceVisitor<'_, '_> {
    fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        self.rewrite_slots(ctl.tree_mut(), id, 1);
        false
    }

    fn enter_mixin_call(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        self.rewrite_slots(ctl.tree_mut(), id, 0);
        false
    }

    fn enter_for_loop(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree_mut();
        let bound_count = tree.children(id).len() - 1;
        for index in 0..bound_count {
            let bound = tree.children(id)[index];
            if let Some(replacements) = rewrite_value(tree, bound, self.bindings) {
                match replacements.as_slice() {
                    [single] => {
                        tree.splice(id, index, &[*single]);
                    }
                    _ => {
                        self.errors.report(
                            Diagnostic::error("a loop bound must expand to a single value")
                                .with_code(ErrorCode::E202)
                                .with_label_opt(tree.location(bound), "this bound"),
                        );
                    }
                }
            }
        }
        true
    }

    fn enter_mixin_definition(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) -> bool {
        self.mixin_depth += 1;
        true
    }

    fn leave_mixin_definition(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.mixin_depth -= 1;
    }
}
