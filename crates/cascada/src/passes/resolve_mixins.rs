//! Mixin inlining.
//!
//! Collects `@defmixin` definitions (removing them from the tree), then
//! replaces each `@mixin` call with deep copies of the definition's
//! declarations, substituting actual arguments for formal parameters.

use indexmap::IndexMap;

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Inlines mixin calls. Unknown mixins and arity mismatches are reported
/// and the call left in place.
pub struct ResolveMixins;

impl ResolveMixins {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut definitions = IndexMap::new();
        let mut collector = CollectMixins {
            definitions: &mut definitions,
        };
        VisitController::new(tree).start_visit(&mut collector);

        let mut inliner = InlineMixins {
            errors,
            definitions: &definitions,
        };
        VisitController::new(tree).start_visit(&mut inliner);
    }
}

/// A collected mixin definition: formal names plus the (now detached)
/// definition node whose block serves as the template.
struct MixinTemplate {
    formals: Vec<String>,
    block: NodeId,
}

struct CollectMixins<'d> {
    definitions: &'d mut IndexMap<String, MixinTemplate>,
}

impl Visitor for CollectMixins<'_> {
    fn enter_mixin_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::MixinDefinition { name, formals } = tree.kind(id) else {
            return true;
        };
        let template = MixinTemplate {
            formals: formals.clone(),
            block: *tree.children(id).last().expect("defmixin block"),
        };
        self.definitions.insert(name.clone(), template);
        ctl.remove_current(id);
        true
    }
}

struct InlineMixins<'d, 'e> {
    errors: &'e mut ErrorManager,
    definitions: &'d IndexMap<String, MixinTemplate>,
}

/// Substitute formal-parameter literals with copies of the actual
/// arguments throughout a copied subtree.
fn substitute_formals(
    tree: &mut Tree,
    node: NodeId,
    formals: &[String],
    actuals: &[NodeId],
) {
    let children = tree.children(node).to_vec();
    for (index, child) in children.into_iter().enumerate() {
        let formal_position = match tree.kind(child) {
            NodeKind::Literal { value } => formals.iter().position(|f| f == value),
            _ => None,
        };
        match formal_position {
            Some(position) => {
                let replacement = tree.deep_copy(actuals[position]);
                tree.splice(node, index, &[replacement]);
            }
            None => substitute_formals(tree, child, formals, actuals),
        }
    }
}

impl Visitor for InlineMixins<'_, '_> {
    fn enter_mixin_call(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::MixinCall { name } = tree.kind(id) else {
            return true;
        };
        let Some(template) = self.definitions.get(name) else {
            self.errors.report(
                Diagnostic::error(format!("unknown mixin `{name}`"))
                    .with_code(ErrorCode::E203)
                    .with_label_opt(tree.location(id), "called here"),
            );
            return false;
        };
        let actuals = tree.children(id).to_vec();
        if actuals.len() != template.formals.len() {
            self.errors.report(
                Diagnostic::error(format!(
                    "mixin `{name}` takes {} arguments, {} given",
                    template.formals.len(),
                    actuals.len()
                ))
                .with_code(ErrorCode::E204)
                .with_label_opt(tree.location(id), "this call"),
            );
            return false;
        }
        let template_children = tree.children(template.block).to_vec();
        if template_children
            .iter()
            .any(|&child| !crate::passes::block_accepts(tree, id, tree.kind(child)))
        {
            self.errors.report(
                Diagnostic::error(format!(
                    "mixin `{name}` expands to content not allowed in this context"
                ))
                .with_code(ErrorCode::E203)
                .with_label_opt(tree.location(id), "this call"),
            );
            return false;
        }

        let tree = ctl.tree_mut();
        let mut inlined = Vec::with_capacity(template_children.len());
        for child in template_children {
            let copy = tree.deep_copy(child);
            substitute_formals(tree, copy, &template.formals, &actuals);
            inlined.push(copy);
        }
        ctl.replace_current(id, inlined);
        true
    }
}
