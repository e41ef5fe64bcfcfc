//! `@defmixin`/`@mixin` into typed mixin nodes.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::{AtRuleKind, NodeKind};
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Turns `@defmixin name(FORMAL, ...) { ... }` into
/// [`NodeKind::MixinDefinition`] and `@mixin name(arg, ...);` into
/// [`NodeKind::MixinCall`]. Malformed instances are reported and left
/// alone.
pub struct CreateMixins;

impl CreateMixins {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = MixinVisitor { errors };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct MixinVisitor<'e> {
    errors: &'e mut ErrorManager,
}

impl MixinVisitor<'_> {
    fn report(&mut self, tree: &Tree, id: NodeId, message: &str, help: &str) {
        self.errors.report(
            Diagnostic::error(message)
                .with_code(ErrorCode::E200)
                .with_label_opt(tree.location(id), "this at-rule")
                .with_help(help),
        );
    }

    fn create_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
        let tree = ctl.tree();
        let Some(block) = tree.at_rule_block(id) else {
            self.report(
                tree,
                id,
                "@defmixin without block",
                "write `@defmixin name(A, B) { ... }`",
            );
            return;
        };
        let params = tree.at_rule_params(id);
        let [header] = params else {
            self.report(
                tree,
                id,
                "@defmixin requires a single `name(FORMALS)` header",
                "write `@defmixin name(A, B) { ... }`",
            );
            return;
        };
        let NodeKind::FunctionCall { name } = tree.kind(*header) else {
            self.report(
                tree,
                id,
                "@defmixin header must be `name(FORMALS)`",
                "write `@defmixin name(A, B) { ... }`",
            );
            return;
        };
        let name = name.clone();

        let mut formals = Vec::new();
        for &formal in tree.children(*header) {
            let NodeKind::Literal { value } = tree.kind(formal) else {
                self.report(
                    tree,
                    id,
                    "@defmixin formal parameters must be identifiers",
                    "write `@defmixin name(A, B) { ... }`",
                );
                return;
            };
            formals.push(value.clone());
        }

        let tree = ctl.tree_mut();
        let definition = tree.alloc(NodeKind::MixinDefinition { name, formals });
        if !crate::passes::block_accepts(tree, id, tree.kind(definition)) {
            self.report(
                ctl.tree(),
                id,
                "@defmixin is not allowed in this context",
                "define mixins at the stylesheet level",
            );
            return;
        }
        let tree = ctl.tree_mut();
        tree.append(definition, block);
        tree.transfer_metadata(id, definition);
        ctl.replace_current(id, vec![definition]);
    }

    fn create_call(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
        let tree = ctl.tree();
        if tree.at_rule_block(id).is_some() {
            self.report(
                tree,
                id,
                "@mixin does not take a block",
                "write `@mixin name(args);`",
            );
            return;
        }
        let params = tree.at_rule_params(id);
        let [header] = params else {
            self.report(
                tree,
                id,
                "@mixin requires a single `name(args)` call",
                "write `@mixin name(args);`",
            );
            return;
        };
        let header = *header;
        let NodeKind::FunctionCall { name } = tree.kind(header) else {
            self.report(
                tree,
                id,
                "@mixin call must be `name(args)`",
                "write `@mixin name(args);`",
            );
            return;
        };
        let name = name.clone();
        let args = tree.children(header).to_vec();

        let tree = ctl.tree_mut();
        let call = tree.alloc(NodeKind::MixinCall { name });
        if !crate::passes::block_accepts(tree, id, tree.kind(call)) {
            self.report(
                ctl.tree(),
                id,
                "@mixin is only allowed between declarations",
                "call mixins inside a ruleset body",
            );
            return;
        }
        let tree = ctl.tree_mut();
        for arg in args {
            tree.append(call, arg);
        }
        tree.transfer_metadata(id, call);
        ctl.replace_current(id, vec![call]);
    }
}

impl Visitor for MixinVisitor<'_> {
    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let NodeKind::AtRule { kind: AtRuleKind::Unknown, name, .. } = ctl.tree().kind(id) else {
            return true;
        };
        match AtRuleKind::classify(name) {
            AtRuleKind::DefMixin => self.create_definition(ctl, id),
            AtRuleKind::Mixin => self.create_call(ctl, id),
            _ => {}
        }
        true
    }
}
