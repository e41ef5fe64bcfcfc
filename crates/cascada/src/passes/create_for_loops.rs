//! `@for $i from A to B [step C] { ... }` into typed for-loop nodes.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::{AtRuleKind, NodeKind};
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Turns `@for` at-rules into [`NodeKind::ForLoop`] nodes. The bounds are
/// kept as value nodes so constant references and compile-time constants
/// can still be substituted into them before unrolling.
pub struct CreateForLoops;

impl CreateForLoops {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = ForLoopVisitor { errors };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct ForLoopVisitor<'e> {
    errors: &'e mut ErrorManager,
}

impl ForLoopVisitor<'_> {
    fn report(&mut self, tree: &Tree, id: NodeId, message: &str) {
        self.errors.report(
            Diagnostic::error(message)
                .with_code(ErrorCode::E200)
                .with_label_opt(tree.location(id), "this @for")
                .with_help("write `@for $i from 1 to 5 [step 2] { ... }`"),
        );
    }
}

/// Whether the node is the given lower-case keyword literal.
fn is_keyword(tree: &Tree, id: NodeId, keyword: &str) -> bool {
    matches!(tree.kind(id), NodeKind::Literal { value } if value.eq_ignore_ascii_case(keyword))
}

impl Visitor for ForLoopVisitor<'_> {
    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::AtRule { kind: AtRuleKind::Unknown, name, .. } = tree.kind(id) else {
            return true;
        };
        if !name.eq_ignore_ascii_case("for") {
            return true;
        }

        let Some(block) = tree.at_rule_block(id) else {
            self.report(tree, id, "@for without block");
            return false;
        };
        let params = tree.at_rule_params(id).to_vec();

        // $var from A to B [step C]
        let shape_ok = (params.len() == 5 || params.len() == 7)
            && matches!(tree.kind(params[0]), NodeKind::LoopVariable { .. })
            && is_keyword(tree, params[1], "from")
            && is_keyword(tree, params[3], "to")
            && (params.len() == 5 || is_keyword(tree, params[5], "step"));
        if !shape_ok {
            self.report(tree, id, "@for requires `$var from A to B [step C]`");
            return false;
        }
        let NodeKind::LoopVariable { name: variable } = tree.kind(params[0]) else {
            unreachable!("shape checked");
        };
        let variable = variable.clone();
        let has_step = params.len() == 7;

        let tree = ctl.tree_mut();
        let for_loop = tree.alloc(NodeKind::ForLoop { variable, has_step });
        if !crate::passes::block_accepts(tree, id, tree.kind(for_loop)) {
            self.report(ctl.tree(), id, "@for is not allowed in this context");
            return false;
        }
        let tree = ctl.tree_mut();
        tree.append(for_loop, params[2]);
        tree.append(for_loop, params[4]);
        if has_step {
            tree.append(for_loop, params[6]);
        }
        tree.append(for_loop, block);
        tree.transfer_metadata(id, for_loop);
        ctl.replace_current(id, vec![for_loop]);
        true
    }
}
