//! Empty-ruleset elimination via the pending-removal side channel.
//!
//! The marking sweep never edits the tree mid-walk: rulesets whose
//! declaration block has emptied out (conditionals resolved to nothing,
//! mixins that produced no declarations) are added to the tree's
//! pending-removal set, and a second traversal removes them.

use log::debug;

use cascada_core::diagnostics::ErrorManager;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Marks empty rulesets, then sweeps them out.
pub struct EliminateEmptyRulesets;

impl EliminateEmptyRulesets {
    pub fn run(tree: &mut Tree, _errors: &mut ErrorManager) {
        let mut marker = MarkVisitor;
        VisitController::new(tree).start_visit(&mut marker);

        let marked = tree.take_pending_removals();
        if marked.is_empty() {
            return;
        }
        debug!(count = marked.len(); "removing empty rulesets");
        let mut sweeper = SweepVisitor { marked };
        VisitController::new(tree).start_visit(&mut sweeper);
    }
}

struct MarkVisitor;

impl Visitor for MarkVisitor {
    fn enter_ruleset(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let block = tree.ruleset_block(id);
        if tree.children(block).is_empty() {
            ctl.tree_mut().mark_for_removal(id);
        }
        true
    }
}

struct SweepVisitor {
    marked: Vec<NodeId>,
}

impl Visitor for SweepVisitor {
    fn enter_ruleset(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        if self.marked.contains(&id) {
            ctl.remove_current(id);
        }
        true
    }
}
