//! `/* @noflip */` comment convention into a structured flag.
//!
//! The flag lands on the annotated structural node (ruleset, declaration,
//! at-rule, or assembled conditional block) and suppresses directional
//! flipping for the whole subtree. Like `@default`, the string convention
//! is interpreted here and nowhere else.

use cascada_core::diagnostics::ErrorManager;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Converts `/* @noflip */` annotations into flip-suppression flags.
pub struct MarkNonFlippable;

impl MarkNonFlippable {
    pub fn run(tree: &mut Tree, _errors: &mut ErrorManager) {
        let mut visitor = NoFlipVisitor;
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct NoFlipVisitor;

impl NoFlipVisitor {
    fn mark_if_annotated(ctl: &mut VisitController<'_>, id: NodeId) {
        if ctl.tree().has_annotation(id, "@noflip") {
            ctl.tree_mut().set_no_flip(id, true);
        }
    }
}

impl Visitor for NoFlipVisitor {
    fn enter_ruleset(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        Self::mark_if_annotated(ctl, id);
        true
    }

    fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        Self::mark_if_annotated(ctl, id);
        false
    }

    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        Self::mark_if_annotated(ctl, id);
        true
    }

    fn enter_conditional_block(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        Self::mark_if_annotated(ctl, id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascada_parser::parse;

    fn run_on(source: &str) -> Tree {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        MarkNonFlippable::run(&mut tree, &mut errors);
        tree
    }

    #[test]
    fn test_annotated_ruleset_is_marked() {
        let tree = run_on("/* @noflip */ a { margin-left: 1px }");
        let ruleset = tree.children(tree.body())[0];
        assert!(tree.no_flip(ruleset));

        // Suppression is visible from inside the subtree.
        let block = tree.ruleset_block(ruleset);
        let declaration = tree.children(block)[0];
        assert!(tree.flip_suppressed(declaration));
    }

    #[test]
    fn test_annotated_declaration_only_marks_itself() {
        let tree = run_on("a { /* @noflip */ margin-left: 1px; float: left }");
        let ruleset = tree.children(tree.body())[0];
        assert!(!tree.no_flip(ruleset));
        let block = tree.ruleset_block(ruleset);
        assert!(tree.no_flip(tree.children(block)[0]));
        assert!(!tree.no_flip(tree.children(block)[1]));
    }

    #[test]
    fn test_unannotated_nodes_are_unmarked() {
        let tree = run_on("a { margin-left: 1px }");
        let ruleset = tree.children(tree.body())[0];
        assert!(!tree.no_flip(ruleset));
    }
}
