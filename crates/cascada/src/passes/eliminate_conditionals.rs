//! Conditional elimination.
//!
//! Evaluates every assembled conditional block against the job's set of
//! true condition names and splices the first true branch's children in
//! place of the block. Conditions are bare names with optional `!`
//! negation; anything else evaluates false and is reported.

use std::collections::HashSet;

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Resolves conditional blocks against the configured truth set.
pub struct EliminateConditionals;

impl EliminateConditionals {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager, true_conditions: &HashSet<String>) {
        let mut visitor = EliminateVisitor {
            errors,
            true_conditions,
        };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct EliminateVisitor<'e, 'c> {
    errors: &'e mut ErrorManager,
    true_conditions: &'c HashSet<String>,
}

/// Extract the condition name from a condition value node: a literal,
/// possibly wrapped in one level of parentheses.
fn condition_name(tree: &Tree, condition: NodeId) -> Option<String> {
    match tree.kind(condition) {
        NodeKind::Literal { value } => Some(value.clone()),
        NodeKind::FunctionCall { name } if name.is_empty() => {
            let children = tree.children(condition);
            if let [inner] = children {
                condition_name(tree, *inner)
            } else {
                None
            }
        }
        _ => None,
    }
}

impl EliminateVisitor<'_, '_> {
    fn branch_taken(&mut self, tree: &Tree, rule: NodeId) -> bool {
        let Some(condition) = tree.conditional_condition(rule) else {
            // An @else branch.
            return true;
        };
        let Some(name) = condition_name(tree, condition) else {
            self.errors.report(
                Diagnostic::error("cannot evaluate this condition")
                    .with_code(ErrorCode::E201)
                    .with_label_opt(tree.location(condition), "expected a bare name")
                    .with_help("conditions are names checked against the job's truth set, with `!` negation"),
            );
            return false;
        };
        match name.strip_prefix('!') {
            Some(negated) => !self.true_conditions.contains(negated),
            None => self.true_conditions.contains(&name),
        }
    }
}

impl Visitor for EliminateVisitor<'_, '_> {
    fn enter_conditional_block(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let rules = ctl.tree().children(id).to_vec();
        for rule in rules {
            if self.branch_taken(ctl.tree(), rule) {
                let block = ctl.tree().conditional_block(rule);
                let winners = ctl.tree().children(block).to_vec();
                let tree = ctl.tree();
                if let Some(misfit) = winners
                    .iter()
                    .find(|&&w| !crate::passes::block_accepts(tree, id, tree.kind(w)))
                {
                    self.errors.report(
                        Diagnostic::error("branch content is not allowed in this context")
                            .with_code(ErrorCode::E201)
                            .with_label_opt(tree.location(*misfit), "this cannot live here"),
                    );
                    return false;
                }
                ctl.replace_current(id, winners);
                return true;
            }
        }
        ctl.remove_current(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::create_conditionals::CreateConditionals;
    use cascada_parser::parse;

    fn run_on(source: &str, truths: &[&str]) -> (Tree, ErrorManager) {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        CreateConditionals::run(&mut tree, &mut errors);
        let truths: HashSet<String> = truths.iter().map(|s| (*s).to_owned()).collect();
        EliminateConditionals::run(&mut tree, &mut errors, &truths);
        (tree, errors)
    }

    const CHAIN: &str = "@if (IE) { a { x: 1 } } @elseif (GECKO) { b { x: 2 } } @else { c { x: 3 } }";

    #[test]
    fn test_true_if_takes_first_branch() {
        let (tree, errors) = run_on(CHAIN, &["IE"]);
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[[a]{[x:[1]]}]");
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_elseif_branch() {
        let (tree, _) = run_on(CHAIN, &["GECKO"]);
        assert_eq!(tree.render(tree.body()), "[[b]{[x:[2]]}]");
    }

    #[test]
    fn test_else_branch_when_nothing_matches() {
        let (tree, _) = run_on(CHAIN, &[]);
        assert_eq!(tree.render(tree.body()), "[[c]{[x:[3]]}]");
    }

    #[test]
    fn test_negated_condition() {
        let (tree, _) = run_on("@if (!IE) { a { x: 1 } }", &[]);
        assert_eq!(tree.render(tree.body()), "[[a]{[x:[1]]}]");

        let (tree, _) = run_on("@if (!IE) { a { x: 1 } }", &["IE"]);
        assert_eq!(tree.render(tree.body()), "[]");
    }

    #[test]
    fn test_no_branch_taken_removes_block() {
        let (tree, errors) = run_on("@if (IE) { a { x: 1 } }", &[]);
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[]");
    }

    #[test]
    fn test_multiple_winning_children_all_spliced() {
        let (tree, _) = run_on("@if (A) { a { x: 1 } b { x: 2 } }", &["A"]);
        assert_eq!(tree.render(tree.body()), "[[a]{[x:[1]]}][[b]{[x:[2]]}]");
    }

    #[test]
    fn test_conditionals_in_declaration_blocks() {
        let (tree, _) = run_on(
            ".x { @if (A) { color: red } @else { color: blue } }",
            &["A"],
        );
        assert_eq!(tree.render(tree.body()), "[[.x]{[color:[red]]}]");
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_nested_conditionals_resolve_inside_out() {
        let (tree, _) = run_on(
            "@if (A) { @if (B) { a { x: 1 } } @else { b { x: 2 } } }",
            &["A"],
        );
        // The outer splice exposes the inner chain, which the ongoing
        // traversal then visits and resolves.
        assert_eq!(tree.render(tree.body()), "[[b]{[x:[2]]}]");
    }
}
