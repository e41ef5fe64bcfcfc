//! `@if`/`@elseif`/`@else` chain assembly.
//!
//! Groups each maximal consecutive run of conditional at-rules sharing a
//! parent block into one [`NodeKind::ConditionalBlock`] whose children
//! are the branches in chain order. Branch parameters become conditions;
//! an `@else` is chain-terminal.
//!
//! Malformed members (missing block, missing condition, excess
//! parameters, branches after a terminal `@else`, branches with no `@if`
//! to join) are reported and dropped, leaving well-formed siblings
//! untouched.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::{AtRuleKind, Branch, NodeKind};
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Assembles conditional chains. Runs on every block, so conditionals
/// nested in rulesets and media rules are grouped too.
pub struct CreateConditionals;

impl CreateConditionals {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = ConditionalVisitor { errors };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct ConditionalVisitor<'e> {
    errors: &'e mut ErrorManager,
}

/// The conditional branch kind of an at-rule, if it is one.
fn branch_of(tree: &Tree, id: NodeId) -> Option<Branch> {
    let NodeKind::AtRule { kind: AtRuleKind::Unknown, name, .. } = tree.kind(id) else {
        return None;
    };
    match AtRuleKind::classify(name) {
        AtRuleKind::If => Some(Branch::If),
        AtRuleKind::Elseif => Some(Branch::Elseif),
        AtRuleKind::Else => Some(Branch::Else),
        _ => None,
    }
}

impl ConditionalVisitor<'_> {
    fn report(&mut self, tree: &Tree, id: NodeId, message: String) {
        self.errors.report(
            Diagnostic::error(message)
                .with_code(ErrorCode::E201)
                .with_label_opt(tree.location(id), "this branch"),
        );
    }

    /// Validate one branch at-rule; on success return its condition (for
    /// `@if`/`@elseif`) and block, detached from the at-rule.
    fn validate_branch(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        branch: Branch,
    ) -> Option<(Option<NodeId>, NodeId)> {
        let Some(block) = tree.at_rule_block(id) else {
            self.report(tree, id, format!("@{} without block", branch.name()));
            return None;
        };
        let params = tree.at_rule_params(id).to_vec();
        match branch {
            Branch::If | Branch::Elseif => match params.len() {
                0 => {
                    self.report(tree, id, format!("@{} without a condition", branch.name()));
                    None
                }
                1 => Some((Some(params[0]), block)),
                _ => {
                    self.report(
                        tree,
                        id,
                        format!("@{} with excess parameters", branch.name()),
                    );
                    None
                }
            },
            Branch::Else => {
                if params.is_empty() {
                    Some((None, block))
                } else {
                    self.report(tree, id, "@else with parameters".into());
                    None
                }
            }
        }
    }

    /// Assemble the run of conditional at-rules starting at child index
    /// `start` of `parent`. Returns the number of children now occupying
    /// the run's position (1 if a chain was built, 0 if everything was
    /// malformed).
    fn assemble_run(&mut self, tree: &mut Tree, parent: NodeId, start: usize) -> usize {
        let mut consumed = Vec::new();
        let mut branches = Vec::new();
        let mut terminal = false;

        let mut index = start;
        while let Some(&child) = tree.children(parent).get(index) {
            let Some(branch) = branch_of(tree, child) else {
                break;
            };
            if branch == Branch::If && index > start {
                // A fresh `@if` starts the next chain.
                break;
            }
            consumed.push(child);
            index += 1;

            if terminal {
                self.report(
                    tree,
                    child,
                    format!("@{} after a terminal @else in the same chain", branch.name()),
                );
                continue;
            }
            if let Some((condition, block)) = self.validate_branch(tree, child, branch) {
                branches.push((branch, condition, block));
                if branch == Branch::Else {
                    terminal = true;
                }
            }
        }

        // Detach the whole run, then put the assembled chain in its place.
        for &child in &consumed {
            tree.orphan(child);
        }
        if branches.is_empty() {
            return 0;
        }
        let chain = tree.alloc(NodeKind::ConditionalBlock);
        for (branch, condition, block) in branches {
            let rule = tree.alloc_conditional_rule(branch, condition, block);
            tree.append(chain, rule);
        }
        tree.transfer_metadata(consumed[0], chain);
        tree.adopt(parent, chain, start);
        1
    }
}

impl Visitor for ConditionalVisitor<'_> {
    fn enter_block(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        // Rewriting the block's children from its own `enter` is safe:
        // descent into them starts only after this callback returns.
        let mut index = 0;
        loop {
            let tree = ctl.tree();
            let Some(&child) = tree.children(id).get(index) else {
                break;
            };
            match branch_of(tree, child) {
                Some(Branch::If) => {
                    index += self.assemble_run(ctl.tree_mut(), id, index);
                }
                Some(orphan_branch) => {
                    self.report(
                        ctl.tree(),
                        child,
                        format!("@{} without previous @if", orphan_branch.name()),
                    );
                    ctl.tree_mut().orphan(child);
                }
                None => index += 1,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascada_parser::parse;

    fn run_on(source: &str) -> (Tree, ErrorManager) {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        CreateConditionals::run(&mut tree, &mut errors);
        (tree, errors)
    }

    #[test]
    fn test_if_else_chain_forms_one_block() {
        let (tree, errors) = run_on("@if (!X) { a { b: c } } @else { d { e: f } }");
        assert!(!errors.has_errors());
        assert_eq!(
            tree.render(tree.body()),
            "[@if [(!X)]{[[a]{[b:[c]]}]}@else{[[d]{[e:[f]]}]}]"
        );
        tree.check_consistency().unwrap();

        // One conditional block with two branches.
        let body = tree.body();
        assert_eq!(tree.children(body).len(), 1);
        let chain = tree.children(body)[0];
        assert!(matches!(tree.kind(chain), NodeKind::ConditionalBlock));
        assert_eq!(tree.children(chain).len(), 2);

        // The if branch's serialized block is the ruleset fingerprint.
        let if_rule = tree.children(chain)[0];
        assert_eq!(
            tree.render(tree.conditional_block(if_rule)),
            "[[a]{[b:[c]]}]"
        );
    }

    #[test]
    fn test_if_elseif_else() {
        let (tree, errors) = run_on(
            "@if (A) { a { x: y } } @elseif (B) { b { x: y } } @else { c { x: y } }",
        );
        assert!(!errors.has_errors());
        let chain = tree.children(tree.body())[0];
        assert_eq!(tree.children(chain).len(), 3);
    }

    #[test]
    fn test_two_ifs_make_two_chains() {
        let (tree, errors) = run_on("@if (A) { a { x: y } } @if (B) { b { x: y } }");
        assert!(!errors.has_errors());
        assert_eq!(tree.children(tree.body()).len(), 2);
    }

    #[test]
    fn test_lone_else_reports() {
        let (tree, errors) = run_on("@else { a { b: c } }");
        assert!(errors.has_errors());
        let reported = errors.generate_report();
        assert!(reported.contains("@else without previous @if"), "{reported}");
        assert_eq!(tree.render(tree.body()), "[]");
    }

    #[test]
    fn test_if_without_condition_reports() {
        let (_, errors) = run_on("@if { a { b: c } }");
        assert!(errors.generate_report().contains("@if without a condition"));
    }

    #[test]
    fn test_if_with_excess_parameters_reports() {
        let (_, errors) = run_on("@if (A) (B) { a { b: c } }");
        assert!(errors.generate_report().contains("@if with excess parameters"));
    }

    #[test]
    fn test_else_with_parameters_reports() {
        let (_, errors) =
            run_on("@if (A) { a { b: c } } @else (B) { d { e: f } }");
        assert!(errors.generate_report().contains("@else with parameters"));
    }

    #[test]
    fn test_elseif_after_terminal_else_reports() {
        let (tree, errors) = run_on(
            "@if (A) { a { x: y } } @else { b { x: y } } @elseif (C) { c { x: y } }",
        );
        assert!(errors.generate_report().contains("after a terminal @else"));
        // The valid prefix still assembles.
        let chain = tree.children(tree.body())[0];
        assert_eq!(tree.children(chain).len(), 2);
    }

    #[test]
    fn test_conditionals_inside_rulesets_assemble_too() {
        let (tree, errors) = run_on(".x { @if (A) { color: red } @else { color: blue } }");
        assert!(!errors.has_errors());
        let body = tree.body();
        let ruleset = tree.children(body)[0];
        let block = tree.ruleset_block(ruleset);
        assert!(matches!(
            tree.kind(tree.children(block)[0]),
            NodeKind::ConditionalBlock
        ));
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_non_conditionals_break_the_run() {
        let (tree, errors) =
            run_on("@if (A) { a { x: y } } p { q: r } @else { b { x: y } }");
        assert!(errors.has_errors());
        // The chain is just the @if; the @else is orphaned by the
        // intervening ruleset.
        assert_eq!(tree.children(tree.body()).len(), 2);
    }
}
