//! `@def NAME value...;` into typed definition nodes.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::{AtRuleKind, NodeKind};
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Turns `@def` at-rules into [`NodeKind::Definition`] nodes: the first
/// parameter is the constant name, the rest are its value nodes.
/// Malformed instances are reported and left as unknown at-rules.
pub struct CreateDefinitions;

impl CreateDefinitions {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = DefinitionVisitor { errors };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct DefinitionVisitor<'e> {
    errors: &'e mut ErrorManager,
}

impl DefinitionVisitor<'_> {
    fn report(&mut self, tree: &Tree, id: NodeId, message: &str) {
        self.errors.report(
            Diagnostic::error(message)
                .with_code(ErrorCode::E200)
                .with_label_opt(tree.location(id), "this @def")
                .with_help("write `@def NAME value;`"),
        );
    }
}

impl Visitor for DefinitionVisitor<'_> {
    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::AtRule { kind: AtRuleKind::Unknown, name, .. } = tree.kind(id) else {
            return true;
        };
        if !name.eq_ignore_ascii_case("def") {
            return true;
        }

        if tree.at_rule_block(id).is_some() {
            self.report(tree, id, "@def does not take a block");
            return false;
        }
        let params = tree.at_rule_params(id).to_vec();
        if params.len() < 2 {
            self.report(tree, id, "@def requires a name and at least one value");
            return false;
        }
        let NodeKind::Literal { value: constant_name } = ctl.tree().kind(params[0]) else {
            self.report(ctl.tree(), id, "@def name must be an identifier");
            return false;
        };
        let constant_name = constant_name.clone();

        let tree = ctl.tree_mut();
        let definition = tree.alloc(NodeKind::Definition {
            name: constant_name,
        });
        if !crate::passes::block_accepts(tree, id, tree.kind(definition)) {
            self.report(ctl.tree(), id, "@def is not allowed in this context");
            return false;
        }
        let tree = ctl.tree_mut();
        for &value in &params[1..] {
            tree.append(definition, value);
        }
        tree.transfer_metadata(id, definition);
        ctl.replace_current(id, vec![definition]);
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
        CreateDefinitions::run(&mut tree, &mut errors);
        (tree, errors)
    }

    #[test]
    fn test_simple_definition() {
        let (tree, errors) = run_on("@def BG_COLOR red;");
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[@def BG_COLOR [red];]");
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_multi_value_definition() {
        let (tree, errors) = run_on("@def PADDING 1px 2px 3px 4px;");
        assert!(!errors.has_errors());
        assert_eq!(
            tree.render(tree.body()),
            "[@def PADDING [1px,2px,3px,4px];]"
        );
    }

    #[test]
    fn test_def_without_value_reports() {
        let (tree, errors) = run_on("@def ONLY_NAME;");
        assert!(errors.has_errors());
        // Left in place as an unknown at-rule.
        assert_eq!(tree.render(tree.body()), "[@def ONLY_NAME;]");
    }

    #[test]
    fn test_def_with_block_reports() {
        let (_, errors) = run_on("@def X { a: b }");
        assert!(errors.has_errors());
    }

    #[test]
    fn test_comments_move_to_the_definition() {
        let (tree, _) = run_on("@def COLOR red /* @default */;");
        let body = tree.body();
        let definition = tree.children(body)[0];
        assert!(tree.has_annotation(definition, "@default"));
    }
}
