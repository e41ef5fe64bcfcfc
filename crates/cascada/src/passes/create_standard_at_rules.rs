//! Validation of the standard CSS at-rules the parser already typed.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::{AtRuleKind, NodeKind};
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Checks parameter counts and block presence for `@media`, `@page`,
/// `@font-face`, `@charset`, and `@import`. Reports and leaves malformed
/// instances in place.
pub struct CreateStandardAtRules;

impl CreateStandardAtRules {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = StandardAtRuleVisitor { errors };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct StandardAtRuleVisitor<'e> {
    errors: &'e mut ErrorManager,
}

impl StandardAtRuleVisitor<'_> {
    fn report(&mut self, tree: &Tree, id: NodeId, message: String) {
        self.errors.report(
            Diagnostic::error(message)
                .with_code(ErrorCode::E200)
                .with_label_opt(tree.location(id), "this at-rule"),
        );
    }
}

impl Visitor for StandardAtRuleVisitor<'_> {
    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::AtRule { kind, .. } = tree.kind(id) else {
            return true;
        };
        let params = tree.at_rule_params(id).len();
        let has_block = tree.at_rule_block(id).is_some();
        match kind {
            AtRuleKind::Media => {
                if params == 0 {
                    self.report(tree, id, "@media requires a media query".into());
                }
                if !has_block {
                    self.report(tree, id, "@media requires a block".into());
                }
            }
            AtRuleKind::Page => {
                if !has_block {
                    self.report(tree, id, "@page requires a block".into());
                }
            }
            AtRuleKind::FontFace => {
                if params != 0 {
                    self.report(tree, id, "@font-face takes no parameters".into());
                }
                if !has_block {
                    self.report(tree, id, "@font-face requires a block".into());
                }
            }
            AtRuleKind::Charset => {
                if params != 1 || has_block {
                    self.report(tree, id, "@charset takes exactly one string".into());
                }
            }
            AtRuleKind::Import => {
                if params == 0 || has_block {
                    self.report(tree, id, "@import takes a target and no block".into());
                }
            }
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascada_parser::parse;

    fn run_on(source: &str) -> ErrorManager {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        CreateStandardAtRules::run(&mut tree, &mut errors);
        errors
    }

    #[test]
    fn test_well_formed_media_passes() {
        assert!(!run_on("@media screen { a { b: c } }").has_errors());
    }

    #[test]
    fn test_media_without_query_reports() {
        assert!(run_on("@media { a { b: c } }").has_errors());
    }

    #[test]
    fn test_font_face_with_params_reports() {
        assert!(run_on("@font-face bogus { font-family: x }").has_errors());
    }

    #[test]
    fn test_unknown_at_rules_are_ignored() {
        assert!(!run_on("@-vendor-thing a b c;").has_errors());
    }
}
