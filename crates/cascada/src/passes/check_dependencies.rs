//! `@provide`/`@require` dependency bookkeeping.

use indexmap::IndexMap;

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::location::SourceLocation;
use cascada_core::node::{AtRuleKind, NodeKind};
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Validates `@provide`/`@require` pairs across the whole job and removes
/// both node kinds (they have no CSS output). Duplicate provides and
/// requires without a matching provide are reported.
pub struct CheckDependencies;

impl CheckDependencies {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = DependencyVisitor {
            errors,
            provides: IndexMap::new(),
            requires: Vec::new(),
        };
        VisitController::new(tree).start_visit(&mut visitor);

        let DependencyVisitor {
            errors,
            provides,
            requires,
            ..
        } = visitor;
        for (namespace, location) in requires {
            if !provides.contains_key(&namespace) {
                errors.report(
                    Diagnostic::error(format!("@require `{namespace}` has no matching @provide"))
                        .with_code(ErrorCode::E206)
                        .with_label_opt(location.as_ref(), "required here"),
                );
            }
        }
    }
}

struct DependencyVisitor<'e> {
    errors: &'e mut ErrorManager,
    provides: IndexMap<String, Option<SourceLocation>>,
    requires: Vec<(String, Option<SourceLocation>)>,
}

impl DependencyVisitor<'_> {
    fn namespace(&mut self, tree: &Tree, id: NodeId) -> Option<String> {
        let params = tree.at_rule_params(id);
        if let [param] = params {
            if let NodeKind::Literal { value } = tree.kind(*param) {
                return Some(value.clone());
            }
            if let NodeKind::Str { value, .. } = tree.kind(*param) {
                return Some(value.clone());
            }
        }
        self.errors.report(
            Diagnostic::error("expected exactly one namespace parameter")
                .with_code(ErrorCode::E206)
                .with_label_opt(tree.location(id), "this at-rule"),
        );
        None
    }
}

impl Visitor for DependencyVisitor<'_> {
    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::AtRule { kind: AtRuleKind::Unknown, name, .. } = tree.kind(id) else {
            return true;
        };
        let classified = AtRuleKind::classify(name);
        match classified {
            AtRuleKind::Provide => {
                let location = tree.location(id).cloned();
                if let Some(namespace) = self.namespace(ctl.tree(), id) {
                    if let Some(previous) = self.provides.get(&namespace) {
                        self.errors.report(
                            Diagnostic::error(format!("duplicate @provide `{namespace}`"))
                                .with_code(ErrorCode::E206)
                                .with_label_opt(location.as_ref(), "provided again here")
                                .with_label_opt(previous.as_ref(), "first provided here"),
                        );
                    } else {
                        self.provides.insert(namespace, location);
                    }
                }
                ctl.remove_current(id);
            }
            AtRuleKind::Require => {
                let location = tree.location(id).cloned();
                if let Some(namespace) = self.namespace(ctl.tree(), id) {
                    self.requires.push((namespace, location));
                }
                ctl.remove_current(id);
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

    fn run_on(source: &str) -> (Tree, ErrorManager) {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        CheckDependencies::run(&mut tree, &mut errors);
        (tree, errors)
    }

    #[test]
    fn test_matched_pair_is_clean_and_removed() {
        let (tree, errors) = run_on("@provide ui.menu; @require ui.menu; a { b: c }");
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[[a]{[b:[c]]}]");
    }

    #[test]
    fn test_unmatched_require_reports() {
        let (_, errors) = run_on("@require ui.missing; a { b: c }");
        assert!(errors.generate_report().contains("no matching @provide"));
    }

    #[test]
    fn test_duplicate_provide_reports() {
        let (_, errors) = run_on("@provide ui.menu; @provide ui.menu;");
        assert!(errors.generate_report().contains("duplicate @provide"));
    }

    #[test]
    fn test_require_before_provide_is_fine() {
        let (_, errors) = run_on("@require ui.menu; @provide ui.menu;");
        assert!(!errors.has_errors());
    }
}
