//! Custom-function resolution.
//!
//! Replaces every function call whose name is in the job's registry with
//! the function's single result node. Evaluation happens on `leave`, so
//! nested calls fold inside-out (`add(sub(10%, 2%), 1%)` sees `8%`).
//! Function names not in the registry are ordinary CSS functions and are
//! left untouched.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

use crate::functions::FunctionRegistry;

/// Folds registered custom functions into value nodes.
pub struct ResolveCustomFunctions;

impl ResolveCustomFunctions {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager, registry: &FunctionRegistry) {
        let mut visitor = FunctionVisitor { errors, registry };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct FunctionVisitor<'e, 'r> {
    errors: &'e mut ErrorManager,
    registry: &'r FunctionRegistry,
}

impl Visitor for FunctionVisitor<'_, '_> {
    fn leave_function_call(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
        let tree = ctl.tree();
        let NodeKind::FunctionCall { name } = tree.kind(id) else {
            return;
        };
        let Some(function) = self.registry.get(name) else {
            return;
        };
        let name = name.clone();

        let args = tree.children(id).to_vec();
        if !function.arity().accepts(args.len()) {
            self.errors.report(
                Diagnostic::error(format!(
                    "`{name}` takes {} arguments, {} given",
                    function.arity().describe(),
                    args.len()
                ))
                .with_code(ErrorCode::E300)
                .with_label_opt(tree.location(id), "this call"),
            );
            return;
        }

        match function.apply(ctl.tree_mut(), &args) {
            Ok(result) => {
                // Give the result the call's provenance for later
                // diagnostics.
                if let Some(location) = ctl.tree().location(id).cloned() {
                    ctl.tree_mut().set_location(result, location);
                }
                ctl.replace_current(id, vec![result]);
            }
            Err(diagnostic) => {
                // Malformed call: report and leave the subtree alone.
                self.errors.report(diagnostic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::default_registry;
    use cascada_parser::parse;

    fn run_on(source: &str) -> (Tree, ErrorManager) {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        ResolveCustomFunctions::run(&mut tree, &mut errors, &default_registry());
        (tree, errors)
    }

    #[test]
    fn test_add_folds_in_declaration() {
        let (tree, errors) = run_on(".x { width: add(5%, 0, 10%) }");
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[[.x]{[width:[15%]]}]");
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_nested_calls_fold_inside_out() {
        let (tree, errors) = run_on(".x { width: add(sub(10%, 2%), 1%) }");
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[[.x]{[width:[9%]]}]");
    }

    #[test]
    fn test_divide_and_mult() {
        let (tree, _) = run_on(".x { width: divide(100%, 5, 2); height: mult(2%, 4, 3) }");
        assert_eq!(
            tree.render(tree.body()),
            "[[.x]{[width:[10%];height:[24%]]}]"
        );
    }

    #[test]
    fn test_unknown_functions_stay() {
        let (tree, errors) = run_on(".x { color: rgb(1, 2, 3) }");
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[[.x]{[color:[rgb(1,2,3)]]}]");
    }

    #[test]
    fn test_unit_mismatch_reports_and_keeps_call() {
        let (tree, errors) = run_on(".x { width: add(5%, 10px) }");
        assert!(errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[[.x]{[width:[add(5%,10px)]]}]");
    }

    #[test]
    fn test_arity_error_reports() {
        let (_, errors) = run_on(".x { width: add(5%) }");
        assert!(errors.generate_report().contains("at least 2 arguments"));
    }

    #[test]
    fn test_select_from_in_context() {
        let (tree, errors) = run_on(".x { cursor: selectFrom(pointer move grab, 2) }");
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[[.x]{[cursor:[move]]}]");
    }
}
