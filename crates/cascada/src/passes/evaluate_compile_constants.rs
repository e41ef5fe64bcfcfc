//! Job-supplied compile-time constants.
//!
//! Substitutes a configured name -> number mapping directly into `@for`
//! loop bounds and definition values wherever those names occur as whole
//! tokens. This is distinct from custom-function arithmetic: it folds
//! named compile-time constants supplied by the job, not CSS expressions.

use std::collections::BTreeMap;

use cascada_core::diagnostics::ErrorManager;
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

use crate::functions::format_number;

/// Substitutes configured compile-time constants into loop bounds and
/// definition values.
pub struct EvaluateCompileConstants;

impl EvaluateCompileConstants {
    pub fn run(tree: &mut Tree, _errors: &mut ErrorManager, constants: &BTreeMap<String, f64>) {
        if constants.is_empty() {
            return;
        }
        let mut visitor = CompileConstantVisitor { constants };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct CompileConstantVisitor<'c> {
    constants: &'c BTreeMap<String, f64>,
}

/// Whether this literal sits inside a definition's values or a for-loop's
/// bounds, climbing only through value nodes.
fn in_substitutable_position(tree: &Tree, id: NodeId) -> bool {
    let mut node = id;
    let mut parent = tree.parent(id);
    while let Some(p) = parent {
        match tree.kind(p) {
            NodeKind::Definition { .. } => return true,
            NodeKind::ForLoop { .. } => {
                let children = tree.children(p);
                let index = children
                    .iter()
                    .position(|&c| c == node)
                    .expect("child of its parent");
                // Everything before the trailing block is a bound.
                return index + 1 < children.len();
            }
            NodeKind::FunctionCall { .. } | NodeKind::Composite { .. } => {
                node = p;
                parent = tree.parent(p);
            }
            _ => return false,
        }
    }
    false
}

impl Visitor for CompileConstantVisitor<'_> {
    fn enter_literal(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let NodeKind::Literal { value } = ctl.tree().kind(id) else {
            return true;
        };
        let Some(&number) = self.constants.get(value) else {
            return true;
        };
        if !in_substitutable_position(ctl.tree(), id) {
            return true;
        }
        let replacement = ctl.tree_mut().alloc(NodeKind::Numeric {
            repr: format_number(number),
            value: number,
            unit: String::new(),
        });
        ctl.replace_current(id, vec![replacement]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::create_definitions::CreateDefinitions;
    use crate::passes::create_for_loops::CreateForLoops;
    use cascada_parser::parse;

    fn run_on(source: &str, constants: &[(&str, f64)]) -> Tree {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        CreateDefinitions::run(&mut tree, &mut errors);
        CreateForLoops::run(&mut tree, &mut errors);
        let map: BTreeMap<String, f64> = constants
            .iter()
            .map(|(k, v)| ((*k).to_owned(), *v))
            .collect();
        EvaluateCompileConstants::run(&mut tree, &mut errors, &map);
        assert!(!errors.has_errors());
        tree
    }

    #[test]
    fn test_loop_bound_substitution() {
        let tree = run_on(
            "@for $i from 1 to COUNT { a { width: $i } }",
            &[("COUNT", 4.0)],
        );
        assert_eq!(
            tree.render(tree.body()),
            "[@for $i from 1 to 4{[[a]{[width:[$i]]}]}]"
        );
    }

    #[test]
    fn test_definition_value_substitution() {
        let tree = run_on("@def WIDTH_FACTOR SCALE;", &[("SCALE", 2.5)]);
        assert_eq!(tree.render(tree.body()), "[@def WIDTH_FACTOR [2.5];]");
    }

    #[test]
    fn test_declaration_values_are_not_touched() {
        let tree = run_on(".x { width: SCALE }", &[("SCALE", 2.5)]);
        assert_eq!(tree.render(tree.body()), "[[.x]{[width:[SCALE]]}]");
    }

    #[test]
    fn test_loop_body_is_not_touched() {
        let tree = run_on(
            "@for $i from 1 to 3 { a { width: COUNT } }",
            &[("COUNT", 4.0)],
        );
        assert_eq!(
            tree.render(tree.body()),
            "[@for $i from 1 to 3{[[a]{[width:[COUNT]]}]}]"
        );
    }
}
