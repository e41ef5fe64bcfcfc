//! `/* @default */` comment convention into a structured flag.
//!
//! This is the one place the `@default` string convention is interpreted;
//! downstream passes and tools only ever read the structured flag on the
//! definition's value nodes.

use cascada_core::diagnostics::ErrorManager;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Marks every value node of a `/* @default */`-annotated definition as a
/// default value.
pub struct MarkDefaults;

impl MarkDefaults {
    pub fn run(tree: &mut Tree, _errors: &mut ErrorManager) {
        let mut visitor = DefaultVisitor;
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct DefaultVisitor;

impl Visitor for DefaultVisitor {
    fn enter_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        if ctl.tree().has_annotation(id, "@default") {
            let values = ctl.tree().children(id).to_vec();
            let tree = ctl.tree_mut();
            for value in values {
                tree.set_default_value(value, true);
            }
        }
        false
    }
}
