//! The visitor protocol.
//!
//! One `enter_*`/`leave_*` pair per node kind, all defaulted to "continue,
//! do nothing", so each compiler pass overrides only the handful of node
//! kinds it cares about and stays a small, focused unit. This is the
//! mechanism that keeps ~25 independent passes out of the traversal
//! engine: the engine dispatches, the visitors decide.
//!
//! Every callback receives the [`VisitController`] driving the walk, which
//! exposes the tree and the in-traversal mutation operations
//! ([`replace_current`](VisitController::replace_current),
//! [`remove_current`](VisitController::remove_current)).
//!
//! An `enter_*` returning `false` skips the node's children AND its
//! `leave_*`; siblings continue normally.

use crate::tree::NodeId;
use crate::visit::VisitController;

macro_rules! visit_methods {
    ($($enter:ident, $leave:ident;)*) => {
        $(
            /// Called before the node's children are visited. Return
            /// `false` to skip the children and the matching leave call.
            fn $enter(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
                let _ = (ctl, id);
                true
            }

            /// Called after the node's children were visited.
            fn $leave(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
                let _ = (ctl, id);
            }
        )*
    };
}

/// The capability interface each compiler pass implements.
pub trait Visitor {
    visit_methods! {
        enter_root, leave_root;
        enter_block, leave_block;
        enter_ruleset, leave_ruleset;
        enter_selector, leave_selector;
        enter_class_refiner, leave_class_refiner;
        enter_id_refiner, leave_id_refiner;
        enter_pseudo_class, leave_pseudo_class;
        enter_pseudo_element, leave_pseudo_element;
        enter_attribute_refiner, leave_attribute_refiner;
        enter_property, leave_property;
        enter_declaration, leave_declaration;
        enter_literal, leave_literal;
        enter_numeric, leave_numeric;
        enter_string, leave_string;
        enter_function_call, leave_function_call;
        enter_composite, leave_composite;
        enter_loop_variable, leave_loop_variable;
        enter_at_rule, leave_at_rule;
        enter_definition, leave_definition;
        enter_conditional_block, leave_conditional_block;
        enter_conditional_rule, leave_conditional_rule;
        enter_for_loop, leave_for_loop;
        enter_mixin_definition, leave_mixin_definition;
        enter_mixin_call, leave_mixin_call;
        enter_component, leave_component;
    }
}
