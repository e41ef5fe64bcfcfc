//! `@component`/`@abstract-component` into typed component nodes.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::node::{AtRuleKind, NodeKind};
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Turns component at-rules into [`NodeKind::Component`] nodes, carrying
/// the optional `extends` parent and the abstract flag. Nesting a
/// component inside another component is an error.
pub struct CreateComponents;

impl CreateComponents {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = ComponentVisitor { errors };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct ComponentVisitor<'e> {
    errors: &'e mut ErrorManager,
}

impl ComponentVisitor<'_> {
    fn report(&mut self, tree: &Tree, id: NodeId, message: &str) {
        self.errors.report(
            Diagnostic::error(message)
                .with_code(ErrorCode::E205)
                .with_label_opt(tree.location(id), "this component")
                .with_help("write `@component name [extends base] { ... }`"),
        );
    }

    fn literal(tree: &Tree, id: NodeId) -> Option<String> {
        match tree.kind(id) {
            NodeKind::Literal { value } => Some(value.clone()),
            _ => None,
        }
    }
}

/// Whether any ancestor of `id` is a component node.
fn inside_component(tree: &Tree, id: NodeId) -> bool {
    let mut cursor = tree.parent(id);
    while let Some(node) = cursor {
        if matches!(tree.kind(node), NodeKind::Component { .. }) {
            return true;
        }
        cursor = tree.parent(node);
    }
    false
}

impl Visitor for ComponentVisitor<'_> {
    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::AtRule { kind: AtRuleKind::Unknown, name, .. } = tree.kind(id) else {
            return true;
        };
        let is_abstract = match AtRuleKind::classify(name) {
            AtRuleKind::Component => false,
            AtRuleKind::AbstractComponent => true,
            _ => return true,
        };

        if inside_component(tree, id) {
            self.report(tree, id, "components cannot be nested");
            return false;
        }
        let Some(block) = tree.at_rule_block(id) else {
            self.report(tree, id, "component without block");
            return false;
        };
        let params = tree.at_rule_params(id).to_vec();
        let (component_name, parent) = match params.as_slice() {
            [name] => (Self::literal(tree, *name), None),
            [name, keyword, base]
                if Self::literal(tree, *keyword).as_deref() == Some("extends") =>
            {
                (Self::literal(tree, *name), Self::literal(tree, *base))
            }
            _ => (None, None),
        };
        let Some(component_name) = component_name else {
            self.report(tree, id, "component requires a name");
            return false;
        };
        if params.len() == 3 && parent.is_none() {
            self.report(tree, id, "component `extends` requires a base name");
            return false;
        }

        let tree = ctl.tree_mut();
        let component = tree.alloc(NodeKind::Component {
            name: component_name,
            parent,
            is_abstract,
        });
        if !crate::passes::block_accepts(tree, id, tree.kind(component)) {
            self.report(ctl.tree(), id, "components are not allowed in this context");
            return false;
        }
        let tree = ctl.tree_mut();
        tree.append(component, block);
        tree.transfer_metadata(id, component);
        ctl.replace_current(id, vec![component]);
        true
    }
}
