//! The minimal-whitespace printer.

use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

use crate::printer::{
    render_at_rule_prelude, render_conditional_prelude, render_for_prelude, render_selector_list,
    render_value_list,
};

/// Compact printer: no indentation, no newlines, deterministic output for
/// a given tree.
///
/// # Example
///
/// ```
/// use cascada_parser::parse;
/// use cascada::printer::CompactPrinter;
///
/// let mut tree = parse("x.gss", ".menu { color: red }").unwrap();
/// assert_eq!(CompactPrinter::new().print(&mut tree), ".menu{color:red;}");
/// ```
#[derive(Debug, Default)]
pub struct CompactPrinter;

impl CompactPrinter {
    pub fn new() -> Self {
        Self
    }

    /// Print the whole tree.
    pub fn print(&self, tree: &mut Tree) -> String {
        let mut visitor = CompactVisitor { out: String::new() };
        VisitController::new(tree).start_visit(&mut visitor);
        visitor.out
    }
}

struct CompactVisitor {
    out: String,
}

impl Visitor for CompactVisitor {
    fn enter_ruleset(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        render_selector_list(ctl.tree(), id, ",", &mut self.out);
        self.out.push('{');
        true
    }

    fn leave_ruleset(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.out.push('}');
    }

    fn enter_selector(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) -> bool {
        false
    }

    fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let property = tree.declaration_property(id);
        if let NodeKind::Property(p) = tree.kind(property) {
            self.out.push_str(&p.name().resolve());
        }
        self.out.push(':');
        render_value_list(tree, tree.declaration_values(id), " ", &mut self.out, true);
        if let NodeKind::Declaration { important: true } = tree.kind(id) {
            self.out.push_str("!important");
        }
        self.out.push(';');
        false
    }

    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let has_block = tree.at_rule_block(id).is_some();
        render_at_rule_prelude(tree, id, &mut self.out, true);
        if has_block {
            self.out.push('{');
            true
        } else {
            self.out.push(';');
            false
        }
    }

    fn leave_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
        if ctl.tree().at_rule_block(id).is_some() {
            self.out.push('}');
        }
    }

    fn enter_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        self.out.push_str("@def ");
        if let NodeKind::Definition { name } = tree.kind(id) {
            self.out.push_str(name);
        }
        self.out.push(' ');
        render_value_list(tree, tree.children(id), " ", &mut self.out, true);
        self.out.push(';');
        false
    }

    fn enter_conditional_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        render_conditional_prelude(ctl.tree(), id, &mut self.out, true);
        self.out.push('{');
        true
    }

    fn leave_conditional_rule(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.out.push('}');
    }

    fn enter_for_loop(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        render_for_prelude(ctl.tree(), id, &mut self.out, true);
        self.out.push('{');
        true
    }

    fn leave_for_loop(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.out.push('}');
    }

    fn enter_mixin_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        if let NodeKind::MixinDefinition { name, formals } = ctl.tree().kind(id) {
            self.out.push_str("@defmixin ");
            self.out.push_str(name);
            self.out.push('(');
            self.out.push_str(&formals.join(","));
            self.out.push(')');
        }
        self.out.push('{');
        true
    }

    fn leave_mixin_definition(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.out.push('}');
    }

    fn enter_mixin_call(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        if let NodeKind::MixinCall { name } = tree.kind(id) {
            self.out.push_str("@mixin ");
            self.out.push_str(name);
        }
        self.out.push('(');
        render_value_list(tree, tree.children(id), ",", &mut self.out, true);
        self.out.push_str(");");
        false
    }

    fn enter_component(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        if let NodeKind::Component {
            name,
            parent,
            is_abstract,
        } = ctl.tree().kind(id)
        {
            self.out.push('@');
            self.out.push_str(if *is_abstract {
                "abstract-component"
            } else {
                "component"
            });
            self.out.push(' ');
            self.out.push_str(name);
            if let Some(parent) = parent {
                self.out.push_str(" extends ");
                self.out.push_str(parent);
            }
        }
        self.out.push('{');
        true
    }

    fn leave_component(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.out.push('}');
    }
}
