//! The human-readable printer.

use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

use crate::printer::{
    render_at_rule_prelude, render_conditional_prelude, render_for_prelude, render_selector_list,
    render_value_list,
};

/// Pretty printer: one construct per line, two-space indentation.
///
/// # Example
///
/// ```
/// use cascada_parser::parse;
/// use cascada::printer::PrettyPrinter;
///
/// let mut tree = parse("x.gss", ".menu{color:red}").unwrap();
/// let css = PrettyPrinter::new().print(&mut tree);
/// assert_eq!(css, ".menu {\n  color: red;\n}\n");
/// ```
#[derive(Debug)]
pub struct PrettyPrinter {
    preserve_quotes: bool,
}

impl PrettyPrinter {
    /// A printer that keeps string quoting as written.
    pub fn new() -> Self {
        Self {
            preserve_quotes: true,
        }
    }

    /// Strip quotes from string values that read as plain identifiers.
    pub fn with_quote_stripping(mut self) -> Self {
        self.preserve_quotes = false;
        self
    }

    /// Print the whole tree.
    pub fn print(&self, tree: &mut Tree) -> String {
        let mut visitor = PrettyVisitor {
            out: String::new(),
            depth: 0,
            preserve_quotes: self.preserve_quotes,
        };
        VisitController::new(tree).start_visit(&mut visitor);
        visitor.out
    }
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        Self::new()
    }
}

struct PrettyVisitor {
    out: String,
    depth: usize,
    preserve_quotes: bool,
}

impl PrettyVisitor {
    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn open_block(&mut self) {
        self.out.push_str(" {\n");
        self.depth += 1;
    }

    fn close_block(&mut self) {
        self.depth -= 1;
        self.indent();
        self.out.push_str("}\n");
    }
}

impl Visitor for PrettyVisitor {
    fn enter_ruleset(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        self.indent();
        render_selector_list(ctl.tree(), id, ", ", &mut self.out);
        self.open_block();
        true
    }

    fn leave_ruleset(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.close_block();
    }

    fn enter_selector(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) -> bool {
        false
    }

    fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        self.indent();
        let property = tree.declaration_property(id);
        if let NodeKind::Property(p) = tree.kind(property) {
            self.out.push_str(&p.name().resolve());
        }
        self.out.push_str(": ");
        render_value_list(
            tree,
            tree.declaration_values(id),
            " ",
            &mut self.out,
            self.preserve_quotes,
        );
        if let NodeKind::Declaration { important: true } = tree.kind(id) {
            self.out.push_str(" !important");
        }
        self.out.push_str(";\n");
        false
    }

    fn enter_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let has_block = tree.at_rule_block(id).is_some();
        self.indent();
        render_at_rule_prelude(tree, id, &mut self.out, self.preserve_quotes);
        if has_block {
            self.open_block();
            true
        } else {
            self.out.push_str(";\n");
            false
        }
    }

    fn leave_at_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
        if ctl.tree().at_rule_block(id).is_some() {
            self.close_block();
        }
    }

    fn enter_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        self.indent();
        self.out.push_str("@def ");
        if let NodeKind::Definition { name } = tree.kind(id) {
            self.out.push_str(name);
        }
        self.out.push(' ');
        render_value_list(
            tree,
            tree.children(id),
            " ",
            &mut self.out,
            self.preserve_quotes,
        );
        self.out.push_str(";\n");
        false
    }

    fn enter_conditional_rule(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        self.indent();
        render_conditional_prelude(ctl.tree(), id, &mut self.out, self.preserve_quotes);
        self.open_block();
        true
    }

    fn leave_conditional_rule(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.close_block();
    }

    fn enter_for_loop(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        self.indent();
        render_for_prelude(ctl.tree(), id, &mut self.out, self.preserve_quotes);
        self.open_block();
        true
    }

    fn leave_for_loop(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.close_block();
    }

    fn enter_mixin_definition(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        self.indent();
        if let NodeKind::MixinDefinition { name, formals } = ctl.tree().kind(id) {
            self.out.push_str("@defmixin ");
            self.out.push_str(name);
            self.out.push('(');
            self.out.push_str(&formals.join(", "));
            self.out.push(')');
        }
        self.open_block();
        true
    }

    fn leave_mixin_definition(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.close_block();
    }

    fn enter_mixin_call(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        self.indent();
        if let NodeKind::MixinCall { name } = tree.kind(id) {
            self.out.push_str("@mixin ");
            self.out.push_str(name);
        }
        self.out.push('(');
        render_value_list(
            tree,
            tree.children(id),
            ", ",
            &mut self.out,
            self.preserve_quotes,
        );
        self.out.push_str(");\n");
        false
    }

    fn enter_component(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        self.indent();
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
        self.open_block();
        true
    }

    fn leave_component(&mut self, _ctl: &mut VisitController<'_>, _id: NodeId) {
        self.close_block();
    }
}
