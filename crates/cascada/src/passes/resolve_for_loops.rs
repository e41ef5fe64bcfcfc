//! For-loop unrolling.
//!
//! Replaces each typed [`ForLoop`](cascada_core::node::NodeKind::ForLoop)
//! with one deep copy of its body per iteration, substituting the loop
//! variable into value positions and into `$var` occurrences inside class
//! names and literals.

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::ident::Name;
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

use crate::functions::format_number;

/// Unrolls for-loops. Bounds must have been folded to unitless whole
/// numbers by the constant passes; loops whose bounds are still symbolic
/// are reported and left in place (best-effort output keeps them
/// visible).
pub struct ResolveForLoops;

impl ResolveForLoops {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = ForLoopVisitor { errors };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct ForLoopVisitor<'e> {
    errors: &'e mut ErrorManager,
}

/// Read a bound as a unitless whole number.
fn bound_value(tree: &Tree, id: NodeId) -> Option<i64> {
    match tree.kind(id) {
        NodeKind::Numeric { value, unit, .. } if unit.is_empty() && value.fract() == 0.0 => {
            Some(*value as i64)
        }
        _ => None,
    }
}

/// Substitute `$variable` with `value` everywhere in a copied subtree.
fn substitute(tree: &mut Tree, node: NodeId, variable: &str, value: i64) {
    let children = tree.children(node).to_vec();
    for (index, child) in children.into_iter().enumerate() {
        if matches!(tree.kind(child), NodeKind::LoopVariable { name } if name == variable) {
            let replacement = tree.alloc(NodeKind::Numeric {
                repr: format_number(value as f64),
                value: value as f64,
                unit: String::new(),
            });
            tree.splice(node, index, &[replacement]);
        } else {
            substitute(tree, child, variable, value);
        }
    }

    let needle = format!("${variable}");
    match tree.kind_mut(node) {
        NodeKind::ClassRefiner { name } => {
            let text = name.resolve();
            if let Some(replaced) = replace_whole_token(&text, &needle, value) {
                *name = Name::new(&replaced);
            }
        }
        NodeKind::Literal { value: text } => {
            if let Some(replaced) = replace_whole_token(text, &needle, value) {
                *text = replaced;
            }
        }
        _ => {}
    }
}

/// Replace `$var` occurrences not followed by an identifier character, so
/// `$i` never eats into `$i2`.
fn replace_whole_token(text: &str, needle: &str, value: i64) -> Option<String> {
    if !text.contains(needle.as_bytes()[0] as char) {
        return None;
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = false;
    while let Some(position) = rest.find(needle) {
        let after = rest[position + needle.len()..].chars().next();
        out.push_str(&rest[..position]);
        if after.is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
            out.push_str(&value.to_string());
            replaced = true;
        } else {
            out.push_str(needle);
        }
        rest = &rest[position + needle.len()..];
    }
    out.push_str(rest);
    replaced.then_some(out)
}

impl ForLoopVisitor<'_> {
    fn report(&mut self, tree: &Tree, id: NodeId, message: &str) {
        self.errors.report(
            Diagnostic::error(message)
                .with_code(ErrorCode::E200)
                .with_label_opt(tree.location(id), "this loop"),
        );
    }
}

impl Visitor for ForLoopVisitor<'_> {
    fn enter_for_loop(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::ForLoop { variable, .. } = tree.kind(id) else {
            return true;
        };
        let variable = variable.clone();

        let Some(from) = bound_value(tree, tree.for_from(id)) else {
            self.report(tree, id, "loop bound is not a whole number");
            return false;
        };
        let Some(to) = bound_value(tree, tree.for_to(id)) else {
            self.report(tree, id, "loop bound is not a whole number");
            return false;
        };
        let step = match tree.for_step(id) {
            Some(step_node) => match bound_value(tree, step_node) {
                Some(step) if step > 0 => step,
                _ => {
                    self.report(tree, id, "loop step must be a positive whole number");
                    return false;
                }
            },
            None => 1,
        };

        let body = tree.for_block(id);
        let body_children = tree.children(body).to_vec();
        if body_children
            .iter()
            .any(|&child| !crate::passes::block_accepts(tree, id, tree.kind(child)))
        {
            self.report(tree, id, "loop body content is not allowed in this context");
            return false;
        }

        let tree = ctl.tree_mut();
        let mut unrolled = Vec::new();
        let mut iteration = from;
        while iteration <= to {
            for &child in &body_children {
                let copy = tree.deep_copy(child);
                substitute(tree, copy, &variable, iteration);
                unrolled.push(copy);
            }
            iteration += step;
        }
        ctl.replace_current(id, unrolled);
        true
    }
}
