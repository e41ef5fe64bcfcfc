//! CSS printers.
//!
//! Both printers are read-only users of the visitor protocol: structure
//! nodes (rulesets, at-rules, declarations) emit text from their
//! `enter_*`/`leave_*` callbacks, while value and selector subtrees are
//! rendered by the shared helpers here - the controller still walks value
//! nodes, but no callback emits for them, so nothing prints twice.
//!
//! [`CompactPrinter`] output is deterministic for a given tree and is a
//! fixed point through the parser: parse, print, parse, print yields the
//! same text.

mod compact;
mod pretty;

pub use compact::CompactPrinter;
pub use pretty::PrettyPrinter;

use cascada_core::node::{JoinOp, NodeKind};
use cascada_core::tree::{NodeId, Tree};

/// Render a value node as CSS text.
fn render_value(tree: &Tree, id: NodeId, out: &mut String, preserve_quotes: bool) {
    match tree.kind(id) {
        NodeKind::Literal { value } => out.push_str(value),
        NodeKind::Numeric { repr, unit, .. } => {
            out.push_str(repr);
            out.push_str(unit);
        }
        NodeKind::Str { value, quote } => {
            if !preserve_quotes && is_plain_ident(value) {
                out.push_str(value);
            } else {
                out.push(quote.char());
                out.push_str(value);
                out.push(quote.char());
            }
        }
        NodeKind::LoopVariable { name } => {
            out.push('$');
            out.push_str(name);
        }
        NodeKind::FunctionCall { name } => {
            out.push_str(name);
            out.push('(');
            let separator = if name.is_empty() { " " } else { "," };
            render_value_list(tree, tree.children(id), separator, out, preserve_quotes);
            out.push(')');
        }
        NodeKind::Composite { op } => {
            let separator = match op {
                JoinOp::Comma => ",",
                JoinOp::Space => " ",
                JoinOp::Slash => "/",
            };
            render_value_list(tree, tree.children(id), separator, out, preserve_quotes);
        }
        other => {
            debug_assert!(false, "non-value node {} in value position", other.kind_name());
        }
    }
}

fn render_value_list(
    tree: &Tree,
    ids: &[NodeId],
    separator: &str,
    out: &mut String,
    preserve_quotes: bool,
) {
    for (index, &id) in ids.iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        render_value(tree, id, out, preserve_quotes);
    }
}

/// Whether a string value could print unquoted without changing meaning.
fn is_plain_ident(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        && !value.starts_with(|c: char| c.is_ascii_digit())
}

/// Render a selector chain as CSS text.
fn render_selector(tree: &Tree, id: NodeId, out: &mut String) {
    let NodeKind::Selector { element, combinator } = tree.kind(id) else {
        debug_assert!(false, "non-selector {} in selector position", tree.kind(id).kind_name());
        return;
    };
    if let Some(element) = element {
        out.push_str(element);
    }
    for &refiner in tree.selector_refiners(id) {
        render_refiner(tree, refiner, out);
    }
    if let (Some(combinator), Some(next)) = (combinator, tree.selector_chained(id)) {
        out.push_str(combinator.as_str());
        render_selector(tree, next, out);
    }
}

fn render_refiner(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::ClassRefiner { name } => {
            out.push('.');
            out.push_str(&name.resolve());
        }
        NodeKind::IdRefiner { name } => {
            out.push('#');
            out.push_str(&name.resolve());
        }
        NodeKind::PseudoClass { name, has_argument } => {
            out.push(':');
            out.push_str(name);
            if *has_argument {
                out.push('(');
                render_selector(tree, tree.children(id)[0], out);
                out.push(')');
            }
        }
        NodeKind::PseudoElement { name } => {
            out.push_str("::");
            out.push_str(name);
        }
        NodeKind::AttributeRefiner { expr } => {
            out.push('[');
            out.push_str(expr);
            out.push(']');
        }
        other => {
            debug_assert!(false, "non-refiner {} in refiner position", other.kind_name());
        }
    }
}

/// Render the selector list of a ruleset.
fn render_selector_list(tree: &Tree, ruleset: NodeId, separator: &str, out: &mut String) {
    for (index, &selector) in tree.ruleset_selectors(ruleset).iter().enumerate() {
        if index > 0 {
            out.push_str(separator);
        }
        render_selector(tree, selector, out);
    }
}

/// Render an at-rule's opening: `@name params`.
fn render_at_rule_prelude(tree: &Tree, id: NodeId, out: &mut String, preserve_quotes: bool) {
    let NodeKind::AtRule { kind, name, .. } = tree.kind(id) else {
        debug_assert!(false, "render_at_rule_prelude on {}", tree.kind(id).kind_name());
        return;
    };
    out.push('@');
    out.push_str(kind.canonical_name().unwrap_or(name));
    let params = tree.at_rule_params(id);
    if !params.is_empty() {
        out.push(' ');
        render_value_list(tree, params, " ", out, preserve_quotes);
    }
}

/// Render the opening of a conditional rule: `@if (cond)` / `@else`.
fn render_conditional_prelude(tree: &Tree, id: NodeId, out: &mut String, preserve_quotes: bool) {
    let NodeKind::ConditionalRule { branch, .. } = tree.kind(id) else {
        debug_assert!(false, "render_conditional_prelude on {}", tree.kind(id).kind_name());
        return;
    };
    out.push('@');
    out.push_str(branch.name());
    if let Some(condition) = tree.conditional_condition(id) {
        out.push(' ');
        render_value(tree, condition, out, preserve_quotes);
    }
}

/// Render a for-loop's opening: `@for $i from A to B step C`.
fn render_for_prelude(tree: &Tree, id: NodeId, out: &mut String, preserve_quotes: bool) {
    let NodeKind::ForLoop { variable, .. } = tree.kind(id) else {
        debug_assert!(false, "render_for_prelude on {}", tree.kind(id).kind_name());
        return;
    };
    out.push_str("@for $");
    out.push_str(variable);
    out.push_str(" from ");
    render_value(tree, tree.for_from(id), out, preserve_quotes);
    out.push_str(" to ");
    render_value(tree, tree.for_to(id), out, preserve_quotes);
    if let Some(step) = tree.for_step(id) {
        out.push_str(" step ");
        render_value(tree, step, out, preserve_quotes);
    }
}
