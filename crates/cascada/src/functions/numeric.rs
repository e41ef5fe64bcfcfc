//! Numeric arithmetic functions: `add`, `sub`, `mult`, `divide`, `min`,
//! `max`.
//!
//! Evaluation is left-associative (`sub(a, b, c)` is `(a - b) - c`). The
//! additive family follows the unit-compatibility rule: the result's unit
//! is the first non-identity operand's unit, where a numeric zero is an
//! identity regardless of its own unit; mixing two different non-empty
//! units is an error naming both. The scalar family (`mult`, `divide`)
//! instead requires every operand past the first to be unitless.
//!
//! Results render with at most 8 decimal places, trailing zeros dropped,
//! and integral values without a decimal point. That precision is
//! preserved legacy behavior, not a numeric policy to improve on.

use cascada_core::diagnostics::{Diagnostic, ErrorCode};
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};

use crate::functions::{Arity, GssFunction};

/// Format a folded numeric result: 8 decimal places, trailing zeros and a
/// trailing decimal point dropped.
pub fn format_number(value: f64) -> String {
    let mut out = format!("{value:.8}");
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    if out == "-0" {
        out = "0".to_owned();
    }
    out
}

/// One validated numeric operand.
struct Operand {
    value: f64,
    unit: String,
    node: NodeId,
}

fn operands(tree: &Tree, args: &[NodeId]) -> Result<Vec<Operand>, Diagnostic> {
    args.iter()
        .map(|&node| match tree.kind(node) {
            NodeKind::Numeric { value, unit, .. } => Ok(Operand {
                value: *value,
                unit: unit.clone(),
                node,
            }),
            other => Err(Diagnostic::error(format!(
                "expected a numeric argument, found {}",
                other.kind_name()
            ))
            .with_code(ErrorCode::E301)
            .with_label_opt(tree.location(node), "this argument")),
        })
        .collect()
}

/// Resolve the result unit for the additive family: the first non-zero
/// operand decides; any non-zero operand disagreeing with it is an error
/// naming both units.
fn additive_unit(tree: &Tree, operands: &[Operand]) -> Result<String, Diagnostic> {
    let mut resolved: Option<&Operand> = None;
    for operand in operands {
        if operand.value == 0.0 {
            continue;
        }
        match resolved {
            None => resolved = Some(operand),
            Some(first) if first.unit == operand.unit => {}
            Some(first) => {
                let describe =
                    |unit: &str| if unit.is_empty() { "no unit".to_owned() } else { format!("`{unit}`") };
                return Err(Diagnostic::error(format!(
                    "incompatible units: {} and {}",
                    describe(&first.unit),
                    describe(&operand.unit)
                ))
                .with_code(ErrorCode::E302)
                .with_label_opt(tree.location(operand.node), "this operand")
                .with_help("operands of add/sub/min/max must share one unit; zero matches any"));
            }
        }
    }
    Ok(resolved
        .or(operands.first())
        .map(|operand| operand.unit.clone())
        .unwrap_or_default())
}

/// Require every operand past the first to be unitless, for the scalar
/// family.
fn require_scalar_tail(tree: &Tree, operands: &[Operand]) -> Result<(), Diagnostic> {
    for operand in &operands[1..] {
        if !operand.unit.is_empty() {
            return Err(Diagnostic::error(format!(
                "scalar operand must be unitless, found `{}`",
                operand.unit
            ))
            .with_code(ErrorCode::E302)
            .with_label_opt(tree.location(operand.node), "this operand")
            .with_help("only the first operand of mult/divide may carry a unit"));
        }
    }
    Ok(())
}

fn result_node(tree: &mut Tree, value: f64, unit: String) -> NodeId {
    tree.alloc(NodeKind::Numeric {
        repr: format_number(value),
        value,
        unit,
    })
}

/// `add(a, b, ...)` - left-associative sum.
pub struct Add;

impl GssFunction for Add {
    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        fold_additive(tree, args, |acc, x| acc + x)
    }
}

/// `sub(a, b, ...)` - left-associative difference.
pub struct Sub;

impl GssFunction for Sub {
    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        fold_additive(tree, args, |acc, x| acc - x)
    }
}

/// `min(a, b, ...)` - smallest operand.
pub struct Min;

impl GssFunction for Min {
    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        fold_additive(tree, args, f64::min)
    }
}

/// `max(a, b, ...)` - largest operand.
pub struct Max;

impl GssFunction for Max {
    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        fold_additive(tree, args, f64::max)
    }
}

fn fold_additive(
    tree: &mut Tree,
    args: &[NodeId],
    op: impl Fn(f64, f64) -> f64,
) -> Result<NodeId, Diagnostic> {
    let operands = operands(tree, args)?;
    let unit = additive_unit(tree, &operands)?;
    let value = operands
        .iter()
        .skip(1)
        .fold(operands[0].value, |acc, operand| op(acc, operand.value));
    Ok(result_node(tree, value, unit))
}

/// `mult(a, b, ...)` - left-associative product; tail operands are
/// scalars.
pub struct Mult;

impl GssFunction for Mult {
    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        let operands = operands(tree, args)?;
        require_scalar_tail(tree, &operands)?;
        let value = operands
            .iter()
            .skip(1)
            .fold(operands[0].value, |acc, operand| acc * operand.value);
        let unit = operands[0].unit.clone();
        Ok(result_node(tree, value, unit))
    }
}

/// `divide(a, b, ...)` - left-associative quotient; tail operands are
/// scalars.
pub struct Divide;

impl GssFunction for Divide {
    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        let operands = operands(tree, args)?;
        require_scalar_tail(tree, &operands)?;
        let mut value = operands[0].value;
        for operand in &operands[1..] {
            if operand.value == 0.0 {
                return Err(Diagnostic::error("division by zero")
                    .with_code(ErrorCode::E303)
                    .with_label_opt(tree.location(operand.node), "this operand is zero"));
            }
            value /= operand.value;
        }
        let unit = operands[0].unit.clone();
        Ok(result_node(tree, value, unit))
    }
}
