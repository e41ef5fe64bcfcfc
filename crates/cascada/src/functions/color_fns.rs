//! Color blending functions built on CSS color parsing.

use std::str::FromStr as _;

use color::DynamicColor;

use cascada_core::diagnostics::{Diagnostic, ErrorCode};
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};

use crate::functions::{Arity, GssFunction};

/// `blendColorsRgb(a, b)` - the per-component sRGB midpoint of two
/// colors, rendered as a hex literal.
pub struct BlendColorsRgb;

impl GssFunction for BlendColorsRgb {
    fn arity(&self) -> Arity {
        Arity::Exact(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        let a = parse_color(tree, args[0])?;
        let b = parse_color(tree, args[1])?;

        let blended: Vec<u8> = a
            .components
            .iter()
            .zip(b.components.iter())
            .take(3)
            .map(|(x, y)| (((x + y) / 2.0).clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();

        let value = format!("#{:02x}{:02x}{:02x}", blended[0], blended[1], blended[2]);
        Ok(tree.alloc(NodeKind::Literal { value }))
    }
}

/// Parse a value node as a CSS color.
fn parse_color(tree: &Tree, node: NodeId) -> Result<DynamicColor, Diagnostic> {
    let text = match tree.kind(node) {
        NodeKind::Literal { value } => value.clone(),
        other => {
            return Err(Diagnostic::error(format!(
                "expected a color argument, found {}",
                other.kind_name()
            ))
            .with_code(ErrorCode::E304)
            .with_label_opt(tree.location(node), "this argument"));
        }
    };
    DynamicColor::from_str(&text).map_err(|err| {
        Diagnostic::error(format!("invalid color `{text}`: {err}"))
            .with_code(ErrorCode::E304)
            .with_label_opt(tree.location(node), "this argument")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(tree: &mut Tree, value: &str) -> NodeId {
        tree.alloc(NodeKind::Literal {
            value: value.into(),
        })
    }

    #[test]
    fn test_blend_black_and_white() {
        let mut tree = Tree::new();
        let black = literal(&mut tree, "#000000");
        let white = literal(&mut tree, "#ffffff");
        let result = BlendColorsRgb.apply(&mut tree, &[black, white]).unwrap();
        assert_eq!(tree.render(result), "#808080");
    }

    #[test]
    fn test_blend_same_color_is_identity() {
        let mut tree = Tree::new();
        let a = literal(&mut tree, "#336699");
        let b = literal(&mut tree, "#336699");
        let result = BlendColorsRgb.apply(&mut tree, &[a, b]).unwrap();
        assert_eq!(tree.render(result), "#336699");
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let mut tree = Tree::new();
        let bad = literal(&mut tree, "not-a-color");
        let ok = literal(&mut tree, "#fff");
        let err = BlendColorsRgb.apply(&mut tree, &[bad, ok]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E304));
    }
}
