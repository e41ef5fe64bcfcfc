//! Directional (BiDi) flipping for RTL output.
//!
//! Swaps left/right-sensitive property names, rotates four-part
//! positional values, and mirrors left/right keyword values - unless the
//! declaration or any ancestor carries the flip-suppression flag set by
//! the `/* @noflip */` pass.

use cascada_core::diagnostics::ErrorManager;
use cascada_core::node::NodeKind;
use cascada_core::property::Property;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Properties whose keyword values mirror between `left` and `right`.
const KEYWORD_FLIPPED: &[&str] = &["clear", "float", "text-align"];

/// Flips a tree written for LTR into its RTL rendition.
pub struct FlipDirection;

impl FlipDirection {
    pub fn run(tree: &mut Tree, _errors: &mut ErrorManager) {
        let mut visitor = FlipVisitor;
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct FlipVisitor;

/// `margin-left` -> `margin-right` and vice versa, matching whole dash
/// segments only.
fn flip_property_name(name: &str) -> Option<String> {
    let mut changed = false;
    let flipped: Vec<&str> = name
        .split('-')
        .map(|segment| match segment {
            "left" => {
                changed = true;
                "right"
            }
            "right" => {
                changed = true;
                "left"
            }
            other => other,
        })
        .collect();
    changed.then(|| flipped.join("-"))
}

impl Visitor for FlipVisitor {
    fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        if ctl.tree().flip_suppressed(id) {
            return false;
        }
        let tree = ctl.tree_mut();

        let property_node = tree.declaration_property(id);
        let NodeKind::Property(property) = tree.kind(property_node) else {
            return false;
        };
        let name = property.name().resolve();
        let positional = property.has_positional_parameters();

        if let Some(flipped) = flip_property_name(&name) {
            *tree.kind_mut(property_node) = NodeKind::Property(Property::new(&flipped));
        }

        let values = tree.declaration_values(id).to_vec();

        // Four-part positional lists rotate right: top right bottom left
        // becomes top left bottom right.
        if positional && values.len() == 4 {
            // Values start after the property at child index 1; swap the
            // 2nd and 4th value.
            let second = values[1];
            let fourth = values[3];
            tree.adopt(id, fourth, 2);
            // After moving `fourth` to index 2, `second` sits at index 3.
            tree.adopt(id, second, 4);
        }

        if KEYWORD_FLIPPED.contains(&name.as_str()) {
            for value in values {
                if let NodeKind::Literal { value: keyword } = tree.kind_mut(value) {
                    match keyword.as_str() {
                        "left" => *keyword = "right".to_owned(),
                        "right" => *keyword = "left".to_owned(),
                        _ => {}
                    }
                }
            }
        }
        false
    }
}
