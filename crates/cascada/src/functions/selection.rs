//! Value-selection functions: `concat` and `selectFrom`.

use cascada_core::diagnostics::{Diagnostic, ErrorCode};
use cascada_core::node::{JoinOp, NodeKind};
use cascada_core::tree::{NodeId, Tree};

use crate::functions::{Arity, GssFunction};

/// `concat(a, b, ...)` - concatenate the rendered arguments into one
/// literal value.
pub struct Concat;

impl GssFunction for Concat {
    fn arity(&self) -> Arity {
        Arity::AtLeast(1)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        let mut value = String::new();
        for &arg in args {
            match tree.kind(arg) {
                NodeKind::Str { value: text, .. } => value.push_str(text),
                NodeKind::Literal { .. } | NodeKind::Numeric { .. } => {
                    value.push_str(&tree.render(arg));
                }
                other => {
                    return Err(Diagnostic::error(format!(
                        "concat cannot take a {} argument",
                        other.kind_name()
                    ))
                    .with_code(ErrorCode::E301)
                    .with_label_opt(tree.location(arg), "this argument"));
                }
            }
        }
        Ok(tree.alloc(NodeKind::Literal { value }))
    }
}

/// `selectFrom(list, index)` - pick the 1-based `index`-th value from a
/// space-separated list.
pub struct SelectFrom;

impl GssFunction for SelectFrom {
    fn arity(&self) -> Arity {
        Arity::Exact(2)
    }

    fn apply(&self, tree: &mut Tree, args: &[NodeId]) -> Result<NodeId, Diagnostic> {
        let index = match tree.kind(args[1]) {
            NodeKind::Numeric { value, unit, .. } if unit.is_empty() && value.fract() == 0.0 => {
                *value as i64
            }
            _ => {
                return Err(Diagnostic::error("selectFrom index must be a whole number")
                    .with_code(ErrorCode::E301)
                    .with_label_opt(tree.location(args[1]), "this index"));
            }
        };

        let list: Vec<NodeId> = match tree.kind(args[0]) {
            NodeKind::Composite { op: JoinOp::Space } => tree.children(args[0]).to_vec(),
            _ => vec![args[0]],
        };

        if index < 1 || index as usize > list.len() {
            return Err(Diagnostic::error(format!(
                "selectFrom index {index} is out of range for a {}-value list",
                list.len()
            ))
            .with_code(ErrorCode::E301)
            .with_label_opt(tree.location(args[1]), "this index"));
        }
        let picked = list[index as usize - 1];
        Ok(tree.deep_copy(picked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_literals_and_numbers() {
        let mut tree = Tree::new();
        let a = tree.alloc(NodeKind::Literal { value: "btn-".into() });
        let b = tree.alloc(NodeKind::Numeric {
            repr: "2".into(),
            value: 2.0,
            unit: String::new(),
        });
        let result = Concat.apply(&mut tree, &[a, b]).unwrap();
        assert_eq!(tree.render(result), "btn-2");
    }

    #[test]
    fn test_concat_unwraps_strings() {
        let mut tree = Tree::new();
        let s = tree.alloc(NodeKind::Str {
            value: "menu".into(),
            quote: cascada_core::node::QuoteStyle::Double,
        });
        let result = Concat.apply(&mut tree, &[s]).unwrap();
        assert_eq!(tree.render(result), "menu");
    }

    #[test]
    fn test_select_from_picks_one_based() {
        let mut tree = Tree::new();
        let list = tree.alloc(NodeKind::Composite { op: JoinOp::Space });
        for name in ["a", "b", "c"] {
            let item = tree.alloc(NodeKind::Literal { value: name.into() });
            tree.append(list, item);
        }
        let index = tree.alloc(NodeKind::Numeric {
            repr: "2".into(),
            value: 2.0,
            unit: String::new(),
        });
        let result = SelectFrom.apply(&mut tree, &[list, index]).unwrap();
        assert_eq!(tree.render(result), "b");
    }

    #[test]
    fn test_select_from_out_of_range() {
        let mut tree = Tree::new();
        let only = tree.alloc(NodeKind::Literal { value: "a".into() });
        let index = tree.alloc(NodeKind::Numeric {
            repr: "4".into(),
            value: 4.0,
            unit: String::new(),
        });
        let err = SelectFrom.apply(&mut tree, &[only, index]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::E301));
    }

    #[test]
    fn test_select_from_rejects_fractional_index() {
        let mut tree = Tree::new();
        let only = tree.alloc(NodeKind::Literal { value: "a".into() });
        let index = tree.alloc(NodeKind::Numeric {
            repr: "1.5".into(),
            value: 1.5,
            unit: String::new(),
        });
        assert!(SelectFrom.apply(&mut tree, &[only, index]).is_err());
    }
}
