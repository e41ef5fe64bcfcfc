//! CSS cascade specificity.
//!
//! Specificity is a derived, order-sensitive 4-tuple computed per selector
//! from its refiners. It is computed on demand from an up-to-date selector
//! node and never stored on the tree, so it cannot desync from the refiners
//! it was derived from.

use serde::Serialize;

use crate::node::NodeKind;
use crate::tree::{NodeId, Tree};

/// An order-sensitive specificity tuple, compared lexicographically.
///
/// The components follow the CSS2 cascade: inline style, id refiners,
/// class/attribute/pseudo-class refiners, element names and
/// pseudo-elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Specificity {
    /// Inline style weight; always zero for stylesheet selectors.
    pub inline: u32,
    /// Count of id refiners.
    pub ids: u32,
    /// Count of class, attribute, and pseudo-class refiners.
    pub classes: u32,
    /// Count of element names and pseudo-elements.
    pub elements: u32,
}

impl Specificity {
    /// Compute the specificity of a selector chain, summing every link.
    ///
    /// A `:not(...)` pseudo-class contributes its argument's specificity
    /// instead of counting as a pseudo-class itself, per the selectors
    /// specification.
    pub fn of_selector(tree: &Tree, selector: NodeId) -> Specificity {
        let mut total = Specificity::default();
        let mut cursor = Some(selector);
        while let Some(link) = cursor {
            total = total.plus(Self::of_link(tree, link));
            cursor = tree.selector_chained(link);
        }
        total
    }

    fn of_link(tree: &Tree, selector: NodeId) -> Specificity {
        let mut spec = Specificity::default();
        if let NodeKind::Selector { element, .. } = tree.kind(selector) {
            if element.as_deref().is_some_and(|e| e != "*") {
                spec.elements += 1;
            }
        }
        for &refiner in tree.selector_refiners(selector) {
            match tree.kind(refiner) {
                NodeKind::IdRefiner { .. } => spec.ids += 1,
                NodeKind::ClassRefiner { .. } | NodeKind::AttributeRefiner { .. } => {
                    spec.classes += 1;
                }
                NodeKind::PseudoClass { has_argument, .. } => {
                    if *has_argument {
                        let argument = tree.children(refiner)[0];
                        spec = spec.plus(Self::of_selector(tree, argument));
                    } else {
                        spec.classes += 1;
                    }
                }
                NodeKind::PseudoElement { .. } => spec.elements += 1,
                other => {
                    debug_assert!(false, "non-refiner child {}", other.kind_name());
                }
            }
        }
        spec
    }

    fn plus(self, other: Specificity) -> Specificity {
        Specificity {
            inline: self.inline + other.inline,
            ids: self.ids + other.ids,
            classes: self.classes + other.classes,
            elements: self.elements + other.elements,
        }
    }

    /// The tuple as `(inline, ids, classes, elements)`.
    pub fn as_tuple(self) -> (u32, u32, u32, u32) {
        (self.inline, self.ids, self.classes, self.elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Name;

    fn selector(tree: &mut Tree, element: Option<&str>) -> NodeId {
        tree.alloc(NodeKind::Selector {
            element: element.map(str::to_owned),
            combinator: None,
        })
    }

    #[test]
    fn test_li_red_level() {
        // li.red.level -> (0,0,2,1), the CSS2 cascade example.
        let mut tree = Tree::new();
        let li = selector(&mut tree, Some("li"));
        for class in ["red", "level"] {
            let refiner = tree.alloc(NodeKind::ClassRefiner {
                name: Name::new(class),
            });
            tree.append(li, refiner);
        }
        assert_eq!(Specificity::of_selector(&tree, li).as_tuple(), (0, 0, 2, 1));
    }

    #[test]
    fn test_not_counts_its_argument() {
        // #s12:not(#s45) -> (0,2,0,0).
        let mut tree = Tree::new();
        let outer = selector(&mut tree, None);
        let id = tree.alloc(NodeKind::IdRefiner {
            name: Name::new("s12"),
        });
        tree.append(outer, id);

        let inner = selector(&mut tree, None);
        let inner_id = tree.alloc(NodeKind::IdRefiner {
            name: Name::new("s45"),
        });
        tree.append(inner, inner_id);

        let not = tree.alloc(NodeKind::PseudoClass {
            name: "not".into(),
            has_argument: true,
        });
        tree.append(not, inner);
        tree.append(outer, not);

        assert_eq!(
            Specificity::of_selector(&tree, outer).as_tuple(),
            (0, 2, 0, 0)
        );
    }

    #[test]
    fn test_universal_selector_counts_nothing() {
        let mut tree = Tree::new();
        let star = selector(&mut tree, Some("*"));
        assert_eq!(Specificity::of_selector(&tree, star).as_tuple(), (0, 0, 0, 0));
    }

    #[test]
    fn test_chain_sums_links() {
        // div > .item -> (0,0,1,1)
        let mut tree = Tree::new();
        let item = selector(&mut tree, None);
        let class = tree.alloc(NodeKind::ClassRefiner {
            name: Name::new("item"),
        });
        tree.append(item, class);

        let div = tree.alloc(NodeKind::Selector {
            element: Some("div".into()),
            combinator: Some(crate::node::Combinator::Child),
        });
        tree.append(div, item);

        assert_eq!(Specificity::of_selector(&tree, div).as_tuple(), (0, 0, 1, 1));
    }

    #[test]
    fn test_lexicographic_ordering() {
        let id_heavy = Specificity {
            inline: 0,
            ids: 1,
            classes: 0,
            elements: 0,
        };
        let class_heavy = Specificity {
            inline: 0,
            ids: 0,
            classes: 9,
            elements: 9,
        };
        assert!(id_heavy > class_heavy);
    }
}
