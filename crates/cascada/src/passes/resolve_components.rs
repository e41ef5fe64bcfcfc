//! Component expansion.
//!
//! A component's rules are emitted with every contained class name
//! prefixed by the component name (`@component search-box { .input ... }`
//! emits `.search-box-input`). An `extends` chain copies the ancestors'
//! rules first, each prefixed with the *derived* component's name.
//! Abstract components emit nothing themselves and exist to be extended.

use indexmap::IndexMap;

use cascada_core::diagnostics::{Diagnostic, ErrorCode, ErrorManager};
use cascada_core::ident::Name;
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

/// Expands component nodes in document order; a component can only
/// extend one defined above it.
pub struct ResolveComponents;

impl ResolveComponents {
    pub fn run(tree: &mut Tree, errors: &mut ErrorManager) {
        let mut visitor = ComponentVisitor {
            errors,
            known: IndexMap::new(),
        };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct ComponentVisitor<'e> {
    errors: &'e mut ErrorManager,
    /// Component name -> its (possibly detached) node, in definition
    /// order.
    known: IndexMap<String, NodeId>,
}

/// Prefix every class refiner in a copied subtree with `prefix-`.
fn prefix_classes(tree: &mut Tree, node: NodeId, prefix: &str) {
    if let NodeKind::ClassRefiner { name } = tree.kind_mut(node) {
        let prefixed = format!("{prefix}-{name}");
        *name = Name::new(&prefixed);
    }
    for child in tree.children(node).to_vec() {
        prefix_classes(tree, child, prefix);
    }
}

impl ComponentVisitor<'_> {
    /// The chain of block nodes contributing to `name`, deepest ancestor
    /// first.
    fn inheritance_chain(&mut self, tree: &Tree, id: NodeId, name: &str) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(component) = cursor {
            let NodeKind::Component { parent, .. } = tree.kind(component) else {
                break;
            };
            chain.push(*tree.children(component).last().expect("component block"));
            cursor = match parent {
                Some(base) => match self.known.get(base) {
                    Some(&ancestor) => Some(ancestor),
                    None => {
                        self.errors.report(
                            Diagnostic::error(format!(
                                "component `{name}` extends unknown component `{base}`"
                            ))
                            .with_code(ErrorCode::E205)
                            .with_label_opt(tree.location(component), "extended here"),
                        );
                        None
                    }
                },
                None => None,
            };
        }
        chain.reverse();
        chain
    }
}

impl Visitor for ComponentVisitor<'_> {
    fn enter_component(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let tree = ctl.tree();
        let NodeKind::Component { name, is_abstract, .. } = tree.kind(id) else {
            return true;
        };
        let name = name.clone();
        let is_abstract = *is_abstract;

        let blocks = self.inheritance_chain(ctl.tree(), id, &name);
        self.known.insert(name.clone(), id);

        if is_abstract {
            // Abstract components only exist to be extended; the node is
            // detached but stays alive as an expansion template.
            ctl.remove_current(id);
            return true;
        }

        let mut expanded = Vec::new();
        for block in &blocks {
            let children = ctl.tree().children(*block).to_vec();
            let tree = ctl.tree();
            if let Some(&misfit) = children
                .iter()
                .find(|&&child| !crate::passes::block_accepts(tree, id, tree.kind(child)))
            {
                self.errors.report(
                    Diagnostic::error(format!(
                        "component `{name}` contains content not allowed in this context"
                    ))
                    .with_code(ErrorCode::E205)
                    .with_label_opt(tree.location(misfit), "this cannot live here"),
                );
                return false;
            }
            let tree = ctl.tree_mut();
            for child in children {
                let copy = tree.deep_copy(child);
                prefix_classes(tree, copy, &name);
                expanded.push(copy);
            }
        }
        ctl.replace_current(id, expanded);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::create_components::CreateComponents;
    use cascada_parser::parse;

    fn run_on(source: &str) -> (Tree, ErrorManager) {
        let mut tree = parse("t.gss", source).unwrap();
        let mut errors = ErrorManager::new();
        CreateComponents::run(&mut tree, &mut errors);
        ResolveComponents::run(&mut tree, &mut errors);
        (tree, errors)
    }

    #[test]
    fn test_component_prefixes_class_names() {
        let (tree, errors) = run_on("@component search-box { .input { color: red } }");
        assert!(!errors.has_errors());
        assert_eq!(
            tree.render(tree.body()),
            "[[.search-box-input]{[color:[red]]}]"
        );
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_abstract_component_emits_nothing() {
        let (tree, errors) = run_on("@abstract-component base { .core { a: b } }");
        assert!(!errors.has_errors());
        assert_eq!(tree.render(tree.body()), "[]");
    }

    #[test]
    fn test_extends_copies_ancestor_rules_first() {
        let (tree, errors) = run_on(
            "@abstract-component base { .core { a: b } } \
             @component fancy extends base { .glow { c: d } }",
        );
        assert!(!errors.has_errors());
        assert_eq!(
            tree.render(tree.body()),
            "[[.fancy-core]{[a:[b]]}][[.fancy-glow]{[c:[d]]}]"
        );
    }

    #[test]
    fn test_two_level_extends_chain() {
        let (tree, errors) = run_on(
            "@abstract-component base { .core { a: b } } \
             @abstract-component mid extends base { .trim { c: d } } \
             @component leaf extends mid { .tip { e: f } }",
        );
        assert!(!errors.has_errors());
        assert_eq!(
            tree.render(tree.body()),
            "[[.leaf-core]{[a:[b]]}][[.leaf-trim]{[c:[d]]}][[.leaf-tip]{[e:[f]]}]"
        );
    }

    #[test]
    fn test_extends_unknown_reports() {
        let (_, errors) = run_on("@component x extends ghost { .a { b: c } }");
        assert!(errors.generate_report().contains("unknown component"));
    }
}
