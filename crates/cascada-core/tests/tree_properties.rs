//! Property tests for the arena tree: deep-copy independence and
//! structural invariants under random shapes and random splices.

use proptest::prelude::*;

use cascada_core::node::NodeKind;
use cascada_core::property::Property;
use cascada_core::tree::{NodeId, Tree};

/// A recipe for one declaration: property name and literal values.
#[derive(Debug, Clone)]
struct DeclRecipe {
    property: String,
    values: Vec<String>,
}

/// A recipe for one ruleset: element selector name plus declarations.
#[derive(Debug, Clone)]
struct RulesetRecipe {
    element: String,
    declarations: Vec<DeclRecipe>,
}

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

fn decl_recipe() -> impl Strategy<Value = DeclRecipe> {
    (ident(), prop::collection::vec(ident(), 1..4))
        .prop_map(|(property, values)| DeclRecipe { property, values })
}

fn ruleset_recipe() -> impl Strategy<Value = RulesetRecipe> {
    (ident(), prop::collection::vec(decl_recipe(), 0..5))
        .prop_map(|(element, declarations)| RulesetRecipe {
            element,
            declarations,
        })
}

fn build(recipes: &[RulesetRecipe]) -> (Tree, Vec<NodeId>) {
    let mut tree = Tree::new();
    let mut rulesets = Vec::new();
    for recipe in recipes {
        let selector = tree.alloc(NodeKind::Selector {
            element: Some(recipe.element.clone()),
            combinator: None,
        });
        let block = tree.alloc_declaration_block();
        for decl in &recipe.declarations {
            let declaration = tree.alloc(NodeKind::Declaration { important: false });
            let property = tree.alloc(NodeKind::Property(Property::new(&decl.property)));
            tree.append(declaration, property);
            for value in &decl.values {
                let value = tree.alloc(NodeKind::Literal {
                    value: value.clone(),
                });
                tree.append(declaration, value);
            }
            tree.append(block, declaration);
        }
        let ruleset = tree.alloc(NodeKind::Ruleset);
        tree.append(ruleset, selector);
        tree.set_ruleset_block(ruleset, block).unwrap();
        let body = tree.body();
        tree.append(body, ruleset);
        rulesets.push(ruleset);
    }
    (tree, rulesets)
}

proptest! {
    #[test]
    fn built_trees_are_consistent(recipes in prop::collection::vec(ruleset_recipe(), 0..6)) {
        let (tree, _) = build(&recipes);
        prop_assert!(tree.check_consistency().is_ok());
    }

    #[test]
    fn deep_copy_matches_original_and_is_independent(
        recipes in prop::collection::vec(ruleset_recipe(), 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut tree, rulesets) = build(&recipes);
        let original = rulesets[pick.index(rulesets.len())];

        let copy = tree.deep_copy(original);
        prop_assert_ne!(copy, original);
        prop_assert_eq!(tree.render(copy), tree.render(original));

        // Copy of the copy is a fixed point.
        let copy2 = tree.deep_copy(copy);
        prop_assert_eq!(tree.render(copy2), tree.render(copy));

        // Emptying the copy's block leaves the original untouched.
        let before = tree.render(original);
        let copy_block = tree.ruleset_block(copy);
        for child in tree.children(copy_block).to_vec() {
            tree.orphan(child);
        }
        prop_assert_eq!(tree.render(original), before);
        prop_assert!(tree.check_consistency().is_ok());
    }

    #[test]
    fn moving_rulesets_preserves_single_ownership(
        recipes in prop::collection::vec(ruleset_recipe(), 2..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut tree, rulesets) = build(&recipes);
        let moved = rulesets[pick.index(rulesets.len())];

        // Re-appending to the same body moves the ruleset to the end
        // without duplicating ownership.
        let body = tree.body();
        tree.append(body, moved);
        prop_assert_eq!(tree.children(body).len(), recipes.len());
        prop_assert_eq!(tree.children(body).last().copied(), Some(moved));
        prop_assert!(tree.check_consistency().is_ok());
    }
}
