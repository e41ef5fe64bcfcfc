//! The traversal engine.
//!
//! [`VisitController`] walks a tree in a fixed, documented order - root,
//! optional charset, import block, then the body depth-first; within a
//! ruleset, selectors (and their refiners) before the declaration block;
//! within a declaration, the property before the values, values in source
//! order - dispatching `enter_*` before a node's children and `leave_*`
//! after.
//!
//! The walk is not a recursive call: it is an explicit state machine with a
//! stack of frames, one per nesting level, where each frame computes its
//! own "next child" from the current (possibly just-mutated) tree shape.
//! That is what makes in-traversal mutation safe: when a visitor replaces
//! or removes the current node, the edit updates the parent's child list
//! and the top frame's bookkeeping together, so former siblings are neither
//! skipped nor visited twice, and replacement nodes are visited in place of
//! the original.
//!
//! Mutation operations address the current node explicitly. Passing any
//! other node is a programming error - the controller panics rather than
//! corrupting the walk.

use log::trace;

use crate::node::{NodeKind, NodeTag};
use crate::tree::{NodeId, Tree};
use crate::visitor::Visitor;

/// Outcome of a mutation requested from inside a visitor callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    /// The current node was detached; its former next sibling now occupies
    /// its index.
    Removed,
    /// The current node was replaced by nodes spliced in at its index;
    /// they are visited next.
    Replaced,
    /// Descent into the current node's children was cancelled.
    SkipChildren,
}

/// One level of the traversal state: a node whose children are being
/// visited, and the index of the next child to visit.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    index: usize,
}

/// The mutating traversal engine.
///
/// Borrows the tree exclusively for the duration of one walk; visitor
/// callbacks reach the tree through [`tree`](VisitController::tree) /
/// [`tree_mut`](VisitController::tree_mut) on the controller they are
/// handed.
pub struct VisitController<'t> {
    tree: &'t mut Tree,
    stack: Vec<Frame>,
    current: Option<NodeId>,
    pending: Option<Edit>,
}

impl<'t> VisitController<'t> {
    /// Create a controller over `tree`.
    pub fn new(tree: &'t mut Tree) -> Self {
        Self {
            tree,
            stack: Vec::new(),
            current: None,
            pending: None,
        }
    }

    /// Shared access to the tree under traversal.
    pub fn tree(&self) -> &Tree {
        self.tree
    }

    /// Exclusive access to the tree under traversal.
    ///
    /// Visitors use this to allocate replacement nodes and to edit node
    /// payloads in place. Structural edits to the node currently being
    /// visited must go through
    /// [`replace_current`](VisitController::replace_current) /
    /// [`remove_current`](VisitController::remove_current) so the
    /// traversal state stays consistent.
    pub fn tree_mut(&mut self) -> &mut Tree {
        self.tree
    }

    /// Walk the whole tree, dispatching to `visitor`.
    pub fn start_visit(&mut self, visitor: &mut dyn Visitor) {
        let root = self.tree.root();
        self.current = Some(root);
        self.pending = None;
        let descend = self.dispatch_enter(visitor, root);
        let skipped = matches!(self.pending.take(), Some(Edit::SkipChildren));
        if !descend || skipped {
            self.current = None;
            return;
        }
        self.stack.push(Frame { node: root, index: 0 });

        while let Some(frame) = self.stack.last().copied() {
            let children = self.tree.children(frame.node);
            if let Some(&child) = children.get(frame.index) {
                self.step_into(visitor, child);
            } else {
                self.step_out(visitor, frame.node);
            }
        }
        self.current = None;
    }

    /// Visit `child`: enter, then either descend, skip, or account for a
    /// mutation the visitor performed.
    fn step_into(&mut self, visitor: &mut dyn Visitor, child: NodeId) {
        self.current = Some(child);
        self.pending = None;
        let descend = self.dispatch_enter(visitor, child);
        let top = self.stack.last_mut().expect("step_into with empty stack");
        match self.pending.take() {
            Some(Edit::Removed) | Some(Edit::Replaced) => {
                // The child list already reflects the edit; the same index
                // now holds the next node to visit (the first replacement,
                // or the former next sibling).
            }
            Some(Edit::SkipChildren) => top.index += 1,
            None => {
                if descend {
                    self.stack.push(Frame {
                        node: child,
                        index: 0,
                    });
                } else {
                    top.index += 1;
                }
            }
        }
    }

    /// All of `node`'s children are visited: pop its frame and leave.
    fn step_out(&mut self, visitor: &mut dyn Visitor, node: NodeId) {
        self.stack.pop();
        self.current = Some(node);
        self.pending = None;
        self.dispatch_leave(visitor, node);
        match self.pending.take() {
            Some(Edit::Removed) | Some(Edit::Replaced) => {
                // Parent index stays put: replacements (if any) are visited
                // in place of the departed node.
            }
            _ => {
                if let Some(parent) = self.stack.last_mut() {
                    parent.index += 1;
                }
            }
        }
    }

    // =====================================================================
    // Mutation operations
    // =====================================================================

    /// Replace the node currently being visited with `replacements`
    /// (splice semantics).
    ///
    /// The replacements are visited in place of the original; the original
    /// is never re-visited. With an empty list this is equivalent to
    /// [`remove_current`](VisitController::remove_current).
    ///
    /// # Panics
    ///
    /// Panics if `current` is not the node currently being visited, if it
    /// is the root, or if the splice would violate the parent's child-kind
    /// constraints.
    pub fn replace_current(&mut self, current: NodeId, replacements: Vec<NodeId>) {
        self.assert_current(current);
        let frame = self
            .stack
            .last()
            .copied()
            .expect("the root cannot be replaced");
        debug_assert_eq!(self.tree.children(frame.node).get(frame.index), Some(&current));
        self.check_splice(frame.node, frame.index, &replacements);

        trace!(
            node = self.tree.kind(current).kind_name(),
            replacements = replacements.len();
            "replace during traversal"
        );
        self.tree.splice(frame.node, frame.index, &replacements);
        self.pending = Some(if replacements.is_empty() {
            Edit::Removed
        } else {
            Edit::Replaced
        });
    }

    /// Remove the node currently being visited. The traversal continues
    /// with its former next sibling.
    ///
    /// # Panics
    ///
    /// Panics if `current` is not the node currently being visited or if
    /// it is the root.
    pub fn remove_current(&mut self, current: NodeId) {
        self.replace_current(current, Vec::new());
    }

    /// Cancel descent into the current node's children from inside
    /// `enter_*`, without touching the tree. The node's `leave_*` is not
    /// called, matching an `enter_*` that returns `false`.
    pub fn skip_children(&mut self, current: NodeId) {
        self.assert_current(current);
        self.pending = Some(Edit::SkipChildren);
    }

    fn assert_current(&self, id: NodeId) {
        assert_eq!(
            self.current,
            Some(id),
            "mutation addressed a node that is not currently being visited"
        );
    }

    /// Enforce the child-kind constraints that are cheap to check at splice
    /// time. Anything structural beyond this is the pass's contract.
    fn check_splice(&self, parent: NodeId, index: usize, replacements: &[NodeId]) {
        match self.tree.kind(parent) {
            NodeKind::Block { kind, .. } => {
                for &replacement in replacements {
                    let child_kind = self.tree.kind(replacement);
                    assert!(
                        kind.accepts(child_kind),
                        "splice would put a {} into a {:?} block",
                        child_kind.kind_name(),
                        kind
                    );
                }
            }
            NodeKind::Declaration { .. } if index == 0 => {
                assert!(
                    replacements.len() == 1
                        && matches!(self.tree.kind(replacements[0]), NodeKind::Property(_)),
                    "a declaration's property slot takes exactly one property node"
                );
            }
            _ => {}
        }
    }

    fn dispatch_enter(&mut self, visitor: &mut dyn Visitor, id: NodeId) -> bool {
        match self.tree.kind(id).tag() {
            NodeTag::Root => visitor.enter_root(self, id),
            NodeTag::Block => visitor.enter_block(self, id),
            NodeTag::Ruleset => visitor.enter_ruleset(self, id),
            NodeTag::Selector => visitor.enter_selector(self, id),
            NodeTag::ClassRefiner => visitor.enter_class_refiner(self, id),
            NodeTag::IdRefiner => visitor.enter_id_refiner(self, id),
            NodeTag::PseudoClass => visitor.enter_pseudo_class(self, id),
            NodeTag::PseudoElement => visitor.enter_pseudo_element(self, id),
            NodeTag::AttributeRefiner => visitor.enter_attribute_refiner(self, id),
            NodeTag::Property => visitor.enter_property(self, id),
            NodeTag::Declaration => visitor.enter_declaration(self, id),
            NodeTag::Literal => visitor.enter_literal(self, id),
            NodeTag::Numeric => visitor.enter_numeric(self, id),
            NodeTag::Str => visitor.enter_string(self, id),
            NodeTag::FunctionCall => visitor.enter_function_call(self, id),
            NodeTag::Composite => visitor.enter_composite(self, id),
            NodeTag::LoopVariable => visitor.enter_loop_variable(self, id),
            NodeTag::AtRule => visitor.enter_at_rule(self, id),
            NodeTag::Definition => visitor.enter_definition(self, id),
            NodeTag::ConditionalBlock => visitor.enter_conditional_block(self, id),
            NodeTag::ConditionalRule => visitor.enter_conditional_rule(self, id),
            NodeTag::ForLoop => visitor.enter_for_loop(self, id),
            NodeTag::MixinDefinition => visitor.enter_mixin_definition(self, id),
            NodeTag::MixinCall => visitor.enter_mixin_call(self, id),
            NodeTag::Component => visitor.enter_component(self, id),
        }
    }

    fn dispatch_leave(&mut self, visitor: &mut dyn Visitor, id: NodeId) {
        match self.tree.kind(id).tag() {
            NodeTag::Root => visitor.leave_root(self, id),
            NodeTag::Block => visitor.leave_block(self, id),
            NodeTag::Ruleset => visitor.leave_ruleset(self, id),
            NodeTag::Selector => visitor.leave_selector(self, id),
            NodeTag::ClassRefiner => visitor.leave_class_refiner(self, id),
            NodeTag::IdRefiner => visitor.leave_id_refiner(self, id),
            NodeTag::PseudoClass => visitor.leave_pseudo_class(self, id),
            NodeTag::PseudoElement => visitor.leave_pseudo_element(self, id),
            NodeTag::AttributeRefiner => visitor.leave_attribute_refiner(self, id),
            NodeTag::Property => visitor.leave_property(self, id),
            NodeTag::Declaration => visitor.leave_declaration(self, id),
            NodeTag::Literal => visitor.leave_literal(self, id),
            NodeTag::Numeric => visitor.leave_numeric(self, id),
            NodeTag::Str => visitor.leave_string(self, id),
            NodeTag::FunctionCall => visitor.leave_function_call(self, id),
            NodeTag::Composite => visitor.leave_composite(self, id),
            NodeTag::LoopVariable => visitor.leave_loop_variable(self, id),
            NodeTag::AtRule => visitor.leave_at_rule(self, id),
            NodeTag::Definition => visitor.leave_definition(self, id),
            NodeTag::ConditionalBlock => visitor.leave_conditional_block(self, id),
            NodeTag::ConditionalRule => visitor.leave_conditional_rule(self, id),
            NodeTag::ForLoop => visitor.leave_for_loop(self, id),
            NodeTag::MixinDefinition => visitor.leave_mixin_definition(self, id),
            NodeTag::MixinCall => visitor.leave_mixin_call(self, id),
            NodeTag::Component => visitor.leave_component(self, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::property::Property;

    /// Build a declarations-block tree `.x { a: v; b: v; c: v }` and
    /// return the declaration ids keyed by property name.
    fn build_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let selector = tree.alloc(NodeKind::Selector {
            element: Some("x".into()),
            combinator: None,
        });
        let block = tree.alloc_declaration_block();
        for name in ["a", "b", "c"] {
            let declaration = declaration(&mut tree, name);
            tree.append(block, declaration);
        }
        let ruleset = tree.alloc(NodeKind::Ruleset);
        tree.append(ruleset, selector);
        tree.set_ruleset_block(ruleset, block).unwrap();
        let body = tree.body();
        tree.append(body, ruleset);
        (tree, block)
    }

    fn declaration(tree: &mut Tree, name: &str) -> NodeId {
        let property = tree.alloc(NodeKind::Property(Property::new(name)));
        let value = tree.alloc(NodeKind::Literal { value: "v".into() });
        let declaration = tree.alloc(NodeKind::Declaration { important: false });
        tree.append(declaration, property);
        tree.append(declaration, value);
        declaration
    }

    /// Records entered property names; optionally edits at one of them.
    #[derive(Default)]
    struct Recorder {
        entered: Vec<String>,
        left: Vec<String>,
        remove_at: Option<String>,
        replace_at: Option<(String, Vec<&'static str>)>,
        skip_declarations: bool,
    }

    impl Visitor for Recorder {
        fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
            let property = ctl.tree().declaration_property(id);
            let NodeKind::Property(p) = ctl.tree().kind(property) else {
                unreachable!()
            };
            let name = p.name().to_string();
            self.entered.push(name.clone());

            if self.remove_at.as_deref() == Some(&name) {
                ctl.remove_current(id);
                return true;
            }
            if let Some((at, with)) = self.replace_at.clone() {
                if at == name {
                    let replacements = with
                        .iter()
                        .map(|n| declaration(ctl.tree_mut(), n))
                        .collect();
                    ctl.replace_current(id, replacements);
                    return true;
                }
            }
            !self.skip_declarations
        }

        fn leave_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
            let property = ctl.tree().declaration_property(id);
            let NodeKind::Property(p) = ctl.tree().kind(property) else {
                unreachable!()
            };
            self.left.push(p.name().to_string());
        }
    }

    #[test]
    fn test_plain_walk_enters_and_leaves_in_order() {
        let (mut tree, _) = build_tree();
        let mut recorder = Recorder::default();
        VisitController::new(&mut tree).start_visit(&mut recorder);
        assert_eq!(recorder.entered, ["a", "b", "c"]);
        assert_eq!(recorder.left, ["a", "b", "c"]);
    }

    #[test]
    fn test_enter_false_skips_children_and_leave() {
        let (mut tree, _) = build_tree();
        let mut recorder = Recorder {
            skip_declarations: true,
            ..Recorder::default()
        };
        VisitController::new(&mut tree).start_visit(&mut recorder);
        assert_eq!(recorder.entered, ["a", "b", "c"]);
        assert!(recorder.left.is_empty());
    }

    #[test]
    fn test_remove_current_visits_every_former_sibling_once() {
        let (mut tree, block) = build_tree();
        let mut recorder = Recorder {
            remove_at: Some("b".into()),
            ..Recorder::default()
        };
        VisitController::new(&mut tree).start_visit(&mut recorder);

        // b is entered (that is where it removed itself), but c is neither
        // skipped nor visited twice, and b gets no leave.
        assert_eq!(recorder.entered, ["a", "b", "c"]);
        assert_eq!(recorder.left, ["a", "c"]);
        assert_eq!(tree.children(block).len(), 2);
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_replace_with_two_visits_both_replacements_only() {
        let (mut tree, block) = build_tree();
        let mut recorder = Recorder {
            replace_at: Some(("b".into(), vec!["p", "q"])),
            ..Recorder::default()
        };
        VisitController::new(&mut tree).start_visit(&mut recorder);

        assert_eq!(recorder.entered, ["a", "b", "p", "q", "c"]);
        assert_eq!(recorder.left, ["a", "p", "q", "c"]);
        assert_eq!(tree.children(block).len(), 4);
        tree.check_consistency().unwrap();
    }

    #[test]
    fn test_skip_children_keeps_siblings() {
        struct SkipBlocks;
        impl Visitor for SkipBlocks {
            fn enter_block(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
                ctl.skip_children(id);
                true
            }
        }
        let (mut tree, _) = build_tree();
        let mut skip = SkipBlocks;
        // Must terminate without visiting any declaration.
        VisitController::new(&mut tree).start_visit(&mut skip);
        tree.check_consistency().unwrap();
    }

    #[test]
    #[should_panic(expected = "not currently being visited")]
    fn test_mutating_a_non_current_node_panics() {
        struct BadPass;
        impl Visitor for BadPass {
            fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
                // Address the parent block instead of the current node.
                let parent = ctl.tree().parent(id).unwrap();
                ctl.remove_current(parent);
                true
            }
        }
        let (mut tree, _) = build_tree();
        VisitController::new(&mut tree).start_visit(&mut BadPass);
    }

    #[test]
    #[should_panic(expected = "block")]
    fn test_splice_kind_constraint_enforced() {
        struct WrongKind;
        impl Visitor for WrongKind {
            fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
                let ruleset = ctl.tree_mut().alloc(NodeKind::Ruleset);
                ctl.replace_current(id, vec![ruleset]);
                true
            }
        }
        let (mut tree, _) = build_tree();
        VisitController::new(&mut tree).start_visit(&mut WrongKind);
    }

    #[test]
    fn test_remove_during_leave_continues_with_next_sibling() {
        #[derive(Default)]
        struct RemoveOnLeave {
            entered: Vec<String>,
        }
        impl Visitor for RemoveOnLeave {
            fn enter_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
                let property = ctl.tree().declaration_property(id);
                let NodeKind::Property(p) = ctl.tree().kind(property) else {
                    unreachable!()
                };
                self.entered.push(p.name().to_string());
                true
            }
            fn leave_declaration(&mut self, ctl: &mut VisitController<'_>, id: NodeId) {
                let property = ctl.tree().declaration_property(id);
                let NodeKind::Property(p) = ctl.tree().kind(property) else {
                    unreachable!()
                };
                if p.name() == "b" {
                    ctl.remove_current(id);
                }
            }
        }

        let (mut tree, block) = build_tree();
        let mut visitor = RemoveOnLeave::default();
        VisitController::new(&mut tree).start_visit(&mut visitor);
        assert_eq!(visitor.entered, ["a", "b", "c"]);
        assert_eq!(tree.children(block).len(), 2);
        tree.check_consistency().unwrap();
    }
}
